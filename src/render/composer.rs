//! Offer composer: assembles the region tree for one offer screen. Regions
//! build top-to-bottom in a fixed order; wide viewports pull the image and
//! the content/actions/disclaimer block side-by-side, and popup mode wraps
//! the card in a dimmed backdrop.

use crate::error::FlowError;
use crate::node::OfferNode;
use crate::offer::OfferScreen;
use crate::render::node::{
    image_slot, render_button, render_digits, render_text, spans_for_run, DispatchRule,
    RenderContext,
};
use crate::render::visual::{
    Action, Axis, CloseButton, Edges, Gravity, Group, Span, TextBlock, Visual,
};
use crate::style::{self, Color, Emphasis};
use crate::theme::{FlowTheme, ViewportClass};
use crate::wire::RenderMode;

/// Flow-level styling inputs for composition, fixed at flow start.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleContext {
    pub theme: FlowTheme,
    pub render_mode: RenderMode,
    pub show_dismiss: bool,
    pub dispatch: DispatchRule,
}

impl Default for StyleContext {
    fn default() -> Self {
        StyleContext {
            theme: FlowTheme::default(),
            render_mode: RenderMode::Inline,
            show_dismiss: false,
            dispatch: DispatchRule::default(),
        }
    }
}

/// A composed screen plus any non-fatal problems found while rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub root: Visual,
    pub issues: Vec<FlowError>,
}

/// Build the visual tree for one offer screen. An all-empty screen composes
/// to an empty tree; callers treat that as "clear the display".
pub fn compose(screen: &OfferScreen, style: &StyleContext, viewport: ViewportClass) -> Composition {
    let mut issues = Vec::new();
    let ctx = RenderContext {
        viewport,
        default_color: Color::INK,
        link_color: Color::MUTED_BLUE,
        primary: style.theme.primary,
        secondary: style.theme.secondary,
        dispatch: style.dispatch,
    };
    let hp = viewport.horizontal_padding();

    let mut card_children = Vec::new();

    if let Some(header) = header_row(screen, style, &ctx) {
        card_children.push(header);
    }
    if let Some(digits) = &screen.digits {
        card_children.push(render_digits(digits, &ctx));
    }

    let image = screen
        .image
        .as_ref()
        .map(|image| Visual::Image(image_slot(image, viewport)));

    if viewport == ViewportClass::Narrow {
        if let Some(image) = image.clone() {
            card_children.push(image);
        }
    }

    card_children.extend(text_blocks(&screen.personalization, &ctx.for_region(Color::INK)));
    card_children.extend(text_blocks(&screen.sponsored, &ctx.for_region(Color::LIGHT_GRAY)));

    let mut body = Vec::new();
    if let Some(content) = content_run(screen, &ctx, hp, &mut issues) {
        body.push(content);
    }
    if let Some(actions) = actions_row(screen, &ctx, hp) {
        body.push(actions);
    }
    if let Some(disclaimer) = mixed_run(
        screen.disclaimer.as_deref(),
        &ctx.for_region(Color::GRAY).with_link_color(Color::MUTED_BLUE),
        Edges::symmetric(hp, 8.0),
        Gravity::Start,
        &mut issues,
    ) {
        body.push(disclaimer);
    }

    match viewport {
        ViewportClass::Wide => {
            // Image leads, the content block fills the remaining width.
            let mut row_children = Vec::new();
            if let Some(image) = image {
                row_children.push(image);
            }
            if !body.is_empty() {
                row_children.push(Visual::Group(Group {
                    children: body,
                    ..Group::column()
                }));
            }
            if !row_children.is_empty() {
                card_children.push(Visual::Group(Group {
                    spacing: hp,
                    children: row_children,
                    ..Group::row()
                }));
            }
        }
        ViewportClass::Narrow => card_children.extend(body),
    }

    if let Some(footer) = mixed_run(
        screen.footer.as_deref(),
        &ctx.for_region(Color::GRAY).with_link_color(Color::GRAY),
        Edges {
            left: hp,
            top: 8.0,
            right: hp,
            bottom: 16.0,
        },
        Gravity::End,
        &mut issues,
    ) {
        card_children.push(footer);
    }

    if card_children.is_empty() {
        return Composition {
            root: Visual::empty(),
            issues,
        };
    }

    let popup = style.render_mode == RenderMode::Popup;
    let card = Visual::Group(Group {
        background: popup.then_some(Color::WHITE),
        margin: if popup { Edges::symmetric(16.0, 0.0) } else { Edges::NONE },
        elevation: if popup { 8.0 } else { 0.0 },
        children: card_children,
        ..Group::column()
    });

    let root = if popup {
        Visual::Group(Group {
            background: Some(style.theme.backdrop),
            gravity: Gravity::Center,
            children: vec![card],
            ..Group::column()
        })
    } else {
        card
    };

    Composition { root, issues }
}

/// Header band: text nodes on the primary fill, plus the close affordance
/// when the directive asks for one.
fn header_row(screen: &OfferScreen, style: &StyleContext, ctx: &RenderContext) -> Option<Visual> {
    let nodes = screen.header.as_deref().filter(|nodes| !nodes.is_empty())?;
    let header_ctx = ctx.for_region(Color::WHITE);

    let mut children = nodes
        .iter()
        .filter_map(|node| match node {
            OfferNode::Text(text) => {
                // The row carries the padding; the runs sit flush inside it.
                let mut block = render_text(text, &header_ctx);
                block.padding = Edges::NONE;
                Some(Visual::Text(block))
            }
            _ => None,
        })
        .collect::<Vec<_>>();

    if children.is_empty() {
        return None;
    }
    if style.show_dismiss {
        children.push(Visual::Close(CloseButton { action: Action::Dismiss }));
    }

    Some(Visual::Group(Group {
        axis: Axis::Horizontal,
        spacing: 8.0,
        padding: Edges::symmetric(ctx.horizontal_padding(), 8.0),
        background: Some(ctx.primary),
        gravity: Gravity::Center,
        children,
        ..Group::default()
    }))
}

/// One text block per text node of a region.
fn text_blocks(region: &Option<Vec<OfferNode>>, ctx: &RenderContext) -> Vec<Visual> {
    region
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(|node| match node {
            OfferNode::Text(text) => Some(Visual::Text(render_text(text, ctx))),
            _ => None,
        })
        .collect()
}

/// Body copy: all content text nodes concatenated into a single run so bold
/// fragments flow inline with their siblings.
fn content_run(
    screen: &OfferScreen,
    ctx: &RenderContext,
    hp: f32,
    issues: &mut Vec<FlowError>,
) -> Option<Visual> {
    let nodes = screen.content.as_deref()?;
    let spans = spans_for_run(nodes, &ctx.for_region(Color::INK), issues);
    if spans.is_empty() {
        return None;
    }
    Some(Visual::Text(TextBlock {
        spans,
        size: 16.0,
        color: Color::INK,
        emphasis: Emphasis::None,
        padding: Edges::symmetric(hp, 8.0),
        align: Gravity::Start,
    }))
}

fn actions_row(screen: &OfferScreen, ctx: &RenderContext, hp: f32) -> Option<Visual> {
    let nodes = screen.actions.as_deref()?;
    let buttons = nodes
        .iter()
        .filter_map(|node| match node {
            OfferNode::Button(button) => Some(Visual::Button(render_button(button, ctx))),
            _ => None,
        })
        .collect::<Vec<_>>();
    if buttons.is_empty() {
        return None;
    }
    Some(Visual::Group(Group {
        axis: match ctx.viewport {
            ViewportClass::Wide => Axis::Horizontal,
            ViewportClass::Narrow => Axis::Vertical,
        },
        spacing: 16.0,
        padding: Edges::symmetric(hp, 8.0),
        children: buttons,
        ..Group::default()
    }))
}

/// A region whose text and link nodes concatenate into one mixed run, styled
/// after its first node.
fn mixed_run(
    nodes: Option<&[OfferNode]>,
    ctx: &RenderContext,
    padding: Edges,
    align: Gravity,
    issues: &mut Vec<FlowError>,
) -> Option<Visual> {
    let nodes = nodes?;
    let spans: Vec<Span> = spans_for_run(nodes, ctx, issues);
    if spans.is_empty() {
        return None;
    }

    let first_attrs = nodes.first().and_then(|node| node.attributes());
    Some(Visual::Text(TextBlock {
        spans,
        size: style::text_size(first_attrs.and_then(|a| a.size.as_deref())),
        color: style::appearance_color(
            first_attrs.and_then(|a| a.appearance.as_deref()),
            ctx.default_color,
        ),
        emphasis: Emphasis::None,
        padding,
        align,
    }))
}
