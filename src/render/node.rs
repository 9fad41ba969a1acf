//! Node renderer: one typed content node in, one visual primitive out, with
//! a bound action where the node is interactive.

use serde::{Deserialize, Serialize};

use crate::error::FlowError;
use crate::node::{ButtonNode, DigitProgress, ImageNode, LinkNode, OfferNode, TextNode};
use crate::render::visual::{
    Action, Axis, ButtonBlock, Edges, Gravity, Group, ImageSlot, Indicator, Span, TextBlock,
    Visual,
};
use crate::style::{self, Color, Emphasis};
use crate::theme::ViewportClass;

/// How a button decides whether it accepts or rejects an offer. Protocol
/// versions disagree; both conventions stay supported and the active one is
/// chosen per flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchRule {
    /// Accept when `kind` is primary and a destination is present.
    #[default]
    KindPrimaryWithDestination,
    /// Accept when the destination contains "accept"; everything else rejects.
    DestinationSubstring,
}

/// Inherited styling for the region currently being rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    pub viewport: ViewportClass,
    /// Fallback text color for this region.
    pub default_color: Color,
    /// Fallback color for link spans in this region.
    pub link_color: Color,
    pub primary: Color,
    pub secondary: Color,
    pub dispatch: DispatchRule,
}

impl RenderContext {
    pub fn horizontal_padding(&self) -> f32 {
        self.viewport.horizontal_padding()
    }

    /// Same context with a different region default color.
    pub fn for_region(&self, default_color: Color) -> RenderContext {
        RenderContext { default_color, ..*self }
    }

    pub fn with_link_color(&self, link_color: Color) -> RenderContext {
        RenderContext { link_color, ..*self }
    }
}

/// Render one node. `None` for unknown node types; they are skipped, never an
/// error. Missing link destinations are appended to `issues` so the flow
/// controller can surface them through its error channel.
pub fn render_node(
    node: &OfferNode,
    ctx: &RenderContext,
    issues: &mut Vec<FlowError>,
) -> Option<Visual> {
    match node {
        OfferNode::Text(text) => Some(Visual::Text(render_text(text, ctx))),
        OfferNode::Link(link) => Some(Visual::Text(TextBlock {
            spans: link_spans(link, ctx, issues),
            size: style::text_size(None),
            color: ctx.default_color,
            emphasis: Emphasis::None,
            padding: Edges::symmetric(ctx.horizontal_padding(), 8.0),
            align: Gravity::Start,
        })),
        OfferNode::Image(image) => Some(Visual::Image(image_slot(image, ctx.viewport))),
        OfferNode::Button(button) => Some(Visual::Button(render_button(button, ctx))),
        OfferNode::Digits(digits) => Some(render_digits(digits, ctx)),
        OfferNode::Container(container) => {
            let children = container
                .children
                .as_deref()
                .unwrap_or_default()
                .iter()
                .filter_map(|child| render_node(child, ctx, issues))
                .collect::<Vec<_>>();
            Some(Visual::Group(Group { children, ..Group::column() }))
        }
        OfferNode::Unknown => None,
    }
}

/// A standalone styled text run.
pub fn render_text(node: &TextNode, ctx: &RenderContext) -> TextBlock {
    let attrs = node.attributes.as_ref();
    let resolved = style::emphasis(attrs.and_then(|a| a.emphasis.as_deref()));
    let bold = resolved == Emphasis::Bold;

    TextBlock {
        spans: vec![Span {
            text: node.text.clone(),
            bold,
            color: None,
            action: None,
        }],
        size: style::text_size(attrs.and_then(|a| a.size.as_deref())),
        color: style::appearance_color(
            attrs.and_then(|a| a.appearance.as_deref()),
            ctx.default_color,
        ),
        emphasis: if bold { Emphasis::None } else { resolved },
        padding: Edges::symmetric(ctx.horizontal_padding(), 8.0),
        align: Gravity::Start,
    }
}

/// Concatenate a region's text and link nodes into one span run. Text nodes
/// inherit the block color unless they carry an appearance token; link
/// children become clickable spans.
pub fn spans_for_run(
    nodes: &[OfferNode],
    ctx: &RenderContext,
    issues: &mut Vec<FlowError>,
) -> Vec<Span> {
    let mut spans = Vec::new();
    for node in nodes {
        match node {
            OfferNode::Text(text) => spans.push(text_span(text, ctx)),
            OfferNode::Link(link) => spans.extend(link_spans(link, ctx, issues)),
            _ => {}
        }
    }
    spans
}

fn text_span(node: &TextNode, ctx: &RenderContext) -> Span {
    let attrs = node.attributes.as_ref();
    let appearance = attrs.and_then(|a| a.appearance.as_deref());
    Span {
        text: node.text.clone(),
        bold: style::emphasis(attrs.and_then(|a| a.emphasis.as_deref())) == Emphasis::Bold,
        color: appearance.map(|token| style::appearance_color(Some(token), ctx.default_color)),
        action: None,
    }
}

/// Spans for one link node: its children (or its own text) as clickable
/// fragments. A link without a destination renders as plain text and its
/// click is a no-op; the omission is recorded once per node.
pub fn link_spans(
    link: &LinkNode,
    ctx: &RenderContext,
    issues: &mut Vec<FlowError>,
) -> Vec<Span> {
    let destination = link.attributes.as_ref().and_then(|a| a.to.clone());
    if destination.is_none() {
        issues.push(FlowError::MissingLinkDestination);
    }
    let action = destination.map(|to| Action::OpenLink { to });

    let fragment = |text: &str, attrs: Option<&crate::node::NodeAttributes>| Span {
        text: text.to_string(),
        bold: style::emphasis(attrs.and_then(|a| a.emphasis.as_deref())) == Emphasis::Bold,
        color: Some(style::appearance_color(
            attrs.and_then(|a| a.appearance.as_deref()),
            ctx.link_color,
        )),
        action: action.clone(),
    };

    match link.children.as_deref() {
        Some(children) => children
            .iter()
            .filter_map(|child| match child {
                OfferNode::Text(text) => Some(fragment(&text.text, text.attributes.as_ref())),
                _ => None,
            })
            .collect(),
        None => link
            .text
            .as_deref()
            .map(|text| vec![fragment(text, link.attributes.as_ref())])
            .unwrap_or_default(),
    }
}

/// A clickable block. Primary kind takes the flow primary fill with white
/// text, everything else the secondary fill with near-black text.
pub fn render_button(button: &ButtonNode, ctx: &RenderContext) -> ButtonBlock {
    let is_primary = button
        .attributes
        .as_ref()
        .and_then(|a| a.kind.as_deref())
        == Some("primary");

    ButtonBlock {
        label: button.text.clone(),
        fill: if is_primary { ctx.primary } else { ctx.secondary },
        text_color: if is_primary { Color::WHITE } else { Color::INK },
        action: button_action(button, ctx.dispatch),
        full_width: ctx.viewport == ViewportClass::Narrow,
    }
}

/// Decide accept vs. reject for a button under the active dispatch rule.
pub fn button_action(button: &ButtonNode, rule: DispatchRule) -> Action {
    let attrs = button.attributes.as_ref();
    let destination = attrs.and_then(|a| a.to.clone());

    match rule {
        DispatchRule::KindPrimaryWithDestination => {
            let is_primary = attrs.and_then(|a| a.kind.as_deref()) == Some("primary");
            match destination {
                Some(to) if is_primary => Action::Accept { to },
                _ => Action::Reject,
            }
        }
        DispatchRule::DestinationSubstring => match destination {
            Some(to) if to.contains("accept") => Action::Accept { to },
            _ => Action::Reject,
        },
    }
}

/// One indicator per step of the closed range; step `i` is filled with the
/// primary color iff `i <= current`.
pub fn render_digits(digits: &DigitProgress, ctx: &RenderContext) -> Visual {
    let children = (digits.start..=digits.size)
        .map(|step| {
            Visual::Indicator(Indicator {
                label: step.to_string(),
                fill: if step <= digits.current { ctx.primary } else { ctx.secondary },
                diameter: 32.0,
            })
        })
        .collect::<Vec<_>>();

    Visual::Group(Group {
        axis: Axis::Horizontal,
        spacing: 8.0,
        margin: Edges::symmetric(0.0, 16.0),
        gravity: Gravity::Center,
        children,
        ..Group::default()
    })
}

/// Reserved image dimensions by viewport class.
pub fn image_slot(image: &ImageNode, viewport: ViewportClass) -> ImageSlot {
    let side = match viewport {
        ViewportClass::Wide => 150.0,
        ViewportClass::Narrow => 100.0,
    };
    ImageSlot {
        url: image.url.clone(),
        width: side,
        height: side,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeAttributes;
    use crate::theme::FlowTheme;

    fn ctx() -> RenderContext {
        let theme = FlowTheme::default();
        RenderContext {
            viewport: ViewportClass::Narrow,
            default_color: Color::INK,
            link_color: Color::MUTED_BLUE,
            primary: theme.primary,
            secondary: theme.secondary,
            dispatch: DispatchRule::default(),
        }
    }

    fn button(kind: Option<&str>, to: Option<&str>) -> ButtonNode {
        ButtonNode {
            text: "Go".into(),
            attributes: Some(NodeAttributes {
                kind: kind.map(Into::into),
                to: to.map(Into::into),
                ..Default::default()
            }),
        }
    }

    #[test]
    fn test_kind_rule_accepts_primary_with_destination() {
        let rule = DispatchRule::KindPrimaryWithDestination;
        assert_eq!(
            button_action(&button(Some("primary"), Some("https://x/a")), rule),
            Action::Accept { to: "https://x/a".into() }
        );
        assert_eq!(button_action(&button(Some("primary"), None), rule), Action::Reject);
        assert_eq!(
            button_action(&button(Some("secondary"), Some("https://x/a")), rule),
            Action::Reject
        );
    }

    #[test]
    fn test_substring_rule_keys_off_destination() {
        let rule = DispatchRule::DestinationSubstring;
        assert_eq!(
            button_action(&button(None, Some("https://x/accept?id=1")), rule),
            Action::Accept { to: "https://x/accept?id=1".into() }
        );
        assert_eq!(
            button_action(&button(Some("primary"), Some("https://x/reject")), rule),
            Action::Reject
        );
        assert_eq!(button_action(&button(Some("primary"), None), rule), Action::Reject);
    }

    #[test]
    fn test_digit_indicators_count_and_fill() {
        let digits = DigitProgress { start: 1, size: 4, current: 2 };
        let rendered = render_digits(&digits, &ctx());
        let Visual::Group(group) = rendered else { panic!("expected group") };
        assert_eq!(group.children.len(), 4);

        for (offset, child) in group.children.iter().enumerate() {
            let Visual::Indicator(indicator) = child else { panic!("expected indicator") };
            let step = digits.start + offset as u32;
            assert_eq!(indicator.label, step.to_string());
            let expected = if step <= digits.current { ctx().primary } else { ctx().secondary };
            assert_eq!(indicator.fill, expected);
        }
    }

    #[test]
    fn test_link_without_destination_is_inert_and_reported() {
        let link = LinkNode {
            text: None,
            attributes: None,
            children: Some(vec![OfferNode::Text(TextNode {
                text: "terms".into(),
                attributes: None,
            })]),
        };
        let mut issues = Vec::new();
        let spans = link_spans(&link, &ctx(), &mut issues);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].action, None);
        assert_eq!(issues, vec![FlowError::MissingLinkDestination]);
    }

    #[test]
    fn test_unknown_node_renders_nothing() {
        let mut issues = Vec::new();
        assert_eq!(render_node(&OfferNode::Unknown, &ctx(), &mut issues), None);
        assert!(issues.is_empty());
    }
}
