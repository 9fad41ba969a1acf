//! Toolkit-agnostic visual primitives. The composer produces a tree of these
//! and the host maps them onto its own widget system; primitives are plain
//! data so two renders of the same screen compare equal.

use serde::{Deserialize, Serialize};

use crate::style::{Color, Emphasis};

/// What a click on an interactive primitive means to the flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Accept the offer: open the destination and advance the flow.
    Accept { to: String },
    /// Decline the offer: advance the flow without opening anything.
    Reject,
    /// Open an external link; the flow does not move.
    OpenLink { to: String },
    /// Clear the surface locally. No network call, no server-side change.
    Dismiss,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gravity {
    #[default]
    Start,
    Center,
    End,
}

/// Per-side spacing in layout units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Edges {
    pub const NONE: Edges = Edges { left: 0.0, top: 0.0, right: 0.0, bottom: 0.0 };

    pub const fn symmetric(horizontal: f32, vertical: f32) -> Edges {
        Edges {
            left: horizontal,
            top: vertical,
            right: horizontal,
            bottom: vertical,
        }
    }
}

/// One fragment of a text run. Bold is span-level so mixed-emphasis runs
/// concatenate without intervening blocks; a span with an action is a
/// clickable link region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Span {
        Span {
            text: text.into(),
            bold: false,
            color: None,
            action: None,
        }
    }
}

/// A styled text run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub spans: Vec<Span>,
    pub size: f32,
    /// Run-level color; spans may override per fragment.
    pub color: Color,
    pub emphasis: Emphasis,
    pub padding: Edges,
    pub align: Gravity,
}

/// Reserved space for a deferred remote image. While the fetch is pending or
/// after it fails the host leaves the reserved dimensions blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSlot {
    pub url: String,
    pub width: f32,
    pub height: f32,
}

/// A filled, clickable block. Hosts disable the block on its first
/// activation; the flow controller additionally ignores duplicate advancing
/// clicks per shown screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonBlock {
    pub label: String,
    pub fill: Color,
    pub text_color: Color,
    pub action: Action,
    /// Narrow viewports stretch buttons edge-to-edge.
    pub full_width: bool,
}

/// One step indicator: a filled circle with a number label. Labels render
/// white at size 12 regardless of fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub label: String,
    pub fill: Color,
    pub diameter: f32,
}

/// The header close affordance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseButton {
    pub action: Action,
}

/// A stack of children along one axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub axis: Axis,
    pub spacing: f32,
    pub padding: Edges,
    pub margin: Edges,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    pub gravity: Gravity,
    pub elevation: f32,
    pub children: Vec<Visual>,
}

impl Group {
    pub fn column() -> Group {
        Group::default()
    }

    pub fn row() -> Group {
        Group {
            axis: Axis::Horizontal,
            ..Group::default()
        }
    }
}

/// One node of the composed visual tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Visual {
    Group(Group),
    Text(TextBlock),
    Image(ImageSlot),
    Button(ButtonBlock),
    Indicator(Indicator),
    Close(CloseButton),
}

impl Visual {
    /// An empty tree; hosts treat it as "clear the display".
    pub fn empty() -> Visual {
        Visual::Group(Group::column())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Visual::Group(group) => group.children.iter().all(Visual::is_empty),
            _ => false,
        }
    }
}
