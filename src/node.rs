//! The offer content vocabulary: a closed tagged variant over the node types
//! the offer schema defines. Unknown type tags deserialize to a skip node so
//! a newer server never breaks an older client.

use serde::{Deserialize, Serialize};

/// One content node inside an offer region.
///
/// The wire discriminator is the `type` field. Fields that are irrelevant to
/// a node's tag are absent, never defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OfferNode {
    Text(TextNode),
    Link(LinkNode),
    Image(ImageNode),
    Button(ButtonNode),
    Digits(DigitProgress),
    Container(ContainerNode),
    /// Any type tag this client does not know. Renders nothing.
    #[serde(other)]
    Unknown,
}

/// Style and action descriptor shared by text-like nodes. All fields are
/// optional on the wire; which ones are meaningful depends on the node type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emphasis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appearance: Option<String>,
    /// Button/link kind: primary or secondary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Destination URL for links and accept buttons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

/// A literal text run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<NodeAttributes>,
}

/// A clickable span. Owns child nodes so plain and linked text can mix in
/// one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<NodeAttributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<OfferNode>>,
}

/// A remote image, fetched best-effort by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageNode {
    pub url: String,
}

/// A clickable action block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonNode {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<NodeAttributes>,
}

/// A generic grouping node; renders its children in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<OfferNode>>,
}

/// A horizontal run of step indicators. Steps at or below `current` are
/// filled with the flow primary color, later ones with the secondary color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitProgress {
    pub start: u32,
    /// Inclusive end of the range.
    pub size: u32,
    pub current: u32,
}

impl DigitProgress {
    /// Whether `start <= current <= size` holds.
    pub fn is_valid(&self) -> bool {
        self.start <= self.current && self.current <= self.size
    }

    /// Number of indicators rendered: the closed range [start, size].
    pub fn step_count(&self) -> u32 {
        self.size - self.start + 1
    }
}

impl OfferNode {
    /// Attributes of the node, when its type carries any.
    pub fn attributes(&self) -> Option<&NodeAttributes> {
        match self {
            OfferNode::Text(n) => n.attributes.as_ref(),
            OfferNode::Link(n) => n.attributes.as_ref(),
            OfferNode::Button(n) => n.attributes.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_node_from_wire() {
        let node: OfferNode = serde_json::from_str(
            r#"{"type":"text","text":"Save 20%","attributes":{"size":"large","emphasis":"bold"}}"#,
        )
        .unwrap();
        match node {
            OfferNode::Text(text) => {
                assert_eq!(text.text, "Save 20%");
                let attrs = text.attributes.unwrap();
                assert_eq!(attrs.size.as_deref(), Some("large"));
                assert_eq!(attrs.emphasis.as_deref(), Some("bold"));
                assert_eq!(attrs.to, None);
            }
            other => panic!("expected text node, got {other:?}"),
        }
    }

    #[test]
    fn test_link_node_owns_children() {
        let node: OfferNode = serde_json::from_str(
            r#"{"type":"link","attributes":{"to":"https://x/terms"},
                "children":[{"type":"text","text":"terms"}]}"#,
        )
        .unwrap();
        match node {
            OfferNode::Link(link) => {
                assert_eq!(link.children.unwrap().len(), 1);
                assert_eq!(link.attributes.unwrap().to.as_deref(), Some("https://x/terms"));
            }
            other => panic!("expected link node, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_tag_is_a_skip_node() {
        let node: OfferNode =
            serde_json::from_str(r#"{"type":"carousel","items":[1,2,3]}"#).unwrap();
        assert_eq!(node, OfferNode::Unknown);
    }

    #[test]
    fn test_digit_progress_invariant() {
        let digits = DigitProgress { start: 1, size: 4, current: 2 };
        assert!(digits.is_valid());
        assert_eq!(digits.step_count(), 4);

        let inverted = DigitProgress { start: 3, size: 2, current: 3 };
        assert!(!inverted.is_valid());
    }
}
