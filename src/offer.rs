//! The composed offer payload: named optional regions, each holding zero or
//! more content nodes. Regions are independent; a missing region renders
//! nothing.

use serde::{Deserialize, Serialize};

use crate::node::{DigitProgress, ImageNode, OfferNode};

/// One screen's worth of promotional content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferScreen {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<Vec<OfferNode>>,
    /// Step indicators. Wire name `offers`.
    #[serde(rename = "offers", skip_serializing_if = "Option::is_none")]
    pub digits: Option<DigitProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personalization: Option<Vec<OfferNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsored: Option<Vec<OfferNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<OfferNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<OfferNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<Vec<OfferNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<Vec<OfferNode>>,
}

impl OfferScreen {
    /// True when no region carries anything renderable.
    pub fn is_empty(&self) -> bool {
        fn empty(region: &Option<Vec<OfferNode>>) -> bool {
            region.as_ref().map(|nodes| nodes.is_empty()).unwrap_or(true)
        }

        empty(&self.header)
            && self.digits.is_none()
            && self.image.is_none()
            && empty(&self.personalization)
            && empty(&self.sponsored)
            && empty(&self.content)
            && empty(&self.actions)
            && empty(&self.disclaimer)
            && empty(&self.footer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_screen() {
        assert!(OfferScreen::default().is_empty());

        let with_empty_region = OfferScreen {
            header: Some(vec![]),
            ..Default::default()
        };
        assert!(with_empty_region.is_empty());
    }

    #[test]
    fn test_screen_with_content_is_not_empty() {
        let screen: OfferScreen = serde_json::from_str(
            r#"{"header":[{"type":"text","text":"Save 20%"}]}"#,
        )
        .unwrap();
        assert!(!screen.is_empty());
    }

    #[test]
    fn test_digits_region_uses_wire_name() {
        let screen: OfferScreen =
            serde_json::from_str(r#"{"offers":{"start":1,"size":3,"current":1}}"#).unwrap();
        assert_eq!(
            screen.digits,
            Some(DigitProgress { start: 1, size: 3, current: 1 })
        );
        assert!(!screen.is_empty());
    }
}
