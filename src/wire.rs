//! Wire schema for flow and offer responses: a typed entry list plus forward
//! links, and the error-body shapes servers use for non-2xx replies.

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, FlowResult};
use crate::offer::OfferScreen;
use crate::style::Color;

/// Where in the host app the offer surface appears.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    #[default]
    OrderConfirmation,
    OrderStatus,
}

impl Placement {
    /// Query-parameter value.
    pub fn as_str(self) -> &'static str {
        match self {
            Placement::OrderConfirmation => "order_confirmation",
            Placement::OrderStatus => "order_status",
        }
    }
}

/// Inline vs. popup presentation for the offer surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Inline,
    Popup,
}

impl RenderMode {
    fn from_wire(value: Option<&str>) -> RenderMode {
        match value {
            Some("popup") => RenderMode::Popup,
            _ => RenderMode::Inline,
        }
    }
}

/// Top-level response body for both flow creation and next-offer requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub data: Vec<Entry>,
    #[serde(default)]
    pub links: Links,
}

/// One typed entry in a response's `data` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub entry_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<OfferScreen>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personalization: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_x: Option<bool>,
}

/// Forward pointers carried by each response. Consumed immediately by the
/// flow controller, never stored beyond the step that produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    #[serde(rename = "nextOffer", skip_serializing_if = "Option::is_none")]
    pub next_offer: Option<String>,
    #[serde(rename = "offerEvent", skip_serializing_if = "Option::is_none")]
    pub offer_event: Option<String>,
}

impl Envelope {
    pub fn entry_of_type(&self, entry_type: &str) -> Option<&Entry> {
        self.data.iter().find(|entry| entry.entry_type == entry_type)
    }

    pub fn flow_entry(&self) -> Option<&Entry> {
        self.entry_of_type("flow")
    }

    pub fn offer_entry(&self) -> Option<&Entry> {
        self.entry_of_type("offer")
    }
}

/// Flow-scoped styling and behavior metadata, read once from the flow-typed
/// entry of the creation response. Immutable for the rest of the flow.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ServerDirective {
    /// Validated override for the flow's primary color.
    pub highlight_color: Option<Color>,
    pub render_mode: RenderMode,
    /// Whether a close affordance is rendered in the header.
    pub show_dismiss: bool,
    /// When false the `first_name` param is removed for the rest of the flow.
    pub personalization_allowed: bool,
    /// True when the server stated a render mode explicitly.
    pub render_mode_explicit: bool,
}

impl ServerDirective {
    pub fn from_entry(entry: &Entry) -> ServerDirective {
        let highlight_color = entry.highlight_color.as_deref().and_then(|hex| {
            Color::parse(hex)
                .map_err(|err| tracing::warn!(value = hex, %err, "ignoring highlight color"))
                .ok()
        });

        ServerDirective {
            highlight_color,
            render_mode: RenderMode::from_wire(entry.render_type.as_deref()),
            show_dismiss: entry.render_x.unwrap_or(false),
            personalization_allowed: entry.personalization.unwrap_or(true),
            render_mode_explicit: entry.render_type.is_some(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    errors: Option<Vec<ErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    title: Option<String>,
}

/// Extract a human-readable message from a non-2xx body: a single `error`
/// field first, then the first `errors[].title`.
pub fn parse_error_body(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    if let Some(message) = parsed.error {
        return Some(message);
    }
    parsed
        .errors?
        .into_iter()
        .find_map(|entry| entry.title)
}

/// Message surfaced for a failed request: the parsed body if it yields one,
/// otherwise a plain status description.
pub fn server_error(status: u16, body: &str) -> FlowError {
    let message = parse_error_body(body)
        .unwrap_or_else(|| format!("request failed with status {status}"));
    FlowError::Server { status, message }
}

/// Decode a 2xx body. A mismatch is a [`FlowError::MalformedResponse`],
/// which callers treat as "no offer to show", not as a user-facing error.
pub fn parse_envelope(body: &str) -> FlowResult<Envelope> {
    serde_json::from_str(body).map_err(|err| FlowError::MalformedResponse(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_envelope_from_wire() {
        let envelope: Envelope = serde_json::from_str(
            r##"{"data":[{"id":"f1","type":"flow","personalization":false,
                 "highlight_color":"#336699","render_type":"popup","render_x":true}],
                "links":{"nextOffer":"/o/1"}}"##,
        )
        .unwrap();

        let entry = envelope.flow_entry().unwrap();
        assert_eq!(entry.id, "f1");

        let directive = ServerDirective::from_entry(entry);
        assert_eq!(directive.highlight_color, Some(Color::rgb(0x33, 0x66, 0x99)));
        assert_eq!(directive.render_mode, RenderMode::Popup);
        assert!(directive.show_dismiss);
        assert!(!directive.personalization_allowed);
        assert!(directive.render_mode_explicit);

        assert_eq!(envelope.links.next_offer.as_deref(), Some("/o/1"));
        assert_eq!(envelope.links.offer_event, None);
    }

    #[test]
    fn test_directive_defaults_when_fields_absent() {
        let entry = Entry {
            id: "f1".into(),
            entry_type: "flow".into(),
            ..Default::default()
        };
        let directive = ServerDirective::from_entry(&entry);
        assert_eq!(directive.highlight_color, None);
        assert_eq!(directive.render_mode, RenderMode::Inline);
        assert!(!directive.show_dismiss);
        assert!(directive.personalization_allowed);
        assert!(!directive.render_mode_explicit);
    }

    #[test]
    fn test_directive_ignores_invalid_highlight() {
        let entry = Entry {
            highlight_color: Some("chartreuse".into()),
            ..Default::default()
        };
        assert_eq!(ServerDirective::from_entry(&entry).highlight_color, None);
    }

    #[test]
    fn test_error_body_single_field() {
        assert_eq!(
            parse_error_body(r#"{"error":"invalid integration id"}"#),
            Some("invalid integration id".to_string())
        );
    }

    #[test]
    fn test_error_body_errors_array() {
        assert_eq!(
            parse_error_body(r#"{"errors":[{"title":"flow expired"},{"title":"other"}]}"#),
            Some("flow expired".to_string())
        );
    }

    #[test]
    fn test_parse_envelope_flags_schema_mismatches() {
        assert!(parse_envelope(r#"{"data":[],"links":{}}"#).is_ok());
        assert!(matches!(
            parse_envelope("<html>boom</html>"),
            Err(FlowError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_error_body_unparseable() {
        assert_eq!(parse_error_body("<html>boom</html>"), None);
        let err = server_error(503, "<html>boom</html>");
        assert_eq!(
            err,
            FlowError::Server {
                status: 503,
                message: "request failed with status 503".to_string()
            }
        );
    }
}
