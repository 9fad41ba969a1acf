use thiserror::Error;

pub type FlowResult<T> = Result<T, FlowError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    /// Connectivity-level failure. Carries the transport's own description.
    #[error("{0}")]
    Transport(String),

    /// Non-2xx response with a human-readable message extracted from the body.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// 2xx response whose body does not match the offer schema. Treated as
    /// "no offer to show"; never surfaced to the user as a message.
    #[error("response did not match the offer schema: {0}")]
    MalformedResponse(String),

    /// A link node arrived without a destination. Its click is a no-op.
    #[error("link has no destination")]
    MissingLinkDestination,

    #[error("invalid color value '{value}': must be hex like #rrggbb or #aarrggbb")]
    InvalidColor { value: String },
}
