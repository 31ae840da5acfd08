//! Protocol error types.

use thiserror::Error;

/// Errors raised by the applet data model and channel transports.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP transport error.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The channel could not deliver the request (custom adapters).
    #[error("channel unavailable: {0}")]
    ChannelUnavailable(String),

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The card payload does not describe a valid applet card.
    #[error("invalid card payload: {0}")]
    InvalidCard(String),

    /// URL parsing error.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ProtocolError {
    /// Whether this error originates in the transport rather than the payload.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ProtocolError::Transport(_) | ProtocolError::ChannelUnavailable(_)
        )
    }
}

/// Protocol Result type alias.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
