//! Applet runtime errors.

use applet_protocol::ProtocolError;
use thiserror::Error;

use crate::executor::InvalidTransition;

/// Errors raised while executing actions or swapping cards.
#[derive(Debug, Error)]
pub enum AppletError {
    /// The channel adapter failed to deliver a request. Never retried.
    #[error("transport error: {0}")]
    Transport(#[source] ProtocolError),

    /// Every allowed attempt came back as a failure.
    #[error("request failed after {attempts} attempt(s): {content}")]
    RetriesExhausted { attempts: u32, content: String },

    /// The card has no `appId`.
    #[error("invalid card payload: the appId property is missing")]
    MissingAppId,

    /// An unauthorized response carried an unusable login URL.
    #[error("invalid loginUrl \"{url}\": {source}")]
    InvalidLoginUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The channel answered with a result the runtime cannot handle.
    #[error("Action.Execute result is of unsupported type ({0})")]
    UnsupportedResultType(String),

    /// The card payload could not be parsed.
    #[error("card parse error: {0}")]
    CardParse(#[source] ProtocolError),

    /// Template expansion failed.
    #[error("template expansion failed: {0}")]
    Template(String),

    /// The host failed to render the card.
    #[error("render error: {0}")]
    Render(String),

    /// A card payload that is neither a card nor bound data.
    #[error("invalid card payload: {0}")]
    InvalidPayload(String),

    /// No channel adapter was configured.
    #[error("no channel adapter set")]
    NoChannelAdapter,

    /// Only `Action.Execute` can be sent to the channel.
    #[error("unsupported action type: {0}")]
    UnsupportedAction(String),

    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The invocation state machine was fed an event it cannot take.
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    /// The applet that rendered the card no longer exists.
    #[error("applet has been dropped")]
    Detached,

    /// Background work was requested outside a tokio runtime.
    #[error("no async runtime to run the action on")]
    NoRuntime,
}

impl AppletError {
    /// Whether the error should be shown to the user rather than only logged.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            AppletError::Transport(_) | AppletError::RetriesExhausted { .. }
        )
    }
}

/// Applet Result type alias.
pub type AppletResult<T> = Result<T, AppletError>;
