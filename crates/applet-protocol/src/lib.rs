//! # applet-protocol
//!
//! Data model and channel transport for Adaptive Card applets.
//!
//! An applet is a card that talks back to a backend "channel": when the user
//! triggers an `Action.Execute` (or the card asks to be auto-refreshed), the
//! host sends an `invoke` activity named `adaptiveCard/action` and receives a
//! response that may carry a new card, a message, or an auth challenge.
//!
//! ## Layers
//!
//! 1. **Canonical Data Model** — actions, applet cards, invoke activities
//! 2. **Channel Adapter** — the `send(request) -> response` contract
//! 3. **Bindings** — an HTTP adapter on top of `reqwest`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use applet_protocol::{
//!     ActivityRequest, ChannelAdapter, ExecuteAction, HttpChannelAdapter, InvocationContext,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let channel = HttpChannelAdapter::new("https://bot.example.com/api/invoke")?;
//!     let action = ExecuteAction::new("refresh").with_id("refresh-button");
//!     let request = ActivityRequest::new("my-app", &action, InvocationContext::UserInteraction);
//!
//!     let response = channel.send(&request).await?;
//!     println!("{:?}: {}", response.status, response.content);
//!     Ok(())
//! }
//! ```

pub mod action;
pub mod activity;
pub mod card;
pub mod error;
pub mod transport;

// Re-export primary types
pub use action::{Action, ExecuteAction, OpenUrlAction, ShowCardAction};
pub use activity::{
    ActionPayload, Activity, ActivityRequest, ActivityResponse, ActivityStatus,
    InvocationContext, InvokeValue,
};
pub use card::{AppletCard, AutoRefreshDefinition, CardParser, JsonCardParser};
pub use error::{ProtocolError, ProtocolResult};
pub use transport::http::HttpChannelAdapter;
pub use transport::ChannelAdapter;
