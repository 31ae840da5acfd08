//! # applet-core
//!
//! Action execution engine for Adaptive Card applets.
//!
//! This crate provides the building blocks for:
//! - Building invoke requests from `Action.Execute` actions
//! - Sending them through a channel adapter, with retries
//! - Interpreting responses: new cards, messages, auth challenges
//! - Swapping the displayed card and starting its auto-refresh
//! - Observability via `tracing` and OpenTelemetry
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use applet_core::{Applet, AppletConfig, HttpChannelAdapter, Surface};
//! use serde_json::json;
//!
//! async fn show(surface: Arc<dyn Surface>) -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppletConfig::load()?;
//!     let channel = HttpChannelAdapter::new("https://bot.example.com/api/invoke")?;
//!
//!     let applet = Applet::builder(surface)
//!         .channel(Arc::new(channel))
//!         .config(&config)
//!         .build();
//!
//!     applet.set_card(json!({
//!         "type": "AdaptiveCard",
//!         "appId": "todo",
//!         "body": [{"type": "TextBlock", "text": "Hello ${name}"}],
//!         "actions": [{"type": "Action.Execute", "id": "next", "verb": "next"}],
//!         "$data": {"name": "Sam"}
//!     }))?;
//!     Ok(())
//! }
//! ```

pub mod applet;
pub mod auth;
pub mod classify;
pub mod config;
pub mod error;
pub mod executor;
pub mod hooks;
pub mod overlay;
pub mod request;
pub mod session;
pub mod surface;
pub mod telemetry;
pub mod template;

// Re-exports
pub use applet::{
    prepare_card, ActionInvoker, Applet, AppletBuilder, AutoRefreshHandle, CardChange, PreparedCard,
};
pub use classify::ActivityResult;
pub use config::{AppletConfig, AuthPromptConfig, LogFormat, RetryConfig, TelemetryConfig};
pub use error::{AppletError, AppletResult};
pub use executor::{ActivityExecutor, ExecutionOutcome, ExecutionState, RetryPolicy};
pub use hooks::{AppletHooks, DefaultHooks, RetryDecision, Verdict};
pub use overlay::{OverlayStyle, ProgressOverlay};
pub use session::AppletSession;
pub use surface::{LoginPopup, Surface, WindowGeometry};
pub use template::{PathTemplateEngine, TemplateEngine};

// Re-export protocol types for convenience
pub use applet_protocol;
pub use applet_protocol::{
    Action, AppletCard, ChannelAdapter, ExecuteAction, HttpChannelAdapter, InvocationContext,
};
