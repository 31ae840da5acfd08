//! Invoke activities — the request/response pair exchanged with the channel.
//!
//! ```text
//! ActivityRequest { context, activity: invoke "adaptiveCard/action", attemptNumber }
//!        │ send
//!        ▼
//! ActivityResponse { status: success | failure, content }
//! ```
//!
//! One logical invocation may produce several requests; only
//! `attemptNumber` changes between them.

use chrono::{DateTime, FixedOffset, Local};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::action::{ExecuteAction, EXECUTE_ACTION_TYPE};

/// Activity type of every applet request.
pub const INVOKE_ACTIVITY_TYPE: &str = "invoke";

/// Activity name of every applet request.
pub const ADAPTIVE_CARD_ACTION_NAME: &str = "adaptiveCard/action";

/// Why an invocation was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum InvocationContext {
    /// The user triggered an action on the card.
    UserInteraction,
    /// The card declared an auto-refresh action.
    AutoRefresh,
}

impl std::fmt::Display for InvocationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvocationContext::UserInteraction => write!(f, "userInteraction"),
            InvocationContext::AutoRefresh => write!(f, "autoRefresh"),
        }
    }
}

/// A request to invoke an action on the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRequest {
    /// Why the invocation was started (diagnostics only).
    pub context: InvocationContext,

    /// The invoke activity itself.
    pub activity: Activity,

    /// Zero-based attempt counter; bumped once per retry.
    pub attempt_number: u32,
}

impl ActivityRequest {
    /// Build the first attempt of an invocation, stamped with the local time.
    pub fn new(app_id: impl Into<String>, action: &ExecuteAction, context: InvocationContext) -> Self {
        Self::at(app_id, action, context, Local::now().fixed_offset())
    }

    /// Build the first attempt of an invocation stamped with `now`.
    pub fn at(
        app_id: impl Into<String>,
        action: &ExecuteAction,
        context: InvocationContext,
        now: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            context,
            activity: Activity {
                activity_type: INVOKE_ACTIVITY_TYPE.into(),
                name: ADAPTIVE_CARD_ACTION_NAME.into(),
                app_id: app_id.into(),
                local_timezone: now.offset().to_string(),
                local_timestamp: now.to_rfc3339(),
                value: InvokeValue {
                    action: ActionPayload::from(action),
                },
            },
            attempt_number: 0,
        }
    }

    /// Number of attempts made so far, counting the current one.
    pub fn attempt_count(&self) -> u32 {
        self.attempt_number + 1
    }

    /// Advance to the next attempt.
    pub fn next_attempt(&mut self) {
        self.attempt_number += 1;
    }
}

/// The `invoke` activity sent to the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Always `"invoke"`.
    #[serde(rename = "type")]
    pub activity_type: String,

    /// Always `"adaptiveCard/action"`.
    pub name: String,

    /// The applet the card belongs to.
    pub app_id: String,

    /// Local UTC offset of the host (e.g. `+02:00`).
    pub local_timezone: String,

    /// Local RFC 3339 time at which the request was built.
    pub local_timestamp: String,

    pub value: InvokeValue,
}

/// Payload of the invoke activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InvokeValue {
    pub action: ActionPayload,
}

/// Wire form of the executed action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ActionPayload {
    /// Always `"Action.Execute"`.
    #[serde(rename = "type")]
    pub action_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verb: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl From<&ExecuteAction> for ActionPayload {
    fn from(action: &ExecuteAction) -> Self {
        Self {
            action_type: EXECUTE_ACTION_TYPE.into(),
            id: action.id.clone(),
            verb: action.verb.clone(),
            data: action.data.clone(),
        }
    }
}

/// Outcome reported by the channel for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Success,
    Failure,
    /// Anything else the channel reports; handled like a failure.
    #[serde(other)]
    Unknown,
}

/// The channel's answer to one attempt. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ActivityResponse {
    pub status: ActivityStatus,

    /// Raw response content: a JSON document or plain text.
    pub content: String,
}

impl ActivityResponse {
    /// A successful response.
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            status: ActivityStatus::Success,
            content: content.into(),
        }
    }

    /// A failed response.
    pub fn failure(content: impl Into<String>) -> Self {
        Self {
            status: ActivityStatus::Failure,
            content: content.into(),
        }
    }

    /// Whether the channel reported success.
    pub fn is_success(&self) -> bool {
        self.status == ActivityStatus::Success
    }
}
