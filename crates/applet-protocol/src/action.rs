//! Actions — what a card lets the user trigger.
//!
//! Applet cards understand three action types. `Action.Execute` is the one
//! that reaches the channel; the others are handled by the host renderer.
//! `Action.Submit` is deliberately absent: applet cards replace it with
//! `Action.Execute`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

/// Type name of the execute action.
pub const EXECUTE_ACTION_TYPE: &str = "Action.Execute";

/// Type name of the submit action (not available in applet cards).
pub const SUBMIT_ACTION_TYPE: &str = "Action.Submit";

/// An action declared by an applet card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum Action {
    /// Invoke the channel with a verb and data.
    #[serde(rename = "Action.Execute")]
    Execute(ExecuteAction),

    /// Open a URL in the host.
    #[serde(rename = "Action.OpenUrl")]
    OpenUrl(OpenUrlAction),

    /// Reveal an inline card.
    #[serde(rename = "Action.ShowCard")]
    ShowCard(ShowCardAction),
}

impl Action {
    /// The action's identifier, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            Action::Execute(a) => a.id.as_deref(),
            Action::OpenUrl(a) => a.id.as_deref(),
            Action::ShowCard(a) => a.id.as_deref(),
        }
    }

    /// The action's title, if any.
    pub fn title(&self) -> Option<&str> {
        match self {
            Action::Execute(a) => a.title.as_deref(),
            Action::OpenUrl(a) => a.title.as_deref(),
            Action::ShowCard(a) => a.title.as_deref(),
        }
    }

    /// The JSON type name of this action.
    pub fn type_name(&self) -> &'static str {
        match self {
            Action::Execute(_) => EXECUTE_ACTION_TYPE,
            Action::OpenUrl(_) => "Action.OpenUrl",
            Action::ShowCard(_) => "Action.ShowCard",
        }
    }

    /// Borrow the execute action, if this is one.
    pub fn as_execute(&self) -> Option<&ExecuteAction> {
        match self {
            Action::Execute(a) => Some(a),
            _ => None,
        }
    }
}

/// `Action.Execute` — carries a free-form verb and opaque data to the channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteAction {
    /// Identifier of the action within the card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Button label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Verb the channel dispatches on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verb: Option<String>,

    /// Opaque data forwarded to the channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ExecuteAction {
    /// Create an execute action for a verb.
    pub fn new(verb: impl Into<String>) -> Self {
        Self {
            verb: Some(verb.into()),
            ..Self::default()
        }
    }

    /// Set the action identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the button label.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Attach data.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// `Action.OpenUrl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenUrlAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Target URL.
    pub url: Url,
}

/// `Action.ShowCard` — the nested card is rendered by the host, never sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShowCardAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// The inline card payload.
    pub card: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_action_parsing() {
        let action: Action = serde_json::from_value(serde_json::json!({
            "type": "Action.Execute",
            "id": "approve",
            "title": "Approve",
            "verb": "approveRequest",
            "data": {"requestId": 42}
        }))
        .unwrap();

        let execute = action.as_execute().unwrap();
        assert_eq!(execute.verb.as_deref(), Some("approveRequest"));
        assert_eq!(execute.data, Some(serde_json::json!({"requestId": 42})));
        assert_eq!(action.id(), Some("approve"));
        assert_eq!(action.type_name(), EXECUTE_ACTION_TYPE);
    }

    #[test]
    fn test_submit_is_not_an_applet_action() {
        let result: Result<Action, _> = serde_json::from_value(serde_json::json!({
            "type": "Action.Submit",
            "title": "Send"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_open_url_requires_valid_url() {
        let result: Result<Action, _> = serde_json::from_value(serde_json::json!({
            "type": "Action.OpenUrl",
            "url": "not a url"
        }));
        assert!(result.is_err());
    }
}
