//! Applet Card — an Adaptive Card bound to an applet.
//!
//! On top of a regular card, an applet card carries the `appId` of the
//! applet it belongs to and may declare an `autoRefresh` policy: an
//! `Action.Execute` to run as soon as the card is displayed.
//!
//! Full schema validation and rendering belong to the host. The parser here
//! only extracts what the applet runtime needs and keeps the rest opaque.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::action::{Action, ExecuteAction, EXECUTE_ACTION_TYPE, SUBMIT_ACTION_TYPE};
use crate::error::{ProtocolError, ProtocolResult};

/// `type` of an Adaptive Card payload.
pub const ADAPTIVE_CARD_TYPE: &str = "AdaptiveCard";

/// A parsed applet card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppletCard {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// The applet this card belongs to. Required for the card to be shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_refresh: Option<AutoRefreshDefinition>,

    /// Card elements, left for the renderer.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<Value>,

    /// Actions the runtime understands.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,

    /// Every other top-level property, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppletCard {
    /// The applet id, if present and non-empty.
    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Find an action by id among the card-level actions.
    pub fn find_action(&self, id: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.id() == Some(id))
    }
}

/// Auto-refresh policy declared by a card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoRefreshDefinition {
    /// Users the refresh is meant for.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub user_ids: BTreeSet<String>,

    /// Keep the current card visible while the refresh runs.
    pub display_current_card_while_refreshing: bool,

    /// The action to execute.
    pub action: ExecuteAction,
}

/// Turns a raw card payload into an [`AppletCard`].
///
/// Hosts with a full Adaptive Cards implementation plug their own parser in.
pub trait CardParser: Send + Sync {
    /// Parse a payload; fails on schema violations.
    fn parse(&self, payload: &Value) -> ProtocolResult<AppletCard>;
}

/// Lenient JSON parser for applet cards.
///
/// Structural problems (not an object, wrong `type`, mistyped fields) are
/// errors. Unsupported actions are dropped with a warning, the way Adaptive
/// Cards renderers skip elements they do not know.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCardParser;

impl CardParser for JsonCardParser {
    fn parse(&self, payload: &Value) -> ProtocolResult<AppletCard> {
        let object = payload
            .as_object()
            .ok_or_else(|| ProtocolError::InvalidCard("card payload must be an object".into()))?;

        match object.get("type").and_then(Value::as_str) {
            Some(ADAPTIVE_CARD_TYPE) => {}
            Some(other) => {
                return Err(ProtocolError::InvalidCard(format!(
                    "expected type \"{ADAPTIVE_CARD_TYPE}\", found \"{other}\""
                )))
            }
            None => {
                return Err(ProtocolError::InvalidCard(
                    "card payload has no \"type\" property".into(),
                ))
            }
        }

        let mut extra = object.clone();
        extra.remove("type");

        let version = optional_string(&mut extra, "version")?;
        let app_id = optional_string(&mut extra, "appId")?;

        let body = match extra.remove("body") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(ProtocolError::InvalidCard("\"body\" must be an array".into())),
        };

        let actions = match extra.remove("actions") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.into_iter().filter_map(parse_action).collect(),
            Some(_) => {
                return Err(ProtocolError::InvalidCard("\"actions\" must be an array".into()))
            }
        };

        let auto_refresh = match extra.remove("autoRefresh") {
            None | Some(Value::Null) => None,
            Some(value) => parse_auto_refresh(value)?,
        };

        Ok(AppletCard {
            version,
            app_id,
            auto_refresh,
            body,
            actions,
            extra,
        })
    }
}

fn optional_string(object: &mut Map<String, Value>, key: &str) -> ProtocolResult<Option<String>> {
    match object.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(ProtocolError::InvalidCard(format!("\"{key}\" must be a string"))),
    }
}

fn parse_action(value: Value) -> Option<Action> {
    let action_type = value.get("type").and_then(Value::as_str).unwrap_or_default();

    if action_type == SUBMIT_ACTION_TYPE {
        tracing::warn!("Action.Submit is not supported in applet cards; use Action.Execute");
        return None;
    }

    match serde_json::from_value::<Action>(value.clone()) {
        Ok(action) => Some(action),
        Err(e) => {
            tracing::warn!(action_type, error = %e, "Dropping unsupported card action");
            None
        }
    }
}

fn parse_auto_refresh(value: Value) -> ProtocolResult<Option<AutoRefreshDefinition>> {
    let Value::Object(mut object) = value else {
        return Err(ProtocolError::InvalidCard("\"autoRefresh\" must be an object".into()));
    };

    let user_ids = match object.remove("userIds") {
        None | Some(Value::Null) => BTreeSet::new(),
        Some(ids) => serde_json::from_value(ids).map_err(|_| {
            ProtocolError::InvalidCard("\"autoRefresh.userIds\" must be an array of strings".into())
        })?,
    };

    let display_current_card_while_refreshing =
        match object.remove("displayCurrentCardWhileRefreshing") {
            None | Some(Value::Null) => true,
            Some(Value::Bool(b)) => b,
            Some(_) => {
                return Err(ProtocolError::InvalidCard(
                    "\"autoRefresh.displayCurrentCardWhileRefreshing\" must be a boolean".into(),
                ))
            }
        };

    let action = match object.remove("action").and_then(parse_action) {
        Some(Action::Execute(action)) => action,
        _ => {
            tracing::warn!(
                "\"autoRefresh\" must have its \"action\" property defined as an {EXECUTE_ACTION_TYPE} object"
            );
            return Ok(None);
        }
    };

    Ok(Some(AutoRefreshDefinition {
        user_ids,
        display_current_card_while_refreshing,
        action,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(payload: Value) -> ProtocolResult<AppletCard> {
        JsonCardParser.parse(&payload)
    }

    #[test]
    fn test_parse_applet_card() {
        let card = parse(serde_json::json!({
            "type": "AdaptiveCard",
            "version": "1.4",
            "appId": "expenses",
            "body": [{"type": "TextBlock", "text": "Expense report"}],
            "actions": [
                {"type": "Action.Execute", "id": "approve", "verb": "approve"},
                {"type": "Action.OpenUrl", "title": "Docs", "url": "https://example.com"}
            ],
            "$schema": "http://adaptivecards.io/schemas/adaptive-card.json"
        }))
        .unwrap();

        assert_eq!(card.app_id(), Some("expenses"));
        assert_eq!(card.version.as_deref(), Some("1.4"));
        assert_eq!(card.body.len(), 1);
        assert_eq!(card.actions.len(), 2);
        assert!(card.find_action("approve").is_some());
        assert!(card.extra.contains_key("$schema"));
        assert!(card.auto_refresh.is_none());
    }

    #[test]
    fn test_empty_app_id_is_missing() {
        let card = parse(serde_json::json!({"type": "AdaptiveCard", "appId": ""})).unwrap();
        assert_eq!(card.app_id(), None);

        let card = parse(serde_json::json!({"type": "AdaptiveCard"})).unwrap();
        assert_eq!(card.app_id(), None);
    }

    #[test]
    fn test_rejects_non_cards() {
        assert!(parse(serde_json::json!("hello")).is_err());
        assert!(parse(serde_json::json!({"type": "Container"})).is_err());
        assert!(parse(serde_json::json!({"body": []})).is_err());
        assert!(parse(serde_json::json!({"type": "AdaptiveCard", "appId": 12})).is_err());
        assert!(parse(serde_json::json!({"type": "AdaptiveCard", "body": {}})).is_err());
    }

    #[test]
    fn test_submit_actions_are_dropped() {
        let card = parse(serde_json::json!({
            "type": "AdaptiveCard",
            "appId": "a",
            "actions": [
                {"type": "Action.Submit", "id": "legacy"},
                {"type": "Action.Execute", "id": "modern", "verb": "go"},
                {"type": "Action.Teleport", "id": "unknown"}
            ]
        }))
        .unwrap();

        assert_eq!(card.actions.len(), 1);
        assert_eq!(card.actions[0].id(), Some("modern"));
    }

    #[test]
    fn test_auto_refresh_definition() {
        let card = parse(serde_json::json!({
            "type": "AdaptiveCard",
            "appId": "a",
            "autoRefresh": {
                "userIds": ["alice", "bob", "alice"],
                "action": {"type": "Action.Execute", "verb": "refresh"}
            }
        }))
        .unwrap();

        let refresh = card.auto_refresh.unwrap();
        assert_eq!(refresh.user_ids.len(), 2);
        assert!(refresh.display_current_card_while_refreshing);
        assert_eq!(refresh.action.verb.as_deref(), Some("refresh"));
    }

    #[test]
    fn test_auto_refresh_requires_execute_action() {
        let card = parse(serde_json::json!({
            "type": "AdaptiveCard",
            "appId": "a",
            "autoRefresh": {
                "displayCurrentCardWhileRefreshing": false,
                "action": {"type": "Action.OpenUrl", "url": "https://example.com"}
            }
        }))
        .unwrap();

        assert!(card.auto_refresh.is_none());
    }
}
