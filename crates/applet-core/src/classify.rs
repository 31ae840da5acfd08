//! Response classifier — what a successful response asks the host to do.
//!
//! The content of a successful response is either JSON or plain text:
//!
//! | content                                              | result        |
//! |------------------------------------------------------|---------------|
//! | not JSON, or a JSON string                           | message       |
//! | `{"type": "AdaptiveCard", ...}`                      | card          |
//! | `{"type": "Activity.InvocationError.Unauthorized"}`  | auth challenge|
//! | anything else                                        | unsupported   |

use serde_json::{Map, Value};

use crate::error::{AppletError, AppletResult};

/// `type` of a card result.
pub const CARD_RESULT_TYPE: &str = "AdaptiveCard";

/// `type` of an auth challenge result.
pub const UNAUTHORIZED_RESULT_TYPE: &str = "Activity.InvocationError.Unauthorized";

/// A classified response.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityResult {
    /// Show this text to the user.
    Message(String),
    /// Replace the current card with this payload.
    Card(Value),
    /// The user must sign in first.
    Unauthorized { login_url: String },
}

/// Classify the content of a successful response.
pub fn classify(content: &str) -> AppletResult<ActivityResult> {
    let parsed = match serde_json::from_str::<Value>(content) {
        Ok(value) => value,
        Err(_) => return Ok(ActivityResult::Message(content.to_string())),
    };

    match parsed {
        Value::String(text) => Ok(ActivityResult::Message(text)),
        Value::Object(object) => classify_object(object),
        other => Err(AppletError::UnsupportedResultType(json_kind(&other).into())),
    }
}

fn classify_object(object: Map<String, Value>) -> AppletResult<ActivityResult> {
    let result_type = object.get("type").and_then(Value::as_str).map(str::to_owned);

    match result_type.as_deref() {
        Some(CARD_RESULT_TYPE) => Ok(ActivityResult::Card(Value::Object(object))),
        Some(UNAUTHORIZED_RESULT_TYPE) => Ok(ActivityResult::Unauthorized {
            login_url: object
                .get("loginUrl")
                .map(login_url_text)
                .unwrap_or_default(),
        }),
        Some(other) => Err(AppletError::UnsupportedResultType(format!(
            "object of type \"{other}\""
        ))),
        None => Err(AppletError::UnsupportedResultType("object without type".into())),
    }
}

fn login_url_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(classify("hello").unwrap(), ActivityResult::Message("hello".into()));
    }

    #[test]
    fn test_json_string_is_a_message() {
        assert_eq!(
            classify(r#""Saved!""#).unwrap(),
            ActivityResult::Message("Saved!".into())
        );
    }

    #[test]
    fn test_card() {
        let result = classify(r#"{"type":"AdaptiveCard","appId":"a","body":[]}"#).unwrap();
        let ActivityResult::Card(payload) = result else {
            panic!("expected a card");
        };
        assert_eq!(payload["appId"], "a");
    }

    #[test]
    fn test_unauthorized() {
        assert_eq!(
            classify(r#"{"type":"Activity.InvocationError.Unauthorized","loginUrl":"https://login.example.com"}"#)
                .unwrap(),
            ActivityResult::Unauthorized {
                login_url: "https://login.example.com".into()
            }
        );

        assert_eq!(
            classify(r#"{"type":"Activity.InvocationError.Unauthorized"}"#).unwrap(),
            ActivityResult::Unauthorized {
                login_url: String::new()
            }
        );
    }

    #[test]
    fn test_unsupported_shapes() {
        for content in [
            r#"{"type":"Message"}"#,
            r#"{"text":"no type"}"#,
            "42",
            "true",
            "null",
            "[1,2]",
        ] {
            assert!(
                matches!(classify(content), Err(AppletError::UnsupportedResultType(_))),
                "{content} should be unsupported"
            );
        }
    }
}
