//! Applet session — what is on screen right now.
//!
//! A session is immutable. A successful card swap builds a new one and
//! replaces the old one wholesale.

use std::sync::Arc;

use applet_protocol::AppletCard;
use serde_json::Value;

use crate::classify::CARD_RESULT_TYPE;
use crate::error::{AppletError, AppletResult};

/// Key under which a card payload may carry its bound data.
pub const DATA_KEY: &str = "$data";

/// The displayed card with the template and data it was built from.
#[derive(Debug, Clone)]
pub struct AppletSession {
    /// The parsed, displayed card.
    pub card: Arc<AppletCard>,

    /// The card template, without `$data`.
    pub payload: Value,

    /// Data the template was expanded with.
    pub data: Option<Value>,
}

impl AppletSession {
    /// The displayed card's applet id.
    pub fn app_id(&self) -> Option<&str> {
        self.card.app_id()
    }
}

/// What a `set_card` payload carries.
#[derive(Debug, Clone, PartialEq)]
pub enum CardPayload {
    /// A card template, with the data found under `$data`, if any.
    Template { payload: Value, data: Option<Value> },

    /// New data for the current template.
    Data(Value),
}

impl CardPayload {
    /// Split a raw payload.
    ///
    /// An object whose `type` is `"AdaptiveCard"` is a template; any other
    /// object is data for the current template.
    pub fn from_value(value: Value) -> AppletResult<Self> {
        let Value::Object(mut object) = value else {
            return Err(AppletError::InvalidPayload(
                "expected a card or a data object".into(),
            ));
        };

        if object.get("type").and_then(Value::as_str) == Some(CARD_RESULT_TYPE) {
            let data = object.remove(DATA_KEY);
            Ok(CardPayload::Template {
                payload: Value::Object(object),
                data,
            })
        } else {
            Ok(CardPayload::Data(Value::Object(object)))
        }
    }

    /// Resolve to `(template, data)`, borrowing the template from `current`
    /// when only data was supplied. `None` when there is no template yet.
    pub fn resolve(self, current: Option<&AppletSession>) -> Option<(Value, Option<Value>)> {
        match self {
            CardPayload::Template { payload, data } => Some((payload, data)),
            CardPayload::Data(data) => current.map(|s| (s.payload.clone(), Some(data))),
        }
    }
}
