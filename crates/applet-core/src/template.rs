//! Templating — expanding a card template against bound data.
//!
//! Full Adaptive Cards templating (scoped `$data`, `$when`, functions) is a
//! host concern; plug it in through [`TemplateEngine`]. [`PathTemplateEngine`]
//! covers the common case of `${path.to.value}` substitutions.

use serde_json::{Map, Value};

use crate::error::{AppletError, AppletResult};

/// Expands a card template with `root` as the evaluation root.
pub trait TemplateEngine: Send + Sync {
    fn expand(&self, template: &Value, root: &Value) -> AppletResult<Value>;
}

/// Substitutes `${path}` expressions inside string values.
///
/// A path is a dotted list of object keys or array indices, optionally
/// prefixed with `$root`. A string made of a single expression takes the
/// bound value as is, keeping its JSON type; expressions embedded in longer
/// strings are rendered as text. Unresolved expressions are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathTemplateEngine;

impl TemplateEngine for PathTemplateEngine {
    fn expand(&self, template: &Value, root: &Value) -> AppletResult<Value> {
        if !(root.is_object() || root.is_array()) {
            return Err(AppletError::Template(
                "bound data must be an object or an array".into(),
            ));
        }
        Ok(expand_value(template, root))
    }
}

fn expand_value(value: &Value, root: &Value) -> Value {
    match value {
        Value::String(s) => expand_string(s, root),
        Value::Array(items) => Value::Array(items.iter().map(|v| expand_value(v, root)).collect()),
        Value::Object(object) => Value::Object(
            object
                .iter()
                .map(|(k, v)| (k.clone(), expand_value(v, root)))
                .collect::<Map<String, Value>>(),
        ),
        other => other.clone(),
    }
}

fn expand_string(s: &str, root: &Value) -> Value {
    if let Some(expr) = whole_expression(s) {
        if let Some(bound) = resolve(expr, root) {
            return bound.clone();
        }
        return Value::String(s.to_string());
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return Value::String(out);
        };
        match resolve(&after[..end], root) {
            Some(Value::String(text)) => out.push_str(text),
            Some(bound) => out.push_str(&bound.to_string()),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Value::String(out)
}

fn whole_expression(s: &str) -> Option<&str> {
    let inner = s.strip_prefix("${")?.strip_suffix('}')?;
    (!inner.contains('}') && !inner.contains("${")).then_some(inner)
}

fn resolve<'a>(expr: &str, root: &'a Value) -> Option<&'a Value> {
    let expr = expr.trim();
    let path = match expr.strip_prefix("$root") {
        Some("") => return Some(root),
        Some(rest) => rest.strip_prefix('.')?,
        None => expr,
    };

    path.split('.').try_fold(root, |node, segment| match node {
        Value::Object(object) => object.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn expand(template: Value, root: Value) -> Value {
        PathTemplateEngine.expand(&template, &root).unwrap()
    }

    #[test]
    fn test_whole_expression_keeps_type() {
        let out = expand(
            json!({"count": "${stats.count}", "tags": "${$root.tags}"}),
            json!({"stats": {"count": 3}, "tags": ["a", "b"]}),
        );
        assert_eq!(out, json!({"count": 3, "tags": ["a", "b"]}));
    }

    #[test]
    fn test_embedded_expressions() {
        let out = expand(
            json!({
                "type": "AdaptiveCard",
                "body": [{"type": "TextBlock", "text": "Hello ${user.name}, you have ${inbox.0.count} items"}]
            }),
            json!({"user": {"name": "Sam"}, "inbox": [{"count": 4}]}),
        );
        assert_eq!(out["body"][0]["text"], "Hello Sam, you have 4 items");
    }

    #[test]
    fn test_unresolved_expressions_are_kept() {
        let out = expand(
            json!({"a": "${missing}", "b": "x ${missing.too} y", "c": "open ${brace"}),
            json!({}),
        );
        assert_eq!(
            out,
            json!({"a": "${missing}", "b": "x ${missing.too} y", "c": "open ${brace"})
        );
    }

    #[test]
    fn test_root_must_be_structured() {
        assert!(matches!(
            PathTemplateEngine.expand(&json!({}), &json!("text")),
            Err(AppletError::Template(_))
        ));
    }
}
