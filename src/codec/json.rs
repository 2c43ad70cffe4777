//! Lenient scalar extraction from API JSON.

use serde_json::Value;

/// Renders a JSON scalar as text.
///
/// Strings are returned as-is, numbers and booleans in their JSON form.
/// Objects, arrays and `null` yield `None`.
#[must_use]
pub fn primitive_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Like [`primitive_string`], but also treats an empty string as absent.
#[must_use]
pub fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(primitive_string)
        .filter(|text| !text.is_empty())
}
