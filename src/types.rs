//! Reserved keywords and small helpers shared by the resolver modules.

use serde_json::Value;

/// Key declaring a node's URI (and the base URI of its subtree).
pub const ID_KEY: &str = "$id";

/// Key naming the URI a node should be replaced with.
pub const REF_KEY: &str = "$ref";

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Returns the node's `$id` if it is a non-empty string.
pub fn declared_id(value: &Value) -> Option<&str> {
    value
        .get(ID_KEY)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

/// Returns the node's `$ref` if it is a non-empty string.
pub fn declared_ref(value: &Value) -> Option<&str> {
    value
        .get(REF_KEY)
        .and_then(Value::as_str)
        .filter(|r| !r.is_empty())
}
