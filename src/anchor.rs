//! Plain-name fragment lookup (`#name` matched against `$id`).

use serde_json::Value;

use crate::types::ID_KEY;

/// Find the first node, in depth-first pre-order, whose `$id` equals `anchor`.
///
/// `anchor` is compared verbatim, so callers pass it with its leading `#`.
/// `root` itself is checked first; object members are visited in document
/// order and array elements by index.
pub fn find_anchor<'a>(root: &'a Value, anchor: &str) -> Option<&'a Value> {
    match root {
        Value::Object(map) => {
            if map.get(ID_KEY).and_then(Value::as_str) == Some(anchor) {
                return Some(root);
            }
            map.values().find_map(|child| find_anchor(child, anchor))
        }
        Value::Array(items) => items.iter().find_map(|item| find_anchor(item, anchor)),
        _ => None,
    }
}
