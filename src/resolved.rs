//! Output tree of a resolution pass.

use std::borrow::Cow;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// A resolved document that shares every unaffected node with its sources.
///
/// Subtrees without a replaced descendant and substituted targets are held
/// as [`Resolved::Same`], borrowing from the input document or from the
/// resolver's store. Only containers on the path to a replaced node are
/// rebuilt, and they own nothing but the list of their children.
///
/// Serializes exactly like the equivalent [`Value`].
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a> {
    /// An existing node, used as is.
    Same(&'a Value),
    /// A rebuilt object; members keep their input order.
    Object(Vec<(&'a str, Resolved<'a>)>),
    /// A rebuilt array.
    Array(Vec<Resolved<'a>>),
}

impl<'a> Resolved<'a> {
    /// The borrowed node, unless this node was rebuilt.
    pub fn as_value(&self) -> Option<&'a Value> {
        match *self {
            Resolved::Same(value) => Some(value),
            _ => None,
        }
    }

    /// Whether this node was rebuilt.
    pub fn is_rebuilt(&self) -> bool {
        !matches!(self, Resolved::Same(_))
    }

    /// Look up a node by JSON Pointer, like [`Value::pointer`].
    ///
    /// Nodes inside a rebuilt container are returned borrowed; nodes inside a
    /// shared subtree are returned as a fresh `Same` pointing into it.
    pub fn pointer(&self, pointer: &str) -> Option<Cow<'_, Resolved<'a>>> {
        if pointer.is_empty() {
            return Some(Cow::Borrowed(self));
        }
        let mut tokens = pointer.strip_prefix('/')?.split('/');
        let mut node = self;

        loop {
            if let Resolved::Same(value) = *node {
                let rest: String = tokens.map(|token| format!("/{}", token)).collect();
                return value.pointer(&rest).map(|found| Cow::Owned(Resolved::Same(found)));
            }
            let Some(token) = tokens.next() else {
                return Some(Cow::Borrowed(node));
            };
            let key = token.replace("~1", "/").replace("~0", "~");
            node = match node {
                Resolved::Object(members) => &members.iter().find(|(name, _)| *name == key)?.1,
                Resolved::Array(items) => items.get(key.parse::<usize>().ok()?)?,
                Resolved::Same(_) => return None,
            };
        }
    }

    /// Copy the tree into an owned [`Value`].
    pub fn to_value(&self) -> Value {
        match self {
            Resolved::Same(value) => (*value).clone(),
            Resolved::Object(members) => Value::Object(
                members
                    .iter()
                    .map(|(key, child)| (key.to_string(), child.to_value()))
                    .collect::<Map<String, Value>>(),
            ),
            Resolved::Array(items) => Value::Array(items.iter().map(Resolved::to_value).collect()),
        }
    }
}

impl Serialize for Resolved<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Resolved::Same(value) => value.serialize(serializer),
            Resolved::Object(members) => {
                let mut map = serializer.serialize_map(Some(members.len()))?;
                for (key, child) in members {
                    map.serialize_entry(key, child)?;
                }
                map.end()
            }
            Resolved::Array(items) => serializer.collect_seq(items),
        }
    }
}

impl PartialEq<Value> for Resolved<'_> {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Resolved::Same(value), _) => *value == other,
            (Resolved::Object(members), Value::Object(map)) => {
                members.len() == map.len()
                    && members
                        .iter()
                        .all(|(key, child)| map.get(*key).map_or(false, |value| child == value))
            }
            (Resolved::Array(items), Value::Array(values)) => {
                items.len() == values.len()
                    && items.iter().zip(values).all(|(item, value)| item == value)
            }
            _ => false,
        }
    }
}

impl PartialEq<Resolved<'_>> for Value {
    fn eq(&self, other: &Resolved<'_>) -> bool {
        other == self
    }
}
