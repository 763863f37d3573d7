//! JSON Pointer (RFC 6901) decoding and traversal.

use serde_json::Value;

use crate::error::ResolveError;
use crate::types::json_type_name;

/// A decoded JSON Pointer reference token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    /// Object member name.
    Key(String),
    /// Array index. Any token made only of digits decodes to this variant,
    /// so a pointer cannot address an object member named e.g. `"200"`.
    Index(usize),
}

/// Decode one reference token.
///
/// In a single left-to-right pass `~1` becomes `/`, `~0` becomes `~`,
/// `%XX` becomes the byte `0xXX` and `+` becomes a space. A non-empty
/// result made only of ASCII digits is returned as [`Token::Index`].
///
/// # Errors
///
/// Returns `ResolveError::InvalidEscape` on a `~` not followed by `0` or `1`,
/// on a `%` not followed by two hex digits, or if the percent-decoded bytes
/// are not valid UTF-8.
pub fn decode_token(raw: &str) -> Result<Token, ResolveError> {
    let invalid = || ResolveError::InvalidEscape {
        token: raw.to_string(),
    };

    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'~' => {
                match bytes.get(i + 1) {
                    Some(b'0') => decoded.push(b'~'),
                    Some(b'1') => decoded.push(b'/'),
                    _ => return Err(invalid()),
                }
                i += 2;
            }
            b'%' => {
                let high = bytes.get(i + 1).copied().and_then(hex_value);
                let low = bytes.get(i + 2).copied().and_then(hex_value);
                match (high, low) {
                    (Some(high), Some(low)) => decoded.push((high << 4) | low),
                    _ => return Err(invalid()),
                }
                i += 3;
            }
            b'+' => {
                decoded.push(b' ');
                i += 1;
            }
            other => {
                decoded.push(other);
                i += 1;
            }
        }
    }

    let decoded = String::from_utf8(decoded).map_err(|_| invalid())?;
    if !decoded.is_empty() && decoded.bytes().all(|b| b.is_ascii_digit()) {
        // digits that overflow usize can never be in range
        let index = decoded.parse().unwrap_or(usize::MAX);
        return Ok(Token::Index(index));
    }
    Ok(Token::Key(decoded))
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|digit| digit as u8)
}

/// Follow a JSON Pointer from `root`.
///
/// An empty pointer denotes `root` itself. Empty tokens (`/a//b`) are
/// skipped.
///
/// # Errors
///
/// Returns `ResolveError::PointerNotFound` when a step cannot descend
/// further, and `ResolveError::InvalidEscape` for malformed tokens.
///
/// # Example
///
/// ```
/// use json_ref_resolver::dereference;
/// use serde_json::json;
///
/// let doc = json!({"a": [1, 2, 3]});
/// assert_eq!(dereference(&doc, "/a/1").unwrap(), &json!(2));
/// ```
pub fn dereference<'a>(root: &'a Value, pointer: &str) -> Result<&'a Value, ResolveError> {
    if pointer.is_empty() {
        return Ok(root);
    }

    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(ResolveError::PointerNotFound {
            pointer: pointer.to_string(),
            reason: "pointer must start with '/'".into(),
        });
    };

    let mut current = root;
    for raw in rest.split('/').filter(|raw| !raw.is_empty()) {
        let token = decode_token(raw)?;
        current = step(current, &token).map_err(|reason| ResolveError::PointerNotFound {
            pointer: pointer.to_string(),
            reason,
        })?;
    }
    Ok(current)
}

fn step<'a>(value: &'a Value, token: &Token) -> Result<&'a Value, String> {
    match (value, token) {
        (Value::Object(map), Token::Key(key)) => map
            .get(key)
            .ok_or_else(|| format!("no member named '{}'", key)),
        (Value::Array(items), Token::Index(index)) => items.get(*index).ok_or_else(|| {
            format!(
                "index {} out of range for array of length {}",
                index,
                items.len()
            )
        }),
        (Value::Object(_), Token::Index(index)) => {
            Err(format!("numeric token {} cannot address an object", index))
        }
        (Value::Array(_), Token::Key(key)) => {
            Err(format!("non-numeric token '{}' cannot address an array", key))
        }
        (other, _) => Err(format!("cannot descend into {}", json_type_name(other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(s: &str) -> Token {
        Token::Key(s.to_string())
    }

    #[test]
    fn decode_tilde_escapes() {
        assert_eq!(decode_token("a~1b").unwrap(), key("a/b"));
        assert_eq!(decode_token("m~0n").unwrap(), key("m~n"));
        // ~01 is "~1", not "/"
        assert_eq!(decode_token("~01").unwrap(), key("~1"));
    }

    #[test]
    fn decode_percent_and_plus() {
        assert_eq!(decode_token("a%20b").unwrap(), key("a b"));
        assert_eq!(decode_token("a+b").unwrap(), key("a b"));
        assert_eq!(decode_token("%25").unwrap(), key("%"));
        assert_eq!(decode_token("caf%C3%A9").unwrap(), key("café"));
    }

    #[test]
    fn decode_numeric_tokens() {
        assert_eq!(decode_token("0").unwrap(), Token::Index(0));
        assert_eq!(decode_token("42").unwrap(), Token::Index(42));
        assert_eq!(decode_token("%31").unwrap(), Token::Index(1));
        assert_eq!(decode_token("1a").unwrap(), key("1a"));
        assert_eq!(decode_token("-1").unwrap(), key("-1"));
        assert_eq!(
            decode_token("99999999999999999999999999").unwrap(),
            Token::Index(usize::MAX)
        );
    }

    #[test]
    fn decode_empty_token_is_key() {
        assert_eq!(decode_token("").unwrap(), key(""));
    }

    #[test]
    fn decode_invalid_escapes() {
        for raw in ["~", "a~2", "~x", "%", "%4", "%zz", "%G0", "%ff"] {
            assert!(
                matches!(decode_token(raw), Err(ResolveError::InvalidEscape { .. })),
                "expected InvalidEscape for '{}'",
                raw
            );
        }
    }

    #[test]
    fn dereference_array_index() {
        let doc = json!({"a": [1, 2, 3]});
        assert_eq!(dereference(&doc, "/a/1").unwrap(), &json!(2));
    }

    #[test]
    fn dereference_empty_pointer_is_root() {
        let doc = json!({"a": 1});
        assert!(std::ptr::eq(dereference(&doc, "").unwrap(), &doc));
        assert!(std::ptr::eq(dereference(&doc, "/").unwrap(), &doc));
    }

    #[test]
    fn dereference_escaped_keys() {
        let doc = json!({"a/b": {"m~n": {"c d": true}}});
        assert_eq!(dereference(&doc, "/a~1b/m~0n/c%20d").unwrap(), &json!(true));
    }

    #[test]
    fn dereference_missing_member() {
        let doc = json!({"a": {"b": 1}});
        let err = dereference(&doc, "/a/c").unwrap_err();
        assert!(matches!(err, ResolveError::PointerNotFound { .. }));
    }

    #[test]
    fn dereference_index_out_of_range() {
        let doc = json!([1, 2, 3]);
        let err = dereference(&doc, "/3").unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn dereference_numeric_key_on_object_fails() {
        let doc = json!({"200": {"description": "OK"}});
        assert!(matches!(
            dereference(&doc, "/200"),
            Err(ResolveError::PointerNotFound { .. })
        ));
    }

    #[test]
    fn dereference_key_on_array_fails() {
        let doc = json!({"a": [1]});
        assert!(matches!(
            dereference(&doc, "/a/length"),
            Err(ResolveError::PointerNotFound { .. })
        ));
    }

    #[test]
    fn dereference_into_scalar_fails() {
        let doc = json!({"a": "text"});
        let err = dereference(&doc, "/a/b").unwrap_err();
        assert!(err.to_string().contains("cannot descend into string"));
    }

    #[test]
    fn dereference_requires_leading_slash() {
        let doc = json!({"a": 1});
        assert!(matches!(
            dereference(&doc, "a"),
            Err(ResolveError::PointerNotFound { .. })
        ));
    }

    #[test]
    fn dereference_propagates_invalid_escape() {
        let doc = json!({"a": 1});
        assert!(matches!(
            dereference(&doc, "/a~"),
            Err(ResolveError::InvalidEscape { .. })
        ));
    }
}
