//! JSON Reference Resolver
//!
//! Resolution of `$ref` / `$id` cross-references inside JSON documents.
//!
//! Any object carrying a `$ref` string is replaced by the node it points to.
//! The reference is a URI, optionally followed by a fragment, resolved
//! against the nearest enclosing `$id`. Documents living under other URIs
//! are registered on a [`Resolver`] first.
//!
//! # Example
//!
//! ```
//! use json_ref_resolver::Resolver;
//! use serde_json::json;
//!
//! let constants = json!({ "$id": "constants.json", "foo": 123, "bar": 42 });
//! let operations = json!({ "add": "+", "sub": "-" });
//!
//! let mut resolver = Resolver::new();
//! resolver.add(&constants, None).unwrap();
//! // no $id, so the URI must be given
//! resolver.add(&operations, Some("operations.json")).unwrap();
//!
//! let calc = json!({
//!     "$id": "calc/simple.json",
//!     "operation": { "$ref": "../operations.json#/add" },
//!     "number1": { "$ref": "../constants.json#/foo" },
//!     "number2": { "$ref": "../constants.json#/bar" }
//! });
//!
//! let resolved = resolver.resolve(&calc, None).unwrap();
//! assert_eq!(
//!     resolved,
//!     json!({
//!         "$id": "calc/simple.json",
//!         "operation": "+",
//!         "number1": 123,
//!         "number2": 42
//!     })
//! );
//! ```
//!
//! The result is a [`Resolved`] tree. Nodes the resolution did not touch,
//! including substituted targets, are borrowed rather than copied; call
//! [`Resolved::to_value`] for an owned [`serde_json::Value`].
//!
//! # Fragments
//!
//! | Fragment | Meaning |
//! |----------|---------|
//! | (none) or `#` | the whole document |
//! | `#/a/0/b` | JSON Pointer (RFC 6901) into the document |
//! | `#name` | first node whose `$id` is exactly `"#name"` |
//!
//! # Limitations
//!
//! - A replacement is inserted as found. If the target itself contains
//!   `$ref`s they are left untouched, so reference cycles cannot loop.
//! - Pointer tokens made only of digits are always array indices; members
//!   with numeric names (`"200"`) cannot be addressed.

mod anchor;
mod error;
mod loader;
mod pointer;
mod resolved;
mod resolver;
mod store;
mod types;
mod uri;

pub use anchor::find_anchor;
pub use error::ResolveError;
pub use loader::{load_document, load_document_str};
pub use pointer::{decode_token, dereference, Token};
pub use resolved::Resolved;
pub use resolver::{resolve, Resolver};
pub use store::DocumentStore;
pub use types::{ID_KEY, REF_KEY};
pub use uri::{parse_uri, resolve_uri, split_fragment, UriParts};
