//! Registry of documents addressable by URI.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::anchor::find_anchor;
use crate::error::ResolveError;
use crate::pointer::dereference;
use crate::uri::{resolve_uri, split_fragment};

/// Maps normalized, fragment-less URIs to the documents registered under them.
///
/// The store owns a copy of every registered document. Sub-documents found
/// by scanning for nested `$id`s are stored as entries of their own.
///
/// Entries are only added through [`Resolver::add`](crate::Resolver::add),
/// which normalizes their URIs; outside the crate the store is read-only.
///
/// ```compile_fail
/// use json_ref_resolver::DocumentStore;
/// use serde_json::json;
///
/// let mut store = DocumentStore::new();
/// store.insert("http://x/dir/../a.json".to_string(), &json!({})).unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: HashMap<String, Value>,
}

impl DocumentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `document` under an already normalized `uri`.
    ///
    /// Registering a structurally equal document twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::DocumentConflict` if a different document is
    /// already registered under `uri`.
    pub(crate) fn insert(&mut self, uri: String, document: &Value) -> Result<(), ResolveError> {
        match self.documents.entry(uri) {
            Entry::Occupied(existing) => {
                if existing.get() != document {
                    return Err(ResolveError::DocumentConflict {
                        uri: existing.key().clone(),
                    });
                }
                debug!(uri = %existing.key(), "document already registered");
            }
            Entry::Vacant(slot) => {
                debug!(uri = %slot.key(), "registered document");
                slot.insert(document.clone());
            }
        }
        Ok(())
    }

    /// Remove the entry for a normalized `uri`, returning whether it existed.
    pub(crate) fn remove(&mut self, uri: &str) -> bool {
        let removed = self.documents.remove(uri).is_some();
        if removed {
            debug!(uri, "removed document");
        }
        removed
    }

    /// The document registered under a normalized `uri`.
    pub fn document(&self, uri: &str) -> Option<&Value> {
        self.documents.get(uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.documents.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Registered URIs, in no particular order.
    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// Look up a URI with an optional fragment.
    ///
    /// An empty base (`#/a/b`, `#name`) is resolved against `root`. A
    /// fragment starting with `/` is a JSON Pointer; any other non-empty
    /// fragment is a plain-name anchor matched against `$id`.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::MissingRoot` for an empty base without `root`,
    /// `ResolveError::DocumentNotFound` for an unknown base,
    /// `ResolveError::ReferenceNotFound` for an unknown anchor, and pointer
    /// errors from [`dereference`].
    pub fn lookup<'a>(
        &'a self,
        uri: &str,
        root: Option<&'a Value>,
    ) -> Result<&'a Value, ResolveError> {
        let (base, fragment) = split_fragment(uri);

        let document = if base.is_empty() {
            root.ok_or_else(|| ResolveError::MissingRoot {
                reference: uri.to_string(),
            })?
        } else {
            let base = resolve_uri(base, None)?;
            self.documents
                .get(&base)
                .ok_or_else(|| ResolveError::DocumentNotFound { uri: base.clone() })?
        };

        resolve_fragment(document, fragment, uri)
    }
}

/// Apply a fragment (without its `#`) to a document.
pub(crate) fn resolve_fragment<'a>(
    document: &'a Value,
    fragment: &str,
    reference: &str,
) -> Result<&'a Value, ResolveError> {
    if fragment.is_empty() {
        return Ok(document);
    }
    if fragment.starts_with('/') {
        return dereference(document, fragment);
    }
    find_anchor(document, &format!("#{}", fragment)).ok_or_else(|| {
        ResolveError::ReferenceNotFound {
            reference: reference.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_with(uri: &str, document: Value) -> DocumentStore {
        let mut store = DocumentStore::new();
        store.insert(uri.to_string(), &document).unwrap();
        store
    }

    #[test]
    fn insert_same_document_twice() {
        let doc = json!({"a": 1});
        let mut store = store_with("http://x/a.json", doc.clone());
        store.insert("http://x/a.json".into(), &doc).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn insert_different_document_conflicts() {
        let mut store = store_with("http://x/a.json", json!({"a": 1}));
        let err = store
            .insert("http://x/a.json".into(), &json!({"a": 2}))
            .unwrap_err();
        assert!(matches!(err, ResolveError::DocumentConflict { ref uri } if uri == "http://x/a.json"));
        assert_eq!(store.document("http://x/a.json").unwrap(), &json!({"a": 1}));
    }

    #[test]
    fn remove_reports_existence() {
        let mut store = store_with("http://x/a.json", json!({}));
        assert!(store.remove("http://x/a.json"));
        assert!(!store.remove("http://x/a.json"));
        assert!(store.is_empty());
    }

    #[test]
    fn lookup_whole_document() {
        let store = store_with("http://x/a.json", json!({"a": 1}));
        assert_eq!(store.lookup("http://x/a.json", None).unwrap(), &json!({"a": 1}));
        assert_eq!(store.lookup("http://x/a.json#", None).unwrap(), &json!({"a": 1}));
    }

    #[test]
    fn lookup_normalizes_base() {
        let store = store_with("http://x/a.json", json!({"a": 1}));
        assert_eq!(
            store.lookup("http://x/dir/../a.json#/a", None).unwrap(),
            &json!(1)
        );
    }

    #[test]
    fn lookup_pointer_fragment() {
        let store = store_with("http://x/a.json", json!({"defs": {"n": {"type": "number"}}}));
        let found = store.lookup("http://x/a.json#/defs/n", None).unwrap();
        assert_eq!(found, &json!({"type": "number"}));
    }

    #[test]
    fn lookup_anchor_fragment() {
        let store = store_with(
            "http://x/a.json",
            json!({"defs": {"n": {"$id": "#num", "type": "number"}}}),
        );
        let found = store.lookup("http://x/a.json#num", None).unwrap();
        assert_eq!(found["type"], "number");
    }

    #[test]
    fn lookup_unknown_anchor() {
        let store = store_with("http://x/a.json", json!({}));
        assert!(matches!(
            store.lookup("http://x/a.json#nope", None),
            Err(ResolveError::ReferenceNotFound { .. })
        ));
    }

    #[test]
    fn lookup_unknown_document() {
        let store = DocumentStore::new();
        let err = store.lookup("http://x/missing.json#/a", None).unwrap_err();
        assert!(matches!(err, ResolveError::DocumentNotFound { ref uri } if uri == "http://x/missing.json"));
    }

    #[test]
    fn lookup_empty_base_uses_root() {
        let store = DocumentStore::new();
        let root = json!({"constants": {"foo": 123}});
        assert_eq!(store.lookup("#/constants/foo", Some(&root)).unwrap(), &json!(123));
    }

    #[test]
    fn lookup_empty_base_without_root() {
        let store = DocumentStore::new();
        assert!(matches!(
            store.lookup("#/a", None),
            Err(ResolveError::MissingRoot { .. })
        ));
    }
}
