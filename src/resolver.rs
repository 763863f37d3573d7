//! Reference resolution - registers documents and replaces `$ref` nodes.

use std::sync::OnceLock;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::ResolveError;
use crate::resolved::Resolved;
use crate::store::{resolve_fragment, DocumentStore};
use crate::types::{declared_id, declared_ref};
use crate::uri::{document_uri, resolve_uri, split_fragment};

/// Resolves `$ref` nodes against a set of registered documents.
///
/// # Example
///
/// ```
/// use json_ref_resolver::Resolver;
/// use serde_json::json;
///
/// let mut resolver = Resolver::new();
/// resolver
///     .add(&json!({"$id": "http://example.com/constants.json", "foo": 123}), None)
///     .unwrap();
///
/// let doc = json!({
///     "$id": "http://example.com/calc/simple.json",
///     "number": {"$ref": "../constants.json#/foo"}
/// });
/// let resolved = resolver.resolve(&doc, None).unwrap();
/// assert_eq!(*resolved.pointer("/number").unwrap(), json!(123));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    store: DocumentStore,
}

impl Resolver {
    /// Create a resolver with no registered documents.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document and return the resolver, for chained construction.
    pub fn with_document(
        mut self,
        document: &Value,
        uri: Option<&str>,
    ) -> Result<Self, ResolveError> {
        self.add(document, uri)?;
        Ok(self)
    }

    /// The documents registered so far.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Register a document, and every nested `$id` inside it, for lookup.
    ///
    /// Without `uri` the document's own `$id` is used. Nested `$id`s are
    /// resolved against the nearest enclosing `$id`. Plain-name `$id`s
    /// (`#name`) are not registered; they are found by anchor lookup.
    ///
    /// # Errors
    ///
    /// - `ResolveError::MissingIdentity` if there is neither `uri` nor `$id`
    /// - `ResolveError::UnexpectedFragment` if the URI has a non-empty fragment
    /// - `ResolveError::DocumentConflict` if a URI is already taken by a
    ///   different document
    pub fn add(&mut self, document: &Value, uri: Option<&str>) -> Result<(), ResolveError> {
        let uri = uri
            .filter(|uri| !uri.is_empty())
            .or_else(|| declared_id(document))
            .ok_or(ResolveError::MissingIdentity)?;

        let uri = document_uri(uri)?;
        if uri.is_empty() {
            return Err(ResolveError::MissingIdentity);
        }

        self.store.insert(uri.clone(), document)?;
        self.scan_sub_documents(document, &uri, true)
    }

    /// Remove a previously registered document (or sub-document).
    ///
    /// A URI carrying a non-empty fragment never names a document, so it
    /// yields `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns `ResolveError::InvalidUri` if the URI cannot be normalized.
    pub fn delete(&mut self, uri: &str) -> Result<bool, ResolveError> {
        let (base, fragment) = split_fragment(uri);
        if base.is_empty() || !fragment.is_empty() {
            return Ok(false);
        }
        let uri = resolve_uri(base, None)?;
        Ok(self.store.remove(&uri))
    }

    /// Look up the node a URI points to.
    ///
    /// A URI without a base (`#/definitions/a`) is resolved against `root`.
    pub fn get<'a>(
        &'a self,
        uri: &str,
        root: Option<&'a Value>,
    ) -> Result<&'a Value, ResolveError> {
        self.store.lookup(uri, root)
    }

    /// Return `document` with every `$ref` node replaced by its target.
    ///
    /// The base URI is `uri`, else the document's `$id`, else empty (only
    /// same-document references resolve). Replacements are inserted as
    /// found and are not resolved again. The result borrows every untouched
    /// node from `document` and every replacement from the store; only
    /// containers on the path to a replaced node are rebuilt. If nothing
    /// was replaced the result is `Resolved::Same(document)`.
    ///
    /// # Errors
    ///
    /// Fails on the first reference that cannot be resolved.
    pub fn resolve<'a>(
        &'a self,
        document: &'a Value,
        uri: Option<&str>,
    ) -> Result<Resolved<'a>, ResolveError> {
        let base = match uri.filter(|uri| !uri.is_empty()).or_else(|| declared_id(document)) {
            Some(uri) => document_uri(uri)?,
            None => String::new(),
        };

        let walk = Walk {
            store: &self.store,
            root: document,
            root_uri: base,
        };
        match walk.visit(document, &walk.root_uri, true)? {
            Resolution::Unchanged => Ok(Resolved::Same(document)),
            Resolution::Replaced(resolved) => Ok(resolved),
        }
    }

    fn scan_sub_documents(
        &mut self,
        node: &Value,
        base: &str,
        is_root: bool,
    ) -> Result<(), ResolveError> {
        let narrowed;
        let base = match declared_id(node).and_then(scope_uri) {
            Some(id) if !is_root => {
                narrowed = resolve_uri(id, Some(base))?;
                self.store.insert(narrowed.clone(), node)?;
                narrowed.as_str()
            }
            _ => base,
        };

        match node {
            Value::Object(map) => {
                for child in map.values() {
                    self.scan_sub_documents(child, base, false)?;
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.scan_sub_documents(item, base, false)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Resolve `$ref` nodes in a document without registering it.
///
/// Same as [`Resolver::resolve`] on a resolver with no registered documents.
///
/// # Example
///
/// ```
/// use json_ref_resolver::resolve;
/// use serde_json::json;
///
/// let doc = json!({
///     "maths": {"number": {"$ref": "#/constants/foo"}},
///     "constants": {"foo": 123}
/// });
/// let resolved = resolve(&doc, None).unwrap();
/// assert_eq!(*resolved.pointer("/maths/number").unwrap(), json!(123));
/// ```
pub fn resolve<'a>(
    document: &'a Value,
    uri: Option<&str>,
) -> Result<Resolved<'a>, ResolveError> {
    static EMPTY: OnceLock<Resolver> = OnceLock::new();
    EMPTY.get_or_init(Resolver::new).resolve(document, uri)
}

/// The URI part of a `$id` that opens a new scope.
///
/// `a.json` and `a.json#` do; `#name` and `a.json#name` do not.
fn scope_uri(id: &str) -> Option<&str> {
    match split_fragment(id) {
        (base, "") if !base.is_empty() => Some(base),
        _ => None,
    }
}

/// Outcome of visiting one node.
enum Resolution<'a> {
    Unchanged,
    Replaced(Resolved<'a>),
}

struct Walk<'a> {
    store: &'a DocumentStore,
    root: &'a Value,
    root_uri: String,
}

impl<'a> Walk<'a> {
    fn visit(
        &self,
        node: &'a Value,
        base: &str,
        is_root: bool,
    ) -> Result<Resolution<'a>, ResolveError> {
        if let Some(reference) = declared_ref(node) {
            let target = resolve_uri(reference, Some(base))?;
            let value = self.lookup(&target)?;
            debug!(reference, target = %target, "substituted reference");
            return Ok(Resolution::Replaced(Resolved::Same(value)));
        }

        let narrowed;
        let base = match declared_id(node).and_then(scope_uri) {
            Some(id) if !is_root => {
                narrowed = resolve_uri(id, Some(base))?;
                trace!(base = %narrowed, "entered $id scope");
                narrowed.as_str()
            }
            _ => base,
        };

        match node {
            Value::Object(map) => self.visit_object(map, base),
            Value::Array(items) => self.visit_array(items, base),
            _ => Ok(Resolution::Unchanged),
        }
    }

    fn visit_object(
        &self,
        map: &'a Map<String, Value>,
        base: &str,
    ) -> Result<Resolution<'a>, ResolveError> {
        let mut rebuilt: Option<Vec<(&'a str, Resolved<'a>)>> = None;

        for (position, (key, child)) in map.iter().enumerate() {
            match self.visit(child, base, false)? {
                Resolution::Replaced(resolved) => {
                    rebuilt
                        .get_or_insert_with(|| {
                            map.iter()
                                .take(position)
                                .map(|(k, v)| (k.as_str(), Resolved::Same(v)))
                                .collect()
                        })
                        .push((key.as_str(), resolved));
                }
                Resolution::Unchanged => {
                    if let Some(rebuilt) = rebuilt.as_mut() {
                        rebuilt.push((key.as_str(), Resolved::Same(child)));
                    }
                }
            }
        }

        Ok(rebuilt.map_or(Resolution::Unchanged, |members| {
            Resolution::Replaced(Resolved::Object(members))
        }))
    }

    fn visit_array(
        &self,
        items: &'a [Value],
        base: &str,
    ) -> Result<Resolution<'a>, ResolveError> {
        let mut rebuilt: Option<Vec<Resolved<'a>>> = None;

        for (position, item) in items.iter().enumerate() {
            match self.visit(item, base, false)? {
                Resolution::Replaced(resolved) => {
                    rebuilt
                        .get_or_insert_with(|| {
                            let mut copy = Vec::with_capacity(items.len());
                            copy.extend(items[..position].iter().map(Resolved::Same));
                            copy
                        })
                        .push(resolved);
                }
                Resolution::Unchanged => {
                    if let Some(rebuilt) = rebuilt.as_mut() {
                        rebuilt.push(Resolved::Same(item));
                    }
                }
            }
        }

        Ok(rebuilt.map_or(Resolution::Unchanged, |items| {
            Resolution::Replaced(Resolved::Array(items))
        }))
    }

    /// Look up an absolute (or root-relative) target.
    ///
    /// A target naming the document being resolved falls back to that
    /// document when it was never added to the store.
    fn lookup(&self, target: &str) -> Result<&'a Value, ResolveError> {
        let (base, fragment) = split_fragment(target);
        if !base.is_empty() && base == self.root_uri && !self.store.contains(base) {
            return resolve_fragment(self.root, fragment, target);
        }
        self.store.lookup(target, Some(self.root))
    }
}
