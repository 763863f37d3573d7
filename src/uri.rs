//! URI parsing, reference resolution and path normalization (RFC 3986).
//!
//! URIs are handled as plain strings split into their five components with
//! the grammar from RFC 3986 appendix B. Resolution follows the component
//! inheritance rules of section 5.2, and `.`/`..` segments are removed from
//! every resulting path so that equal locations compare equal as strings.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::ResolveError;

/// RFC 3986 appendix B: scheme, authority, path, query, fragment.
const URI_GRAMMAR: &str = r"^(?:([^:/?#]+):)?(?://([^/?#]*))?([^?#]*)(?:\?([^#]*))?(?:#(.*))?$";

fn grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| Regex::new(URI_GRAMMAR).expect("URI grammar is a valid pattern"))
}

/// The five components of a URI reference.
///
/// `None` means the component is absent, `Some("")` means it is present
/// but empty (`http://a?` has an empty query, `http://a` has none).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UriParts<'a> {
    pub scheme: Option<&'a str>,
    pub authority: Option<&'a str>,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

impl fmt::Display for UriParts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = self.scheme {
            write!(f, "{}:", scheme)?;
        }
        if let Some(authority) = self.authority {
            write!(f, "//{}", authority)?;
            // an authority must be followed by an absolute path
            if !self.path.is_empty() && !self.path.starts_with('/') {
                f.write_str("/")?;
            }
        }
        f.write_str(self.path)?;
        if let Some(query) = self.query {
            write!(f, "?{}", query)?;
        }
        if let Some(fragment) = self.fragment {
            write!(f, "#{}", fragment)?;
        }
        Ok(())
    }
}

/// Split a URI reference into its components.
///
/// # Errors
///
/// Returns `ResolveError::InvalidUri` if the string does not match the URI
/// grammar. The grammar is permissive; in practice only a line break inside
/// the fragment is rejected.
pub fn parse_uri(uri: &str) -> Result<UriParts<'_>, ResolveError> {
    let caps = grammar()
        .captures(uri)
        .ok_or_else(|| ResolveError::InvalidUri {
            uri: uri.to_string(),
        })?;

    Ok(UriParts {
        scheme: caps.get(1).map(|m| m.as_str()),
        authority: caps.get(2).map(|m| m.as_str()),
        path: caps.get(3).map_or("", |m| m.as_str()),
        query: caps.get(4).map(|m| m.as_str()),
        fragment: caps.get(5).map(|m| m.as_str()),
    })
}

/// Resolve `uri` against an optional `base` and return it in normalized form.
///
/// A URI with a scheme is absolute and only has its path normalized. A
/// relative URI inherits the missing components from `base`. Without a base
/// (or with an empty one) a relative URI is normalized as-is, so the result
/// may still be relative.
///
/// # Errors
///
/// Returns `ResolveError::InvalidUri` if either string fails to parse.
///
/// # Example
///
/// ```
/// use json_ref_resolver::resolve_uri;
///
/// let uri = resolve_uri("../g?y", Some("http://a/b/c/d;p?q")).unwrap();
/// assert_eq!(uri, "http://a/b/g?y");
/// ```
pub fn resolve_uri(uri: &str, base: Option<&str>) -> Result<String, ResolveError> {
    let reference = parse_uri(uri)?;

    if reference.scheme.is_some() {
        let path = remove_dot_segments(reference.path);
        return Ok(UriParts {
            path: &path,
            ..reference
        }
        .to_string());
    }

    let base = match base {
        Some(base) if !base.is_empty() => parse_uri(base)?,
        _ => UriParts::default(),
    };

    let path;
    let target = if reference.authority.is_some() {
        path = remove_dot_segments(reference.path);
        UriParts {
            scheme: base.scheme,
            path: &path,
            ..reference
        }
    } else if reference.path.is_empty() {
        path = remove_dot_segments(base.path);
        UriParts {
            scheme: base.scheme,
            authority: base.authority,
            path: &path,
            query: reference.query.or(base.query),
            fragment: reference.fragment,
        }
    } else {
        path = remove_dot_segments(&merge_paths(&base, reference.path));
        UriParts {
            scheme: base.scheme,
            authority: base.authority,
            path: &path,
            query: reference.query,
            fragment: reference.fragment,
        }
    };

    Ok(target.to_string())
}

/// Split a URI at the first `#`.
///
/// The fragment excludes the `#` and is empty when there is none.
pub fn split_fragment(uri: &str) -> (&str, &str) {
    uri.split_once('#').unwrap_or((uri, ""))
}

/// Normalize a URI that names a whole document.
///
/// A trailing bare `#` is dropped; any other fragment is rejected.
pub(crate) fn document_uri(uri: &str) -> Result<String, ResolveError> {
    let (base, fragment) = split_fragment(uri);
    if !fragment.is_empty() {
        return Err(ResolveError::UnexpectedFragment {
            uri: uri.to_string(),
        });
    }
    resolve_uri(base, None)
}

/// RFC 3986 section 5.2.3.
fn merge_paths(base: &UriParts<'_>, path: &str) -> String {
    if path.starts_with('/') {
        return path.to_string();
    }
    if base.authority.is_some() && base.path.is_empty() {
        return format!("/{}", path);
    }
    match base.path.rfind('/') {
        Some(idx) => format!("{}{}", &base.path[..=idx], path),
        None => path.to_string(),
    }
}

/// Drop `.` and `..` segments along with empty ones.
///
/// A leading slash and a trailing slash survive. A `..` with nothing before
/// it is discarded. A relative path whose segments all cancel out becomes
/// `/`.
fn remove_dot_segments(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    let mut trailing_slash = path.ends_with('/');

    for segment in path.split('/') {
        match segment {
            "" => continue,
            "." => trailing_slash = true,
            ".." => {
                segments.pop();
                trailing_slash = true;
            }
            other => {
                segments.push(other);
                trailing_slash = path.ends_with('/');
            }
        }
    }

    let mut normalized = String::with_capacity(path.len());
    if absolute {
        normalized.push('/');
    }
    normalized.push_str(&segments.join("/"));
    if trailing_slash && !(absolute && segments.is_empty()) {
        normalized.push('/');
    }
    normalized
}
