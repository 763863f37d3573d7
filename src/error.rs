//! Error types for reference resolution and document loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while normalizing URIs, registering documents or resolving references.
///
/// Every variant is terminal: the first failure aborts the operation.
#[derive(Debug, Error)]
pub enum ResolveError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URI '{uri}'")]
    InvalidUri { uri: String },

    #[error("invalid escape sequence in pointer token '{token}'")]
    InvalidEscape { token: String },

    // Registration errors
    #[error("could not identify the document: no URI given and no $id attribute")]
    MissingIdentity,

    #[error("unexpected non-empty fragment in document URI '{uri}'")]
    UnexpectedFragment { uri: String },

    #[error("document '{uri}' was already added with a different structure")]
    DocumentConflict { uri: String },

    // Lookup errors
    #[error("could not find document '{uri}'")]
    DocumentNotFound { uri: String },

    #[error("same-document reference '{reference}' needs a root document")]
    MissingRoot { reference: String },

    #[error("could not resolve reference '{reference}'")]
    ReferenceNotFound { reference: String },

    #[error("could not dereference pointer '{pointer}': {reason}")]
    PointerNotFound { pointer: String, reason: String },
}

impl ResolveError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ResolveError::FileNotFound { .. } | ResolveError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}
