use std::sync::Arc;

use thiserror::Error;

/// Failures from specifier parsing and remote-map validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("invalid version specifier: {0:?}")]
    InvalidFormat(String),

    #[error("unknown remote: {0}")]
    UnknownRemote(String),

    #[error("specifier requires a remote name: {0:?}")]
    MissingRemote(String),

    #[error("specifier requires an architecture: {0:?}")]
    MissingArch(String),
}

/// Failures from remote catalog aggregation.
///
/// Cloneable so results can be shared across concurrent callers of the
/// memoized fetch; non-cloneable sources are wrapped in `Arc`.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("unknown remote: {0}")]
    UnknownRemote(String),

    #[error("remote listing not found: {uri}")]
    NotFound { uri: String },

    #[error("invalid version index at {uri}: {detail}")]
    InvalidIndexFormat { uri: String, detail: String },

    #[error("invalid path template {template:?}: {detail}")]
    InvalidTemplate { template: String, detail: String },

    #[error("{uri} returned HTTP {status}: {body}")]
    Http {
        uri: String,
        status: u16,
        body: String,
    },

    #[error("fetch failed: {uri}")]
    Fetch {
        uri: String,
        #[source]
        source: Arc<reqwest::Error>,
    },

    #[error("failed to read {path}")]
    Io {
        path: String,
        #[source]
        source: Arc<std::io::Error>,
    },
}
