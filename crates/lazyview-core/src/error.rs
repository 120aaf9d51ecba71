use thiserror::Error;

/// Rejected configuration input.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("option `{name}` expects {expected}, got {found}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("option `{name}` does not accept `{value}`")]
    UnknownVariant { name: String, value: String },
    #[error("invalid configuration json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Host transport failure reported by a [`crate::Fetcher`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
}

/// Why a single element could not be loaded.
///
/// These never escape the engine: they are logged and turned into the
/// element's error path.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("no loader registered as `{0}`")]
    UnknownStrategy(String),
    #[error("loader `{strategy}` can not handle <{tag}>")]
    WrongTag { strategy: &'static str, tag: String },
    #[error("missing `{0}` attribute")]
    MissingAttribute(&'static str),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("loader rejected the element")]
    Rejected,
}
