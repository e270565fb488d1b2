use std::path::PathBuf;

use thiserror::Error;

/// Why a remote object could not be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    NotFound,
    AccessDenied,
    Network,
    Unknown,
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::AccessDenied => write!(f, "access denied"),
            Self::Network => write!(f, "network error"),
            Self::Unknown => write!(f, "unknown error"),
        }
    }
}

/// Terminal errors of a single load invocation
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to download file {key} from S3 bucket {bucket}: {kind}: {message}")]
    Fetch {
        kind: FetchErrorKind,
        bucket: String,
        key: String,
        message: String,
    },

    #[error("Failed to stage file {key} in {}: {source}", path.display())]
    Stage {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load file {} using unstructured loader: {message}", path.display())]
    Partition { path: PathBuf, message: String },

    #[error("Load of {key} from S3 bucket {bucket} exceeded its deadline of {timeout_ms}ms")]
    DeadlineExceeded {
        bucket: String,
        key: String,
        timeout_ms: u128,
    },
}

impl LoaderError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn fetch(
        kind: FetchErrorKind,
        bucket: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Fetch {
            kind,
            bucket: bucket.into(),
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn stage(key: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Stage {
            key: key.into(),
            path: path.into(),
            source,
        }
    }

    pub fn partition(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Partition {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Short label used for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Fetch { .. } => "fetch",
            Self::Stage { .. } => "stage",
            Self::Partition { .. } => "partition",
            Self::DeadlineExceeded { .. } => "deadline",
        }
    }
}
