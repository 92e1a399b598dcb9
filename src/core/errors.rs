use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GpError {
    #[error("Invalid auth string: {0}")]
    InvalidAuthString(String),

    #[error("No authentication found for '{0}'")]
    NotFound(String),

    #[error("No authentication found matching '{0}'")]
    NoMatch(String),

    #[error("Multiple accounts match '{query}': {}, please be more specific", candidates.join(", "))]
    AmbiguousMatch {
        query: String,
        candidates: Vec<String>,
    },

    #[error("Malformed dedup key '{key}': {reason}")]
    MalformedKey {
        key: String,
        reason: String,
    },

    #[error("Config file {path} is unreadable: {message}")]
    ConfigUnreadable {
        path: PathBuf,
        message: String,
    },

    #[error("Failed to persist config to {path}: {message}")]
    PersistFailed {
        path: PathBuf,
        message: String,
    },

    #[error("Transfer error: {0}")]
    Transfer(String),

    #[error("Failed to read {path}: {source}")]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid upload options: {0}")]
    InvalidOptions(String),

    #[error("No authentication configured. Use 'gpcli auth add' to add credentials")]
    NoCredentials,

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GpError {
    pub fn transfer(message: impl Into<String>) -> Self {
        Self::Transfer(message.into())
    }

    pub fn discovery(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Discovery {
            path: path.into(),
            source,
        }
    }

    pub fn malformed_key(key: &str, reason: impl ToString) -> Self {
        Self::MalformedKey {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Error alias
pub type Result<T, E = GpError> = std::result::Result<T, E>;
