#![forbid(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;

/// Failure to read or write stored preferences.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure of the response service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("response service unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("response service rejected the request: {reason}")]
    Rejected { reason: String },

    #[error("response worker disconnected")]
    Disconnected,
}

impl ServiceError {
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }
}

/// Failure to load a [`TouchPolicy`](crate::config::TouchPolicy).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_constructors_keep_reason() {
        let err = ServiceError::unavailable("offline");
        assert_eq!(err.to_string(), "response service unavailable: offline");
        let err = ServiceError::rejected("quota");
        assert!(err.to_string().contains("quota"));
    }

    #[test]
    fn validation_errors_are_joined() {
        let err = ConfigError::Validation(vec!["a must be > 0".into(), "b must be > 0".into()]);
        assert_eq!(err.to_string(), "validation errors: a must be > 0; b must be > 0");
    }

    #[test]
    fn store_io_names_path() {
        let err = StoreError::io(
            "/tmp/prefs.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/prefs.json"));
    }
}
