#![forbid(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;
use touchlang_runtime::{ConfigError, ServiceError};

pub type Result<T> = std::result::Result<T, ReplayError>;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("trace line {line}: {source}")]
    Trace {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("trace line {line}: timestamp {t_ms}ms is earlier than the previous line")]
    OutOfOrder { line: usize, t_ms: u64 },

    #[error("policy error: {0}")]
    Config(#[from] ConfigError),

    #[error("response worker error: {0}")]
    Worker(#[from] ServiceError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl ReplayError {
    /// Process exit code: 2 for bad input, 1 for everything else.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Trace { .. } | Self::OutOfOrder { .. } | Self::InvalidArgument { .. } => 2,
            Self::Config(ConfigError::Validation(_)) => 2,
            _ => 1,
        }
    }

    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ReplayError;
    use touchlang_runtime::ConfigError;

    #[test]
    fn bad_input_exits_with_two() {
        assert_eq!(ReplayError::invalid("nope").exit_code(), 2);
        assert_eq!(ReplayError::OutOfOrder { line: 3, t_ms: 5 }.exit_code(), 2);
        assert_eq!(
            ReplayError::Config(ConfigError::Validation(vec!["x".into()])).exit_code(),
            2
        );
    }

    #[test]
    fn io_errors_exit_with_one() {
        let err = ReplayError::io(
            "trace.jsonl",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("trace.jsonl"));
    }
}
