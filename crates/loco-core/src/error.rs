//! Error types for loco

use std::path::PathBuf;

/// loco error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("No state found for {0}")]
    StateNotFound(PathBuf),

    #[error("Cannot decode state record {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for loco
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::ConfigError(msg.into())
    }

    pub fn invalid_interval<S: Into<String>>(expr: S) -> Self {
        Error::InvalidInterval(expr.into())
    }

    /// Wrap an I/O error with a message describing what was being attempted
    pub fn io<S: Into<String>>(context: S, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::StateNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::StateNotFound(PathBuf::from("/var/log/app.log"));
        assert_eq!(err.to_string(), "No state found for /var/log/app.log");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_io_error_context() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::io("Cannot open log file /tmp/x.log", io_err);
        assert_eq!(err.to_string(), "Cannot open log file /tmp/x.log: denied");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::IoError(_)));
    }
}
