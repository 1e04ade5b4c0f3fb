//! Error types for PromptSync.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The page yielded no conversation id or no messages.
    #[error("Extraction failed: {0}")]
    Extraction(String),

    /// Message delivery or network-level failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("API request failed: {status} {body}")]
    RemoteRejected { status: u16, body: String },

    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// A failure reported by another responder, keeping its classification.
    #[error("{message}")]
    Relayed { kind: ErrorKind, message: String },
}

impl Error {
    /// Classify the error for structured failure reports.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Extraction(_) => ErrorKind::ExtractionFailure,
            Self::Transport(_) => ErrorKind::TransportError,
            Self::RemoteRejected { .. } => ErrorKind::RemoteRejected,
            Self::Timeout(_) => ErrorKind::TimeoutError,
            Self::Storage(_) | Self::Database(_) | Self::Io(_) => ErrorKind::StorageError,
            Self::Json(_) | Self::Config(_) | Self::Internal(_) => ErrorKind::Internal,
            Self::Relayed { kind, .. } => *kind,
        }
    }

    /// Whether the next periodic tick may succeed where this attempt failed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::TransportError | ErrorKind::RemoteRejected | ErrorKind::TimeoutError
        )
    }
}

/// Serializable error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    ExtractionFailure,
    TransportError,
    RemoteRejected,
    TimeoutError,
    StorageError,
    Internal,
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_retry_policy() {
        let rejected = Error::RemoteRejected {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(rejected.kind(), ErrorKind::RemoteRejected);
        assert!(rejected.is_retryable());

        let timeout = Error::Timeout(Duration::from_millis(8000));
        assert_eq!(timeout.kind(), ErrorKind::TimeoutError);
        assert!(timeout.is_retryable());
        assert_eq!(timeout.to_string(), "Request timed out after 8000ms");

        let extraction = Error::Extraction("no messages".into());
        assert_eq!(extraction.kind(), ErrorKind::ExtractionFailure);
        assert!(!extraction.is_retryable());

        let relayed = Error::Relayed {
            kind: ErrorKind::RemoteRejected,
            message: "API request failed: 502 bad gateway".into(),
        };
        assert!(relayed.is_retryable());
        assert_eq!(relayed.to_string(), "API request failed: 502 bad gateway");
    }
}
