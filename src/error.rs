//! Error types for trivia-fetch
//!
//! This module provides error handling for the acquisition pipeline, including:
//! - The pipeline error type with transport, rejection and cancellation variants
//! - A coarse [`ErrorKind`] classification used by the data service
//! - Session storage errors raised by the cache backends

use thiserror::Error;

/// Result type alias for trivia-fetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message published when an error renders to an empty string
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Main error type for trivia-fetch
///
/// Each variant carries enough context (status code, response code, config key)
/// to produce a useful message for the consumer.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "batching.max_per_request")
        key: Option<String>,
    },

    /// The question source answered with a non-success HTTP status
    #[error("HTTP error! status: {status}")]
    Transport {
        /// HTTP status code returned by the source
        status: u16,
    },

    /// The question source rejected the request at the API level
    #[error("API error! response code: {code} ({})", response_code_reason(.code))]
    ApiRejected {
        /// Non-zero response code reported by the source
        code: u8,
    },

    /// The run was superseded or torn down before it finished
    #[error("operation cancelled")]
    Cancelled,

    /// A cached value could not be deserialized
    #[error("corrupt cache entry {key}: {reason}")]
    CacheCorrupt {
        /// Storage key of the corrupt entry
        key: String,
        /// Why deserialization failed
        reason: String,
    },

    /// Session storage operation failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Network error (connect failure, timeout, unreadable body)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Session storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to open the storage backend
    #[error("failed to open session storage: {0}")]
    ConnectionFailed(String),

    /// Failed to create the storage schema
    #[error("failed to prepare session storage: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// Coarse classification of pipeline failures
///
/// The data service only distinguishes `Cancelled` (swallowed) from everything
/// else (published as an error message). `CacheCorrupt` never leaves the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Non-success HTTP status from the source
    Transport,
    /// Source-reported logical rejection
    ApiRejected,
    /// Operation superseded or torn down
    Cancelled,
    /// Stored cache value failed to deserialize
    CacheCorrupt,
    /// Any other failure
    Unknown,
}

impl ErrorKind {
    /// Machine-readable name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transport => "transport",
            ErrorKind::ApiRejected => "api_rejected",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::CacheCorrupt => "cache_corrupt",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport { .. } => ErrorKind::Transport,
            Error::ApiRejected { .. } => ErrorKind::ApiRejected,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::CacheCorrupt { .. } => ErrorKind::CacheCorrupt,
            Error::Config { .. }
            | Error::Storage(_)
            | Error::Network(_)
            | Error::Serialization(_)
            | Error::Other(_) => ErrorKind::Unknown,
        }
    }

    /// Returns true if this error only signals a cancelled run
    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }

    /// Message suitable for the consumer-facing `error` field
    ///
    /// Errors that render to an empty string are coerced to
    /// [`UNKNOWN_ERROR_MESSAGE`].
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            UNKNOWN_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}

fn response_code_reason(code: &u8) -> &'static str {
    describe_response_code(*code)
}

/// Human-readable meaning of a question source response code
pub fn describe_response_code(code: u8) -> &'static str {
    match code {
        0 => "success",
        1 => "no results: not enough questions for the requested parameters",
        2 => "invalid parameter",
        3 => "session token not found",
        4 => "session token exhausted",
        5 => "rate limit exceeded",
        _ => "unrecognized response code",
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_message_includes_status() {
        let err = Error::Transport { status: 503 };
        assert_eq!(err.to_string(), "HTTP error! status: 503");
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn api_rejected_message_includes_code_and_meaning() {
        let err = Error::ApiRejected { code: 5 };
        let msg = err.to_string();
        assert!(msg.contains("response code: 5"), "got: {msg}");
        assert!(msg.contains("rate limit"), "got: {msg}");
        assert_eq!(err.kind(), ErrorKind::ApiRejected);
    }

    #[test]
    fn unknown_response_code_is_still_described() {
        let err = Error::ApiRejected { code: 42 };
        assert!(err.to_string().contains("unrecognized response code"));
    }

    #[test]
    fn kind_classifies_every_variant() {
        let cases = vec![
            (
                Error::Config {
                    message: "bad".into(),
                    key: None,
                },
                ErrorKind::Unknown,
            ),
            (Error::Cancelled, ErrorKind::Cancelled),
            (
                Error::CacheCorrupt {
                    key: "triviaDataCache_10".into(),
                    reason: "eof".into(),
                },
                ErrorKind::CacheCorrupt,
            ),
            (
                Error::Storage(StorageError::QueryFailed("locked".into())),
                ErrorKind::Unknown,
            ),
            (Error::Other("boom".into()), ErrorKind::Unknown),
        ];

        for (err, expected) in cases {
            assert_eq!(err.kind(), expected, "wrong kind for {err:?}");
        }
    }

    #[test]
    fn serialization_errors_are_unknown() {
        let err: Error = serde_json::from_str::<Vec<u8>>("not json")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert!(err.to_string().starts_with("serialization error"));
    }

    #[test]
    fn empty_messages_are_coerced() {
        assert_eq!(
            Error::Other(String::new()).user_message(),
            UNKNOWN_ERROR_MESSAGE
        );
        assert_eq!(Error::Other("  ".into()).user_message(), UNKNOWN_ERROR_MESSAGE);
        assert_eq!(Error::Other("boom".into()).user_message(), "boom");
    }

    #[test]
    fn only_cancelled_reports_is_cancelled() {
        assert!(Error::Cancelled.is_cancelled());
        assert!(!Error::Transport { status: 500 }.is_cancelled());
    }

    #[test]
    fn kind_names_are_stable() {
        assert_eq!(ErrorKind::ApiRejected.as_str(), "api_rejected");
        assert_eq!(ErrorKind::CacheCorrupt.to_string(), "cache_corrupt");
    }
}
