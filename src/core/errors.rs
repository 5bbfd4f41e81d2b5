//! Custom error types for classification operations

use thiserror::Error;

/// Message shown when the language gate refuses a submission.
pub const LANGUAGE_REJECTION_MESSAGE: &str = "Kindly stick to English texts only!";

/// Classification-related errors
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Text did not pass the English-language gate; no request was sent
    #[error("{}", LANGUAGE_REJECTION_MESSAGE)]
    LanguageRejection,

    /// Title or body missing
    #[error("Both title and body are required")]
    IncompleteIssue,

    /// Request could not complete or came back with a non-success status
    #[error("request failed")]
    TransportFailure {
        status: Option<u16>,
        detail: String,
    },

    /// Response body does not have the expected shape
    #[error("Malformed response: {message}")]
    MalformedResponse {
        message: String,
    },

    /// Request exceeded the configured timeout
    #[error("Request timed out after {timeout_ms} ms")]
    Timeout {
        timeout_ms: u64,
    },

    /// Request was cancelled by teardown or a newer submission
    #[error("Request cancelled")]
    Cancelled,

    /// Correction target unknown to the service
    #[error("Prediction not found: {id}")]
    PredictionNotFound {
        id: String,
    },

    /// Label outside enhancement/bug/question
    #[error("Unknown label: {label}")]
    UnknownLabel {
        label: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<config::ConfigError> for ClassifierError {
    fn from(err: config::ConfigError) -> Self {
        ClassifierError::ConfigError {
            message: err.to_string(),
        }
    }
}

impl ClassifierError {
    /// Whether the failure happened before anything was sent to the service.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClassifierError::LanguageRejection
                | ClassifierError::IncompleteIssue
                | ClassifierError::UnknownLabel { .. }
                | ClassifierError::ConfigError { .. }
        )
    }
}

/// Result type for classification operations
pub type Result<T> = std::result::Result<T, ClassifierError>;
