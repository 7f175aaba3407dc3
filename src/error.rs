//! Error types for portfolio operations
//!
//! Errors are classified by recoverability:
//! - Retryable: Network issues, timeouts
//! - NonRetryable: Validation failures, unknown records, remote API refusals
//! - RequiresUserAction: Missing configuration, read-only accounts

use thiserror::Error;

/// Error types for portfolio operations
#[derive(Debug, Error)]
pub enum PortfolioError {
    // Retryable errors
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    // Non-retryable errors
    #[error("Remote API error: {0}")]
    Api(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Service not found: {0}")]
    NotFound(i64),

    #[error("Service id already present: {0}")]
    Duplicate(i64),

    #[error("Unsaved changes are being saved; try again when the save completes")]
    Busy,

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(String),

    // Requires user action
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Read-only accounts cannot change ideas")]
    ReadOnly,
}

impl PortfolioError {
    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, PortfolioError::Network(_) | PortfolioError::Timeout(_))
    }

    /// Returns true if this error requires user action to resolve
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            PortfolioError::Configuration(_) | PortfolioError::ReadOnly
        )
    }

    /// Get a user-friendly recovery suggestion
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            PortfolioError::Network(_) => "Check your internet connection and try again.",
            PortfolioError::Timeout(_) => "The server took too long to answer. Try again.",
            PortfolioError::Api(_) => "The spreadsheet backend rejected the request. Review the details.",
            PortfolioError::Validation(_) => "Fill in the required fields and try again.",
            PortfolioError::NotFound(_) => "The idea no longer exists. Sync the data and try again.",
            PortfolioError::Duplicate(_) => "Sync the data to reload the portfolio.",
            PortfolioError::Busy => "Wait for the current save to finish.",
            PortfolioError::Parse(_) => "Check that the backend script returns the expected format.",
            PortfolioError::Io(_) => "Check file permissions and disk space.",
            PortfolioError::Configuration(_) => {
                "Check your configuration in ~/.ideaboard/config.json"
            }
            PortfolioError::ReadOnly => "Ask an administrator for editor access.",
        }
    }
}

impl From<std::io::Error> for PortfolioError {
    fn from(err: std::io::Error) -> Self {
        PortfolioError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PortfolioError {
    fn from(err: serde_json::Error) -> Self {
        PortfolioError::Parse(err.to_string())
    }
}

impl From<csv::Error> for PortfolioError {
    fn from(err: csv::Error) -> Self {
        PortfolioError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for PortfolioError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PortfolioError::Parse(err.to_string())
        } else {
            PortfolioError::Network(err.to_string())
        }
    }
}

/// Serializable error representation for front ends
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFacingError {
    pub message: String,
    pub error_type: ErrorType,
    pub can_retry: bool,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorType {
    Retryable,
    NonRetryable,
    RequiresUserAction,
}

impl From<&PortfolioError> for UserFacingError {
    fn from(err: &PortfolioError) -> Self {
        let error_type = if err.requires_user_action() {
            ErrorType::RequiresUserAction
        } else if err.is_retryable() {
            ErrorType::Retryable
        } else {
            ErrorType::NonRetryable
        };

        UserFacingError {
            message: err.to_string(),
            error_type,
            can_retry: err.is_retryable(),
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}
