//! Error types for the triage core

use crate::workflow::PolicyViolation;
use thiserror::Error;
use triage_types::{ErrorCode, Failure};

/// Main error type for all triage operations
#[derive(Error, Debug)]
pub enum TriageError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network failure: {0}")]
    Network(String),

    #[error("{0}")]
    Remote(Failure),

    #[error("{message}")]
    NotFound { code: ErrorCode, message: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Transition rejected: {0}")]
    Policy(#[from] PolicyViolation),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl TriageError {
    pub fn not_found(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            message: message.into(),
        }
    }

    /// Wire code this error surfaces as in an error envelope
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Http(_) | Self::Network(_) => ErrorCode::NetworkFailure,
            Self::Json(_) | Self::Decode(_) => ErrorCode::DecodeFailure,
            Self::Io(_) | Self::Config(_) => ErrorCode::ServerError,
            Self::Remote(failure) => failure.error_code.clone(),
            Self::NotFound { code, .. } => code.clone(),
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::Policy(_) => ErrorCode::PolicyViolation,
        }
    }
}

impl From<TriageError> for Failure {
    fn from(error: TriageError) -> Self {
        match error {
            TriageError::Remote(failure) => failure,
            TriageError::NotFound { code, message } => Failure::new(code, message),
            other => Failure::new(other.error_code(), other.to_string()),
        }
    }
}

/// Result type for triage operations
pub type Result<T> = std::result::Result<T, TriageError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{Entity, PolicyViolation};

    #[test]
    fn test_remote_failure_passes_through_unchanged() {
        let failure = Failure::new(ErrorCode::Http(503), "maintenance");
        let converted: Failure = TriageError::Remote(failure.clone()).into();
        assert_eq!(converted, failure);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            TriageError::Validation("reason is required".to_string()).error_code(),
            ErrorCode::ValidationError
        );
        assert_eq!(
            TriageError::Network("connection refused".to_string()).error_code(),
            ErrorCode::NetworkFailure
        );
        assert_eq!(
            TriageError::not_found(ErrorCode::CompanyNotFound, "Company 999 not found").error_code(),
            ErrorCode::CompanyNotFound
        );

        let violation = PolicyViolation::new(Entity::Company, "rejected", "approve", "rejected is terminal");
        let failure: Failure = TriageError::from(violation).into();
        assert_eq!(failure.error_code, ErrorCode::PolicyViolation);
        assert!(failure.message.contains("rejected is terminal"));
    }
}
