//! Uniform response envelope returned by every triage operation
//!
//! `{"status": "success", "data": ..., "total"?, "page"?, "limit"?}` or
//! `{"status": "error", "message": ..., "error_code": ...}`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes carried by the error envelope.
///
/// Serialised as the bare wire string. Bare HTTP statuses travel as their
/// decimal form (`"500"`), anything unrecognised is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "RawCode")]
pub enum ErrorCode {
    NetworkFailure,
    ServerError,
    DecodeFailure,
    ValidationError,
    PolicyViolation,
    NotFound,
    CompanyNotFound,
    LetterNotFound,
    EmailNotFound,
    Http(u16),
    Other(String),
}

/// The error taxonomy codes fold into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NetworkFailure,
    ServerError,
    NotFound,
    ValidationError,
    PolicyViolation,
}

impl ErrorCode {
    pub fn as_wire(&self) -> String {
        match self {
            Self::NetworkFailure => "NETWORK_FAILURE".to_string(),
            Self::ServerError => "SERVER_ERROR".to_string(),
            Self::DecodeFailure => "DECODE_FAILURE".to_string(),
            Self::ValidationError => "VALIDATION_ERROR".to_string(),
            Self::PolicyViolation => "POLICY_VIOLATION".to_string(),
            Self::NotFound => "NOT_FOUND".to_string(),
            Self::CompanyNotFound => "COMPANY_NOT_FOUND".to_string(),
            Self::LetterNotFound => "LETTER_NOT_FOUND".to_string(),
            Self::EmailNotFound => "EMAIL_NOT_FOUND".to_string(),
            Self::Http(status) => status.to_string(),
            Self::Other(code) => code.clone(),
        }
    }

    pub fn parse(code: &str) -> Self {
        match code {
            "NETWORK_FAILURE" => Self::NetworkFailure,
            "SERVER_ERROR" => Self::ServerError,
            "DECODE_FAILURE" => Self::DecodeFailure,
            "VALIDATION_ERROR" => Self::ValidationError,
            "POLICY_VIOLATION" => Self::PolicyViolation,
            "NOT_FOUND" => Self::NotFound,
            "COMPANY_NOT_FOUND" => Self::CompanyNotFound,
            "LETTER_NOT_FOUND" => Self::LetterNotFound,
            "EMAIL_NOT_FOUND" => Self::EmailNotFound,
            other => match other.parse::<u16>() {
                Ok(status) => Self::Http(status),
                Err(_) => Self::Other(other.to_string()),
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NetworkFailure => ErrorKind::NetworkFailure,
            Self::ServerError | Self::DecodeFailure | Self::Other(_) => ErrorKind::ServerError,
            Self::ValidationError => ErrorKind::ValidationError,
            Self::PolicyViolation => ErrorKind::PolicyViolation,
            Self::NotFound | Self::CompanyNotFound | Self::LetterNotFound | Self::EmailNotFound => {
                ErrorKind::NotFound
            }
            Self::Http(404) => ErrorKind::NotFound,
            Self::Http(422) => ErrorKind::ValidationError,
            Self::Http(409) => ErrorKind::PolicyViolation,
            Self::Http(_) => ErrorKind::ServerError,
        }
    }
}

impl Default for ErrorCode {
    fn default() -> Self {
        Self::ServerError
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_wire())
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> Self {
        code.as_wire()
    }
}

/// Servers send the code as a string, a bare status number or `null`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCode {
    Number(u16),
    Text(String),
    Null,
}

impl From<RawCode> for ErrorCode {
    fn from(raw: RawCode) -> Self {
        match raw {
            RawCode::Number(status) => Self::Http(status),
            RawCode::Text(code) => Self::parse(&code),
            RawCode::Null => Self::default(),
        }
    }
}

/// Payload of a success envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Success<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl<T> Success<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            total: None,
            page: None,
            limit: None,
        }
    }

    pub fn paged(data: T, total: u64, page: u32, limit: u32) -> Self {
        Self {
            data,
            total: Some(total),
            page: Some(page),
            limit: Some(limit),
        }
    }
}

/// Payload of an error envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} ({error_code})")]
pub struct Failure {
    pub message: String,
    #[serde(default)]
    pub error_code: ErrorCode,
}

impl Failure {
    pub fn new(error_code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_code,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error_code.kind()
    }
}

/// Response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Envelope<T> {
    Success(Success<T>),
    Error(Failure),
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self::Success(Success::new(data))
    }

    pub fn paged(data: T, total: u64, page: u32, limit: u32) -> Self {
        Self::Success(Success::paged(data, total, page, limit))
    }

    pub fn error(error_code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error(Failure::new(error_code, message))
    }

    /// Collapse an operation result into an envelope
    pub fn from_result<E: Into<Failure>>(result: Result<Success<T>, E>) -> Self {
        match result {
            Ok(success) => Self::Success(success),
            Err(e) => Self::Error(e.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(success) => Some(&success.data),
            Self::Error(_) => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success(success) => Some(success.data),
            Self::Error(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Self::Success(_) => None,
            Self::Error(failure) => Some(failure),
        }
    }

    pub fn error_code(&self) -> Option<&ErrorCode> {
        self.failure().map(|failure| &failure.error_code)
    }

    pub fn into_result(self) -> Result<Success<T>, Failure> {
        match self {
            Self::Success(success) => Ok(success),
            Self::Error(failure) => Err(failure),
        }
    }
}
