//! Transport adapters for the triage REST API
//!
//! Every adapter turns an [`ApiRequest`] into an [`Envelope`] and never
//! fails by signature: network errors, non-2xx responses and undecodable
//! bodies all come back as error envelopes.

pub mod http;
pub mod in_memory;
pub mod response;

pub use http::HttpTransport;
pub use in_memory::InMemoryTransport;
pub use response::{normalize_json, normalize_response};

use crate::error::Result;
use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use triage_types::{Envelope, ErrorCode};

/// Logical operation a request belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    TopCompanies,
    ListCompanies,
    GetCompany,
    ApproveCompany,
    RejectCompany,
    GetLetter,
    ListLetters,
    GenerateLetter,
    UpdateLetter,
    ApproveLetter,
    RejectLetter,
    SendEmail,
    EmailStatus,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TopCompanies => "top_companies",
            Self::ListCompanies => "list_companies",
            Self::GetCompany => "get_company",
            Self::ApproveCompany => "approve_company",
            Self::RejectCompany => "reject_company",
            Self::GetLetter => "get_letter",
            Self::ListLetters => "list_letters",
            Self::GenerateLetter => "generate_letter",
            Self::UpdateLetter => "update_letter",
            Self::ApproveLetter => "approve_letter",
            Self::RejectLetter => "reject_letter",
            Self::SendEmail => "send_email",
            Self::EmailStatus => "email_status",
        }
    }

    /// A 404 here means "nothing yet", not an error
    pub fn absent_is_empty(&self) -> bool {
        matches!(self, Self::GetLetter)
    }

    /// Code reported for a 404 when the server names none
    pub fn not_found_code(&self) -> ErrorCode {
        match self {
            Self::GetCompany
            | Self::ApproveCompany
            | Self::RejectCompany
            | Self::GenerateLetter
            | Self::SendEmail => ErrorCode::CompanyNotFound,
            Self::GetLetter | Self::UpdateLetter | Self::ApproveLetter | Self::RejectLetter => {
                ErrorCode::LetterNotFound
            }
            Self::EmailStatus => ErrorCode::EmailNotFound,
            Self::TopCompanies | Self::ListCompanies | Self::ListLetters => ErrorCode::NotFound,
        }
    }
}

/// One call against the REST API, path relative to the `/api` base
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub operation: Operation,
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(operation: Operation, method: Method, path: impl Into<String>) -> Self {
        Self {
            operation,
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(operation: Operation, path: impl Into<String>) -> Self {
        Self::new(operation, Method::GET, path)
    }

    pub fn post(operation: Operation, path: impl Into<String>) -> Self {
        Self::new(operation, Method::POST, path)
    }

    pub fn put(operation: Operation, path: impl Into<String>) -> Self {
        Self::new(operation, Method::PUT, path)
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query.extend(query);
        self
    }

    pub fn with_param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_json<B: Serialize>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Path split into its non-empty segments
    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Network seam of the orchestration client
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Envelope<Value>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: ApiRequest) -> Envelope<Value> {
        (**self).send(request).await
    }
}
