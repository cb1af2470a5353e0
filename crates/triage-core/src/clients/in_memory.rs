//! In-memory transport serving the REST routes from an [`InMemoryStore`]
//!
//! Store failures are rendered as the HTTP responses the real backend
//! gives (404, 409, 422) and normalised exactly like network responses,
//! so both data paths produce identical envelopes.

use super::{normalize_json, ApiRequest, Transport};
use crate::error::{Result, TriageError};
use crate::store::InMemoryStore;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use triage_types::{
    ApproveCompanyRequest, ApproveLetterRequest, CompanyFilter, CompanyId, Envelope, ErrorCode,
    LetterFilter, LetterId, LetterTemplate, RejectRequest, SendEmailRequest, UpdateLetterRequest,
};

pub struct InMemoryTransport {
    store: Arc<InMemoryStore>,
    latency: Duration,
}

impl InMemoryTransport {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self {
            store,
            latency: Duration::ZERO,
        }
    }

    /// Delay every response to mimic a network round trip
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn store(&self) -> &Arc<InMemoryStore> {
        &self.store
    }

    fn route(&self, request: &ApiRequest) -> Result<Value> {
        let store = &self.store;
        let segments = request.segments();

        match (request.method.as_str(), segments.as_slice()) {
            ("GET", ["companies", "top-20"]) => to_json(store.top_companies()),
            ("GET", ["companies"]) => {
                let filter = company_filter(request)?;
                to_json(Envelope::Success(store.list_companies(&filter)?))
            }
            ("GET", ["companies", id]) => to_json(store.company(company_id(id)?)?),
            ("POST", ["companies", id, "approve"]) => {
                let body: ApproveCompanyRequest = parse_body(request)?;
                to_json(store.approve_company(company_id(id)?, body.comment.as_deref())?)
            }
            ("POST", ["companies", id, "reject"]) => {
                let body: RejectRequest = parse_body(request)?;
                to_json(store.reject_company(company_id(id)?, &body.reason)?)
            }

            ("GET", ["letters"]) => {
                let filter = letter_filter(request)?;
                to_json(Envelope::Success(store.list_letters(&filter)?))
            }
            ("POST", ["letters", "generate", id]) => {
                let template = match request.query_value("template") {
                    Some(raw) => parse_param::<LetterTemplate>("template", raw)?,
                    None => LetterTemplate::default(),
                };
                to_json(store.generate_letter(company_id(id)?, template)?)
            }
            ("GET", ["letters", id]) => to_json(store.letter_for_company(company_id(id)?)?),
            ("PUT", ["letters", id]) => {
                let body: UpdateLetterRequest = parse_body(request)?;
                to_json(store.update_letter(letter_id(id)?, &body.body)?)
            }
            ("POST", ["letters", id, "approve"]) => {
                let body: ApproveLetterRequest = parse_body(request)?;
                to_json(store.approve_letter(letter_id(id)?, body.body.as_deref())?)
            }
            ("POST", ["letters", id, "reject"]) => {
                let body: RejectRequest = parse_body(request)?;
                to_json(store.reject_letter(letter_id(id)?, &body.reason)?)
            }

            ("POST", ["emails", "send", id]) => {
                let body: SendEmailRequest = parse_body(request)?;
                let dry_run = request.query_value("dry_run") == Some("true");
                to_json(store.send_email(company_id(id)?, &body.email, dry_run)?)
            }
            ("GET", ["emails", "status", id]) => {
                to_json(store.email_status(company_id(id)?)?)
            }

            _ => Err(TriageError::not_found(
                ErrorCode::NotFound,
                format!("No route for {} {}", request.method, request.path),
            )),
        }
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn send(&self, request: ApiRequest) -> Envelope<Value> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        log::debug!(
            "{} (in-memory): {} {}",
            request.operation.name(),
            request.method,
            request.path
        );

        let (status, body) = match self.route(&request) {
            Ok(body) => (200, body),
            Err(e) => error_response(&e),
        };

        normalize_json(request.operation, status, Some(body))
    }
}

/// HTTP status and FastAPI-style body for a store failure
fn error_response(error: &TriageError) -> (u16, Value) {
    let status = match error {
        TriageError::NotFound { .. } => 404,
        TriageError::Policy(_) => 409,
        TriageError::Validation(_) => 422,
        _ => 500,
    };

    (
        status,
        json!({ "detail": error.to_string(), "error_code": error.error_code() }),
    )
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn parse_body<B: DeserializeOwned>(request: &ApiRequest) -> Result<B> {
    let body = request.body.clone().unwrap_or_else(|| json!({}));
    serde_json::from_value(body)
        .map_err(|e| TriageError::Validation(format!("Invalid request body: {}", e)))
}

fn parse_param<T: FromStr>(name: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| TriageError::Validation(format!("Invalid {}: {}", name, e)))
}

fn company_id(raw: &str) -> Result<CompanyId> {
    parse_param::<i64>("company id", raw).map(CompanyId::new)
}

fn letter_id(raw: &str) -> Result<LetterId> {
    parse_param::<i64>("letter id", raw).map(LetterId::new)
}

fn company_filter(request: &ApiRequest) -> Result<CompanyFilter> {
    Ok(CompanyFilter {
        status: optional_param(request, "status")?,
        industry: request.query_value("industry").map(str::to_string),
        min_score: optional_param(request, "min_score")?,
        sort_by: optional_param(request, "sort_by")?,
        page: optional_param(request, "page")?,
        limit: optional_param(request, "limit")?,
    })
}

fn letter_filter(request: &ApiRequest) -> Result<LetterFilter> {
    Ok(LetterFilter {
        status: optional_param(request, "status")?,
        company_id: optional_param::<i64>(request, "company_id")?.map(CompanyId::new),
        page: optional_param(request, "page")?,
        limit: optional_param(request, "limit")?,
    })
}

fn optional_param<T: FromStr>(request: &ApiRequest, name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    request
        .query_value(name)
        .map(|raw| parse_param(name, raw))
        .transpose()
}
