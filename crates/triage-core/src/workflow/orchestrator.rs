//! Triage client orchestrating company review, letter review and sending
//!
//! Every operation returns an [`Envelope`] and never panics or errors by
//! signature. Preconditions that can be checked locally (required text,
//! e-mail shape, filter ranges, workflow transitions) are checked before
//! the mutating call goes out, so a refused operation leaves the backend
//! untouched.

use super::company_flow::{self, CompanyAction};
use super::letter_flow::{self, LetterAction};
use super::transition_types::{Entity, PolicyViolation, Transition};
use crate::clients::{ApiRequest, Operation, Transport};
use crate::constants::{DEFAULT_LIMIT, DEFAULT_PAGE, TOP_COMPANIES_LIMIT};
use crate::error::{Result, TriageError};
use crate::services::company_query;
use crate::validation::{
    require_text, validate_company_filter, validate_email, validate_letter_filter,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use triage_types::{
    ApproveCompanyRequest, ApproveLetterRequest, Company, CompanyFilter, CompanyId, EmailStatus,
    Envelope, ErrorCode, Letter, LetterFilter, LetterHandle, LetterTemplate, RejectRequest,
    SendEmailRequest, Success, UpdateLetterRequest,
};

/// Options for [`TriageClient::send_email`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendOptions {
    /// Validate and preview without sending or changing state
    pub dry_run: bool,
}

/// Orchestration client, generic over the transport seam
pub struct TriageClient<T: Transport> {
    transport: T,
}

impl<T: Transport> TriageClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Up to 20 companies, highest score first
    pub async fn top_companies(&self) -> Envelope<Vec<Company>> {
        Envelope::from_result(self.fetch_top_companies().await)
    }

    pub async fn list_companies(&self, filter: &CompanyFilter) -> Envelope<Vec<Company>> {
        Envelope::from_result(self.fetch_companies(filter).await)
    }

    pub async fn company(&self, id: CompanyId) -> Envelope<Company> {
        Envelope::from_result(self.call_as(get_company(id)).await)
    }

    pub async fn approve_company(&self, id: CompanyId, comment: Option<&str>) -> Envelope<Company> {
        Envelope::from_result(self.do_approve_company(id, comment).await)
    }

    pub async fn reject_company(&self, id: CompanyId, reason: &str) -> Envelope<Company> {
        Envelope::from_result(self.do_reject_company(id, reason).await)
    }

    /// Active letter of the company; `None` when none was generated yet
    pub async fn letter(&self, company_id: CompanyId) -> Envelope<Option<Letter>> {
        Envelope::from_result(self.call_as(get_letter(company_id)).await)
    }

    pub async fn list_letters(&self, filter: &LetterFilter) -> Envelope<Vec<Letter>> {
        Envelope::from_result(self.fetch_letters(filter).await)
    }

    /// Generate a draft, superseding any previous letter of the company
    pub async fn generate_letter(
        &self,
        company_id: CompanyId,
        template: LetterTemplate,
    ) -> Envelope<Letter> {
        Envelope::from_result(self.do_generate_letter(company_id, template).await)
    }

    pub async fn update_letter(&self, handle: LetterHandle, body: &str) -> Envelope<Letter> {
        Envelope::from_result(self.do_update_letter(handle, body).await)
    }

    /// Approve the draft, optionally replacing its body in the same call
    pub async fn approve_letter(
        &self,
        handle: LetterHandle,
        edited_body: Option<&str>,
    ) -> Envelope<Letter> {
        Envelope::from_result(self.do_approve_letter(handle, edited_body).await)
    }

    pub async fn reject_letter(&self, handle: LetterHandle, reason: Option<&str>) -> Envelope<Letter> {
        Envelope::from_result(self.do_reject_letter(handle, reason).await)
    }

    pub async fn send_email(
        &self,
        company_id: CompanyId,
        email: &str,
        options: SendOptions,
    ) -> Envelope<EmailStatus> {
        Envelope::from_result(self.do_send_email(company_id, email, options).await)
    }

    pub async fn email_status(&self, company_id: CompanyId) -> Envelope<EmailStatus> {
        Envelope::from_result(
            self.call_as(ApiRequest::get(
                Operation::EmailStatus,
                format!("/emails/status/{}", company_id),
            ))
            .await,
        )
    }

    async fn fetch_top_companies(&self) -> Result<Success<Vec<Company>>> {
        let request = ApiRequest::get(Operation::TopCompanies, "/companies/top-20");
        let success: Success<Vec<Company>> = self.call_as(request).await?;

        let ranked = company_query::top_ranked(&success.data, TOP_COMPANIES_LIMIT);
        log::debug!("Top companies: {} ranked", ranked.len());
        Ok(Success::new(ranked))
    }

    async fn fetch_companies(&self, filter: &CompanyFilter) -> Result<Success<Vec<Company>>> {
        validate_company_filter(filter)?;

        let request =
            ApiRequest::get(Operation::ListCompanies, "/companies").with_query(filter.to_query());
        let success: Success<Vec<Company>> = self.call_as(request).await?;

        Ok(with_paging(success, filter.page, filter.limit))
    }

    async fn fetch_letters(&self, filter: &LetterFilter) -> Result<Success<Vec<Letter>>> {
        validate_letter_filter(filter)?;

        let request =
            ApiRequest::get(Operation::ListLetters, "/letters").with_query(filter.to_query());
        let success: Success<Vec<Letter>> = self.call_as(request).await?;

        Ok(with_paging(success, filter.page, filter.limit))
    }

    async fn do_approve_company(
        &self,
        id: CompanyId,
        comment: Option<&str>,
    ) -> Result<Success<Company>> {
        let company = self.load_company(id).await?;

        match company_flow::next_status(company.status, CompanyAction::Approve).map_err(refused)? {
            Transition::Unchanged(_) => {
                log::info!("Company {} is already approved", id);
                Ok(Success::new(company))
            }
            Transition::Apply(_) => {
                let body = ApproveCompanyRequest {
                    comment: comment.map(str::to_string),
                };
                let request = ApiRequest::post(
                    Operation::ApproveCompany,
                    format!("/companies/{}/approve", id),
                )
                .with_json(&body)?;

                let approved: Success<Company> = self.call_as(request).await?;
                log::info!("Approved company {} ({})", id, approved.data.name);
                Ok(approved)
            }
        }
    }

    async fn do_reject_company(&self, id: CompanyId, reason: &str) -> Result<Success<Company>> {
        let reason = require_text("reason", Some(reason))?;
        let company = self.load_company(id).await?;

        match company_flow::next_status(company.status, CompanyAction::Reject).map_err(refused)? {
            Transition::Unchanged(_) => {
                log::info!("Company {} is already rejected", id);
                Ok(Success::new(company))
            }
            Transition::Apply(_) => {
                let body = RejectRequest {
                    reason: reason.to_string(),
                };
                let request =
                    ApiRequest::post(Operation::RejectCompany, format!("/companies/{}/reject", id))
                        .with_json(&body)?;

                let rejected: Success<Company> = self.call_as(request).await?;
                log::info!("Rejected company {}: {}", id, reason);
                Ok(rejected)
            }
        }
    }

    async fn do_generate_letter(
        &self,
        company_id: CompanyId,
        template: LetterTemplate,
    ) -> Result<Success<Letter>> {
        let company = self.load_company(company_id).await?;
        letter_flow::check_generate(company.status).map_err(refused)?;

        let request = ApiRequest::post(
            Operation::GenerateLetter,
            format!("/letters/generate/{}", company_id),
        )
        .with_param("template", template);

        let letter: Success<Letter> = self.call_as(request).await?;
        log::info!(
            "Generated {} letter {} for company {}",
            template,
            letter.data.id,
            company_id
        );
        Ok(letter)
    }

    async fn do_update_letter(&self, handle: LetterHandle, body: &str) -> Result<Success<Letter>> {
        require_text("body", Some(body))?;
        self.check_letter_action(handle, LetterAction::Update).await?;

        let request = ApiRequest::put(Operation::UpdateLetter, format!("/letters/{}", handle.id))
            .with_json(&UpdateLetterRequest {
                body: body.to_string(),
            })?;

        self.call_as(request).await
    }

    async fn do_approve_letter(
        &self,
        handle: LetterHandle,
        edited_body: Option<&str>,
    ) -> Result<Success<Letter>> {
        if let Some(body) = edited_body {
            require_text("edited body", Some(body))?;
        }
        self.check_letter_action(handle, LetterAction::Approve).await?;

        let request = ApiRequest::post(
            Operation::ApproveLetter,
            format!("/letters/{}/approve", handle.id),
        )
        .with_json(&ApproveLetterRequest {
            body: edited_body.map(str::to_string),
        })?;

        let approved: Success<Letter> = self.call_as(request).await?;
        log::info!("Approved letter {} for company {}", handle.id, handle.company_id);
        Ok(approved)
    }

    async fn do_reject_letter(
        &self,
        handle: LetterHandle,
        reason: Option<&str>,
    ) -> Result<Success<Letter>> {
        let reason = require_text("reason", reason)?;
        self.check_letter_action(handle, LetterAction::Reject).await?;

        let request = ApiRequest::post(
            Operation::RejectLetter,
            format!("/letters/{}/reject", handle.id),
        )
        .with_json(&RejectRequest {
            reason: reason.to_string(),
        })?;

        self.call_as(request).await
    }

    async fn do_send_email(
        &self,
        company_id: CompanyId,
        email: &str,
        options: SendOptions,
    ) -> Result<Success<EmailStatus>> {
        let email = validate_email(email)?;
        let company = self.load_company(company_id).await?;
        let letter = self.load_letter(company_id).await?;

        let action = CompanyAction::Send {
            letter: letter.as_ref().map(|letter| letter.status),
        };
        company_flow::next_status(company.status, action).map_err(refused)?;

        let mut request =
            ApiRequest::post(Operation::SendEmail, format!("/emails/send/{}", company_id))
                .with_json(&SendEmailRequest {
                    email: email.to_string(),
                })?;
        if options.dry_run {
            request = request.with_param("dry_run", true);
        }

        let status: Success<EmailStatus> = self.call_as(request).await?;
        if options.dry_run {
            log::info!("Dry run: letter for company {} would go to {}", company_id, email);
        } else {
            log::info!("Sent letter for company {} to {}", company_id, email);
        }
        Ok(status)
    }

    /// Re-read company and active letter and check the action is allowed
    async fn check_letter_action(&self, handle: LetterHandle, action: LetterAction) -> Result<()> {
        let company = self.load_company(handle.company_id).await?;
        let letter = self.load_letter(handle.company_id).await?.ok_or_else(|| {
            TriageError::not_found(
                ErrorCode::LetterNotFound,
                format!("Company {} has no letter", handle.company_id),
            )
        })?;

        if letter.id != handle.id {
            return Err(refused(PolicyViolation::new(
                Entity::Letter,
                "superseded",
                action.name(),
                format!("letter {} was replaced by letter {}", handle.id, letter.id),
            )));
        }

        letter_flow::next_status(letter.status, action, company.status).map_err(refused)?;
        Ok(())
    }

    async fn load_company(&self, id: CompanyId) -> Result<Company> {
        self.call_as(get_company(id)).await.map(|success| success.data)
    }

    async fn load_letter(&self, company_id: CompanyId) -> Result<Option<Letter>> {
        self.call_as(get_letter(company_id))
            .await
            .map(|success| success.data)
    }

    async fn call(&self, request: ApiRequest) -> Result<Success<Value>> {
        let operation = request.operation;
        self.transport
            .send(request)
            .await
            .into_result()
            .map_err(|failure| {
                log::warn!("{} failed: {}", operation.name(), failure);
                TriageError::Remote(failure)
            })
    }

    async fn call_as<D: DeserializeOwned>(&self, request: ApiRequest) -> Result<Success<D>> {
        let operation = request.operation;
        let success = self.call(request).await?;
        decode(operation, success)
    }
}

fn get_company(id: CompanyId) -> ApiRequest {
    ApiRequest::get(Operation::GetCompany, format!("/companies/{}", id))
}

fn get_letter(company_id: CompanyId) -> ApiRequest {
    ApiRequest::get(Operation::GetLetter, format!("/letters/{}", company_id))
}

fn decode<D: DeserializeOwned>(operation: Operation, success: Success<Value>) -> Result<Success<D>> {
    let Success {
        data,
        total,
        page,
        limit,
    } = success;

    let data = serde_json::from_value(data).map_err(|e| {
        TriageError::Decode(format!("{} returned an unexpected payload: {}", operation.name(), e))
    })?;

    Ok(Success {
        data,
        total,
        page,
        limit,
    })
}

/// Fill in paging fields the server left out
fn with_paging<I>(success: Success<Vec<I>>, page: Option<u32>, limit: Option<u32>) -> Success<Vec<I>> {
    let total = success.total.unwrap_or(success.data.len() as u64);
    let page = success.page.or(page).unwrap_or(DEFAULT_PAGE);
    let limit = success.limit.or(limit).unwrap_or(DEFAULT_LIMIT);
    Success::paged(success.data, total, page, limit)
}

fn refused(violation: PolicyViolation) -> TriageError {
    log::warn!("Refused: {}", violation);
    violation.into()
}
