//! In-memory backend state behind the mock data path
//!
//! Applies the same workflow rules as the real backend so the two data
//! paths are interchangeable. Every operation takes the state lock for
//! its whole duration.

pub mod fixtures;

pub use fixtures::FixtureSet;

use crate::constants::{DEFAULT_LIMIT, DEFAULT_PAGE, TOP_COMPANIES_LIMIT};
use crate::error::{Result, TriageError};
use crate::services::{company_query, LetterComposer};
use crate::validation::{
    require_text, validate_company_filter, validate_email, validate_letter_filter,
};
use crate::workflow::{company_flow, letter_flow, CompanyAction, LetterAction, Transition};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use triage_types::{
    ApprovalAction, ApprovalLogEntry, Company, CompanyFilter, CompanyId, DeliveryStatus,
    EmailStatus, ErrorCode, Letter, LetterFilter, LetterId, LetterStatus, LetterTemplate, Success,
};

pub struct InMemoryStore {
    state: Mutex<StoreState>,
    composer: LetterComposer,
}

#[derive(Default)]
struct StoreState {
    companies: BTreeMap<CompanyId, Company>,
    /// Active letter per company
    letters: BTreeMap<CompanyId, Letter>,
    email_statuses: BTreeMap<CompanyId, EmailStatus>,
    approval_log: Vec<ApprovalLogEntry>,
    next_letter_id: i64,
}

impl InMemoryStore {
    pub fn new(fixtures: FixtureSet, composer: LetterComposer) -> Self {
        let next_letter_id = fixtures
            .letters
            .iter()
            .map(|letter| letter.id.value() + 1)
            .max()
            .unwrap_or(1);

        let state = StoreState {
            companies: fixtures
                .companies
                .into_iter()
                .map(|company| (company.id, company))
                .collect(),
            letters: fixtures
                .letters
                .into_iter()
                .map(|letter| (letter.company_id, letter))
                .collect(),
            email_statuses: fixtures
                .email_statuses
                .into_iter()
                .map(|status| (status.company_id, status))
                .collect(),
            approval_log: fixtures.approval_log,
            next_letter_id,
        };

        log::info!(
            "In-memory store seeded with {} companies and {} letters",
            state.companies.len(),
            state.letters.len()
        );

        Self {
            state: Mutex::new(state),
            composer,
        }
    }

    /// Store seeded with the built-in fixtures
    pub fn seeded(composer: LetterComposer) -> Result<Self> {
        Ok(Self::new(FixtureSet::builtin()?, composer))
    }

    pub fn from_fixture_file(path: &std::path::Path, composer: LetterComposer) -> Result<Self> {
        Ok(Self::new(FixtureSet::from_file(path)?, composer))
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn top_companies(&self) -> Vec<Company> {
        company_query::top_ranked(self.state().companies.values(), TOP_COMPANIES_LIMIT)
    }

    pub fn list_companies(&self, filter: &CompanyFilter) -> Result<Success<Vec<Company>>> {
        validate_company_filter(filter)?;

        let companies = company_query::filter_companies(self.state().companies.values(), filter);
        let total = companies.len() as u64;

        Ok(Success::paged(
            companies,
            total,
            filter.page.unwrap_or(DEFAULT_PAGE),
            filter.limit.unwrap_or(DEFAULT_LIMIT),
        ))
    }

    pub fn company(&self, id: CompanyId) -> Result<Company> {
        self.state().company(id).cloned()
    }

    pub fn approve_company(&self, id: CompanyId, comment: Option<&str>) -> Result<Company> {
        self.state()
            .apply_company(id, CompanyAction::Approve, comment.map(str::to_string))
    }

    pub fn reject_company(&self, id: CompanyId, reason: &str) -> Result<Company> {
        let reason = require_text("reason", Some(reason))?;
        self.state()
            .apply_company(id, CompanyAction::Reject, Some(reason.to_string()))
    }

    /// Reply received from the company; not reachable through the client
    pub fn mark_responded(&self, id: CompanyId) -> Result<Company> {
        self.state().apply_company(id, CompanyAction::RecordResponse, None)
    }

    pub fn letter_for_company(&self, company_id: CompanyId) -> Result<Letter> {
        let state = self.state();
        state.company(company_id)?;
        state.letters.get(&company_id).cloned().ok_or_else(|| {
            TriageError::not_found(
                ErrorCode::LetterNotFound,
                format!("No letter for company {}", company_id),
            )
        })
    }

    pub fn list_letters(&self, filter: &LetterFilter) -> Result<Success<Vec<Letter>>> {
        validate_letter_filter(filter)?;

        let letters: Vec<Letter> = self
            .state()
            .letters
            .values()
            .filter(|letter| filter.status.map_or(true, |status| letter.status == status))
            .filter(|letter| filter.company_id.map_or(true, |id| letter.company_id == id))
            .cloned()
            .collect();
        let total = letters.len() as u64;

        Ok(Success::paged(
            letters,
            total,
            filter.page.unwrap_or(DEFAULT_PAGE),
            filter.limit.unwrap_or(DEFAULT_LIMIT),
        ))
    }

    /// Compose a fresh draft, replacing any previous letter of the company
    pub fn generate_letter(&self, company_id: CompanyId, template: LetterTemplate) -> Result<Letter> {
        let mut state = self.state();
        let company = state.company(company_id)?.clone();
        letter_flow::check_generate(company.status)?;

        let composed = self.composer.compose(&company, template);
        let id = LetterId::new(state.next_letter_id);
        state.next_letter_id += 1;

        let letter = Letter {
            id,
            company_id,
            template,
            subject: composed.subject,
            body: composed.body,
            status: LetterStatus::Draft,
            created_at: Utc::now(),
            updated_at: None,
            approved_at: None,
            sent_at: None,
        };

        if let Some(previous) = state.letters.insert(company_id, letter.clone()) {
            log::info!("Letter {} for company {} replaced by {}", previous.id, company_id, id);
        }

        Ok(letter)
    }

    pub fn update_letter(&self, id: LetterId, body: &str) -> Result<Letter> {
        require_text("body", Some(body))?;
        self.state().review_letter(id, LetterAction::Update, Some(body))
    }

    pub fn approve_letter(&self, id: LetterId, body: Option<&str>) -> Result<Letter> {
        if let Some(body) = body {
            require_text("body", Some(body))?;
        }
        self.state().review_letter(id, LetterAction::Approve, body)
    }

    pub fn reject_letter(&self, id: LetterId, reason: &str) -> Result<Letter> {
        let reason = require_text("reason", Some(reason))?;
        let letter = self.state().review_letter(id, LetterAction::Reject, None)?;
        log::info!("Letter {} rejected: {}", id, reason);
        Ok(letter)
    }

    /// Send the approved letter. A dry run validates without changing state.
    pub fn send_email(&self, company_id: CompanyId, email: &str, dry_run: bool) -> Result<EmailStatus> {
        let email = validate_email(email)?.to_string();
        let mut state = self.state();

        let current = state.company(company_id)?.status;
        let letter = state.letters.get(&company_id).map(|letter| letter.status);
        let action = CompanyAction::Send { letter };
        company_flow::next_status(current, action)?;

        if dry_run {
            log::info!("Dry run: letter for company {} would go to {}", company_id, email);
            return Ok(EmailStatus {
                company_id,
                email,
                sent_at: None,
                delivery_status: DeliveryStatus::Pending,
                opened_at: None,
                clicked_at: None,
                bounced: false,
                error: None,
            });
        }

        let now = Utc::now();
        state.apply_company(company_id, action, Some(format!("sent to {}", email)))?;
        if let Some(letter) = state.letters.get_mut(&company_id) {
            letter.sent_at = Some(now);
        }

        let status = EmailStatus {
            company_id,
            email,
            sent_at: Some(now),
            delivery_status: DeliveryStatus::Delivered,
            opened_at: None,
            clicked_at: None,
            bounced: false,
            error: None,
        };
        state.email_statuses.insert(company_id, status.clone());

        Ok(status)
    }

    pub fn email_status(&self, company_id: CompanyId) -> Result<EmailStatus> {
        let state = self.state();
        state.company(company_id)?;
        state.email_statuses.get(&company_id).cloned().ok_or_else(|| {
            TriageError::not_found(
                ErrorCode::EmailNotFound,
                format!("No e-mail has been sent to company {}", company_id),
            )
        })
    }

    pub fn approval_log(&self, company_id: CompanyId) -> Vec<ApprovalLogEntry> {
        self.state()
            .approval_log
            .iter()
            .filter(|entry| entry.company_id == company_id)
            .cloned()
            .collect()
    }
}

impl StoreState {
    fn company(&self, id: CompanyId) -> Result<&Company> {
        self.companies.get(&id).ok_or_else(|| {
            TriageError::not_found(ErrorCode::CompanyNotFound, format!("Company {} not found", id))
        })
    }

    fn apply_company(
        &mut self,
        id: CompanyId,
        action: CompanyAction,
        details: Option<String>,
    ) -> Result<Company> {
        let company = self.companies.get_mut(&id).ok_or_else(|| {
            TriageError::not_found(ErrorCode::CompanyNotFound, format!("Company {} not found", id))
        })?;

        let next = match company_flow::next_status(company.status, action)? {
            Transition::Unchanged(_) => return Ok(company.clone()),
            Transition::Apply(next) => next,
        };

        let now = Utc::now();
        company.status = next;
        company.updated_at = Some(now);
        let updated = company.clone();

        self.approval_log.push(ApprovalLogEntry {
            company_id: id,
            action: logged_action(action),
            details,
            created_at: now,
        });
        log::info!("Company {} moved to {}", id, next);

        Ok(updated)
    }

    fn review_letter(&mut self, id: LetterId, action: LetterAction, body: Option<&str>) -> Result<Letter> {
        let company_id = self
            .letters
            .values()
            .find(|letter| letter.id == id)
            .map(|letter| letter.company_id)
            .ok_or_else(|| {
                TriageError::not_found(ErrorCode::LetterNotFound, format!("Letter {} not found", id))
            })?;
        let company_status = self.company(company_id)?.status;

        let letter = self.letters.get_mut(&company_id).ok_or_else(|| {
            TriageError::not_found(ErrorCode::LetterNotFound, format!("Letter {} not found", id))
        })?;
        let next = letter_flow::next_status(letter.status, action, company_status)?;

        let now = Utc::now();
        if let Some(body) = body {
            letter.body = body.to_string();
        }
        letter.status = next;
        letter.updated_at = Some(now);
        letter.approved_at = match next {
            LetterStatus::Approved => Some(now),
            LetterStatus::Draft | LetterStatus::Rejected => None,
            LetterStatus::Sent => letter.approved_at,
        };

        Ok(letter.clone())
    }
}

fn logged_action(action: CompanyAction) -> ApprovalAction {
    match action {
        CompanyAction::Approve => ApprovalAction::Approved,
        CompanyAction::Reject => ApprovalAction::Rejected,
        CompanyAction::Send { .. } => ApprovalAction::Sent,
        CompanyAction::RecordResponse => ApprovalAction::Responded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SenderConfig;
    use triage_types::CompanyStatus;

    fn store() -> InMemoryStore {
        InMemoryStore::seeded(LetterComposer::new(SenderConfig::default())).unwrap()
    }

    #[test]
    fn test_top_companies_are_ranked() {
        let top = store().top_companies();
        let ids: Vec<i64> = top.iter().map(|c| c.id.value()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_list_echoes_paging_defaults() {
        let page = store()
            .list_companies(&CompanyFilter {
                industry: Some("IT".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(page.data.len(), 2);
        assert_eq!(page.total, Some(2));
        assert_eq!(page.page, Some(1));
        assert_eq!(page.limit, Some(20));
    }

    #[test]
    fn test_generate_replaces_previous_letter() {
        let store = store();
        let first = store.generate_letter(CompanyId::new(1), LetterTemplate::Formal).unwrap();
        let second = store.generate_letter(CompanyId::new(1), LetterTemplate::Informal).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.letter_for_company(CompanyId::new(1)).unwrap().id, second.id);

        let err = store.approve_letter(first.id, None).unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::LetterNotFound);
    }

    #[test]
    fn test_approve_letter_with_edit_stamps_approval() {
        let store = store();
        let draft = store.generate_letter(CompanyId::new(3), LetterTemplate::Formal).unwrap();

        let approved = store.approve_letter(draft.id, Some("Edited body")).unwrap();
        assert_eq!(approved.status, LetterStatus::Approved);
        assert_eq!(approved.body, "Edited body");
        assert!(approved.approved_at.is_some());

        let reopened = store.update_letter(draft.id, "Second edit").unwrap();
        assert_eq!(reopened.status, LetterStatus::Draft);
        assert!(reopened.approved_at.is_none());
    }

    #[test]
    fn test_send_marks_company_and_letter() {
        let store = store();
        let status = store.send_email(CompanyId::new(2), "hr@ozon.ru", false).unwrap();

        assert_eq!(status.delivery_status, DeliveryStatus::Delivered);
        assert_eq!(store.company(CompanyId::new(2)).unwrap().status, CompanyStatus::Sent);
        assert!(store.letter_for_company(CompanyId::new(2)).unwrap().sent_at.is_some());
        assert_eq!(store.email_status(CompanyId::new(2)).unwrap().email, "hr@ozon.ru");

        let log = store.approval_log(CompanyId::new(2));
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].action, ApprovalAction::Sent);
    }

    #[test]
    fn test_dry_run_changes_nothing() {
        let store = store();
        let status = store.send_email(CompanyId::new(2), "hr@ozon.ru", true).unwrap();

        assert_eq!(status.delivery_status, DeliveryStatus::Pending);
        assert!(status.sent_at.is_none());
        assert_eq!(store.company(CompanyId::new(2)).unwrap().status, CompanyStatus::Approved);
        assert_eq!(
            store.email_status(CompanyId::new(2)).unwrap_err().error_code(),
            ErrorCode::EmailNotFound
        );
    }

    #[test]
    fn test_mark_responded_only_after_send() {
        let store = store();
        assert!(store.mark_responded(CompanyId::new(2)).is_err());

        store.send_email(CompanyId::new(2), "hr@ozon.ru", false).unwrap();
        let responded = store.mark_responded(CompanyId::new(2)).unwrap();
        assert_eq!(responded.status, CompanyStatus::Responded);
    }

    #[test]
    fn test_blank_reject_reason_is_refused() {
        let err = store().reject_company(CompanyId::new(1), "   ").unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::ValidationError);
    }
}
