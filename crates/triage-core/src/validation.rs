//! Client-side input checks run before any transport call

use crate::constants::{MAX_LIMIT, MAX_SCORE};
use crate::error::{Result, TriageError};
use once_cell::sync::Lazy;
use regex::Regex;
use triage_types::{CompanyFilter, LetterFilter};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

/// Reject missing or whitespace-only free text
pub fn require_text<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(TriageError::Validation(format!("{} must not be empty", field))),
    }
}

pub fn validate_email(email: &str) -> Result<&str> {
    let email = email.trim();
    if EMAIL_PATTERN.is_match(email) {
        Ok(email)
    } else {
        Err(TriageError::Validation(format!(
            "'{}' is not a valid e-mail address",
            email
        )))
    }
}

fn validate_paging(page: Option<u32>, limit: Option<u32>) -> Result<()> {
    if page == Some(0) {
        return Err(TriageError::Validation("page must be at least 1".to_string()));
    }

    if let Some(limit) = limit {
        if limit == 0 || limit > MAX_LIMIT {
            return Err(TriageError::Validation(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }
    }

    Ok(())
}

pub fn validate_company_filter(filter: &CompanyFilter) -> Result<()> {
    if let Some(min_score) = filter.min_score {
        if !(0.0..=MAX_SCORE).contains(&min_score) {
            return Err(TriageError::Validation(format!(
                "min_score must be between 0 and {}",
                MAX_SCORE
            )));
        }
    }

    validate_paging(filter.page, filter.limit)
}

pub fn validate_letter_filter(filter: &LetterFilter) -> Result<()> {
    validate_paging(filter.page, filter.limit)
}
