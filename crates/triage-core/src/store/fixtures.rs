//! Seed data for the in-memory backend

use crate::error::{Result, TriageError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use triage_types::{ApprovalLogEntry, Company, EmailStatus, Letter};

/// Built-in fixtures: four companies and one approved letter
pub const BUILTIN_FIXTURES: &str = include_str!("../../fixtures/companies.json");

/// Everything the in-memory backend can be seeded with
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FixtureSet {
    pub companies: Vec<Company>,

    /// Active letters, at most one per company
    #[serde(default)]
    pub letters: Vec<Letter>,

    #[serde(default)]
    pub email_statuses: Vec<EmailStatus>,

    #[serde(default)]
    pub approval_log: Vec<ApprovalLogEntry>,
}

impl FixtureSet {
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_FIXTURES)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let set: Self = serde_json::from_str(json)?;
        set.validate()?;
        Ok(set)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TriageError::Config(format!("Cannot read fixtures {}: {}", path.display(), e))
        })?;

        log::debug!("Loading fixtures from {}", path.display());
        Self::from_json_str(&content)
    }

    fn validate(&self) -> Result<()> {
        let mut company_ids = HashSet::new();
        for company in &self.companies {
            if !company_ids.insert(company.id) {
                return Err(invalid(format!("duplicate company id {}", company.id)));
            }
        }

        let mut letter_owners = HashSet::new();
        let mut letter_ids = HashSet::new();
        for letter in &self.letters {
            if !company_ids.contains(&letter.company_id) {
                return Err(invalid(format!(
                    "letter {} references unknown company {}",
                    letter.id, letter.company_id
                )));
            }
            if !letter_owners.insert(letter.company_id) {
                return Err(invalid(format!(
                    "company {} has more than one active letter",
                    letter.company_id
                )));
            }
            if !letter_ids.insert(letter.id) {
                return Err(invalid(format!("duplicate letter id {}", letter.id)));
            }
        }

        for status in &self.email_statuses {
            if !company_ids.contains(&status.company_id) {
                return Err(invalid(format!(
                    "e-mail status references unknown company {}",
                    status.company_id
                )));
            }
        }

        Ok(())
    }
}

fn invalid(message: String) -> TriageError {
    TriageError::Config(format!("Invalid fixtures: {}", message))
}
