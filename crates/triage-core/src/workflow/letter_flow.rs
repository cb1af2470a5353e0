//! Letter review state machine
//!
//! A letter is born a draft by generation, returns to draft on every
//! update and leaves draft only through approve or reject. Approval is
//! cross-checked against the owning company.

use super::transition_types::{Entity, PolicyViolation};
use triage_types::{CompanyStatus, LetterStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterAction {
    Update,
    Approve,
    Reject,
}

impl LetterAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

/// Whether a (replacement) letter may be generated for a company
pub fn check_generate(company: CompanyStatus) -> Result<(), PolicyViolation> {
    let refuse = |reason: &str| {
        PolicyViolation::new(Entity::Company, company.as_str(), "generate a letter for", reason)
    };

    match company {
        CompanyStatus::New | CompanyStatus::Approved => Ok(()),
        CompanyStatus::Rejected => Err(refuse("rejected is terminal")),
        CompanyStatus::Sent | CompanyStatus::Responded => {
            Err(refuse("outreach has already been sent"))
        }
    }
}

/// Decide the letter status after an action
pub fn next_status(
    current: LetterStatus,
    action: LetterAction,
    company: CompanyStatus,
) -> Result<LetterStatus, PolicyViolation> {
    let refuse = |reason: String| {
        PolicyViolation::new(Entity::Letter, current.as_str(), action.name(), reason)
    };

    if current == LetterStatus::Sent
        || matches!(company, CompanyStatus::Sent | CompanyStatus::Responded)
    {
        return Err(refuse("the letter has already been sent".to_string()));
    }

    match (current, action) {
        (_, LetterAction::Update) => Ok(LetterStatus::Draft),
        (LetterStatus::Draft, LetterAction::Approve) if company == CompanyStatus::Rejected => {
            Err(refuse("the owning company is rejected".to_string()))
        }
        (LetterStatus::Draft, LetterAction::Approve) => Ok(LetterStatus::Approved),
        (LetterStatus::Draft, LetterAction::Reject) => Ok(LetterStatus::Rejected),
        (LetterStatus::Approved | LetterStatus::Rejected | LetterStatus::Sent, _) => {
            Err(refuse(format!(
                "only drafts can be reviewed; this revision is already {}",
                current
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_refused_for_closed_companies() {
        assert!(check_generate(CompanyStatus::New).is_ok());
        assert!(check_generate(CompanyStatus::Approved).is_ok());
        assert!(check_generate(CompanyStatus::Rejected).is_err());
        assert!(check_generate(CompanyStatus::Sent).is_err());
    }

    #[test]
    fn test_update_always_returns_to_draft() {
        for current in [LetterStatus::Draft, LetterStatus::Approved, LetterStatus::Rejected] {
            assert_eq!(
                next_status(current, LetterAction::Update, CompanyStatus::Approved),
                Ok(LetterStatus::Draft)
            );
        }
    }

    #[test]
    fn test_review_of_draft() {
        assert_eq!(
            next_status(LetterStatus::Draft, LetterAction::Approve, CompanyStatus::Approved),
            Ok(LetterStatus::Approved)
        );
        assert_eq!(
            next_status(LetterStatus::Draft, LetterAction::Reject, CompanyStatus::New),
            Ok(LetterStatus::Rejected)
        );
    }

    #[test]
    fn test_letter_of_rejected_company_cannot_be_approved() {
        let err = next_status(LetterStatus::Draft, LetterAction::Approve, CompanyStatus::Rejected)
            .unwrap_err();
        assert_eq!(err.entity, Entity::Letter);
        assert!(err.reason.contains("rejected"));

        // Rejecting it is still fine
        assert!(next_status(LetterStatus::Draft, LetterAction::Reject, CompanyStatus::Rejected).is_ok());
    }

    #[test]
    fn test_reviewed_revisions_are_final() {
        assert!(next_status(LetterStatus::Approved, LetterAction::Approve, CompanyStatus::Approved).is_err());
        assert!(next_status(LetterStatus::Rejected, LetterAction::Approve, CompanyStatus::Approved).is_err());
        assert!(next_status(LetterStatus::Approved, LetterAction::Reject, CompanyStatus::Approved).is_err());
    }

    #[test]
    fn test_sent_letters_are_frozen() {
        assert!(next_status(LetterStatus::Approved, LetterAction::Update, CompanyStatus::Sent).is_err());

        // Backend-reported sent letters stay frozen whatever the company says
        for action in [LetterAction::Update, LetterAction::Approve, LetterAction::Reject] {
            let err = next_status(LetterStatus::Sent, action, CompanyStatus::Approved).unwrap_err();
            assert!(err.reason.contains("already been sent"));
        }
    }
}
