//! Company triage state machine
//!
//! ```text
//! new ──approve──▶ approved ──send──▶ sent ──(external)──▶ responded
//!  │                  │
//!  └──reject──▶ rejected ◀──reject──┘
//! ```
//!
//! `send` additionally needs the company's active letter to be approved.
//! `rejected` accepts nothing but a repeated reject.

use super::transition_types::{Entity, PolicyViolation, Transition};
use triage_types::{CompanyStatus, LetterStatus};

/// Actions that move a company through triage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyAction {
    Approve,
    Reject,
    /// Status of the company's active letter, if any
    Send { letter: Option<LetterStatus> },
    /// Driven by inbound replies, never by a client operation
    RecordResponse,
}

impl CompanyAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Send { .. } => "send",
            Self::RecordResponse => "record a response for",
        }
    }
}

/// Decide the next company status for an action
pub fn next_status(
    current: CompanyStatus,
    action: CompanyAction,
) -> Result<Transition<CompanyStatus>, PolicyViolation> {
    use CompanyStatus::*;

    let refuse = |reason: &str| -> Result<Transition<CompanyStatus>, PolicyViolation> {
        Err(PolicyViolation::new(
            Entity::Company,
            current.as_str(),
            action.name(),
            reason,
        ))
    };

    match (current, action) {
        (New, CompanyAction::Approve) => Ok(Transition::Apply(Approved)),
        (Approved, CompanyAction::Approve) => Ok(Transition::Unchanged(Approved)),

        (New | Approved, CompanyAction::Reject) => Ok(Transition::Apply(Rejected)),
        (Rejected, CompanyAction::Reject) => Ok(Transition::Unchanged(Rejected)),

        (Approved, CompanyAction::Send { letter: Some(LetterStatus::Approved) }) => {
            Ok(Transition::Apply(Sent))
        }
        (Approved, CompanyAction::Send { letter: None }) => {
            refuse("no letter has been generated for this company")
        }
        (Approved, CompanyAction::Send { letter: Some(_) }) => {
            refuse("the company's letter must be approved before sending")
        }
        (New, CompanyAction::Send { .. }) => refuse("the company must be approved before sending"),

        (Sent, CompanyAction::RecordResponse) => Ok(Transition::Apply(Responded)),
        (Responded, CompanyAction::RecordResponse) => Ok(Transition::Unchanged(Responded)),
        (_, CompanyAction::RecordResponse) => refuse("only sent companies can respond"),

        (Rejected, _) => refuse("rejected is terminal"),
        (Sent | Responded, _) => refuse("outreach has already been sent"),
    }
}
