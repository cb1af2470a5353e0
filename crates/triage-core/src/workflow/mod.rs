//! Triage workflow: state machines and the orchestration client

pub mod company_flow;
pub mod letter_flow;
pub mod orchestrator;
pub mod transition_types;

// Re-export commonly used types
pub use company_flow::CompanyAction;
pub use letter_flow::LetterAction;
pub use orchestrator::{SendOptions, TriageClient};
pub use transition_types::{Entity, PolicyViolation, Transition};
