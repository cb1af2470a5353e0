//! Strongly typed transition outcomes shared by both state machines

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which state machine refused a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Company,
    Letter,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Company => f.write_str("company"),
            Self::Letter => f.write_str("letter"),
        }
    }
}

/// Outcome of an accepted action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<S> {
    /// Persist the new status
    Apply(S),
    /// Already there; nothing to persist
    Unchanged(S),
}

/// A transition the workflow refuses to apply
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {action} {entity} in status '{from}': {reason}")]
pub struct PolicyViolation {
    pub entity: Entity,
    pub from: String,
    pub action: String,
    pub reason: String,
}

impl PolicyViolation {
    pub fn new(
        entity: Entity,
        from: impl Into<String>,
        action: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            entity,
            from: from.into(),
            action: action.into(),
            reason: reason.into(),
        }
    }
}
