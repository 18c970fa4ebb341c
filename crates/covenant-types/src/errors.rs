//! Shared error taxonomy for the workflow core
//!
//! Subsystem crates carry their own error enums (token, objection,
//! guarantee, biometric). The errors here cut across all of them.

use crate::{ContractState, PartyId, PartyRole};

/// State machine transition failures
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TransitionError {
    /// The event's source state does not match the contract's current state.
    /// Unlisted (state, event) pairs are always rejected, never ignored.
    #[error("event '{event}' is not valid in state '{state}'")]
    InvalidForState { state: ContractState, event: String },

    /// The (state, event) pair is listed but a guard is unmet.
    /// The reason names the specific guard so the caller can render it.
    #[error("cannot apply event in state '{state}': {reason}")]
    GuardFailed { state: ContractState, reason: String },
}

/// Wrong actor or role for an operation
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("actor {actor} acting as {actual} may not {action}: requires {required}")]
pub struct AuthorizationError {
    pub actor: PartyId,
    pub required: PartyRole,
    pub actual: PartyRole,
    pub action: String,
}

/// Malformed or missing input. Always caller-fixable.
///
/// Collects every violation, not just the first, so a form can surface
/// all problems in one round trip.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", self.violations.join("; "))]
pub struct ValidationError {
    pub violations: Vec<String>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    pub fn single(violation: impl Into<String>) -> Self {
        Self {
            violations: vec![violation.into()],
        }
    }

    pub fn push(&mut self, violation: impl Into<String>) {
        self.violations.push(violation.into());
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Ok if no violations were collected, Err otherwise
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Default for ValidationError {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_collects_all_violations() {
        let mut v = ValidationError::new();
        v.push("amount must be positive");
        v.push("policy number is required");

        let err = v.into_result().unwrap_err();
        assert_eq!(err.violations.len(), 2);
        let rendered = err.to_string();
        assert!(rendered.contains("amount must be positive"));
        assert!(rendered.contains("policy number is required"));
    }

    #[test]
    fn test_empty_validation_is_ok() {
        assert!(ValidationError::new().into_result().is_ok());
    }

    #[test]
    fn test_transition_error_names_state() {
        let err = TransitionError::InvalidForState {
            state: ContractState::Draft,
            event: "publish".to_string(),
        };
        assert!(err.to_string().contains("draft"));
        assert!(err.to_string().contains("publish"));
    }
}
