//! The platform error: one surface over every subsystem
//!
//! Compound operations can fail in any participating subsystem; the
//! platform wraps each subsystem error transparently so callers match on
//! one enum while the original error text survives.

use crate::DependencyError;
use covenant_biometric::BiometricError;
use covenant_guarantee::GuaranteeError;
use covenant_invitation::TokenError;
use covenant_objection::ObjectionError;
use covenant_types::{AuthorizationError, TransitionError, ValidationError};

/// Errors surfaced by platform operations
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PlatformError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Objection(#[from] ObjectionError),

    #[error(transparent)]
    Guarantee(#[from] GuaranteeError),

    #[error(transparent)]
    Biometric(#[from] BiometricError),

    /// An external collaborator failed; workflow state was not advanced
    /// past the point recorded by the operation's documentation
    #[error(transparent)]
    Dependency(#[from] DependencyError),

    #[error("contract not found: {0}")]
    ContractNotFound(String),

    /// The caller's snapshot went stale between read and write
    #[error(
        "contract {contract_id} was modified concurrently (expected version {expected}, found {actual})"
    )]
    ConcurrentModification {
        contract_id: String,
        expected: u64,
        actual: u64,
    },
}

/// Result type alias for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;
