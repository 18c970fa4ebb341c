//! Invitation lifecycle errors

use crate::InvitationStatus;

/// Errors from token issuance, validation, and redemption
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("no invitation matches the presented token")]
    NotFound,

    #[error("invitation expired at {expired_at}")]
    Expired { expired_at: chrono::DateTime<chrono::Utc> },

    #[error("token has already been redeemed")]
    AlreadyAccepted,

    #[error("invitation is not redeemable in status '{0}'")]
    NotRedeemable(InvitationStatus),

    #[error("invitation is in absorbing status '{0}' and cannot change")]
    Absorbing(InvitationStatus),

    #[error("invitation not found: {0}")]
    InvitationNotFound(String),
}

/// Result type alias for invitation operations
pub type TokenResult<T> = Result<T, TokenError>;
