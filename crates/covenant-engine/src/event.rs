//! Business events that can move a contract through its lifecycle

use covenant_types::PartyRole;
use serde::{Deserialize, Serialize};

/// Every trigger the state machine understands.
///
/// Events describe what happened, not what state to go to; the
/// transition table decides the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractEvent {
    /// Issuer sent the invitation to the counterparty
    InvitationSent,
    /// Counterparty redeemed a valid, unexpired token
    InvitationAccepted,
    /// Counterparty submitted their profile data
    TenantSubmitted,
    /// A party set their approval flag
    PartyApproved(PartyRole),
    /// A party raised a field-level objection
    ObjectionRaised,
    /// The last pending objection was resolved or withdrawn
    ObjectionsCleared,
    /// The guarantee requirement became satisfied
    GuaranteeSatisfied,
    /// A signer's biometric session reached completion
    SignatureCompleted(PartyRole),
    /// Issuer triggered publication
    Publish,
    /// An invitation or signing deadline elapsed (external sweep)
    DeadlineElapsed,
    /// Issuer cancelled the contract before signatures completed
    Cancel,
    /// Explicit termination of a published contract
    Terminate,
}

impl std::fmt::Display for ContractEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvitationSent => write!(f, "invitation_sent"),
            Self::InvitationAccepted => write!(f, "invitation_accepted"),
            Self::TenantSubmitted => write!(f, "tenant_submitted"),
            Self::PartyApproved(role) => write!(f, "party_approved({role})"),
            Self::ObjectionRaised => write!(f, "objection_raised"),
            Self::ObjectionsCleared => write!(f, "objections_cleared"),
            Self::GuaranteeSatisfied => write!(f, "guarantee_satisfied"),
            Self::SignatureCompleted(role) => write!(f, "signature_completed({role})"),
            Self::Publish => write!(f, "publish"),
            Self::DeadlineElapsed => write!(f, "deadline_elapsed"),
            Self::Cancel => write!(f, "cancel"),
            Self::Terminate => write!(f, "terminate"),
        }
    }
}
