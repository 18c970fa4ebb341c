//! Actors: who is calling, and in which role
//!
//! Every mutating operation in the workflow core takes an `ActorContext`
//! explicitly. There is no ambient session state: the caller's identity
//! and role travel with the request.

use crate::AuthorizationError;
use serde::{Deserialize, Serialize};

// ── Party Identifier ─────────────────────────────────────────────────

/// Unique identifier for a contract party (issuer or counterparty)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartyId(pub String);

impl PartyId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl std::fmt::Display for PartyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Party Role ───────────────────────────────────────────────────────

/// The two roles a contract party can hold
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyRole {
    /// The property owner / landlord. Originates the contract draft.
    Issuer,
    /// The tenant. Joins via invitation.
    Counterparty,
}

impl PartyRole {
    /// The opposite role
    pub fn other(&self) -> Self {
        match self {
            Self::Issuer => Self::Counterparty,
            Self::Counterparty => Self::Issuer,
        }
    }
}

impl std::fmt::Display for PartyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Issuer => write!(f, "issuer"),
            Self::Counterparty => write!(f, "counterparty"),
        }
    }
}

// ── Actor Context ────────────────────────────────────────────────────

/// The authenticated caller of a workflow operation.
///
/// Produced by the identity collaborator at the boundary and passed
/// into every mutating operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    /// The calling party's identity
    pub party_id: PartyId,
    /// The role the caller acts under
    pub role: PartyRole,
}

impl ActorContext {
    pub fn new(party_id: PartyId, role: PartyRole) -> Self {
        Self { party_id, role }
    }

    pub fn issuer(party_id: PartyId) -> Self {
        Self::new(party_id, PartyRole::Issuer)
    }

    pub fn counterparty(party_id: PartyId) -> Self {
        Self::new(party_id, PartyRole::Counterparty)
    }

    pub fn is_issuer(&self) -> bool {
        self.role == PartyRole::Issuer
    }

    pub fn is_counterparty(&self) -> bool {
        self.role == PartyRole::Counterparty
    }

    /// Require a specific role for an operation
    pub fn require(&self, required: PartyRole, action: &str) -> Result<(), AuthorizationError> {
        if self.role == required {
            Ok(())
        } else {
            Err(AuthorizationError {
                actor: self.party_id.clone(),
                required,
                actual: self.role,
                action: action.to_string(),
            })
        }
    }
}
