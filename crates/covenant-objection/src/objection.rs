//! The objection aggregate

use chrono::{DateTime, Utc};
use covenant_types::{ContractId, PartyRole, TermField};
use serde::{Deserialize, Serialize};

// ── Objection Identifier ─────────────────────────────────────────────

/// Unique identifier for an objection
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectionId(pub String);

impl ObjectionId {
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

impl std::fmt::Display for ObjectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Status ───────────────────────────────────────────────────────────

/// Objection lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectionStatus {
    Pending,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ObjectionStatus {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for ObjectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        };
        write!(f, "{name}")
    }
}

/// The responder's decision on a pending objection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectionDecision {
    Accept,
    Reject,
}

// ── Objection Aggregate ──────────────────────────────────────────────

/// One field-level disagreement on a contract's terms
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Objection {
    pub id: ObjectionId,
    pub contract_id: ContractId,
    /// The role that raised the objection
    pub submitted_by: PartyRole,
    /// The term field under dispute (whitelist enforced by the type)
    pub field: TermField,
    /// The value at submission time
    pub current_value: String,
    /// The value the submitter proposes instead
    pub proposed_value: String,
    /// Why the submitter objects
    pub justification: String,
    pub status: ObjectionStatus,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    /// Responder's note, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_note: Option<String>,
}

impl Objection {
    pub fn new(
        contract_id: ContractId,
        submitted_by: PartyRole,
        field: TermField,
        current_value: impl Into<String>,
        proposed_value: impl Into<String>,
        justification: impl Into<String>,
    ) -> Self {
        Self {
            id: ObjectionId::generate(),
            contract_id,
            submitted_by,
            field,
            current_value: current_value.into(),
            proposed_value: proposed_value.into(),
            justification: justification.into(),
            status: ObjectionStatus::Pending,
            submitted_at: Utc::now(),
            resolved_at: None,
            resolution_note: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ObjectionStatus::Pending
    }
}

// ── Errors ───────────────────────────────────────────────────────────

/// Errors from the objection protocol
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ObjectionError {
    #[error("objection not found: {0}")]
    NotFound(String),

    #[error("objection is already resolved (status '{0}')")]
    AlreadyResolved(ObjectionStatus),

    #[error("only the original submitter ({submitter}) may withdraw")]
    NotSubmitter { submitter: PartyRole },

    #[error("the submitter may not respond to their own objection")]
    SelfResponse,
}

/// Result type alias for objection operations
pub type ObjectionResult<T> = Result<T, ObjectionError>;
