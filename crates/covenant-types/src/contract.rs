//! Contracts: the central aggregate of the workflow core
//!
//! A Contract tracks the parties, economic terms, approval and signature
//! flags, the canonical workflow state, and the append-only history of
//! every transition it has gone through.
//!
//! The aggregate is plain data. State only moves through the engine's
//! transition function; managers and the platform never flip flags
//! directly.

use crate::{HistoryEntry, LeaseTerms, PartyId, PartyRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Contract Identifier ──────────────────────────────────────────────

/// Unique identifier for a contract
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractId(pub String);

impl ContractId {
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

impl std::fmt::Display for ContractId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Workflow State ───────────────────────────────────────────────────

/// The canonical workflow state of a contract
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractState {
    /// Issuer is assembling the draft
    Draft,
    /// Invitation sent, waiting for the counterparty to redeem the token
    TenantInvited,
    /// Counterparty is reviewing and filling in profile data
    TenantReviewing,
    /// Issuer is reviewing the counterparty's submission
    LandlordReviewing,
    /// At least one objection is pending; progress is blocked
    ObjectionsPending,
    /// Both parties have approved; waiting on readiness guards
    BothReviewing,
    /// All approvals and guarantees in place; signing may begin
    ReadyToSign,
    /// Both signature flags set
    FullySigned,
    /// Published (terminal for the workflow; termination still possible)
    Published,
    /// A deadline elapsed (terminal)
    Expired,
    /// Explicitly terminated after publication (terminal)
    Terminated,
    /// Explicitly cancelled by the issuer before signing completed (terminal)
    Cancelled,
}

impl ContractState {
    /// Every state, in declaration order
    pub const ALL: [ContractState; 12] = [
        ContractState::Draft,
        ContractState::TenantInvited,
        ContractState::TenantReviewing,
        ContractState::LandlordReviewing,
        ContractState::ObjectionsPending,
        ContractState::BothReviewing,
        ContractState::ReadyToSign,
        ContractState::FullySigned,
        ContractState::Published,
        ContractState::Expired,
        ContractState::Terminated,
        ContractState::Cancelled,
    ];

    /// Whether no further workflow progress is possible from here.
    ///
    /// Published still admits the explicit termination action.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Published | Self::Expired | Self::Terminated | Self::Cancelled
        )
    }

    /// The states in which approval flags may be set and objections raised
    pub fn is_reviewing(&self) -> bool {
        matches!(
            self,
            Self::TenantReviewing | Self::LandlordReviewing | Self::BothReviewing
        )
    }
}

impl std::fmt::Display for ContractState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Draft => "draft",
            Self::TenantInvited => "tenant_invited",
            Self::TenantReviewing => "tenant_reviewing",
            Self::LandlordReviewing => "landlord_reviewing",
            Self::ObjectionsPending => "objections_pending",
            Self::BothReviewing => "both_reviewing",
            Self::ReadyToSign => "ready_to_sign",
            Self::FullySigned => "fully_signed",
            Self::Published => "published",
            Self::Expired => "expired",
            Self::Terminated => "terminated",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{name}")
    }
}

// ── Parties ──────────────────────────────────────────────────────────

/// Contact channel for a party
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl PartyContact {
    pub fn email(address: impl Into<String>) -> Self {
        Self {
            email: Some(address.into()),
            phone: None,
        }
    }

    pub fn phone(number: impl Into<String>) -> Self {
        Self {
            email: None,
            phone: Some(number.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none()
    }
}

/// A contract party: identity plus contact channel
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyRecord {
    pub id: PartyId,
    pub name: String,
    pub contact: PartyContact,
}

impl PartyRecord {
    pub fn new(id: PartyId, name: impl Into<String>, contact: PartyContact) -> Self {
        Self {
            id,
            name: name.into(),
            contact,
        }
    }
}

/// Profile data the counterparty submits during review
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantProfile {
    pub full_name: String,
    pub document_number: String,
    pub phone: String,
    /// Declared monthly income in minor units
    pub monthly_income: i64,
}

// ── Contract Aggregate ───────────────────────────────────────────────

/// The central aggregate: one rental contract moving through its lifecycle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Unique identifier
    pub id: ContractId,
    /// Human-readable sequential number, assigned by the store
    pub number: String,
    /// Canonical workflow state
    pub state: ContractState,
    /// The property owner. Present from creation.
    pub issuer: PartyRecord,
    /// The tenant. Bound when the invitation is redeemed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<PartyRecord>,
    /// Profile the tenant submits while reviewing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_profile: Option<TenantProfile>,
    /// Economic terms
    pub terms: LeaseTerms,
    /// Whether an approved guarantee is required before signing
    pub guarantor_required: bool,
    /// Issuer approval flag (settable only in a reviewing state)
    pub issuer_approved: bool,
    /// Counterparty approval flag (settable only in a reviewing state)
    pub tenant_approved: bool,
    /// Issuer signature flag (monotonic: never unset)
    pub issuer_signed: bool,
    /// Counterparty signature flag (monotonic: never unset)
    pub tenant_signed: bool,
    /// Publication flag
    pub published: bool,
    /// Where to resume when the last pending objection clears
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior_reviewing_state: Option<ContractState>,
    /// Deadline for completing the signing ceremony
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_deadline: Option<DateTime<Utc>>,
    /// When the contract was created (write-once)
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
    /// When both signatures were recorded (write-once)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<DateTime<Utc>>,
    /// When the contract was published (write-once)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency counter; bumped on every applied mutation
    pub version: u64,
    /// Append-only audit trail of transitions
    pub history: Vec<HistoryEntry>,
}

impl Contract {
    /// Create a new draft contract
    pub fn new(
        number: impl Into<String>,
        issuer: PartyRecord,
        terms: LeaseTerms,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ContractId::generate(),
            number: number.into(),
            state: ContractState::Draft,
            issuer,
            counterparty: None,
            tenant_profile: None,
            terms,
            guarantor_required: false,
            issuer_approved: false,
            tenant_approved: false,
            issuer_signed: false,
            tenant_signed: false,
            published: false,
            prior_reviewing_state: None,
            signing_deadline: None,
            created_at: now,
            updated_at: now,
            signed_at: None,
            published_at: None,
            version: 0,
            history: Vec::new(),
        }
    }

    pub fn with_guarantor_required(mut self, required: bool) -> Self {
        self.guarantor_required = required;
        self
    }

    pub fn with_signing_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.signing_deadline = Some(deadline);
        self
    }

    // ── Flag accessors ───────────────────────────────────────────────

    /// Approval flag for a role
    pub fn approval_for(&self, role: PartyRole) -> bool {
        match role {
            PartyRole::Issuer => self.issuer_approved,
            PartyRole::Counterparty => self.tenant_approved,
        }
    }

    /// Signature flag for a role
    pub fn signature_for(&self, role: PartyRole) -> bool {
        match role {
            PartyRole::Issuer => self.issuer_signed,
            PartyRole::Counterparty => self.tenant_signed,
        }
    }

    pub fn both_approved(&self) -> bool {
        self.issuer_approved && self.tenant_approved
    }

    pub fn both_signed(&self) -> bool {
        self.issuer_signed && self.tenant_signed
    }

    /// Whether any party has approved (terms become immutable past this
    /// point, except through an accepted objection)
    pub fn any_approved(&self) -> bool {
        self.issuer_approved || self.tenant_approved
    }

    // ── Mutation helpers (engine-only seams) ─────────────────────────

    /// Set the approval flag for a role
    pub fn set_approval(&mut self, role: PartyRole) {
        match role {
            PartyRole::Issuer => self.issuer_approved = true,
            PartyRole::Counterparty => self.tenant_approved = true,
        }
    }

    /// Record a signature for a role. Monotonic: never unsets.
    pub fn record_signature(&mut self, role: PartyRole) {
        match role {
            PartyRole::Issuer => self.issuer_signed = true,
            PartyRole::Counterparty => self.tenant_signed = true,
        }
    }

    /// Bind the counterparty at invitation redemption
    pub fn bind_counterparty(&mut self, party: PartyRecord) {
        self.counterparty = Some(party);
    }

    /// Bump the mutation clock
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.version += 1;
    }

    /// Append a history entry
    pub fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
    }

    // ── Invariant checks ─────────────────────────────────────────────

    /// The publication invariant: published implies both approvals, both
    /// signatures, and the Published state.
    pub fn publication_consistent(&self) -> bool {
        if !self.published {
            return true;
        }
        self.both_approved()
            && self.both_signed()
            && matches!(self.state, ContractState::Published | ContractState::Terminated)
    }
}
