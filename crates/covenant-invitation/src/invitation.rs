//! The invitation aggregate
//!
//! Ephemeral, 1:1 with a pending counterparty onboarding attempt.
//! Retained forever for audit; only the status field ever changes.

use crate::{InviteToken, TokenError, TokenResult};
use chrono::{DateTime, Duration, Utc};
use covenant_types::ContractId;
use serde::{Deserialize, Serialize};

/// Default validity window for a fresh invitation
pub const DEFAULT_TTL_DAYS: i64 = 7;

// ── Invitation Identifier ────────────────────────────────────────────

/// Unique identifier for an invitation
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvitationId(pub String);

impl InvitationId {
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

impl std::fmt::Display for InvitationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Delivery ─────────────────────────────────────────────────────────

/// How the invitation message is delivered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    Email,
    Sms,
    WhatsApp,
}

impl std::fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
            Self::Sms => write!(f, "sms"),
            Self::WhatsApp => write!(f, "whatsapp"),
        }
    }
}

// ── Status ───────────────────────────────────────────────────────────

/// Invitation lifecycle status.
///
/// Advances monotonically along the delivery chain; `Cancelled` and
/// `Expired` are absorbing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Sent,
    Delivered,
    Opened,
    Accepted,
    Expired,
    Failed,
    Cancelled,
}

impl InvitationStatus {
    /// No further status movement from these
    pub fn is_absorbing(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Expired)
    }

    /// Statuses from which the token may be redeemed
    pub fn is_redeemable(&self) -> bool {
        matches!(self, Self::Sent | Self::Delivered | Self::Opened)
    }

    /// Live statuses: a new invitation for the same contract cancels these
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Pending | Self::Sent | Self::Delivered | Self::Opened)
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Opened => "opened",
            Self::Accepted => "accepted",
            Self::Expired => "expired",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{name}")
    }
}

// ── Invitation Aggregate ─────────────────────────────────────────────

/// One counterparty onboarding attempt
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: InvitationId,
    /// The contract this invitation belongs to
    pub contract_id: ContractId,
    /// The single-use token
    pub token: InviteToken,
    /// Target contact address (email address or phone number)
    pub contact: String,
    pub method: DeliveryMethod,
    pub status: InvitationStatus,
    pub issued_at: DateTime<Utc>,
    /// Fixed expiry; never extended, not even by resend
    pub expires_at: DateTime<Utc>,
    /// Dispatch attempts (initial send plus resends)
    pub attempts: u32,
}

impl Invitation {
    pub fn new(
        contract_id: ContractId,
        contact: impl Into<String>,
        method: DeliveryMethod,
        ttl_days: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: InvitationId::generate(),
            contract_id,
            token: InviteToken::generate(),
            contact: contact.into(),
            method,
            status: InvitationStatus::Pending,
            issued_at: now,
            expires_at: now + Duration::days(ttl_days),
            attempts: 0,
        }
    }

    /// Whether the expiry window has elapsed
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Move to a later delivery status. Rejects moves out of absorbing
    /// states and any move that would go backwards.
    pub fn advance_status(&mut self, to: InvitationStatus) -> TokenResult<()> {
        if self.status.is_absorbing() {
            return Err(TokenError::Absorbing(self.status));
        }
        if self.status == InvitationStatus::Accepted && to != InvitationStatus::Accepted {
            return Err(TokenError::AlreadyAccepted);
        }
        if delivery_rank(to) < delivery_rank(self.status) && !to.is_absorbing() {
            // Regression along the delivery chain is ignored-with-error,
            // never applied silently.
            return Err(TokenError::NotRedeemable(self.status));
        }
        self.status = to;
        Ok(())
    }
}

/// Ordering of the monotonic delivery chain. Absorbing and failure
/// statuses sit outside the chain.
fn delivery_rank(status: InvitationStatus) -> u8 {
    match status {
        InvitationStatus::Pending => 0,
        InvitationStatus::Sent => 1,
        InvitationStatus::Delivered => 2,
        InvitationStatus::Opened => 3,
        InvitationStatus::Accepted => 4,
        InvitationStatus::Failed => 1,
        InvitationStatus::Expired | InvitationStatus::Cancelled => 5,
    }
}
