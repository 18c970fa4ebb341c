//! The invitation manager: token bookkeeping over all invitations
//!
//! Owns every invitation ever issued (soft lifecycle, audit retention)
//! and enforces the one-live-invitation-per-contract rule.
//!
//! Redemption is two-phase so the caller can pair it atomically with the
//! contract transition: `validate_redeemable` checks without mutating,
//! `mark_accepted` commits. The single-step `redeem` is a convenience
//! for callers with no cross-aggregate coupling.

use crate::{
    Invitation, InvitationId, InvitationStatus, InviteToken, DeliveryMethod, TokenError,
    TokenResult,
};
use chrono::{DateTime, Utc};
use covenant_types::ContractId;
use std::collections::HashMap;

/// Manages invitation aggregates and their tokens
#[derive(Clone, Debug, Default)]
pub struct InvitationManager {
    invitations: HashMap<InvitationId, Invitation>,
    by_token: HashMap<String, InvitationId>,
}

impl InvitationManager {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Issuance ─────────────────────────────────────────────────────

    /// Issue a fresh invitation for a contract.
    ///
    /// Any prior live invitation for the same contract is cancelled:
    /// exactly one invitation may be awaiting redemption at a time.
    pub fn issue(
        &mut self,
        contract_id: ContractId,
        contact: impl Into<String>,
        method: DeliveryMethod,
        ttl_days: i64,
    ) -> Invitation {
        let cancelled = self.cancel_live_for(&contract_id);
        if cancelled > 0 {
            tracing::info!(
                contract_id = %contract_id,
                cancelled,
                "Prior live invitations cancelled by reissue"
            );
        }

        let invitation = Invitation::new(contract_id, contact, method, ttl_days);
        tracing::info!(
            invitation_id = %invitation.id,
            contract_id = %invitation.contract_id,
            token = %invitation.token,
            expires_at = %invitation.expires_at,
            "Invitation issued"
        );

        self.by_token
            .insert(invitation.token.0.clone(), invitation.id.clone());
        self.invitations
            .insert(invitation.id.clone(), invitation.clone());
        invitation
    }

    // ── Redemption ───────────────────────────────────────────────────

    /// Check that a token can be redeemed right now, without mutating.
    ///
    /// Expiry is judged against the supplied clock so the caller and the
    /// sweep agree on "now".
    pub fn validate_redeemable(
        &self,
        token: &InviteToken,
        now: DateTime<Utc>,
    ) -> TokenResult<&Invitation> {
        let id = self.by_token.get(&token.0).ok_or(TokenError::NotFound)?;
        let invitation = self
            .invitations
            .get(id)
            .ok_or(TokenError::NotFound)?;

        if invitation.status == InvitationStatus::Accepted {
            return Err(TokenError::AlreadyAccepted);
        }
        if invitation.status == InvitationStatus::Expired || invitation.is_expired_at(now) {
            return Err(TokenError::Expired {
                expired_at: invitation.expires_at,
            });
        }
        if !invitation.status.is_redeemable() {
            return Err(TokenError::NotRedeemable(invitation.status));
        }
        Ok(invitation)
    }

    /// Commit a previously validated redemption
    pub fn mark_accepted(&mut self, id: &InvitationId) -> TokenResult<Invitation> {
        let invitation = self.get_mut(id)?;
        invitation.advance_status(InvitationStatus::Accepted)?;
        tracing::info!(invitation_id = %id, "Invitation accepted");
        Ok(invitation.clone())
    }

    /// Validate and accept in one step
    pub fn redeem(
        &mut self,
        token: &InviteToken,
        now: DateTime<Utc>,
    ) -> TokenResult<Invitation> {
        let id = self.validate_redeemable(token, now)?.id.clone();
        self.mark_accepted(&id)
    }

    // ── Delivery bookkeeping ─────────────────────────────────────────

    /// Record a dispatch attempt: advances to `Sent` or `Failed` and
    /// bumps the attempt counter either way. A resend after a delivery
    /// or open receipt keeps the later status.
    pub fn record_dispatch(&mut self, id: &InvitationId, delivered: bool) -> TokenResult<()> {
        let invitation = self.get_mut(id)?;
        let past_sent = matches!(
            invitation.status,
            InvitationStatus::Delivered | InvitationStatus::Opened
        );
        if !past_sent {
            let to = if delivered {
                InvitationStatus::Sent
            } else {
                InvitationStatus::Failed
            };
            invitation.advance_status(to)?;
        }
        invitation.attempts += 1;
        tracing::info!(
            invitation_id = %id,
            status = %invitation.status,
            attempts = invitation.attempts,
            "Invitation dispatch recorded"
        );
        Ok(())
    }

    pub fn mark_delivered(&mut self, id: &InvitationId) -> TokenResult<()> {
        self.get_mut(id)?.advance_status(InvitationStatus::Delivered)
    }

    pub fn mark_opened(&mut self, id: &InvitationId) -> TokenResult<()> {
        self.get_mut(id)?.advance_status(InvitationStatus::Opened)
    }

    /// Prepare a resend: validates the invitation is still resendable and
    /// returns a snapshot for the dispatcher. The expiry window is never
    /// extended; the attempt counter moves when the dispatch is recorded.
    pub fn resend(&self, id: &InvitationId) -> TokenResult<Invitation> {
        let invitation = self.get(id)?;
        if invitation.status.is_absorbing() {
            return Err(TokenError::Absorbing(invitation.status));
        }
        if invitation.status == InvitationStatus::Accepted {
            return Err(TokenError::AlreadyAccepted);
        }
        Ok(invitation.clone())
    }

    // ── Expiry sweep ─────────────────────────────────────────────────

    /// Mark every overdue live invitation expired. Returns what expired.
    pub fn expire_due(&mut self, now: DateTime<Utc>) -> Vec<Invitation> {
        let mut expired = Vec::new();
        for invitation in self.invitations.values_mut() {
            if invitation.status.is_live() && invitation.is_expired_at(now) {
                invitation.status = InvitationStatus::Expired;
                expired.push(invitation.clone());
            }
        }
        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "Invitations expired by sweep");
        }
        expired
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn get(&self, id: &InvitationId) -> TokenResult<&Invitation> {
        self.invitations
            .get(id)
            .ok_or_else(|| TokenError::InvitationNotFound(id.to_string()))
    }

    /// The live invitation for a contract, if any
    pub fn live_for(&self, contract_id: &ContractId) -> Option<&Invitation> {
        self.invitations
            .values()
            .find(|i| &i.contract_id == contract_id && i.status.is_live())
    }

    /// Every invitation ever issued for a contract (audit view)
    pub fn list_for(&self, contract_id: &ContractId) -> Vec<&Invitation> {
        let mut all: Vec<&Invitation> = self
            .invitations
            .values()
            .filter(|i| &i.contract_id == contract_id)
            .collect();
        all.sort_by_key(|i| i.issued_at);
        all
    }

    fn get_mut(&mut self, id: &InvitationId) -> TokenResult<&mut Invitation> {
        self.invitations
            .get_mut(id)
            .ok_or_else(|| TokenError::InvitationNotFound(id.to_string()))
    }

    fn cancel_live_for(&mut self, contract_id: &ContractId) -> usize {
        let mut cancelled = 0;
        for invitation in self.invitations.values_mut() {
            if &invitation.contract_id == contract_id && invitation.status.is_live() {
                invitation.status = InvitationStatus::Cancelled;
                cancelled += 1;
            }
        }
        cancelled
    }
}
