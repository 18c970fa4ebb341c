//! The transition function: total over (state, event)
//!
//! `transition` consumes a contract snapshot and produces the next one.
//! It never mutates the input and never performs I/O, so a rejected
//! transition leaves the caller's aggregate untouched by construction.

use crate::ContractEvent;
use chrono::Utc;
use covenant_types::{
    ActorContext, Contract, ContractState, HistoryEntry, TransitionError,
};

/// Satellite facts consulted by transition guards.
///
/// The objection and guarantee subsystems are independent aggregates;
/// the caller snapshots them into this context so the machine stays pure.
#[derive(Clone, Copy, Debug, Default)]
pub struct GuardContext {
    /// Number of objections currently pending for the contract
    pub pending_objections: usize,
    /// Whether the guarantee requirement is satisfied
    /// (always true when the contract does not require a guarantor)
    pub guarantee_satisfied: bool,
}

impl GuardContext {
    pub fn new() -> Self {
        Self {
            pending_objections: 0,
            guarantee_satisfied: true,
        }
    }

    pub fn with_pending_objections(mut self, count: usize) -> Self {
        self.pending_objections = count;
        self
    }

    pub fn with_guarantee_satisfied(mut self, satisfied: bool) -> Self {
        self.guarantee_satisfied = satisfied;
        self
    }
}

/// The outcome of a successful transition
#[derive(Clone, Debug)]
pub struct Transitioned {
    /// The contract after the transition
    pub contract: Contract,
    /// Whether anything actually changed (idempotent re-evaluations
    /// return the input unchanged and append no history)
    pub changed: bool,
}

/// Apply one event to a contract.
///
/// Total over (state, event): every unlisted pair is rejected with
/// [`TransitionError::InvalidForState`], every listed pair with an unmet
/// guard with [`TransitionError::GuardFailed`] naming the guard.
pub fn transition(
    contract: &Contract,
    event: &ContractEvent,
    actor: &ActorContext,
    ctx: &GuardContext,
) -> Result<Transitioned, TransitionError> {
    use ContractEvent as E;
    use ContractState as S;

    let state = contract.state;
    let mut next = contract.clone();
    let mut note: Option<String> = None;

    let target = match (state, event) {
        // ── Draft → invitation ───────────────────────────────────────
        (S::Draft, E::InvitationSent) => {
            if !next.terms.core_terms_present() {
                return guard_failed(state, "core economic terms are incomplete");
            }
            if next.issuer.name.is_empty() || next.issuer.contact.is_empty() {
                return guard_failed(state, "issuer profile is incomplete");
            }
            S::TenantInvited
        }

        // ── Token redemption ─────────────────────────────────────────
        // Token validity is the invitation manager's guard; by the time
        // this event is issued the token has been validated.
        (S::TenantInvited, E::InvitationAccepted) => S::TenantReviewing,

        // ── Tenant hands the review over ─────────────────────────────
        (S::TenantReviewing, E::TenantSubmitted) => {
            if next.tenant_profile.is_none() {
                return guard_failed(state, "tenant profile has not been submitted");
            }
            if ctx.pending_objections > 0 {
                return objections_pending_guard(state, ctx.pending_objections);
            }
            S::LandlordReviewing
        }

        // ── Approvals (any reviewing state) ──────────────────────────
        (
            S::TenantReviewing | S::LandlordReviewing | S::BothReviewing,
            E::PartyApproved(role),
        ) => {
            if ctx.pending_objections > 0 {
                return objections_pending_guard(state, ctx.pending_objections);
            }
            if next.approval_for(*role) {
                return guard_failed(state, &format!("{role} has already approved"));
            }
            next.set_approval(*role);
            note = Some(format!("{role} approved the terms"));

            if next.both_approved() {
                // At most one deterministic cascade: readiness is checked
                // here, and again via GuaranteeSatisfied if it fails now.
                if ctx.guarantee_satisfied {
                    S::ReadyToSign
                } else {
                    S::BothReviewing
                }
            } else if state == S::TenantReviewing
                && *role == covenant_types::PartyRole::Counterparty
            {
                S::LandlordReviewing
            } else {
                state
            }
        }

        // ── Guarantee readiness re-evaluation ────────────────────────
        (S::BothReviewing, E::GuaranteeSatisfied) => {
            if !ctx.guarantee_satisfied {
                return guard_failed(state, "no approved guarantee on record");
            }
            S::ReadyToSign
        }

        // ── Objections ───────────────────────────────────────────────
        (S::TenantReviewing | S::LandlordReviewing, E::ObjectionRaised) => {
            next.prior_reviewing_state = Some(state);
            S::ObjectionsPending
        }
        (S::BothReviewing, E::ObjectionRaised) => {
            return guard_failed(state, "contract is already fully approved");
        }
        (S::ObjectionsPending, E::ObjectionRaised) => {
            note = Some("additional objection raised".to_string());
            S::ObjectionsPending
        }
        (S::ObjectionsPending, E::ObjectionsCleared) => {
            if ctx.pending_objections > 0 {
                return objections_pending_guard(state, ctx.pending_objections);
            }
            let resume = next
                .prior_reviewing_state
                .take()
                .unwrap_or(S::LandlordReviewing);
            note = Some("all objections resolved".to_string());
            resume
        }

        // ── Signatures ───────────────────────────────────────────────
        (S::ReadyToSign, E::SignatureCompleted(role)) => {
            if next.signature_for(*role) {
                // Re-evaluation after an already-recorded completion:
                // no state change, no history entry.
                return Ok(Transitioned {
                    contract: contract.clone(),
                    changed: false,
                });
            }
            next.record_signature(*role);
            note = Some(format!("{role} completed biometric signature"));
            if next.both_signed() {
                if next.signed_at.is_none() {
                    next.signed_at = Some(Utc::now());
                }
                S::FullySigned
            } else {
                S::ReadyToSign
            }
        }
        (S::FullySigned, E::SignatureCompleted(_)) => {
            // Both flags already set; idempotent no-op.
            return Ok(Transitioned {
                contract: contract.clone(),
                changed: false,
            });
        }

        // ── Publication / termination ────────────────────────────────
        (S::FullySigned, E::Publish) => {
            if next.published {
                return guard_failed(state, "contract is already published");
            }
            next.published = true;
            if next.published_at.is_none() {
                next.published_at = Some(Utc::now());
            }
            S::Published
        }
        (S::Published, E::Terminate) => S::Terminated,

        // ── Deadlines and cancellation ───────────────────────────────
        (s, E::DeadlineElapsed) if !s.is_terminal() => {
            note = Some("deadline elapsed".to_string());
            S::Expired
        }
        (s, E::Cancel) if !s.is_terminal() => {
            if next.both_signed() {
                return guard_failed(state, "signatures are already complete");
            }
            S::Cancelled
        }

        // ── Everything else is rejected, never silently ignored ──────
        _ => {
            return Err(TransitionError::InvalidForState {
                state,
                event: event.to_string(),
            });
        }
    };

    let mut entry = HistoryEntry::new(state, target, actor.party_id.clone(), actor.role);
    if let Some(text) = note {
        entry = entry.with_note(text);
    }
    next.state = target;
    next.push_history(entry);
    next.touch();

    tracing::debug!(
        contract_id = %next.id,
        from = %state,
        to = %target,
        event = %event,
        "Contract transition applied"
    );

    Ok(Transitioned {
        contract: next,
        changed: true,
    })
}

fn guard_failed(
    state: ContractState,
    reason: &str,
) -> Result<Transitioned, TransitionError> {
    Err(TransitionError::GuardFailed {
        state,
        reason: reason.to_string(),
    })
}

fn objections_pending_guard(
    state: ContractState,
    count: usize,
) -> Result<Transitioned, TransitionError> {
    let noun = if count == 1 { "objection" } else { "objections" };
    Err(TransitionError::GuardFailed {
        state,
        reason: format!("{count} {noun} still pending"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_types::{
        LeaseTerms, PartyContact, PartyId, PartyRecord, PartyRole, TenantProfile,
    };

    fn issuer_actor() -> ActorContext {
        ActorContext::issuer(PartyId::new("landlord-1"))
    }

    fn tenant_actor() -> ActorContext {
        ActorContext::counterparty(PartyId::new("tenant-1"))
    }

    fn draft() -> Contract {
        Contract::new(
            "CTR-000001",
            PartyRecord::new(
                PartyId::new("landlord-1"),
                "A. Landlord",
                PartyContact::email("landlord@test.com"),
            ),
            LeaseTerms::new(2_500_000, 2_500_000, 12),
        )
    }

    fn profile() -> TenantProfile {
        TenantProfile {
            full_name: "T. Tenant".to_string(),
            document_number: "12345678".to_string(),
            phone: "+5491100000000".to_string(),
            monthly_income: 9_000_000,
        }
    }

    /// Put a contract into an arbitrary state with flags that are
    /// consistent with how the machine would have gotten there.
    fn contract_in(state: ContractState) -> Contract {
        let mut c = draft();
        c.state = state;
        match state {
            ContractState::TenantReviewing
            | ContractState::LandlordReviewing
            | ContractState::ObjectionsPending => {
                c.tenant_profile = Some(profile());
            }
            ContractState::BothReviewing | ContractState::ReadyToSign => {
                c.tenant_profile = Some(profile());
                c.issuer_approved = true;
                c.tenant_approved = true;
            }
            ContractState::FullySigned => {
                c.tenant_profile = Some(profile());
                c.issuer_approved = true;
                c.tenant_approved = true;
                c.issuer_signed = true;
                c.tenant_signed = true;
                c.signed_at = Some(Utc::now());
            }
            ContractState::Published => {
                c.tenant_profile = Some(profile());
                c.issuer_approved = true;
                c.tenant_approved = true;
                c.issuer_signed = true;
                c.tenant_signed = true;
                c.signed_at = Some(Utc::now());
                c.published = true;
                c.published_at = Some(Utc::now());
            }
            _ => {}
        }
        c
    }

    fn all_events() -> Vec<ContractEvent> {
        vec![
            ContractEvent::InvitationSent,
            ContractEvent::InvitationAccepted,
            ContractEvent::TenantSubmitted,
            ContractEvent::PartyApproved(PartyRole::Issuer),
            ContractEvent::PartyApproved(PartyRole::Counterparty),
            ContractEvent::ObjectionRaised,
            ContractEvent::ObjectionsCleared,
            ContractEvent::GuaranteeSatisfied,
            ContractEvent::SignatureCompleted(PartyRole::Issuer),
            ContractEvent::SignatureCompleted(PartyRole::Counterparty),
            ContractEvent::Publish,
            ContractEvent::DeadlineElapsed,
            ContractEvent::Cancel,
            ContractEvent::Terminate,
        ]
    }

    #[test]
    fn test_draft_to_invited_requires_terms() {
        let mut c = draft();
        c.terms.monthly_rent = 0;
        let err = transition(&c, &ContractEvent::InvitationSent, &issuer_actor(), &GuardContext::new())
            .unwrap_err();
        assert!(matches!(err, TransitionError::GuardFailed { .. }));
        assert!(err.to_string().contains("economic terms"));
    }

    #[test]
    fn test_happy_path_to_ready_to_sign() {
        let ctx = GuardContext::new();
        let c = draft();

        let c = transition(&c, &ContractEvent::InvitationSent, &issuer_actor(), &ctx)
            .unwrap()
            .contract;
        assert_eq!(c.state, ContractState::TenantInvited);

        let mut c = transition(&c, &ContractEvent::InvitationAccepted, &tenant_actor(), &ctx)
            .unwrap()
            .contract;
        assert_eq!(c.state, ContractState::TenantReviewing);

        c.tenant_profile = Some(profile());
        let c = transition(&c, &ContractEvent::TenantSubmitted, &tenant_actor(), &ctx)
            .unwrap()
            .contract;
        assert_eq!(c.state, ContractState::LandlordReviewing);

        let c = transition(
            &c,
            &ContractEvent::PartyApproved(PartyRole::Counterparty),
            &tenant_actor(),
            &ctx,
        )
        .unwrap()
        .contract;
        assert!(c.tenant_approved);
        assert_eq!(c.state, ContractState::LandlordReviewing);

        let c = transition(
            &c,
            &ContractEvent::PartyApproved(PartyRole::Issuer),
            &issuer_actor(),
            &ctx,
        )
        .unwrap()
        .contract;
        // Both approved and no guarantee required: cascade to ReadyToSign
        assert_eq!(c.state, ContractState::ReadyToSign);
        assert_eq!(c.history.len(), 5);
    }

    #[test]
    fn test_tenant_approval_hands_over_review() {
        let c = contract_in(ContractState::TenantReviewing);
        let out = transition(
            &c,
            &ContractEvent::PartyApproved(PartyRole::Counterparty),
            &tenant_actor(),
            &GuardContext::new(),
        )
        .unwrap()
        .contract;
        assert_eq!(out.state, ContractState::LandlordReviewing);
        assert!(out.tenant_approved);
    }

    #[test]
    fn test_guarantee_blocks_ready_to_sign() {
        let mut c = contract_in(ContractState::LandlordReviewing);
        c.guarantor_required = true;
        c.tenant_approved = true;
        let ctx = GuardContext::new().with_guarantee_satisfied(false);

        let c = transition(
            &c,
            &ContractEvent::PartyApproved(PartyRole::Issuer),
            &issuer_actor(),
            &ctx,
        )
        .unwrap()
        .contract;
        assert_eq!(c.state, ContractState::BothReviewing);

        // Still blocked
        let err = transition(&c, &ContractEvent::GuaranteeSatisfied, &issuer_actor(), &ctx)
            .unwrap_err();
        assert!(err.to_string().contains("guarantee"));

        // Guarantee approved: readiness re-evaluation succeeds
        let ctx = ctx.with_guarantee_satisfied(true);
        let c = transition(&c, &ContractEvent::GuaranteeSatisfied, &issuer_actor(), &ctx)
            .unwrap()
            .contract;
        assert_eq!(c.state, ContractState::ReadyToSign);
    }

    #[test]
    fn test_objection_blocks_approval() {
        let c = contract_in(ContractState::LandlordReviewing);
        let ctx = GuardContext::new().with_pending_objections(1);
        let err = transition(
            &c,
            &ContractEvent::PartyApproved(PartyRole::Issuer),
            &issuer_actor(),
            &ctx,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot apply event in state 'landlord_reviewing': 1 objection still pending"
        );
    }

    #[test]
    fn test_objection_round_trip_resumes_prior_state() {
        let c = contract_in(ContractState::LandlordReviewing);
        let ctx = GuardContext::new();

        let c = transition(&c, &ContractEvent::ObjectionRaised, &tenant_actor(), &ctx)
            .unwrap()
            .contract;
        assert_eq!(c.state, ContractState::ObjectionsPending);
        assert_eq!(
            c.prior_reviewing_state,
            Some(ContractState::LandlordReviewing)
        );

        // Clearing while one is still pending fails
        let blocked = GuardContext::new().with_pending_objections(1);
        assert!(transition(&c, &ContractEvent::ObjectionsCleared, &issuer_actor(), &blocked).is_err());

        let c = transition(&c, &ContractEvent::ObjectionsCleared, &issuer_actor(), &ctx)
            .unwrap()
            .contract;
        assert_eq!(c.state, ContractState::LandlordReviewing);
        assert_eq!(c.prior_reviewing_state, None);
    }

    #[test]
    fn test_objection_rejected_when_fully_approved() {
        let c = contract_in(ContractState::BothReviewing);
        let err = transition(
            &c,
            &ContractEvent::ObjectionRaised,
            &tenant_actor(),
            &GuardContext::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("fully approved"));
    }

    #[test]
    fn test_signatures_in_either_order() {
        let ctx = GuardContext::new();
        let c = contract_in(ContractState::ReadyToSign);

        let c = transition(
            &c,
            &ContractEvent::SignatureCompleted(PartyRole::Counterparty),
            &tenant_actor(),
            &ctx,
        )
        .unwrap()
        .contract;
        assert_eq!(c.state, ContractState::ReadyToSign);
        assert!(c.tenant_signed);
        assert!(c.signed_at.is_none());

        let c = transition(
            &c,
            &ContractEvent::SignatureCompleted(PartyRole::Issuer),
            &issuer_actor(),
            &ctx,
        )
        .unwrap()
        .contract;
        assert_eq!(c.state, ContractState::FullySigned);
        assert!(c.both_signed());
        assert!(c.signed_at.is_some());
    }

    #[test]
    fn test_signature_completion_is_idempotent() {
        let ctx = GuardContext::new();
        let mut c = contract_in(ContractState::ReadyToSign);
        c.tenant_signed = true;

        // Same signer again: unchanged, no history appended
        let history_len = c.history.len();
        let version = c.version;
        let out = transition(
            &c,
            &ContractEvent::SignatureCompleted(PartyRole::Counterparty),
            &tenant_actor(),
            &ctx,
        )
        .unwrap();
        assert!(!out.changed);
        assert_eq!(out.contract.history.len(), history_len);
        assert_eq!(out.contract.version, version);

        // After full signing, re-evaluation is also a no-op
        let c = contract_in(ContractState::FullySigned);
        let out = transition(
            &c,
            &ContractEvent::SignatureCompleted(PartyRole::Issuer),
            &issuer_actor(),
            &ctx,
        )
        .unwrap();
        assert!(!out.changed);
        assert_eq!(out.contract, c);
    }

    #[test]
    fn test_publish_and_terminate() {
        let ctx = GuardContext::new();
        let c = contract_in(ContractState::FullySigned);

        let c = transition(&c, &ContractEvent::Publish, &issuer_actor(), &ctx)
            .unwrap()
            .contract;
        assert_eq!(c.state, ContractState::Published);
        assert!(c.published);
        assert!(c.published_at.is_some());
        assert!(c.publication_consistent());

        // Publishing twice is invalid from the Published state
        let err = transition(&c, &ContractEvent::Publish, &issuer_actor(), &ctx).unwrap_err();
        assert!(matches!(err, TransitionError::InvalidForState { .. }));

        let c = transition(&c, &ContractEvent::Terminate, &issuer_actor(), &ctx)
            .unwrap()
            .contract;
        assert_eq!(c.state, ContractState::Terminated);
    }

    #[test]
    fn test_cancel_blocked_after_signatures() {
        let c = contract_in(ContractState::FullySigned);
        let err = transition(&c, &ContractEvent::Cancel, &issuer_actor(), &GuardContext::new())
            .unwrap_err();
        assert!(err.to_string().contains("signatures are already complete"));
    }

    #[test]
    fn test_expiry_from_any_non_terminal_state() {
        let ctx = GuardContext::new();
        for state in ContractState::ALL {
            let c = contract_in(state);
            let result = transition(&c, &ContractEvent::DeadlineElapsed, &issuer_actor(), &ctx);
            if state.is_terminal() {
                assert!(matches!(
                    result,
                    Err(TransitionError::InvalidForState { .. })
                ));
            } else {
                assert_eq!(result.unwrap().contract.state, ContractState::Expired);
            }
        }
    }

    #[test]
    fn test_totality_unlisted_pairs_rejected_and_unchanged() {
        let ctx = GuardContext::new();
        for state in ContractState::ALL {
            for event in all_events() {
                let c = contract_in(state);
                let before = c.clone();
                match transition(&c, &event, &issuer_actor(), &ctx) {
                    Ok(_) => {}
                    Err(TransitionError::InvalidForState { state: s, .. }) => {
                        assert_eq!(s, state);
                        // Input untouched on rejection
                        assert_eq!(c, before);
                    }
                    Err(TransitionError::GuardFailed { state: s, .. }) => {
                        assert_eq!(s, state);
                        assert_eq!(c, before);
                    }
                }
            }
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn event_strategy() -> impl Strategy<Value = ContractEvent> {
            prop_oneof![
                Just(ContractEvent::InvitationSent),
                Just(ContractEvent::InvitationAccepted),
                Just(ContractEvent::TenantSubmitted),
                Just(ContractEvent::PartyApproved(PartyRole::Issuer)),
                Just(ContractEvent::PartyApproved(PartyRole::Counterparty)),
                Just(ContractEvent::ObjectionRaised),
                Just(ContractEvent::ObjectionsCleared),
                Just(ContractEvent::GuaranteeSatisfied),
                Just(ContractEvent::SignatureCompleted(PartyRole::Issuer)),
                Just(ContractEvent::SignatureCompleted(PartyRole::Counterparty)),
                Just(ContractEvent::Publish),
                Just(ContractEvent::DeadlineElapsed),
                Just(ContractEvent::Cancel),
                Just(ContractEvent::Terminate),
            ]
        }

        proptest! {
            /// Signatures are monotonic and the publication invariant
            /// holds under any event sequence.
            #[test]
            fn property_invariants_hold_under_any_sequence(
                events in proptest::collection::vec(event_strategy(), 0..40)
            ) {
                let ctx = GuardContext::new();
                let actor = issuer_actor();
                let mut contract = draft();
                contract.tenant_profile = Some(profile());

                for event in events {
                    let issuer_was_signed = contract.issuer_signed;
                    let tenant_was_signed = contract.tenant_signed;

                    if let Ok(out) = transition(&contract, &event, &actor, &ctx) {
                        contract = out.contract;
                    }

                    prop_assert!(!issuer_was_signed || contract.issuer_signed);
                    prop_assert!(!tenant_was_signed || contract.tenant_signed);
                    prop_assert!(contract.publication_consistent());
                    // One history entry per applied change, never more
                    prop_assert!(contract.history.len() as u64 <= contract.version);
                }
            }
        }
    }
}
