//! The contract service: compound operations over every subsystem
//!
//! Holds the aggregate store and the satellite managers, authorizes the
//! caller's role, snapshots guard inputs, and commits the results of the
//! engine's pure transitions. Cross-aggregate operations validate every
//! participant before committing so a failure leaves no partial state.

use crate::{
    ContractStore, DashboardSummary, DomainEvent, DocumentRenderer, EventFeed, FileStorage,
    Notifier, PlatformError, PlatformResult, RecordedEvent,
};
use chrono::{DateTime, Utc};
use covenant_biometric::{
    BiometricSession, CapturePayload, CaptureStep, ConfidencePolicy, SessionId,
    SignatureSequencer, StepResult,
};
use covenant_engine::{next_required_action, transition, ContractEvent, GuardContext};
use covenant_guarantee::{
    DocumentType, Guarantee, GuaranteeBook, GuaranteeDocument, GuaranteeId, GuaranteeKind,
};
use covenant_invitation::{
    DeliveryMethod, Invitation, InvitationId, InvitationManager, InviteToken, DEFAULT_TTL_DAYS,
};
use covenant_objection::{Objection, ObjectionDecision, ObjectionId, ObjectionRegistry};
use covenant_types::{
    ActorContext, AuthorizationError, Contract, ContractId, ContractState, LeaseTerms,
    PartyRecord, PartyRole, TenantProfile, TermField, ValidationError,
};
use std::sync::Arc;

/// Orchestrates the full contract lifecycle
pub struct ContractService {
    store: ContractStore,
    invitations: InvitationManager,
    objections: ObjectionRegistry,
    guarantees: GuaranteeBook,
    sequencer: SignatureSequencer,
    notifier: Arc<dyn Notifier>,
    file_storage: Arc<dyn FileStorage>,
    renderer: Arc<dyn DocumentRenderer>,
    feed: EventFeed,
    invitation_ttl_days: i64,
}

impl ContractService {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        file_storage: Arc<dyn FileStorage>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            store: ContractStore::new(),
            invitations: InvitationManager::new(),
            objections: ObjectionRegistry::new(),
            guarantees: GuaranteeBook::new(),
            sequencer: SignatureSequencer::new(),
            notifier,
            file_storage,
            renderer,
            feed: EventFeed::new(),
            invitation_ttl_days: DEFAULT_TTL_DAYS,
        }
    }

    /// Service wired to the in-process reference adapters
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(crate::LoggingNotifier),
            Arc::new(crate::InMemoryFileStorage::new()),
            Arc::new(crate::PlainTextRenderer),
        )
    }

    pub fn with_invitation_ttl_days(mut self, days: i64) -> Self {
        self.invitation_ttl_days = days;
        self
    }

    pub fn with_confidence_policy(mut self, policy: ConfidencePolicy) -> Self {
        self.sequencer = SignatureSequencer::with_policy(policy);
        self
    }

    // ── Drafting ─────────────────────────────────────────────────────

    /// Create a draft contract. Issuer-only.
    pub fn create_draft(
        &mut self,
        actor: &ActorContext,
        issuer: PartyRecord,
        terms: LeaseTerms,
        guarantor_required: bool,
    ) -> PlatformResult<Contract> {
        actor.require(PartyRole::Issuer, "create a draft contract")?;

        let number = self.store.allocate_number();
        let contract =
            Contract::new(number, issuer, terms).with_guarantor_required(guarantor_required);
        tracing::info!(
            contract_id = %contract.id,
            number = %contract.number,
            "Draft contract created"
        );
        self.feed.record(DomainEvent::DraftCreated {
            contract_id: contract.id.clone(),
            number: contract.number.clone(),
        });
        self.store.insert(contract.clone());
        Ok(contract)
    }

    /// Replace the draft's terms. Rejected once any party has approved;
    /// past that point terms only change through an accepted objection.
    pub fn update_draft_terms(
        &mut self,
        actor: &ActorContext,
        contract_id: &ContractId,
        terms: LeaseTerms,
    ) -> PlatformResult<Contract> {
        actor.require(PartyRole::Issuer, "update the draft terms")?;
        let mut contract = self.store.get(contract_id)?;
        if contract.any_approved() {
            return Err(ValidationError::single(
                "terms are immutable once a party has approved",
            )
            .into());
        }
        if contract.state.is_terminal() {
            return Err(ValidationError::single(
                "terms cannot change on a terminal contract",
            )
            .into());
        }

        let read_version = contract.version;
        contract.terms = terms;
        contract.touch();
        self.store.compare_and_put(contract.clone(), read_version)?;
        Ok(contract)
    }

    // ── Invitations ──────────────────────────────────────────────────

    /// Send the invitation to the counterparty.
    ///
    /// Transitions the contract out of `Draft`, issues a fresh token, and
    /// dispatches through the notifier. A dispatch failure leaves the
    /// contract invited and the invitation marked `Failed` so the issuer
    /// can resend.
    pub fn send_invitation(
        &mut self,
        actor: &ActorContext,
        contract_id: &ContractId,
        contact: impl Into<String>,
        method: DeliveryMethod,
    ) -> PlatformResult<Invitation> {
        actor.require(PartyRole::Issuer, "send the invitation")?;
        let contract = self.store.get(contract_id)?;
        let invited = self.apply(contract, ContractEvent::InvitationSent, actor)?;

        let invitation = self.invitations.issue(
            contract_id.clone(),
            contact,
            method,
            self.invitation_ttl_days,
        );
        self.feed.record(DomainEvent::InvitationIssued {
            contract_id: contract_id.clone(),
            invitation_id: invitation.id.to_string(),
        });

        self.dispatch(&invitation.id, &invited)
    }

    /// Resend an invitation. Does not extend the expiry window.
    pub fn resend_invitation(
        &mut self,
        actor: &ActorContext,
        invitation_id: &InvitationId,
    ) -> PlatformResult<Invitation> {
        actor.require(PartyRole::Issuer, "resend the invitation")?;
        let snapshot = self.invitations.resend(invitation_id)?;
        let contract = self.store.get(&snapshot.contract_id)?;
        self.dispatch(invitation_id, &contract)
    }

    fn dispatch(
        &mut self,
        invitation_id: &InvitationId,
        contract: &Contract,
    ) -> PlatformResult<Invitation> {
        let invitation = self.invitations.get(invitation_id)?.clone();
        let outcome = self.notifier.send_invitation(&invitation, contract);
        self.invitations
            .record_dispatch(invitation_id, outcome.is_ok())?;
        outcome?;
        Ok(self.invitations.get(invitation_id)?.clone())
    }

    /// Delivery receipt from the notification transport
    pub fn mark_invitation_delivered(&mut self, invitation_id: &InvitationId) -> PlatformResult<()> {
        Ok(self.invitations.mark_delivered(invitation_id)?)
    }

    /// Open receipt from the notification transport
    pub fn mark_invitation_opened(&mut self, invitation_id: &InvitationId) -> PlatformResult<()> {
        Ok(self.invitations.mark_opened(invitation_id)?)
    }

    /// Redeem an invitation token and bind the counterparty.
    ///
    /// Atomic with the contract transition: the token is only consumed
    /// once the contract has moved to `TenantReviewing`.
    pub fn redeem_invitation(
        &mut self,
        actor: &ActorContext,
        token: &InviteToken,
        tenant: PartyRecord,
        now: DateTime<Utc>,
    ) -> PlatformResult<Contract> {
        actor.require(PartyRole::Counterparty, "redeem an invitation")?;
        let invitation = self.invitations.validate_redeemable(token, now)?.clone();

        let mut snapshot = self.store.get(&invitation.contract_id)?;
        snapshot.bind_counterparty(tenant);
        let next = self.apply(snapshot, ContractEvent::InvitationAccepted, actor)?;

        // Cannot fail after validate_redeemable; the token is consumed
        // only now that the transition has committed.
        self.invitations.mark_accepted(&invitation.id)?;
        self.feed.record(DomainEvent::InvitationRedeemed {
            contract_id: next.id.clone(),
            invitation_id: invitation.id.to_string(),
        });
        Ok(next)
    }

    // ── Review and approval ──────────────────────────────────────────

    /// Submit the tenant's profile and hand review to the landlord
    pub fn submit_tenant_profile(
        &mut self,
        actor: &ActorContext,
        contract_id: &ContractId,
        profile: TenantProfile,
    ) -> PlatformResult<Contract> {
        actor.require(PartyRole::Counterparty, "submit the tenant profile")?;
        let mut snapshot = self.store.get(contract_id)?;
        snapshot.tenant_profile = Some(profile);
        self.apply(snapshot, ContractEvent::TenantSubmitted, actor)
    }

    /// Set the caller's approval flag, cascading to `ReadyToSign` when
    /// both parties have approved and the guarantee guard holds
    pub fn approve(
        &mut self,
        actor: &ActorContext,
        contract_id: &ContractId,
    ) -> PlatformResult<Contract> {
        let contract = self.store.get(contract_id)?;
        self.apply(contract, ContractEvent::PartyApproved(actor.role), actor)
    }

    // ── Objections ───────────────────────────────────────────────────

    /// Raise a field-level objection, blocking the workflow
    pub fn submit_objection(
        &mut self,
        actor: &ActorContext,
        contract_id: &ContractId,
        field: TermField,
        proposed_value: impl Into<String>,
        justification: impl Into<String>,
    ) -> PlatformResult<Objection> {
        let contract = self.store.get(contract_id)?;
        let current_value = field.current(&contract.terms);
        self.apply(contract, ContractEvent::ObjectionRaised, actor)?;

        let objection = self.objections.submit(
            contract_id.clone(),
            actor.role,
            field,
            current_value,
            proposed_value,
            justification,
        );
        self.feed.record(DomainEvent::ObjectionSubmitted {
            contract_id: contract_id.clone(),
            objection_id: objection.id.to_string(),
            field: field.name().to_string(),
        });
        Ok(objection)
    }

    /// Respond to a pending objection.
    ///
    /// Accepting applies the proposed value to the terms; either decision
    /// resumes the prior reviewing state when it resolves the last
    /// pending objection. The proposed value is validated before the
    /// objection is resolved so a malformed proposal changes nothing.
    pub fn respond_objection(
        &mut self,
        actor: &ActorContext,
        objection_id: &ObjectionId,
        decision: ObjectionDecision,
        note: Option<String>,
    ) -> PlatformResult<Objection> {
        let objection = self.objections.get(objection_id)?.clone();
        let contract = self.store.get(&objection.contract_id)?;

        let accepted = decision == ObjectionDecision::Accept;
        let mut terms = contract.terms.clone();
        if accepted {
            objection.field.apply(&mut terms, &objection.proposed_value)?;
        }

        let resolved = self
            .objections
            .respond(objection_id, actor.role, decision, note)?;

        let mut snapshot = contract;
        if accepted {
            snapshot.terms = terms;
        }
        self.commit_after_resolution(snapshot, accepted, actor)?;

        self.feed.record(DomainEvent::ObjectionResolved {
            contract_id: resolved.contract_id.clone(),
            objection_id: resolved.id.to_string(),
            accepted,
        });
        Ok(resolved)
    }

    /// Withdraw a pending objection. Submitter-only.
    pub fn withdraw_objection(
        &mut self,
        actor: &ActorContext,
        objection_id: &ObjectionId,
    ) -> PlatformResult<Objection> {
        let withdrawn = self.objections.withdraw(objection_id, actor.role)?;
        let contract = self.store.get(&withdrawn.contract_id)?;
        self.commit_after_resolution(contract, false, actor)?;

        self.feed.record(DomainEvent::ObjectionWithdrawn {
            contract_id: withdrawn.contract_id.clone(),
            objection_id: withdrawn.id.to_string(),
        });
        Ok(withdrawn)
    }

    /// Commit contract changes after an objection left the pending set.
    /// Resumes the prior reviewing state when the last one cleared.
    fn commit_after_resolution(
        &mut self,
        snapshot: Contract,
        terms_changed: bool,
        actor: &ActorContext,
    ) -> PlatformResult<()> {
        let last_cleared = self.objections.pending_count(&snapshot.id) == 0
            && snapshot.state == ContractState::ObjectionsPending;

        if last_cleared {
            self.apply(snapshot, ContractEvent::ObjectionsCleared, actor)?;
        } else if terms_changed {
            let mut updated = snapshot;
            let read_version = updated.version;
            updated.touch();
            self.store.compare_and_put(updated, read_version)?;
        }
        Ok(())
    }

    // ── Guarantees ───────────────────────────────────────────────────

    /// Provide the guarantee for a contract. Counterparty-only.
    pub fn create_guarantee(
        &mut self,
        actor: &ActorContext,
        contract_id: &ContractId,
        kind: GuaranteeKind,
        amount: i64,
        description: impl Into<String>,
    ) -> PlatformResult<Guarantee> {
        actor.require(PartyRole::Counterparty, "provide a guarantee")?;
        self.store.get(contract_id)?;

        let guarantee = self
            .guarantees
            .create(contract_id.clone(), kind, amount, description)?;
        self.feed.record(DomainEvent::GuaranteeCreated {
            contract_id: contract_id.clone(),
            guarantee_id: guarantee.id.to_string(),
        });
        Ok(guarantee)
    }

    /// Store the document bytes and attach the resulting ref to the
    /// guarantee. The type must be in the kind's catalog.
    pub fn attach_guarantee_document(
        &mut self,
        actor: &ActorContext,
        guarantee_id: &GuaranteeId,
        document_type: DocumentType,
        bytes: &[u8],
    ) -> PlatformResult<GuaranteeDocument> {
        actor.require(PartyRole::Counterparty, "attach a guarantee document")?;
        // Catalog check happens before the blob is stored
        self.guarantees.get(guarantee_id)?;
        let content_ref = self.file_storage.store("guarantee-document", bytes)?;
        Ok(self
            .guarantees
            .get_mut(guarantee_id)?
            .attach_document(document_type, content_ref)?)
    }

    /// Approve the guarantee, unblocking `BothReviewing → ReadyToSign`
    /// when both approvals are already in place. Issuer-only.
    pub fn approve_guarantee(
        &mut self,
        actor: &ActorContext,
        guarantee_id: &GuaranteeId,
    ) -> PlatformResult<Contract> {
        actor.require(PartyRole::Issuer, "approve the guarantee")?;
        let guarantee = self.guarantees.get_mut(guarantee_id)?;
        guarantee.approve()?;
        let contract_id = guarantee.contract_id.clone();
        self.feed.record(DomainEvent::GuaranteeReviewed {
            contract_id: contract_id.clone(),
            guarantee_id: guarantee_id.to_string(),
            approved: true,
        });

        let contract = self.store.get(&contract_id)?;
        if contract.state == ContractState::BothReviewing {
            return self.apply(contract, ContractEvent::GuaranteeSatisfied, actor);
        }
        Ok(contract)
    }

    /// Reject the guarantee. Issuer-only.
    pub fn reject_guarantee(
        &mut self,
        actor: &ActorContext,
        guarantee_id: &GuaranteeId,
    ) -> PlatformResult<Guarantee> {
        actor.require(PartyRole::Issuer, "reject the guarantee")?;
        let guarantee = self.guarantees.get_mut(guarantee_id)?;
        guarantee.reject()?;
        let rejected = guarantee.clone();
        self.feed.record(DomainEvent::GuaranteeReviewed {
            contract_id: rejected.contract_id.clone(),
            guarantee_id: guarantee_id.to_string(),
            approved: false,
        });
        Ok(rejected)
    }

    /// Mark the approved guarantee verified. Issuer-only, idempotent.
    pub fn verify_guarantee(
        &mut self,
        actor: &ActorContext,
        guarantee_id: &GuaranteeId,
        notes: Option<String>,
    ) -> PlatformResult<Guarantee> {
        actor.require(PartyRole::Issuer, "verify the guarantee")?;
        let guarantee = self.guarantees.get_mut(guarantee_id)?;
        guarantee.verify(notes)?;
        Ok(guarantee.clone())
    }

    // ── Biometric signing ────────────────────────────────────────────

    /// Start (or resume) the caller's biometric session
    pub fn start_signing(
        &mut self,
        actor: &ActorContext,
        contract_id: &ContractId,
    ) -> PlatformResult<BiometricSession> {
        let contract = self.store.get(contract_id)?;
        if contract.state != ContractState::ReadyToSign {
            return Err(covenant_types::TransitionError::GuardFailed {
                state: contract.state,
                reason: "contract is not ready for signing".to_string(),
            }
            .into());
        }
        Ok(self
            .sequencer
            .start_session(contract_id.clone(), actor.party_id.clone(), actor.role))
    }

    /// Submit one capture attempt for the caller's own session
    pub fn submit_biometric_step(
        &mut self,
        actor: &ActorContext,
        session_id: &SessionId,
        step: CaptureStep,
        payload: CapturePayload,
    ) -> PlatformResult<StepResult> {
        self.authorize_signer(actor, session_id, "submit a capture for this session")?;
        Ok(self.sequencer.submit_step(session_id, step, payload)?)
    }

    /// Complete the signature action and record it on the contract.
    ///
    /// Only the session's signer may complete it. Idempotent at the
    /// contract level: re-completion changes nothing.
    pub fn complete_signature(
        &mut self,
        actor: &ActorContext,
        session_id: &SessionId,
    ) -> PlatformResult<Contract> {
        self.authorize_signer(actor, session_id, "complete this signature session")?;
        let event = self.sequencer.complete_signature(session_id)?;
        let contract = self.store.get(&event.contract_id)?;
        let already_signed = contract.signature_for(event.role);

        let next = self.apply(
            contract,
            ContractEvent::SignatureCompleted(event.role),
            actor,
        )?;
        if !already_signed {
            self.feed.record(DomainEvent::SignatureRecorded {
                contract_id: next.id.clone(),
                role: event.role,
            });
        }
        Ok(next)
    }

    // ── Publication and termination ──────────────────────────────────

    /// Render, store, and publish the final contract document.
    ///
    /// The document is rendered before the transition commits, so a
    /// renderer or storage failure leaves the contract `FullySigned`.
    pub fn publish(
        &mut self,
        actor: &ActorContext,
        contract_id: &ContractId,
    ) -> PlatformResult<Contract> {
        actor.require(PartyRole::Issuer, "publish the contract")?;
        let contract = self.store.get(contract_id)?;

        // Validate the transition before touching any collaborator
        let ctx = self.guard_ctx(&contract);
        let transitioned = transition(&contract, &ContractEvent::Publish, actor, &ctx)?;

        let bytes = self.renderer.render_contract_document(&contract)?;
        let content_ref = self.file_storage.store("contract-document", &bytes)?;

        let next = transitioned.contract;
        self.store.compare_and_put(next.clone(), contract.version)?;
        self.record_state_change(&next, contract.state, &ContractEvent::Publish);
        self.feed.record(DomainEvent::DocumentPublished {
            contract_id: next.id.clone(),
            content_ref,
        });
        Ok(next)
    }

    /// Cancel before signatures complete. Issuer-only.
    pub fn cancel(
        &mut self,
        actor: &ActorContext,
        contract_id: &ContractId,
    ) -> PlatformResult<Contract> {
        actor.require(PartyRole::Issuer, "cancel the contract")?;
        let contract = self.store.get(contract_id)?;
        self.apply(contract, ContractEvent::Cancel, actor)
    }

    /// Terminate a published contract. Issuer-only.
    pub fn terminate(
        &mut self,
        actor: &ActorContext,
        contract_id: &ContractId,
    ) -> PlatformResult<Contract> {
        actor.require(PartyRole::Issuer, "terminate the contract")?;
        let contract = self.store.get(contract_id)?;
        self.apply(contract, ContractEvent::Terminate, actor)
    }

    // ── Deadline sweep ───────────────────────────────────────────────

    /// Expire overdue invitations and overdue signing deadlines.
    ///
    /// Safe to race with user-facing operations: a contract that moved
    /// since the sweep's read is skipped via the version check and picked
    /// up on the next pass. Returns how many contracts expired.
    pub fn expire_due(&mut self, now: DateTime<Utc>) -> usize {
        let expired_invitations = self.invitations.expire_due(now);
        if !expired_invitations.is_empty() {
            self.feed.record(DomainEvent::InvitationsExpired {
                count: expired_invitations.len(),
            });
        }

        let mut expired = 0;
        for invitation in &expired_invitations {
            if let Ok(contract) = self.store.get(&invitation.contract_id) {
                if contract.state == ContractState::TenantInvited
                    && self.sweep_expire(contract).is_ok()
                {
                    expired += 1;
                }
            }
        }

        for contract in self.store.list() {
            if contract.state.is_terminal() {
                continue;
            }
            let overdue = contract
                .signing_deadline
                .map(|deadline| now > deadline)
                .unwrap_or(false);
            if overdue && self.sweep_expire(contract).is_ok() {
                expired += 1;
            }
        }
        expired
    }

    fn sweep_expire(&mut self, contract: Contract) -> PlatformResult<Contract> {
        // Sweeps act on the issuer's behalf for the audit trail
        let actor = ActorContext::issuer(contract.issuer.id.clone());
        self.apply(contract, ContractEvent::DeadlineElapsed, &actor)
    }

    // ── Explicit optimistic concurrency ──────────────────────────────

    /// Apply an event only if the contract is still at the version the
    /// caller read. The boundary surface for stale-form rejection.
    pub fn apply_event_expecting(
        &mut self,
        actor: &ActorContext,
        contract_id: &ContractId,
        event: ContractEvent,
        expected_version: u64,
    ) -> PlatformResult<Contract> {
        let contract = self.store.get(contract_id)?;
        if contract.version != expected_version {
            return Err(PlatformError::ConcurrentModification {
                contract_id: contract_id.to_string(),
                expected: expected_version,
                actual: contract.version,
            });
        }
        self.apply(contract, event, actor)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn contract(&self, contract_id: &ContractId) -> PlatformResult<Contract> {
        self.store.get(contract_id)
    }

    pub fn invitation(&self, invitation_id: &InvitationId) -> PlatformResult<Invitation> {
        Ok(self.invitations.get(invitation_id)?.clone())
    }

    pub fn invitations_for(&self, contract_id: &ContractId) -> Vec<Invitation> {
        self.invitations
            .list_for(contract_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn objections_for(&self, contract_id: &ContractId) -> Vec<Objection> {
        self.objections
            .list_for(contract_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn guarantee_for(&self, contract_id: &ContractId) -> Option<Guarantee> {
        self.guarantees.for_contract(contract_id).cloned()
    }

    pub fn session(&self, session_id: &SessionId) -> PlatformResult<BiometricSession> {
        Ok(self.sequencer.get(session_id)?.clone())
    }

    pub fn events(&self) -> &[RecordedEvent] {
        self.feed.all()
    }

    pub fn events_for(&self, contract_id: &ContractId) -> Vec<RecordedEvent> {
        self.feed
            .for_contract(contract_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// What the role should do next on this contract
    pub fn next_action(
        &self,
        contract_id: &ContractId,
        role: PartyRole,
    ) -> PlatformResult<&'static str> {
        let contract = self.store.get(contract_id)?;
        Ok(next_required_action(contract.state, role))
    }

    /// Cross-contract dashboard summary
    pub fn dashboard(&self) -> DashboardSummary {
        DashboardSummary::of(&self.store.list())
    }

    /// Fetch the raw bytes behind a content ref (pass-through to storage)
    pub fn fetch_document(&self, content_ref: &covenant_types::ContentRef) -> PlatformResult<Vec<u8>> {
        Ok(self.file_storage.fetch(content_ref)?)
    }

    // ── Internals ────────────────────────────────────────────────────

    /// A biometric session belongs to exactly one signer; nobody else may
    /// act on it, whatever role they hold.
    fn authorize_signer(
        &self,
        actor: &ActorContext,
        session_id: &SessionId,
        action: &str,
    ) -> PlatformResult<()> {
        let session = self.sequencer.get(session_id)?;
        if actor.party_id != session.signer || actor.role != session.role {
            return Err(AuthorizationError {
                actor: actor.party_id.clone(),
                required: session.role,
                actual: actor.role,
                action: action.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Snapshot the satellite subsystems into guard inputs
    fn guard_ctx(&self, contract: &Contract) -> GuardContext {
        GuardContext::new()
            .with_pending_objections(self.objections.pending_count(&contract.id))
            .with_guarantee_satisfied(
                !contract.guarantor_required || self.guarantees.approved_for(&contract.id),
            )
    }

    /// Transition a snapshot and commit the result.
    ///
    /// The snapshot may carry uncommitted field edits (bound counterparty,
    /// submitted profile, applied terms); they commit together with the
    /// transition or not at all.
    fn apply(
        &mut self,
        snapshot: Contract,
        event: ContractEvent,
        actor: &ActorContext,
    ) -> PlatformResult<Contract> {
        let ctx = self.guard_ctx(&snapshot);
        let from = snapshot.state;
        let transitioned = transition(&snapshot, &event, actor, &ctx)?;
        if !transitioned.changed {
            return Ok(transitioned.contract);
        }

        let next = transitioned.contract;
        self.store.compare_and_put(next.clone(), snapshot.version)?;
        self.record_state_change(&next, from, &event);
        Ok(next)
    }

    fn record_state_change(&mut self, next: &Contract, from: ContractState, event: &ContractEvent) {
        self.feed.record(DomainEvent::StateChanged {
            contract_id: next.id.clone(),
            from,
            to: next.state,
            trigger: event.to_string(),
        });
    }
}
