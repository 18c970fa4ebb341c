//! End-to-end lifecycle scenarios through the service facade

use chrono::{Duration, Utc};
use covenant_biometric::{CapturePayload, CaptureStep, SessionId};
use covenant_engine::ContractEvent;
use covenant_guarantee::{DocumentType, GuaranteeKind};
use covenant_invitation::{DeliveryMethod, InvitationStatus, InviteToken};
use covenant_objection::ObjectionDecision;
use covenant_platform::{ContractService, DomainEvent, PlatformError};
use covenant_types::{
    ActorContext, ContentRef, ContractId, ContractState, LeaseTerms, PartyContact, PartyId,
    PartyRecord, TenantProfile, TermField, TransitionError,
};

fn issuer_actor() -> ActorContext {
    ActorContext::issuer(PartyId::new("landlord-1"))
}

fn tenant_actor() -> ActorContext {
    ActorContext::counterparty(PartyId::new("tenant-1"))
}

fn issuer_record() -> PartyRecord {
    PartyRecord::new(
        PartyId::new("landlord-1"),
        "A. Landlord",
        PartyContact::email("landlord@test.com"),
    )
}

fn tenant_record() -> PartyRecord {
    PartyRecord::new(
        PartyId::new("tenant-1"),
        "T. Tenant",
        PartyContact::email("tenant@test.com"),
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

fn terms() -> LeaseTerms {
    LeaseTerms::new(2_500_000, 2_500_000, 12)
}

/// Draft → invited, returning the live token
fn invited(service: &mut ContractService, guarantor_required: bool) -> (ContractId, InviteToken) {
    let contract = service
        .create_draft(&issuer_actor(), issuer_record(), terms(), guarantor_required)
        .unwrap();
    let invitation = service
        .send_invitation(
            &issuer_actor(),
            &contract.id,
            "tenant@test.com",
            DeliveryMethod::Email,
        )
        .unwrap();
    (contract.id, invitation.token)
}

/// Draft → TenantReviewing with the counterparty bound
fn tenant_reviewing(service: &mut ContractService, guarantor_required: bool) -> ContractId {
    let (contract_id, token) = invited(service, guarantor_required);
    service
        .redeem_invitation(&tenant_actor(), &token, tenant_record(), Utc::now())
        .unwrap();
    contract_id
}

/// Draft → LandlordReviewing with the profile submitted
fn landlord_reviewing(service: &mut ContractService, guarantor_required: bool) -> ContractId {
    let contract_id = tenant_reviewing(service, guarantor_required);
    service
        .submit_tenant_profile(&tenant_actor(), &contract_id, profile())
        .unwrap();
    contract_id
}

/// Draft → ReadyToSign, no guarantor
fn ready_to_sign(service: &mut ContractService) -> ContractId {
    let contract_id = landlord_reviewing(service, false);
    service.approve(&issuer_actor(), &contract_id).unwrap();
    service.approve(&tenant_actor(), &contract_id).unwrap();
    contract_id
}

/// Walk one signer through all five capture steps
fn complete_captures(service: &mut ContractService, actor: &ActorContext, session_id: &SessionId) {
    for step in CaptureStep::SEQUENCE {
        service
            .submit_biometric_step(
                actor,
                session_id,
                step,
                CapturePayload::success(ContentRef::new("blob://capture"), 0.9),
            )
            .unwrap();
    }
}

// ── Scenario: happy path to publication ──────────────────────────────

#[test]
fn test_full_lifecycle_to_publication() {
    let mut service = ContractService::in_memory();
    let contract_id = ready_to_sign(&mut service);

    let contract = service.contract(&contract_id).unwrap();
    assert_eq!(contract.state, ContractState::ReadyToSign);
    assert!(contract.both_approved());

    // Tenant signs first
    let tenant_session = service.start_signing(&tenant_actor(), &contract_id).unwrap();
    complete_captures(&mut service, &tenant_actor(), &tenant_session.id);
    let after_first = service
        .complete_signature(&tenant_actor(), &tenant_session.id)
        .unwrap();
    assert_eq!(after_first.state, ContractState::ReadyToSign);
    assert!(after_first.tenant_signed);
    assert!(!after_first.issuer_signed);

    // Landlord signs second
    let issuer_session = service.start_signing(&issuer_actor(), &contract_id).unwrap();
    complete_captures(&mut service, &issuer_actor(), &issuer_session.id);
    let signed = service
        .complete_signature(&issuer_actor(), &issuer_session.id)
        .unwrap();
    assert_eq!(signed.state, ContractState::FullySigned);
    assert!(signed.both_signed());
    assert!(signed.signed_at.is_some());

    let published = service.publish(&issuer_actor(), &contract_id).unwrap();
    assert_eq!(published.state, ContractState::Published);
    assert!(published.published);
    assert!(published.published_at.is_some());
    assert!(published.publication_consistent());

    // One history entry per applied transition
    assert_eq!(published.history.len(), 8);
    assert_eq!(published.version, 8);

    // The rendered document is fetchable through the feed's ref
    let content_ref = service
        .events_for(&contract_id)
        .into_iter()
        .find_map(|recorded| match recorded.event {
            DomainEvent::DocumentPublished { content_ref, .. } => Some(content_ref),
            _ => None,
        })
        .unwrap();
    let bytes = service.fetch_document(&content_ref).unwrap();
    assert!(String::from_utf8(bytes).unwrap().contains(&published.number));

    let dashboard = service.dashboard();
    assert_eq!(dashboard.published, 1);
    assert_eq!(dashboard.active_monthly_rent, 2_500_000);
}

#[test]
fn test_signature_completion_is_idempotent() {
    let mut service = ContractService::in_memory();
    let contract_id = ready_to_sign(&mut service);

    let session = service.start_signing(&tenant_actor(), &contract_id).unwrap();
    complete_captures(&mut service, &tenant_actor(), &session.id);
    let first = service
        .complete_signature(&tenant_actor(), &session.id)
        .unwrap();

    // Re-delivery of the completion: no new history, no version bump
    let second = service
        .complete_signature(&tenant_actor(), &session.id)
        .unwrap();
    assert_eq!(second.version, first.version);
    assert_eq!(second.history.len(), first.history.len());
    assert!(second.tenant_signed);
}

#[test]
fn test_out_of_order_capture_rejected_at_facade() {
    let mut service = ContractService::in_memory();
    let contract_id = ready_to_sign(&mut service);
    let session = service.start_signing(&tenant_actor(), &contract_id).unwrap();

    let err = service
        .submit_biometric_step(
            &tenant_actor(),
            &session.id,
            CaptureStep::Document,
            CapturePayload::success(ContentRef::new("blob://capture"), 1.0),
        )
        .unwrap_err();
    assert!(matches!(err, PlatformError::Biometric(_)));
}

#[test]
fn test_only_the_signer_may_act_on_their_session() {
    let mut service = ContractService::in_memory();
    let contract_id = ready_to_sign(&mut service);

    let session = service.start_signing(&tenant_actor(), &contract_id).unwrap();
    complete_captures(&mut service, &tenant_actor(), &session.id);

    // The landlord can neither submit captures for the tenant's session
    // nor complete it
    let err = service
        .submit_biometric_step(
            &issuer_actor(),
            &session.id,
            CaptureStep::FaceFront,
            CapturePayload::success(ContentRef::new("blob://capture"), 0.9),
        )
        .unwrap_err();
    assert!(matches!(err, PlatformError::Authorization(_)));

    let err = service
        .complete_signature(&issuer_actor(), &session.id)
        .unwrap_err();
    assert!(matches!(err, PlatformError::Authorization(_)));

    // The tenant's signature flag never moved
    let contract = service.contract(&contract_id).unwrap();
    assert!(!contract.tenant_signed);

    // The rightful signer still completes normally
    let signed = service
        .complete_signature(&tenant_actor(), &session.id)
        .unwrap();
    assert!(signed.tenant_signed);
}

#[test]
fn test_signing_requires_ready_state() {
    let mut service = ContractService::in_memory();
    let contract_id = landlord_reviewing(&mut service, false);

    let err = service
        .start_signing(&tenant_actor(), &contract_id)
        .unwrap_err();
    assert!(matches!(
        err,
        PlatformError::Transition(TransitionError::GuardFailed { .. })
    ));
}

#[test]
fn test_cancel_rejected_once_fully_signed() {
    let mut service = ContractService::in_memory();
    let contract_id = ready_to_sign(&mut service);

    for actor in [tenant_actor(), issuer_actor()] {
        let session = service.start_signing(&actor, &contract_id).unwrap();
        complete_captures(&mut service, &actor, &session.id);
        service.complete_signature(&actor, &session.id).unwrap();
    }

    let err = service.cancel(&issuer_actor(), &contract_id).unwrap_err();
    assert!(matches!(
        err,
        PlatformError::Transition(TransitionError::GuardFailed { .. })
    ));
}

// ── Scenario: token lifecycle ────────────────────────────────────────

#[test]
fn test_token_is_single_use() {
    let mut service = ContractService::in_memory();
    let (_, token) = invited(&mut service, false);

    service
        .redeem_invitation(&tenant_actor(), &token, tenant_record(), Utc::now())
        .unwrap();
    let err = service
        .redeem_invitation(&tenant_actor(), &token, tenant_record(), Utc::now())
        .unwrap_err();
    assert!(matches!(err, PlatformError::Token(_)));
}

#[test]
fn test_expired_invitation_expires_contract() {
    let mut service = ContractService::in_memory();
    let (contract_id, token) = invited(&mut service, false);

    let day_eight = Utc::now() + Duration::days(8);
    assert_eq!(service.expire_due(day_eight), 1);

    let contract = service.contract(&contract_id).unwrap();
    assert_eq!(contract.state, ContractState::Expired);

    let err = service
        .redeem_invitation(&tenant_actor(), &token, tenant_record(), day_eight)
        .unwrap_err();
    assert!(matches!(err, PlatformError::Token(_)));
}

#[test]
fn test_second_invite_rejected_after_leaving_draft() {
    let mut service = ContractService::in_memory();
    let contract = service
        .create_draft(&issuer_actor(), issuer_record(), terms(), false)
        .unwrap();
    service
        .send_invitation(
            &issuer_actor(),
            &contract.id,
            "tenant@test.com",
            DeliveryMethod::Email,
        )
        .unwrap();

    // Issuer re-invites over a different channel; only one token stays live
    let second = service
        .send_invitation(
            &issuer_actor(),
            &contract.id,
            "+5491100000000",
            DeliveryMethod::WhatsApp,
        );
    // The contract already left Draft, so the second invite is rejected
    // by the state machine rather than producing a competing token.
    assert!(matches!(second, Err(PlatformError::Transition(_))));

    let invitations = service.invitations_for(&contract.id);
    assert_eq!(invitations.len(), 1);
    assert_eq!(invitations[0].status, InvitationStatus::Sent);
}

#[test]
fn test_resend_keeps_expiry_and_counts_attempt() {
    let mut service = ContractService::in_memory();
    let contract = service
        .create_draft(&issuer_actor(), issuer_record(), terms(), false)
        .unwrap();
    let invitation = service
        .send_invitation(
            &issuer_actor(),
            &contract.id,
            "tenant@test.com",
            DeliveryMethod::Email,
        )
        .unwrap();

    let resent = service
        .resend_invitation(&issuer_actor(), &invitation.id)
        .unwrap();
    assert_eq!(resent.expires_at, invitation.expires_at);
    assert_eq!(resent.attempts, 2);
}

#[test]
fn test_resend_after_delivery_receipt() {
    let mut service = ContractService::in_memory();
    let contract = service
        .create_draft(&issuer_actor(), issuer_record(), terms(), false)
        .unwrap();
    let invitation = service
        .send_invitation(
            &issuer_actor(),
            &contract.id,
            "tenant@test.com",
            DeliveryMethod::Email,
        )
        .unwrap();
    service.mark_invitation_delivered(&invitation.id).unwrap();

    // A delivered-but-unredeemed invitation can still be nudged; the
    // delivery status is kept rather than rewound to Sent
    let resent = service
        .resend_invitation(&issuer_actor(), &invitation.id)
        .unwrap();
    assert_eq!(resent.status, InvitationStatus::Delivered);
    assert_eq!(resent.attempts, 2);
}

// ── Scenario: objection blocking and resolution ──────────────────────

#[test]
fn test_objection_blocks_until_accepted() {
    let mut service = ContractService::in_memory();
    let contract_id = tenant_reviewing(&mut service, false);

    let objection = service
        .submit_objection(
            &tenant_actor(),
            &contract_id,
            TermField::MonthlyRent,
            "2200000",
            "market rate is lower",
        )
        .unwrap();
    assert_eq!(
        service.contract(&contract_id).unwrap().state,
        ContractState::ObjectionsPending
    );

    // Approval is blocked while the objection is pending
    assert!(service.approve(&tenant_actor(), &contract_id).is_err());

    // Issuer accepts: the proposed value lands and review resumes where
    // it was interrupted
    service
        .respond_objection(
            &issuer_actor(),
            &objection.id,
            ObjectionDecision::Accept,
            Some("agreed".to_string()),
        )
        .unwrap();

    let contract = service.contract(&contract_id).unwrap();
    assert_eq!(contract.state, ContractState::TenantReviewing);
    assert_eq!(contract.terms.monthly_rent, 2_200_000);
}

#[test]
fn test_resume_waits_for_last_pending_objection() {
    let mut service = ContractService::in_memory();
    let contract_id = tenant_reviewing(&mut service, false);

    let first = service
        .submit_objection(
            &tenant_actor(),
            &contract_id,
            TermField::MonthlyRent,
            "2200000",
            "rent too high",
        )
        .unwrap();
    let second = service
        .submit_objection(
            &tenant_actor(),
            &contract_id,
            TermField::PetsAllowed,
            "true",
            "tenant has a cat",
        )
        .unwrap();

    service
        .respond_objection(&issuer_actor(), &first.id, ObjectionDecision::Reject, None)
        .unwrap();
    assert_eq!(
        service.contract(&contract_id).unwrap().state,
        ContractState::ObjectionsPending
    );

    service
        .respond_objection(&issuer_actor(), &second.id, ObjectionDecision::Accept, None)
        .unwrap();
    let contract = service.contract(&contract_id).unwrap();
    assert_eq!(contract.state, ContractState::TenantReviewing);
    // Rejected proposal left the rent alone; accepted one flipped pets
    assert_eq!(contract.terms.monthly_rent, 2_500_000);
    assert!(contract.terms.pets_allowed);
}

#[test]
fn test_withdrawal_resumes_review() {
    let mut service = ContractService::in_memory();
    let contract_id = tenant_reviewing(&mut service, false);

    let objection = service
        .submit_objection(
            &tenant_actor(),
            &contract_id,
            TermField::Deposit,
            "2000000",
            "deposit too high",
        )
        .unwrap();
    service
        .withdraw_objection(&tenant_actor(), &objection.id)
        .unwrap();

    assert_eq!(
        service.contract(&contract_id).unwrap().state,
        ContractState::TenantReviewing
    );
}

#[test]
fn test_malformed_proposal_changes_nothing() {
    let mut service = ContractService::in_memory();
    let contract_id = tenant_reviewing(&mut service, false);

    let objection = service
        .submit_objection(
            &tenant_actor(),
            &contract_id,
            TermField::MonthlyRent,
            "a fair price",
            "rent too high",
        )
        .unwrap();

    let err = service
        .respond_objection(
            &issuer_actor(),
            &objection.id,
            ObjectionDecision::Accept,
            None,
        )
        .unwrap_err();
    assert!(matches!(err, PlatformError::Validation(_)));

    // Objection still pending, contract still blocked, terms untouched
    let contract = service.contract(&contract_id).unwrap();
    assert_eq!(contract.state, ContractState::ObjectionsPending);
    assert_eq!(contract.terms.monthly_rent, 2_500_000);
    assert!(service.objections_for(&contract_id)[0].is_pending());
}

// ── Scenario: guarantee gating ───────────────────────────────────────

#[test]
fn test_guarantee_gates_readiness() {
    let mut service = ContractService::in_memory();
    let contract_id = landlord_reviewing(&mut service, true);

    service.approve(&issuer_actor(), &contract_id).unwrap();
    let contract = service.approve(&tenant_actor(), &contract_id).unwrap();
    // Both approved, but the guarantee requirement holds it back
    assert_eq!(contract.state, ContractState::BothReviewing);

    let guarantee = service
        .create_guarantee(
            &tenant_actor(),
            &contract_id,
            GuaranteeKind::Deposit,
            2_500_000,
            "cash deposit",
        )
        .unwrap();
    service
        .attach_guarantee_document(
            &tenant_actor(),
            &guarantee.id,
            DocumentType::DepositReceipt,
            b"receipt bytes",
        )
        .unwrap();

    let contract = service
        .approve_guarantee(&issuer_actor(), &guarantee.id)
        .unwrap();
    assert_eq!(contract.state, ContractState::ReadyToSign);
}

#[test]
fn test_rejected_guarantee_keeps_contract_blocked() {
    let mut service = ContractService::in_memory();
    let contract_id = landlord_reviewing(&mut service, true);
    service.approve(&issuer_actor(), &contract_id).unwrap();
    service.approve(&tenant_actor(), &contract_id).unwrap();

    let guarantee = service
        .create_guarantee(
            &tenant_actor(),
            &contract_id,
            GuaranteeKind::Deposit,
            2_500_000,
            "cash deposit",
        )
        .unwrap();
    service
        .reject_guarantee(&issuer_actor(), &guarantee.id)
        .unwrap();

    assert_eq!(
        service.contract(&contract_id).unwrap().state,
        ContractState::BothReviewing
    );
}

// ── Concurrency surface ──────────────────────────────────────────────

#[test]
fn test_stale_snapshot_rejected_at_boundary() {
    let mut service = ContractService::in_memory();
    let contract_id = tenant_reviewing(&mut service, false);
    let stale_version = service.contract(&contract_id).unwrap().version;

    service
        .submit_tenant_profile(&tenant_actor(), &contract_id, profile())
        .unwrap();

    let err = service
        .apply_event_expecting(
            &issuer_actor(),
            &contract_id,
            ContractEvent::Cancel,
            stale_version,
        )
        .unwrap_err();
    assert!(matches!(err, PlatformError::ConcurrentModification { .. }));
}
