//! The sequencer: session lifecycle and step gating

use crate::{
    BiometricError, BiometricResult, BiometricSession, CapturePayload, CaptureStep,
    ConfidencePolicy, SessionId, StepRecord, StepStatus,
};
use chrono::{DateTime, Utc};
use covenant_types::{ContractId, PartyId, PartyRole};
use std::collections::HashMap;

/// The outcome of one accepted step submission
#[derive(Clone, Debug, PartialEq)]
pub struct StepResult {
    pub step: CaptureStep,
    pub status: StepStatus,
    pub confidence: f64,
    /// The next expected step, or None when captures are complete
    pub next_step: Option<CaptureStep>,
}

/// The signature completion event, one per signer.
///
/// Consumed by the platform to set the signer's signature flag on the
/// contract.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SignatureEvent {
    pub contract_id: ContractId,
    pub signer: PartyId,
    pub role: PartyRole,
    pub confidence_scores: Vec<(CaptureStep, f64)>,
    pub completed_at: DateTime<Utc>,
}

/// Orchestrates biometric sessions across signers
#[derive(Clone, Debug, Default)]
pub struct SignatureSequencer {
    sessions: HashMap<SessionId, BiometricSession>,
    policy: ConfidencePolicy,
}

impl SignatureSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ConfidencePolicy) -> Self {
        Self {
            sessions: HashMap::new(),
            policy,
        }
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Start a session for a signer, or resume the incomplete one.
    ///
    /// Idempotent per (contract, signer): an abandoned session is picked
    /// up at its last incomplete step, never restarted.
    pub fn start_session(
        &mut self,
        contract_id: ContractId,
        signer: PartyId,
        role: PartyRole,
    ) -> BiometricSession {
        if let Some(existing) = self
            .sessions
            .values()
            .find(|s| s.contract_id == contract_id && s.signer == signer && !s.completed)
        {
            tracing::info!(
                session_id = %existing.id,
                signer = %signer,
                "Resuming incomplete biometric session"
            );
            return existing.clone();
        }

        let session = BiometricSession::new(contract_id, signer, role);
        tracing::info!(
            session_id = %session.id,
            contract_id = %session.contract_id,
            signer = %session.signer,
            "Biometric session started"
        );
        self.sessions.insert(session.id.clone(), session.clone());
        session
    }

    /// Submit one capture attempt.
    ///
    /// Rejects out-of-order steps, scores outside 0.0–1.0, and
    /// below-threshold successes (recapture required; the cursor stays).
    /// Only a success at or above the policy minimum advances.
    pub fn submit_step(
        &mut self,
        session_id: &SessionId,
        step: CaptureStep,
        payload: CapturePayload,
    ) -> BiometricResult<StepResult> {
        if !(0.0..=1.0).contains(&payload.confidence) {
            return Err(BiometricError::ScoreOutOfRange(payload.confidence));
        }

        let policy = self.policy;
        let session = self.get_mut(session_id)?;
        if session.completed {
            return Err(BiometricError::AlreadyComplete);
        }

        let expected = match session.expected_step() {
            Some(expected) => expected,
            None => return Err(BiometricError::AlreadyComplete),
        };
        if step != expected {
            return Err(BiometricError::OutOfOrder {
                expected,
                submitted: step,
            });
        }

        if payload.status == StepStatus::Success && !policy.accepts(step, payload.confidence) {
            // Recorded as a retry so the attempt is auditable, but the
            // cursor does not move.
            let mut record = StepRecord::from_payload(&payload);
            record.status = StepStatus::Retry;
            session.record_step(step, record);
            return Err(BiometricError::BelowThreshold {
                step,
                confidence: payload.confidence,
                minimum: policy.minimum_for(step),
            });
        }

        let record = StepRecord::from_payload(&payload);
        let status = record.status;
        let confidence = record.confidence;
        session.record_step(step, record);
        let next_step = session.expected_step();

        tracing::debug!(
            session_id = %session_id,
            step = %step,
            ?status,
            confidence,
            "Biometric step recorded"
        );

        Ok(StepResult {
            step,
            status,
            confidence,
            next_step,
        })
    }

    /// Complete the signature action.
    ///
    /// Callable only once all five capture steps succeeded. Calling
    /// again on a completed session returns the same event.
    pub fn complete_signature(&mut self, session_id: &SessionId) -> BiometricResult<SignatureEvent> {
        let session = self.get_mut(session_id)?;

        if session.completed {
            return Ok(Self::event_of(session));
        }
        let remaining = session.remaining_steps();
        if remaining > 0 {
            return Err(BiometricError::StepsIncomplete { remaining });
        }

        session.completed = true;
        session.completed_at = Some(Utc::now());
        session.updated_at = Utc::now();

        let event = Self::event_of(session);
        tracing::info!(
            session_id = %session_id,
            contract_id = %event.contract_id,
            signer = %event.signer,
            "Biometric signature completed"
        );
        Ok(event)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn get(&self, session_id: &SessionId) -> BiometricResult<&BiometricSession> {
        self.sessions
            .get(session_id)
            .ok_or_else(|| BiometricError::SessionNotFound(session_id.to_string()))
    }

    fn get_mut(&mut self, session_id: &SessionId) -> BiometricResult<&mut BiometricSession> {
        self.sessions
            .get_mut(session_id)
            .ok_or_else(|| BiometricError::SessionNotFound(session_id.to_string()))
    }

    fn event_of(session: &BiometricSession) -> SignatureEvent {
        SignatureEvent {
            contract_id: session.contract_id.clone(),
            signer: session.signer.clone(),
            role: session.role,
            confidence_scores: session.confidence_scores(),
            completed_at: session.completed_at.unwrap_or_else(Utc::now),
        }
    }
}
