//! Biometric sessions: one signer's walk through the capture sequence

use crate::{CaptureStep, StepRecord};
use chrono::{DateTime, Utc};
use covenant_types::{ContractId, PartyId, PartyRole};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Session Identifier ───────────────────────────────────────────────

/// Unique identifier for a biometric session
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
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

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Session Aggregate ────────────────────────────────────────────────

/// One signer's verification session for one signing attempt
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiometricSession {
    pub id: SessionId,
    pub contract_id: ContractId,
    /// Who is being verified
    pub signer: PartyId,
    /// The role the signer signs under
    pub role: PartyRole,
    /// Latest attempt per step (a below-threshold retry overwrites)
    pub records: HashMap<CaptureStep, StepRecord>,
    /// Set once the signature action completes
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BiometricSession {
    pub fn new(contract_id: ContractId, signer: PartyId, role: PartyRole) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::generate(),
            contract_id,
            signer,
            role,
            records: HashMap::new(),
            completed: false,
            completed_at: None,
            started_at: now,
            updated_at: now,
        }
    }

    /// The next step the protocol expects, or None when all five
    /// capture steps have succeeded.
    pub fn expected_step(&self) -> Option<CaptureStep> {
        CaptureStep::SEQUENCE
            .into_iter()
            .find(|step| !self.step_succeeded(*step))
    }

    pub fn step_succeeded(&self, step: CaptureStep) -> bool {
        self.records
            .get(&step)
            .map(StepRecord::is_success)
            .unwrap_or(false)
    }

    /// How many capture steps still need a success
    pub fn remaining_steps(&self) -> usize {
        CaptureStep::SEQUENCE
            .iter()
            .filter(|step| !self.step_succeeded(**step))
            .count()
    }

    pub fn all_steps_succeeded(&self) -> bool {
        self.remaining_steps() == 0
    }

    /// Confidence scores in sequence order, for completed steps
    pub fn confidence_scores(&self) -> Vec<(CaptureStep, f64)> {
        CaptureStep::SEQUENCE
            .into_iter()
            .filter_map(|step| {
                self.records
                    .get(&step)
                    .filter(|r| r.is_success())
                    .map(|r| (step, r.confidence))
            })
            .collect()
    }

    /// Record the latest attempt at a step
    pub fn record_step(&mut self, step: CaptureStep, record: StepRecord) {
        self.records.insert(step, record);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CapturePayload, StepStatus};
    use covenant_types::ContentRef;

    fn session() -> BiometricSession {
        BiometricSession::new(
            ContractId::generate(),
            PartyId::new("tenant-1"),
            PartyRole::Counterparty,
        )
    }

    fn success(confidence: f64) -> StepRecord {
        StepRecord::from_payload(&CapturePayload::success(
            ContentRef::new("blob://capture"),
            confidence,
        ))
    }

    #[test]
    fn test_expected_step_walks_sequence() {
        let mut s = session();
        assert_eq!(s.expected_step(), Some(CaptureStep::FaceFront));

        s.record_step(CaptureStep::FaceFront, success(0.9));
        assert_eq!(s.expected_step(), Some(CaptureStep::FaceSide));
        assert_eq!(s.remaining_steps(), 4);
    }

    #[test]
    fn test_retry_does_not_advance() {
        let mut s = session();
        let mut retry = success(0.4);
        retry.status = StepStatus::Retry;
        s.record_step(CaptureStep::FaceFront, retry);
        assert_eq!(s.expected_step(), Some(CaptureStep::FaceFront));
    }

    #[test]
    fn test_all_steps_succeeded() {
        let mut s = session();
        for step in CaptureStep::SEQUENCE {
            s.record_step(step, success(0.8));
        }
        assert!(s.all_steps_succeeded());
        assert_eq!(s.expected_step(), None);
        assert_eq!(s.confidence_scores().len(), 5);
    }
}
