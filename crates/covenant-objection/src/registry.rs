//! The objection registry: all objections across contracts
//!
//! Pure bookkeeping. Applying an accepted proposal to the contract's
//! terms, and the `ObjectionsPending` entry/resume transitions, are the
//! platform's job — it holds both aggregates.

use crate::{
    Objection, ObjectionDecision, ObjectionError, ObjectionId, ObjectionResult, ObjectionStatus,
};
use chrono::Utc;
use covenant_types::{ContractId, PartyRole, TermField};
use std::collections::HashMap;

/// Holds every objection, keyed by id
#[derive(Clone, Debug, Default)]
pub struct ObjectionRegistry {
    objections: HashMap<ObjectionId, Objection>,
}

impl ObjectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new pending objection
    pub fn submit(
        &mut self,
        contract_id: ContractId,
        submitted_by: PartyRole,
        field: TermField,
        current_value: impl Into<String>,
        proposed_value: impl Into<String>,
        justification: impl Into<String>,
    ) -> Objection {
        let objection = Objection::new(
            contract_id,
            submitted_by,
            field,
            current_value,
            proposed_value,
            justification,
        );
        tracing::info!(
            objection_id = %objection.id,
            contract_id = %objection.contract_id,
            field = %objection.field,
            "Objection submitted"
        );
        self.objections
            .insert(objection.id.clone(), objection.clone());
        objection
    }

    /// Resolve a pending objection with an accept/reject decision.
    ///
    /// The responder must not be the submitter. Returns the resolved
    /// objection; on accept the caller applies the proposed value.
    pub fn respond(
        &mut self,
        id: &ObjectionId,
        responder: PartyRole,
        decision: ObjectionDecision,
        note: Option<String>,
    ) -> ObjectionResult<Objection> {
        let objection = self.get_mut(id)?;
        if objection.status.is_resolved() {
            return Err(ObjectionError::AlreadyResolved(objection.status));
        }
        if responder == objection.submitted_by {
            return Err(ObjectionError::SelfResponse);
        }

        objection.status = match decision {
            ObjectionDecision::Accept => ObjectionStatus::Accepted,
            ObjectionDecision::Reject => ObjectionStatus::Rejected,
        };
        objection.resolved_at = Some(Utc::now());
        objection.resolution_note = note;

        tracing::info!(
            objection_id = %id,
            status = %objection.status,
            "Objection resolved"
        );
        Ok(objection.clone())
    }

    /// Withdraw a pending objection. Submitter-only.
    pub fn withdraw(&mut self, id: &ObjectionId, actor: PartyRole) -> ObjectionResult<Objection> {
        let objection = self.get_mut(id)?;
        if objection.status.is_resolved() {
            return Err(ObjectionError::AlreadyResolved(objection.status));
        }
        if actor != objection.submitted_by {
            return Err(ObjectionError::NotSubmitter {
                submitter: objection.submitted_by,
            });
        }

        objection.status = ObjectionStatus::Withdrawn;
        objection.resolved_at = Some(Utc::now());
        tracing::info!(objection_id = %id, "Objection withdrawn");
        Ok(objection.clone())
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn get(&self, id: &ObjectionId) -> ObjectionResult<&Objection> {
        self.objections
            .get(id)
            .ok_or_else(|| ObjectionError::NotFound(id.to_string()))
    }

    /// Number of objections currently blocking a contract
    pub fn pending_count(&self, contract_id: &ContractId) -> usize {
        self.objections
            .values()
            .filter(|o| &o.contract_id == contract_id && o.is_pending())
            .count()
    }

    /// All objections for a contract, oldest first
    pub fn list_for(&self, contract_id: &ContractId) -> Vec<&Objection> {
        let mut all: Vec<&Objection> = self
            .objections
            .values()
            .filter(|o| &o.contract_id == contract_id)
            .collect();
        all.sort_by_key(|o| o.submitted_at);
        all
    }

    fn get_mut(&mut self, id: &ObjectionId) -> ObjectionResult<&mut Objection> {
        self.objections
            .get_mut(id)
            .ok_or_else(|| ObjectionError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_one() -> (ObjectionRegistry, Objection, ContractId) {
        let mut registry = ObjectionRegistry::new();
        let contract_id = ContractId::generate();
        let objection = registry.submit(
            contract_id.clone(),
            PartyRole::Counterparty,
            TermField::MonthlyRent,
            "2500000",
            "2200000",
            "market rate is lower",
        );
        (registry, objection, contract_id)
    }

    #[test]
    fn test_pending_count_tracks_blocking() {
        let (mut registry, objection, contract_id) = registry_with_one();
        assert_eq!(registry.pending_count(&contract_id), 1);

        registry
            .respond(
                &objection.id,
                PartyRole::Issuer,
                ObjectionDecision::Accept,
                Some("agreed".to_string()),
            )
            .unwrap();
        assert_eq!(registry.pending_count(&contract_id), 0);
    }

    #[test]
    fn test_respond_twice_fails() {
        let (mut registry, objection, _) = registry_with_one();
        registry
            .respond(&objection.id, PartyRole::Issuer, ObjectionDecision::Reject, None)
            .unwrap();

        let err = registry
            .respond(&objection.id, PartyRole::Issuer, ObjectionDecision::Accept, None)
            .unwrap_err();
        assert_eq!(
            err,
            ObjectionError::AlreadyResolved(ObjectionStatus::Rejected)
        );
    }

    #[test]
    fn test_submitter_cannot_respond_to_own() {
        let (mut registry, objection, _) = registry_with_one();
        let err = registry
            .respond(
                &objection.id,
                PartyRole::Counterparty,
                ObjectionDecision::Accept,
                None,
            )
            .unwrap_err();
        assert_eq!(err, ObjectionError::SelfResponse);
    }

    #[test]
    fn test_withdraw_is_submitter_only() {
        let (mut registry, objection, contract_id) = registry_with_one();

        let err = registry
            .withdraw(&objection.id, PartyRole::Issuer)
            .unwrap_err();
        assert!(matches!(err, ObjectionError::NotSubmitter { .. }));

        registry
            .withdraw(&objection.id, PartyRole::Counterparty)
            .unwrap();
        assert_eq!(registry.pending_count(&contract_id), 0);
    }

    #[test]
    fn test_multiple_simultaneous_pending() {
        let (mut registry, _, contract_id) = registry_with_one();
        registry.submit(
            contract_id.clone(),
            PartyRole::Issuer,
            TermField::PetsAllowed,
            "false",
            "true",
            "tenant has a cat",
        );
        assert_eq!(registry.pending_count(&contract_id), 2);
        assert_eq!(registry.list_for(&contract_id).len(), 2);
    }
}
