//! The guarantee book: zero-or-one guarantee per contract

use crate::{Guarantee, GuaranteeError, GuaranteeId, GuaranteeKind, GuaranteeResult, GuaranteeStatus};
use covenant_types::ContractId;
use std::collections::HashMap;

/// Holds all guarantees, enforcing the one-per-contract rule
#[derive(Clone, Debug, Default)]
pub struct GuaranteeBook {
    guarantees: HashMap<GuaranteeId, Guarantee>,
    by_contract: HashMap<ContractId, GuaranteeId>,
}

impl GuaranteeBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and record a guarantee for a contract.
    ///
    /// Rejects a second guarantee for the same contract; replacing one
    /// is an explicit remove-then-create at the platform level.
    pub fn create(
        &mut self,
        contract_id: ContractId,
        kind: GuaranteeKind,
        amount: i64,
        description: impl Into<String>,
    ) -> GuaranteeResult<Guarantee> {
        if self.by_contract.contains_key(&contract_id) {
            return Err(GuaranteeError::AlreadyExists(contract_id.to_string()));
        }
        let guarantee = Guarantee::new(contract_id.clone(), kind, amount, description)?;
        tracing::info!(
            guarantee_id = %guarantee.id,
            contract_id = %contract_id,
            kind = guarantee.kind.label(),
            "Guarantee created"
        );
        self.by_contract.insert(contract_id, guarantee.id.clone());
        self.guarantees
            .insert(guarantee.id.clone(), guarantee.clone());
        Ok(guarantee)
    }

    pub fn get(&self, id: &GuaranteeId) -> GuaranteeResult<&Guarantee> {
        self.guarantees
            .get(id)
            .ok_or_else(|| GuaranteeError::NotFound(id.to_string()))
    }

    pub fn get_mut(&mut self, id: &GuaranteeId) -> GuaranteeResult<&mut Guarantee> {
        self.guarantees
            .get_mut(id)
            .ok_or_else(|| GuaranteeError::NotFound(id.to_string()))
    }

    /// The contract's guarantee, if one exists
    pub fn for_contract(&self, contract_id: &ContractId) -> Option<&Guarantee> {
        self.by_contract
            .get(contract_id)
            .and_then(|id| self.guarantees.get(id))
    }

    /// Guard input: whether the contract has an approved guarantee
    pub fn approved_for(&self, contract_id: &ContractId) -> bool {
        self.for_contract(contract_id)
            .map(|g| g.status == GuaranteeStatus::Approved)
            .unwrap_or(false)
    }
}
