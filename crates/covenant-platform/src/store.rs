//! In-memory contract store with optimistic concurrency
//!
//! Single-writer-per-aggregate: every update presents the version of the
//! snapshot it was derived from, and a stale version is rejected with
//! `ConcurrentModification` instead of silently overwriting.

use crate::{PlatformError, PlatformResult};
use covenant_types::{Contract, ContractId};
use std::collections::HashMap;

/// Holds every contract, keyed by id, and issues sequential numbers
#[derive(Clone, Debug)]
pub struct ContractStore {
    contracts: HashMap<ContractId, Contract>,
    next_number: u64,
}

impl ContractStore {
    pub fn new() -> Self {
        Self {
            contracts: HashMap::new(),
            next_number: 1,
        }
    }

    /// Allocate the next human-readable contract number
    pub fn allocate_number(&mut self) -> String {
        let number = format!("CTR-{:06}", self.next_number);
        self.next_number += 1;
        number
    }

    /// Insert a freshly created contract
    pub fn insert(&mut self, contract: Contract) {
        self.contracts.insert(contract.id.clone(), contract);
    }

    /// Fetch a snapshot of a contract
    pub fn get(&self, id: &ContractId) -> PlatformResult<Contract> {
        self.contracts
            .get(id)
            .cloned()
            .ok_or_else(|| PlatformError::ContractNotFound(id.to_string()))
    }

    /// Commit an updated contract derived from a snapshot read at
    /// `read_version`. Rejects the write when the stored aggregate has
    /// moved since the read.
    pub fn compare_and_put(&mut self, next: Contract, read_version: u64) -> PlatformResult<()> {
        let stored = self
            .contracts
            .get_mut(&next.id)
            .ok_or_else(|| PlatformError::ContractNotFound(next.id.to_string()))?;

        if stored.version != read_version {
            return Err(PlatformError::ConcurrentModification {
                contract_id: next.id.to_string(),
                expected: read_version,
                actual: stored.version,
            });
        }
        *stored = next;
        Ok(())
    }

    /// Snapshot of every contract, for projections and sweeps
    pub fn list(&self) -> Vec<Contract> {
        self.contracts.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl Default for ContractStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_types::{LeaseTerms, PartyContact, PartyId, PartyRecord};

    fn contract(number: &str) -> Contract {
        Contract::new(
            number,
            PartyRecord::new(
                PartyId::new("landlord-1"),
                "A. Landlord",
                PartyContact::email("landlord@test.com"),
            ),
            LeaseTerms::new(2_500_000, 2_500_000, 12),
        )
    }

    #[test]
    fn test_numbers_are_sequential() {
        let mut store = ContractStore::new();
        assert_eq!(store.allocate_number(), "CTR-000001");
        assert_eq!(store.allocate_number(), "CTR-000002");
    }

    #[test]
    fn test_stale_write_is_rejected() {
        let mut store = ContractStore::new();
        let stored = contract("CTR-000001");
        let id = stored.id.clone();
        store.insert(stored);

        // Two readers take the same snapshot
        let mut first = store.get(&id).unwrap();
        let mut second = store.get(&id).unwrap();

        first.touch();
        store.compare_and_put(first, 0).unwrap();

        second.touch();
        let err = store.compare_and_put(second, 0).unwrap_err();
        assert!(matches!(
            err,
            PlatformError::ConcurrentModification { expected: 0, actual: 1, .. }
        ));
    }

    #[test]
    fn test_get_unknown_contract() {
        let store = ContractStore::new();
        let err = store.get(&ContractId::generate()).unwrap_err();
        assert!(matches!(err, PlatformError::ContractNotFound(_)));
    }
}
