//! Read-only dashboard projections
//!
//! Derived from contract snapshots on demand; no state of their own, so
//! they can never drift from the aggregates.

use covenant_types::{Contract, ContractState};
use serde::Serialize;
use std::collections::HashMap;

/// Cross-contract summary for the landlord dashboard
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// Total contracts in the store
    pub total: usize,
    /// Contract count per workflow state (states with zero omitted)
    pub by_state: HashMap<ContractState, usize>,
    /// Contracts currently published
    pub published: usize,
    /// Sum of monthly rent (minor units) across published contracts
    pub active_monthly_rent: i64,
    /// Contracts waiting on at least one signature
    pub awaiting_signature: usize,
}

impl DashboardSummary {
    pub fn of(contracts: &[Contract]) -> Self {
        let mut summary = Self {
            total: contracts.len(),
            ..Self::default()
        };
        for contract in contracts {
            *summary.by_state.entry(contract.state).or_insert(0) += 1;
            match contract.state {
                ContractState::Published => {
                    summary.published += 1;
                    summary.active_monthly_rent += contract.terms.monthly_rent;
                }
                ContractState::ReadyToSign => summary.awaiting_signature += 1,
                _ => {}
            }
        }
        summary
    }

    pub fn count_in(&self, state: ContractState) -> usize {
        self.by_state.get(&state).copied().unwrap_or(0)
    }
}
