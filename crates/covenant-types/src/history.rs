//! Workflow history: the append-only audit trail
//!
//! Every successful state transition appends exactly one entry. Entries
//! are never edited or removed.

use crate::{ContractState, PartyId, PartyRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded workflow transition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// State before the transition
    pub from: ContractState,
    /// State after the transition
    pub to: ContractState,
    /// Who triggered it
    pub actor: PartyId,
    /// The role the actor acted under
    pub role: PartyRole,
    /// When it was applied
    pub at: DateTime<Utc>,
    /// Optional human-readable note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl HistoryEntry {
    pub fn new(from: ContractState, to: ContractState, actor: PartyId, role: PartyRole) -> Self {
        Self {
            from,
            to,
            actor,
            role,
            at: Utc::now(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_entry_note() {
        let entry = HistoryEntry::new(
            ContractState::Draft,
            ContractState::TenantInvited,
            PartyId::new("landlord-1"),
            PartyRole::Issuer,
        )
        .with_note("invitation sent to tenant@test.com");

        assert_eq!(entry.from, ContractState::Draft);
        assert_eq!(entry.to, ContractState::TenantInvited);
        assert!(entry.note.unwrap().contains("tenant@test.com"));
    }
}
