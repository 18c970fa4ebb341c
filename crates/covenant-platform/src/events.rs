//! The domain event feed
//!
//! Projections never derive facts from transition side effects directly;
//! every applied transition and side effect is appended here, and the
//! feed is the single source downstream consumers read.

use chrono::{DateTime, Utc};
use covenant_types::{ContentRef, ContractId, ContractState, PartyRole};
use serde::{Deserialize, Serialize};

/// One recorded fact about the system
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainEvent {
    DraftCreated {
        contract_id: ContractId,
        number: String,
    },
    InvitationIssued {
        contract_id: ContractId,
        invitation_id: String,
    },
    InvitationRedeemed {
        contract_id: ContractId,
        invitation_id: String,
    },
    InvitationsExpired {
        count: usize,
    },
    StateChanged {
        contract_id: ContractId,
        from: ContractState,
        to: ContractState,
        trigger: String,
    },
    ObjectionSubmitted {
        contract_id: ContractId,
        objection_id: String,
        field: String,
    },
    ObjectionResolved {
        contract_id: ContractId,
        objection_id: String,
        accepted: bool,
    },
    ObjectionWithdrawn {
        contract_id: ContractId,
        objection_id: String,
    },
    GuaranteeCreated {
        contract_id: ContractId,
        guarantee_id: String,
    },
    GuaranteeReviewed {
        contract_id: ContractId,
        guarantee_id: String,
        approved: bool,
    },
    SignatureRecorded {
        contract_id: ContractId,
        role: PartyRole,
    },
    DocumentPublished {
        contract_id: ContractId,
        content_ref: ContentRef,
    },
}

/// An event plus when the feed recorded it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub at: DateTime<Utc>,
    pub event: DomainEvent,
}

/// Append-only, in-order event log
#[derive(Clone, Debug, Default)]
pub struct EventFeed {
    events: Vec<RecordedEvent>,
}

impl EventFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: DomainEvent) {
        self.events.push(RecordedEvent {
            at: Utc::now(),
            event,
        });
    }

    pub fn all(&self) -> &[RecordedEvent] {
        &self.events
    }

    /// Events concerning one contract, in feed order
    pub fn for_contract(&self, contract_id: &ContractId) -> Vec<&RecordedEvent> {
        self.events
            .iter()
            .filter(|r| match &r.event {
                DomainEvent::InvitationsExpired { .. } => false,
                DomainEvent::DraftCreated { contract_id: id, .. }
                | DomainEvent::InvitationIssued { contract_id: id, .. }
                | DomainEvent::InvitationRedeemed { contract_id: id, .. }
                | DomainEvent::StateChanged { contract_id: id, .. }
                | DomainEvent::ObjectionSubmitted { contract_id: id, .. }
                | DomainEvent::ObjectionResolved { contract_id: id, .. }
                | DomainEvent::ObjectionWithdrawn { contract_id: id, .. }
                | DomainEvent::GuaranteeCreated { contract_id: id, .. }
                | DomainEvent::GuaranteeReviewed { contract_id: id, .. }
                | DomainEvent::SignatureRecorded { contract_id: id, .. }
                | DomainEvent::DocumentPublished { contract_id: id, .. } => id == contract_id,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
