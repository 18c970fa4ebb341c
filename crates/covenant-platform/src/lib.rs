//! Covenant Platform
//!
//! The orchestration layer over the workflow core:
//!
//! - **ContractService**: the single facade for every lifecycle
//!   operation — drafting, invitations, review, objections, guarantees,
//!   biometric signing, publication, and the deadline sweep. Every
//!   mutating call takes an explicit [`ActorContext`] and is authorized
//!   before it acts.
//! - **ContractStore**: in-memory aggregate store with version-checked
//!   writes; stale snapshots are rejected, never silently overwritten.
//! - **Collaborator traits**: notification transport, blob storage, and
//!   document rendering stay outside the core behind [`Notifier`],
//!   [`FileStorage`], and [`DocumentRenderer`].
//! - **EventFeed**: append-only domain event log feeding the dashboard
//!   projections.
//!
//! # Design Principles
//!
//! 1. Compound operations validate every participant before committing;
//!    a failure leaves no partial state behind.
//! 2. Guard inputs are snapshotted from the satellite subsystems at call
//!    time; the engine itself stays pure.
//! 3. Projections are derived on demand from aggregate snapshots and the
//!    event feed — they hold no state of their own.
//!
//! [`ActorContext`]: covenant_types::ActorContext

#![deny(unsafe_code)]

mod collaborators;
mod errors;
mod events;
mod projections;
mod service;
mod store;

pub use collaborators::*;
pub use errors::*;
pub use events::*;
pub use projections::*;
pub use service::*;
pub use store::*;
