//! Covenant Domain Types
//!
//! Shared types for the rental-contract lifecycle core:
//!
//! - **Contract**: the central aggregate — parties, terms, approval and
//!   signature flags, workflow state, append-only history.
//! - **ActorContext**: the explicitly-injected identity of the caller
//!   (issuer or counterparty). Never ambient, never global.
//! - **LeaseTerms / TermField**: economic terms plus the whitelist of
//!   fields an objection may target.
//! - **Error taxonomy**: transition, authorization, and validation errors
//!   shared across the workflow crates.
//!
//! # Design Principles
//!
//! 1. Aggregates are plain data with explicit version counters. All
//!    mutation goes through the engine or a manager crate.
//! 2. No implicit state changes: flags and timestamps only move through
//!    recorded transitions.
//! 3. History is append-only. It is the audit trail.

#![deny(unsafe_code)]

mod actor;
mod content;
mod contract;
mod errors;
mod history;
mod terms;

pub use actor::*;
pub use content::*;
pub use contract::*;
pub use errors::*;
pub use history::*;
pub use terms::*;
