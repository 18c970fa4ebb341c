//! Covenant Contract State Machine
//!
//! The engine owns the canonical workflow transitions of a contract:
//!
//! - **ContractEvent**: every business trigger that can move a contract.
//! - **transition**: a total function over (state, event). Unlisted pairs
//!   are rejected with `InvalidForState`; listed pairs with unmet guards
//!   are rejected with `GuardFailed` naming the specific guard.
//! - **GuardContext**: satellite facts (pending objections, guarantee
//!   satisfaction) supplied by the caller, keeping the machine pure.
//! - **next_required_action**: the per-(state, role) projection derived
//!   from the transition table.
//!
//! # Design Principles
//!
//! 1. The machine never performs I/O. It consumes a contract snapshot and
//!    produces a new one; persistence is the platform's concern.
//! 2. One business event triggers at most one deterministic cascade step,
//!    and the cascade is expressed in the table itself.
//! 3. Every successful transition appends exactly one history entry.
//!    Idempotent re-evaluations append nothing.

#![deny(unsafe_code)]

mod event;
mod machine;
mod next_action;

pub use event::*;
pub use machine::*;
pub use next_action::*;
