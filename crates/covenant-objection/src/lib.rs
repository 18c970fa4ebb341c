//! Covenant Objection Subsystem
//!
//! A sub-protocol for proposing, responding to, and resolving
//! field-level disagreements without resetting the whole contract state.
//!
//! Objections target a whitelisted term field and carry a proposed
//! value. While any objection is pending the contract is blocked in
//! `ObjectionsPending`; resolving or withdrawing the last one unblocks
//! exactly one resume transition, performed by the platform.

#![deny(unsafe_code)]

mod objection;
mod registry;

pub use objection::*;
pub use registry::*;
