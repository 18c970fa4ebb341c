//! Covenant Biometric Signature Sequencer
//!
//! Orchestrates the ordered identity-verification pipeline each signer
//! walks before their signature is recorded:
//!
//! `face_front → face_side → document → combined → voice → signature`
//!
//! - Steps complete strictly in sequence; out-of-order submissions are
//!   rejected by business rule, not by a race.
//! - Confidence scores are recorded as supplied by the capture provider;
//!   this crate enforces only the configurable per-step minimum.
//! - One incomplete session per signer: starting again resumes it.
//! - Completion produces a single signature event per signer, consumed
//!   by the platform to set the contract's signature flag.

#![deny(unsafe_code)]

mod errors;
mod policy;
mod sequencer;
mod session;
mod step;

pub use errors::*;
pub use policy::*;
pub use sequencer::*;
pub use session::*;
pub use step::*;
