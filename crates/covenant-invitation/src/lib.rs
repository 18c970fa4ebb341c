//! Covenant Invitation Manager
//!
//! Issues, validates, expires, and revokes the single-use secure tokens
//! that bind a contract draft to a specific counterparty contact channel.
//!
//! - Tokens carry 256 bits of OS entropy; they are unguessable, opaque,
//!   and redeemable exactly once.
//! - At most one invitation per contract is live at a time: issuing a new
//!   one cancels the prior.
//! - Invitations are never deleted. Status is the only thing that moves,
//!   and it moves monotonically; `Cancelled` and `Expired` are absorbing.
//!
//! Message dispatch (email/SMS/WhatsApp) is the notifier collaborator's
//! job; this crate only manages token validity and status bookkeeping.

#![deny(unsafe_code)]

mod errors;
mod invitation;
mod manager;
mod token;

pub use errors::*;
pub use invitation::*;
pub use manager::*;
pub use token::*;
