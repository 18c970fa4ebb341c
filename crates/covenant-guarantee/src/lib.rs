//! Covenant Guarantee Subsystem
//!
//! Zero-or-one collateral/guarantee record per contract, with
//! type-dependent required fields, per-kind document catalogs, an
//! issuer-verified flag, and a progress metric.
//!
//! The guarantee kind is a tagged union: required-field validation is
//! enforced by the type system, not by string-keyed runtime lookups.
//! Validation collects every violation so the caller can fix a form in
//! one round trip.

#![deny(unsafe_code)]

mod book;
mod document;
mod guarantee;
mod kind;

pub use book::*;
pub use document::*;
pub use guarantee::*;
pub use kind::*;
