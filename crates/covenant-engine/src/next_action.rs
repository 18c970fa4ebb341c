//! Next required action per (state, role)
//!
//! A pure lookup derived from the transition table, exposed as a read
//! projection for dashboards. No state of its own.

use covenant_types::{ContractState, PartyRole};

/// What the given role should do next for a contract in the given state
pub fn next_required_action(state: ContractState, role: PartyRole) -> &'static str {
    use ContractState as S;
    use PartyRole as R;

    match (state, role) {
        (S::Draft, R::Issuer) => "complete the draft and send the invitation",
        (S::Draft, R::Counterparty) => "wait for the invitation",

        (S::TenantInvited, R::Issuer) => "wait for the tenant to accept the invitation",
        (S::TenantInvited, R::Counterparty) => "accept the invitation using your token",

        (S::TenantReviewing, R::Issuer) => "wait for the tenant's review",
        (S::TenantReviewing, R::Counterparty) => "submit your profile and approve the terms",

        (S::LandlordReviewing, R::Issuer) => "review the submission and approve the terms",
        (S::LandlordReviewing, R::Counterparty) => "wait for the landlord's review",

        (S::ObjectionsPending, R::Issuer) => "respond to the pending objections",
        (S::ObjectionsPending, R::Counterparty) => "await objection resolution or withdraw",

        (S::BothReviewing, R::Issuer) => "review and approve the guarantee",
        (S::BothReviewing, R::Counterparty) => "provide the required guarantee",

        (S::ReadyToSign, _) => "complete your biometric signature",

        (S::FullySigned, R::Issuer) => "publish the contract",
        (S::FullySigned, R::Counterparty) => "wait for publication",

        (S::Published, _) => "no action required",
        (S::Expired | S::Terminated | S::Cancelled, _) => "no action available",
    }
}
