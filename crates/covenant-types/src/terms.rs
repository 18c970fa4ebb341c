//! Economic terms of a lease contract
//!
//! Amounts are integer minor units. Terms are immutable once any party
//! has approved, except through an accepted objection — that path goes
//! through [`TermField::apply`], which is the only typed mutation seam.

use crate::ValidationError;
use serde::{Deserialize, Serialize};

/// The economic terms of a lease
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseTerms {
    /// Monthly rent in minor units
    pub monthly_rent: i64,
    /// Security deposit in minor units
    pub deposit: i64,
    /// Lease duration in months
    pub duration_months: u32,
    /// Whether utilities are included in the rent
    pub utilities_included: bool,
    /// Whether pets are allowed
    pub pets_allowed: bool,
    /// Whether smoking is allowed
    pub smoking_allowed: bool,
}

impl LeaseTerms {
    pub fn new(monthly_rent: i64, deposit: i64, duration_months: u32) -> Self {
        Self {
            monthly_rent,
            deposit,
            duration_months,
            utilities_included: false,
            pets_allowed: false,
            smoking_allowed: false,
        }
    }

    pub fn with_utilities_included(mut self, included: bool) -> Self {
        self.utilities_included = included;
        self
    }

    pub fn with_pets_allowed(mut self, allowed: bool) -> Self {
        self.pets_allowed = allowed;
        self
    }

    pub fn with_smoking_allowed(mut self, allowed: bool) -> Self {
        self.smoking_allowed = allowed;
        self
    }

    /// Whether the core economic terms are present.
    ///
    /// Guard input for sending the first invitation.
    pub fn core_terms_present(&self) -> bool {
        self.monthly_rent > 0 && self.duration_months > 0 && self.deposit >= 0
    }
}

// ── Objectable Fields ────────────────────────────────────────────────

/// The whitelist of term fields an objection may target.
///
/// Field-level disagreements name one of these; anything else is not
/// objectable and is rejected at submission time by construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermField {
    MonthlyRent,
    Deposit,
    DurationMonths,
    UtilitiesIncluded,
    PetsAllowed,
    SmokingAllowed,
}

impl TermField {
    /// All objectable fields
    pub const ALL: [TermField; 6] = [
        TermField::MonthlyRent,
        TermField::Deposit,
        TermField::DurationMonths,
        TermField::UtilitiesIncluded,
        TermField::PetsAllowed,
        TermField::SmokingAllowed,
    ];

    /// The field name as it appears in history notes and projections
    pub fn name(&self) -> &'static str {
        match self {
            Self::MonthlyRent => "monthly_rent",
            Self::Deposit => "deposit",
            Self::DurationMonths => "duration_months",
            Self::UtilitiesIncluded => "utilities_included",
            Self::PetsAllowed => "pets_allowed",
            Self::SmokingAllowed => "smoking_allowed",
        }
    }

    /// Render the field's current value from the terms
    pub fn current(&self, terms: &LeaseTerms) -> String {
        match self {
            Self::MonthlyRent => terms.monthly_rent.to_string(),
            Self::Deposit => terms.deposit.to_string(),
            Self::DurationMonths => terms.duration_months.to_string(),
            Self::UtilitiesIncluded => terms.utilities_included.to_string(),
            Self::PetsAllowed => terms.pets_allowed.to_string(),
            Self::SmokingAllowed => terms.smoking_allowed.to_string(),
        }
    }

    /// Apply a proposed value to the terms.
    ///
    /// Used when an objection is accepted. Parses per field type and
    /// rejects malformed or out-of-range values.
    pub fn apply(&self, terms: &mut LeaseTerms, raw: &str) -> Result<(), ValidationError> {
        match self {
            Self::MonthlyRent => {
                let value = parse_amount(raw, "monthly_rent")?;
                terms.monthly_rent = value;
            }
            Self::Deposit => {
                let value: i64 = raw.trim().parse().map_err(|_| {
                    ValidationError::single(format!("deposit: '{raw}' is not a valid amount"))
                })?;
                if value < 0 {
                    return Err(ValidationError::single("deposit must not be negative"));
                }
                terms.deposit = value;
            }
            Self::DurationMonths => {
                let value: u32 = raw.trim().parse().map_err(|_| {
                    ValidationError::single(format!(
                        "duration_months: '{raw}' is not a valid month count"
                    ))
                })?;
                if value == 0 {
                    return Err(ValidationError::single("duration_months must be positive"));
                }
                terms.duration_months = value;
            }
            Self::UtilitiesIncluded => terms.utilities_included = parse_bool(raw, self.name())?,
            Self::PetsAllowed => terms.pets_allowed = parse_bool(raw, self.name())?,
            Self::SmokingAllowed => terms.smoking_allowed = parse_bool(raw, self.name())?,
        }
        Ok(())
    }
}

impl std::fmt::Display for TermField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn parse_amount(raw: &str, field: &str) -> Result<i64, ValidationError> {
    let value: i64 = raw.trim().parse().map_err(|_| {
        ValidationError::single(format!("{field}: '{raw}' is not a valid amount"))
    })?;
    if value <= 0 {
        return Err(ValidationError::single(format!("{field} must be positive")));
    }
    Ok(value)
}

fn parse_bool(raw: &str, field: &str) -> Result<bool, ValidationError> {
    match raw.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ValidationError::single(format!(
            "{field}: '{other}' is not a valid boolean"
        ))),
    }
}
