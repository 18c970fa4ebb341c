//! Guarantee kinds: the tagged union of collateral shapes
//!
//! Each kind carries exactly the fields it needs. `validate` gathers
//! every violation instead of stopping at the first.

use covenant_types::ValidationError;
use serde::{Deserialize, Serialize};

/// The collateral backing a contract
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GuaranteeKind {
    /// A natural person co-signs
    Personal {
        cosigner_name: String,
        cosigner_document: String,
        cosigner_phone: String,
        /// Co-signer's declared monthly income in minor units
        monthly_income: i64,
    },
    /// A company co-signs
    Company {
        company_name: String,
        company_tax_id: String,
        contact_phone: String,
        /// Company's declared monthly income in minor units
        monthly_income: i64,
    },
    /// A rental-guarantee insurance policy
    Insurance {
        company_name: String,
        policy_number: String,
        /// Coverage amount in minor units
        coverage_amount: i64,
    },
    /// A plain cash deposit; the common amount field is all it needs
    Deposit,
}

impl GuaranteeKind {
    /// Stable label used for logs and document-catalog lookups
    pub fn label(&self) -> &'static str {
        match self {
            Self::Personal { .. } => "personal",
            Self::Company { .. } => "company",
            Self::Insurance { .. } => "insurance",
            Self::Deposit => "deposit",
        }
    }

    /// Validate the kind-specific required fields, collecting every
    /// missing or invalid one.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = ValidationError::new();
        match self {
            Self::Personal {
                cosigner_name,
                cosigner_document,
                cosigner_phone,
                monthly_income,
            } => {
                if cosigner_name.trim().is_empty() {
                    violations.push("cosigner_name is required");
                }
                if cosigner_document.trim().is_empty() {
                    violations.push("cosigner_document is required");
                }
                if cosigner_phone.trim().is_empty() {
                    violations.push("cosigner_phone is required");
                }
                if *monthly_income <= 0 {
                    violations.push("monthly_income must be positive");
                }
            }
            Self::Company {
                company_name,
                company_tax_id,
                contact_phone,
                monthly_income,
            } => {
                if company_name.trim().is_empty() {
                    violations.push("company_name is required");
                }
                if company_tax_id.trim().is_empty() {
                    violations.push("company_tax_id is required");
                }
                if contact_phone.trim().is_empty() {
                    violations.push("contact_phone is required");
                }
                if *monthly_income <= 0 {
                    violations.push("monthly_income must be positive");
                }
            }
            Self::Insurance {
                company_name,
                policy_number,
                coverage_amount,
            } => {
                if company_name.trim().is_empty() {
                    violations.push("company_name is required");
                }
                if policy_number.trim().is_empty() {
                    violations.push("policy_number is required");
                }
                if *coverage_amount <= 0 {
                    violations.push("coverage_amount must be positive");
                }
            }
            Self::Deposit => {}
        }
        violations.into_result()
    }

    /// Whether every kind-specific field is present and valid.
    /// Progress-metric input, not a gate.
    pub fn fields_complete(&self) -> bool {
        self.validate().is_ok()
    }
}
