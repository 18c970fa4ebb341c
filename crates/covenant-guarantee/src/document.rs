//! Guarantee documents and the per-kind catalogs
//!
//! Each guarantee kind accepts a fixed catalog of document types.
//! Attachment outside the catalog is rejected; re-attaching an already
//! present type replaces it (one active document per type).

use crate::GuaranteeKind;
use chrono::{DateTime, Utc};
use covenant_types::ContentRef;
use serde::{Deserialize, Serialize};

/// Tags for attachable guarantee documents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    CosignerIdentity,
    IncomeProof,
    PropertyDeed,
    BankStatement,
    CompanyRegistration,
    FinancialStatement,
    TaxReturn,
    PolicyCertificate,
    PaymentReceipt,
    DepositReceipt,
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::CosignerIdentity => "cosigner_identity",
            Self::IncomeProof => "income_proof",
            Self::PropertyDeed => "property_deed",
            Self::BankStatement => "bank_statement",
            Self::CompanyRegistration => "company_registration",
            Self::FinancialStatement => "financial_statement",
            Self::TaxReturn => "tax_return",
            Self::PolicyCertificate => "policy_certificate",
            Self::PaymentReceipt => "payment_receipt",
            Self::DepositReceipt => "deposit_receipt",
        };
        write!(f, "{name}")
    }
}

/// Documents a kind requires before it is considered documentally complete
pub fn required_documents(kind: &GuaranteeKind) -> &'static [DocumentType] {
    match kind {
        GuaranteeKind::Personal { .. } => {
            &[DocumentType::CosignerIdentity, DocumentType::IncomeProof]
        }
        GuaranteeKind::Company { .. } => &[
            DocumentType::CompanyRegistration,
            DocumentType::FinancialStatement,
        ],
        GuaranteeKind::Insurance { .. } => &[DocumentType::PolicyCertificate],
        GuaranteeKind::Deposit => &[DocumentType::DepositReceipt],
    }
}

/// Documents a kind accepts beyond the required set
pub fn optional_documents(kind: &GuaranteeKind) -> &'static [DocumentType] {
    match kind {
        GuaranteeKind::Personal { .. } => {
            &[DocumentType::PropertyDeed, DocumentType::BankStatement]
        }
        GuaranteeKind::Company { .. } => &[DocumentType::TaxReturn],
        GuaranteeKind::Insurance { .. } => &[DocumentType::PaymentReceipt],
        GuaranteeKind::Deposit => &[],
    }
}

/// Whether the kind's catalog admits the document type at all
pub fn accepts_document(kind: &GuaranteeKind, document_type: DocumentType) -> bool {
    required_documents(kind).contains(&document_type)
        || optional_documents(kind).contains(&document_type)
}

/// One attached document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuaranteeDocument {
    pub document_type: DocumentType,
    /// Opaque ref owned by the file-storage collaborator
    pub content_ref: ContentRef,
    /// Set by the issuer during verification
    pub verified: bool,
    pub attached_at: DateTime<Utc>,
}

impl GuaranteeDocument {
    pub fn new(document_type: DocumentType, content_ref: ContentRef) -> Self {
        Self {
            document_type,
            content_ref,
            verified: false,
            attached_at: Utc::now(),
        }
    }
}
