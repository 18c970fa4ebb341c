//! The guarantee aggregate

use crate::{
    accepts_document, DocumentType, GuaranteeDocument, GuaranteeKind,
};
use chrono::{DateTime, Utc};
use covenant_types::{ContentRef, ContractId, ValidationError};
use serde::{Deserialize, Serialize};

// ── Guarantee Identifier ─────────────────────────────────────────────

/// Unique identifier for a guarantee
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuaranteeId(pub String);

impl GuaranteeId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl std::fmt::Display for GuaranteeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Status ───────────────────────────────────────────────────────────

/// Guarantee review status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuaranteeStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

impl std::fmt::Display for GuaranteeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        };
        write!(f, "{name}")
    }
}

// ── Errors ───────────────────────────────────────────────────────────

/// Errors from the guarantee subsystem
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GuaranteeError {
    #[error("guarantee not found: {0}")]
    NotFound(String),

    #[error("contract {0} already has a guarantee on record")]
    AlreadyExists(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("document type '{document_type}' is not in the {kind} catalog")]
    DocumentNotInCatalog {
        document_type: DocumentType,
        kind: &'static str,
    },

    #[error("guarantee is '{0}', expected 'pending'")]
    NotPending(GuaranteeStatus),

    #[error("guarantee must be approved before verification (currently '{0}')")]
    NotApproved(GuaranteeStatus),
}

/// Result type alias for guarantee operations
pub type GuaranteeResult<T> = Result<T, GuaranteeError>;

// ── Guarantee Aggregate ──────────────────────────────────────────────

/// One collateral record attached to a contract
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Guarantee {
    pub id: GuaranteeId,
    pub contract_id: ContractId,
    pub kind: GuaranteeKind,
    /// Guaranteed amount in minor units
    pub amount: i64,
    pub description: String,
    pub status: GuaranteeStatus,
    /// Independent of status: set by the issuer once approved
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_notes: Option<String>,
    pub documents: Vec<GuaranteeDocument>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Guarantee {
    /// Create a guarantee, validating the common and kind-specific
    /// required fields. Every violation is reported, not just the first.
    pub fn new(
        contract_id: ContractId,
        kind: GuaranteeKind,
        amount: i64,
        description: impl Into<String>,
    ) -> GuaranteeResult<Self> {
        let description = description.into();
        let mut violations = ValidationError::new();
        if amount <= 0 {
            violations.push("amount must be positive");
        }
        if let Err(kind_violations) = kind.validate() {
            violations.violations.extend(kind_violations.violations);
        }
        violations.into_result()?;

        let now = Utc::now();
        Ok(Self {
            id: GuaranteeId::generate(),
            contract_id,
            kind,
            amount,
            description,
            status: GuaranteeStatus::Pending,
            verified: false,
            verification_notes: None,
            documents: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    // ── Documents ────────────────────────────────────────────────────

    /// Attach a document. The type must be in the kind's catalog; an
    /// existing document of the same type is replaced (last write wins).
    pub fn attach_document(
        &mut self,
        document_type: DocumentType,
        content_ref: ContentRef,
    ) -> GuaranteeResult<GuaranteeDocument> {
        if !accepts_document(&self.kind, document_type) {
            return Err(GuaranteeError::DocumentNotInCatalog {
                document_type,
                kind: self.kind.label(),
            });
        }

        self.documents.retain(|d| d.document_type != document_type);
        let document = GuaranteeDocument::new(document_type, content_ref);
        self.documents.push(document.clone());
        self.updated_at = Utc::now();
        Ok(document)
    }

    pub fn document_of(&self, document_type: DocumentType) -> Option<&GuaranteeDocument> {
        self.documents
            .iter()
            .find(|d| d.document_type == document_type)
    }

    // ── Review ───────────────────────────────────────────────────────

    /// Approve a pending guarantee
    pub fn approve(&mut self) -> GuaranteeResult<()> {
        if self.status != GuaranteeStatus::Pending {
            return Err(GuaranteeError::NotPending(self.status));
        }
        self.status = GuaranteeStatus::Approved;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Reject a pending guarantee
    pub fn reject(&mut self) -> GuaranteeResult<()> {
        if self.status != GuaranteeStatus::Pending {
            return Err(GuaranteeError::NotPending(self.status));
        }
        self.status = GuaranteeStatus::Rejected;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Mark the guarantee verified. Approved-only; idempotent when
    /// already verified.
    pub fn verify(&mut self, notes: Option<String>) -> GuaranteeResult<()> {
        if self.status != GuaranteeStatus::Approved {
            return Err(GuaranteeError::NotApproved(self.status));
        }
        if self.verified {
            return Ok(());
        }
        self.verified = true;
        self.verification_notes = notes;
        self.updated_at = Utc::now();
        Ok(())
    }

    // ── Progress metric ──────────────────────────────────────────────

    /// Deterministic weighted completion, for progress reporting only:
    /// basic fields, kind-specific fields, at least one document,
    /// verification — 25 points each.
    pub fn completion_percentage(&self) -> u8 {
        let mut score = 0u8;
        if self.amount > 0 && !self.description.trim().is_empty() {
            score += 25;
        }
        if self.kind.fields_complete() {
            score += 25;
        }
        if !self.documents.is_empty() {
            score += 25;
        }
        if self.verified {
            score += 25;
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn personal_kind() -> GuaranteeKind {
        GuaranteeKind::Personal {
            cosigner_name: "C. Signer".to_string(),
            cosigner_document: "30123456".to_string(),
            cosigner_phone: "+541100000000".to_string(),
            monthly_income: 8_000_000,
        }
    }

    fn guarantee() -> Guarantee {
        Guarantee::new(
            ContractId::generate(),
            personal_kind(),
            2_500_000,
            "co-signed by relative",
        )
        .unwrap()
    }

    #[test]
    fn test_create_reports_every_violation() {
        let err = Guarantee::new(
            ContractId::generate(),
            GuaranteeKind::Personal {
                cosigner_name: String::new(),
                cosigner_document: String::new(),
                cosigner_phone: String::new(),
                monthly_income: 0,
            },
            0,
            "",
        )
        .unwrap_err();

        let GuaranteeError::Validation(validation) = err else {
            panic!("expected validation error");
        };
        // amount + four kind fields
        assert_eq!(validation.violations.len(), 5);
    }

    #[test]
    fn test_attach_respects_catalog() {
        let mut g = guarantee();
        g.attach_document(
            DocumentType::CosignerIdentity,
            ContentRef::new("blob://doc-1"),
        )
        .unwrap();

        let err = g
            .attach_document(DocumentType::PolicyCertificate, ContentRef::new("blob://x"))
            .unwrap_err();
        assert!(matches!(err, GuaranteeError::DocumentNotInCatalog { .. }));
    }

    #[test]
    fn test_attach_same_type_replaces() {
        let mut g = guarantee();
        g.attach_document(DocumentType::IncomeProof, ContentRef::new("blob://v1"))
            .unwrap();
        g.attach_document(DocumentType::IncomeProof, ContentRef::new("blob://v2"))
            .unwrap();

        assert_eq!(g.documents.len(), 1);
        assert_eq!(
            g.document_of(DocumentType::IncomeProof).unwrap().content_ref,
            ContentRef::new("blob://v2")
        );
    }

    #[test]
    fn test_verify_requires_approval_and_is_idempotent() {
        let mut g = guarantee();
        let err = g.verify(None).unwrap_err();
        assert!(matches!(err, GuaranteeError::NotApproved(GuaranteeStatus::Pending)));

        g.approve().unwrap();
        g.verify(Some("income proof checked".to_string())).unwrap();
        assert!(g.verified);

        // Second call keeps the original notes
        g.verify(Some("other notes".to_string())).unwrap();
        assert_eq!(
            g.verification_notes.as_deref(),
            Some("income proof checked")
        );
    }

    #[test]
    fn test_approve_only_from_pending() {
        let mut g = guarantee();
        g.approve().unwrap();
        let err = g.approve().unwrap_err();
        assert!(matches!(err, GuaranteeError::NotPending(GuaranteeStatus::Approved)));
    }

    #[test]
    fn test_completion_percentage_steps() {
        let mut g = guarantee();
        assert_eq!(g.completion_percentage(), 50); // basics + kind fields

        g.attach_document(DocumentType::IncomeProof, ContentRef::new("blob://v1"))
            .unwrap();
        assert_eq!(g.completion_percentage(), 75);

        g.approve().unwrap();
        g.verify(None).unwrap();
        assert_eq!(g.completion_percentage(), 100);
    }
}
