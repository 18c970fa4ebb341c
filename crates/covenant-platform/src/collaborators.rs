//! External collaborator seams
//!
//! Notification transport, blob storage, and document rendering live
//! outside the workflow core. The platform talks to them through these
//! traits; the reference adapters here are enough for tests and for
//! single-process deployments.

use covenant_invitation::Invitation;
use covenant_types::{ContentRef, Contract};
use std::collections::HashMap;
use std::sync::Mutex;

/// A collaborator call failed.
///
/// Carries which collaborator and the transport-level cause; the
/// workflow core never interprets the cause beyond surfacing it.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("collaborator '{collaborator}' failed: {cause}")]
pub struct DependencyError {
    pub collaborator: &'static str,
    pub cause: String,
}

impl DependencyError {
    pub fn new(collaborator: &'static str, cause: impl Into<String>) -> Self {
        Self {
            collaborator,
            cause: cause.into(),
        }
    }
}

// ── Traits ───────────────────────────────────────────────────────────

/// Delivers invitation messages over the invitation's contact channel
pub trait Notifier: Send + Sync {
    fn send_invitation(
        &self,
        invitation: &Invitation,
        contract: &Contract,
    ) -> Result<(), DependencyError>;
}

/// Opaque blob storage; the core only ever holds `ContentRef`s
pub trait FileStorage: Send + Sync {
    fn store(&self, label: &str, bytes: &[u8]) -> Result<ContentRef, DependencyError>;
    fn fetch(&self, content_ref: &ContentRef) -> Result<Vec<u8>, DependencyError>;
}

/// Renders the final contract document at publication time
pub trait DocumentRenderer: Send + Sync {
    fn render_contract_document(&self, contract: &Contract) -> Result<Vec<u8>, DependencyError>;
}

// ── Reference adapters ───────────────────────────────────────────────

/// Logs deliveries instead of sending them. Always succeeds.
#[derive(Clone, Debug, Default)]
pub struct LoggingNotifier;

impl Notifier for LoggingNotifier {
    fn send_invitation(
        &self,
        invitation: &Invitation,
        contract: &Contract,
    ) -> Result<(), DependencyError> {
        tracing::info!(
            invitation_id = %invitation.id,
            contract_number = %contract.number,
            contact = %invitation.contact,
            method = %invitation.method,
            "Invitation dispatched"
        );
        Ok(())
    }
}

/// Keeps blobs in a process-local map
#[derive(Debug, Default)]
pub struct InMemoryFileStorage {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryFileStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FileStorage for InMemoryFileStorage {
    fn store(&self, label: &str, bytes: &[u8]) -> Result<ContentRef, DependencyError> {
        let key = format!("mem://{label}/{}", uuid::Uuid::new_v4());
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| DependencyError::new("file_storage", "storage mutex poisoned"))?;
        blobs.insert(key.clone(), bytes.to_vec());
        Ok(ContentRef::new(key))
    }

    fn fetch(&self, content_ref: &ContentRef) -> Result<Vec<u8>, DependencyError> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|_| DependencyError::new("file_storage", "storage mutex poisoned"))?;
        blobs
            .get(&content_ref.0)
            .cloned()
            .ok_or_else(|| DependencyError::new("file_storage", format!("no blob at {content_ref}")))
    }
}

/// Renders a plain-text summary document. Layout is out of scope; the
/// workflow only needs deterministic bytes to hand to file storage.
#[derive(Clone, Debug, Default)]
pub struct PlainTextRenderer;

impl DocumentRenderer for PlainTextRenderer {
    fn render_contract_document(&self, contract: &Contract) -> Result<Vec<u8>, DependencyError> {
        let counterparty = contract
            .counterparty
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("(unbound)");
        let text = format!(
            "RENTAL CONTRACT {number}\n\
             issuer: {issuer}\n\
             counterparty: {counterparty}\n\
             monthly rent (minor units): {rent}\n\
             deposit (minor units): {deposit}\n\
             duration: {months} months\n",
            number = contract.number,
            issuer = contract.issuer.name,
            rent = contract.terms.monthly_rent,
            deposit = contract.terms.deposit,
            months = contract.terms.duration_months,
        );
        Ok(text.into_bytes())
    }
}
