//! Opaque references to externally-stored content
//!
//! The workflow core never inspects raw bytes. Guarantee documents and
//! biometric captures are carried as refs owned by the file-storage
//! collaborator.

use serde::{Deserialize, Serialize};

/// Opaque handle to a blob held by the external file storage
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef(pub String);

impl ContentRef {
    pub fn new(r: impl Into<String>) -> Self {
        Self(r.into())
    }
}

impl std::fmt::Display for ContentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
