//! Invitation tokens: opaque, unguessable, single-use

use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Number of random bytes per token. 32 bytes = 256 bits of entropy,
/// comfortably past the 128-bit guessing-resistance floor.
const TOKEN_BYTES: usize = 32;

/// An opaque invitation token
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InviteToken(pub String);

impl InviteToken {
    /// Generate a fresh token from OS entropy
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Redacted form for logs: first 8 hex chars only
    pub fn redacted(&self) -> String {
        format!("{}…", &self.0[..8.min(self.0.len())])
    }
}

impl std::fmt::Display for InviteToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Full tokens never hit Display; always redacted
        write!(f, "{}", self.redacted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_length_and_uniqueness() {
        let a = InviteToken::generate();
        let b = InviteToken::generate();
        assert_eq!(a.0.len(), TOKEN_BYTES * 2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_is_redacted() {
        let token = InviteToken::generate();
        let shown = token.to_string();
        assert!(shown.len() < token.0.len());
        assert!(token.0.starts_with(&shown[..8]));
    }
}
