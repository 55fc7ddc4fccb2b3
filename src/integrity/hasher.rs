//! Content fingerprinting.
//!
//! A fingerprint is the SHA-256 digest of the UTF-8 bytes of a document,
//! hex-encoded in lowercase (64 characters). No salt, no prefix: the same
//! text always produces the same fingerprint, in any process.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Length of a hex-encoded SHA-256 digest
pub const FINGERPRINT_HEX_LEN: usize = 64;

/// Raised when input bytes are not a canonical (UTF-8) text encoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Input is not valid UTF-8 text (invalid byte at offset {valid_up_to})")]
pub struct EncodingError {
    /// Number of leading bytes that were valid UTF-8
    pub valid_up_to: usize,
}

/// Raised when a stored or supplied fingerprint is not a 64-char hex digest
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid fingerprint: {0:?}")]
pub struct InvalidFingerprint(pub String);

/// Lowercase hex SHA-256 digest of document content
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Parse a fingerprint from its hex form.
    ///
    /// Uppercase input is accepted and normalised to lowercase.
    pub fn parse(hex_digest: &str) -> Option<Self> {
        let trimmed = hex_digest.trim();
        if trimmed.len() != FINGERPRINT_HEX_LEN || !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        Some(Self(trimmed.to_ascii_lowercase()))
    }

    /// Get the raw hex string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form for display, e.g. `a7f2c1d0...8e11`
    pub fn short(&self) -> String {
        format!("{}...{}", &self.0[..8], &self.0[FINGERPRINT_HEX_LEN - 4..])
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = InvalidFingerprint;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(InvalidFingerprint(value))
    }
}

impl From<Fingerprint> for String {
    fn from(fingerprint: Fingerprint) -> Self {
        fingerprint.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fingerprint in-memory text.
///
/// Rust strings are always valid UTF-8, so this cannot fail.
pub fn hash_content(content: &str) -> Fingerprint {
    digest(content.as_bytes())
}

/// Fingerprint raw bytes that are expected to hold UTF-8 text
pub fn hash_bytes(bytes: &[u8]) -> Result<Fingerprint, EncodingError> {
    let text = std::str::from_utf8(bytes).map_err(|e| EncodingError {
        valid_up_to: e.valid_up_to(),
    })?;
    Ok(hash_content(text))
}

fn digest(bytes: &[u8]) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    Fingerprint(hex::encode(hasher.finalize()))
}
