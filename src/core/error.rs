//! Error taxonomy for the integrity core.
//!
//! A verification miss is not an error: it is `VerificationResult::NotFound`.

use std::path::PathBuf;

use thiserror::Error;

use crate::adapters::OracleError;
use crate::integrity::EncodingError;

/// Errors raised by the analysis pipeline, archive and governance workflow
#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("Document content is empty")]
    EmptyContent,

    #[error("Failed to fingerprint content: {0}")]
    Hash(#[from] EncodingError),

    #[error("Similarity analysis failed: {0}")]
    Oracle(#[from] OracleError),

    #[error("Similarity analysis timed out after {seconds}s")]
    OracleTimeout { seconds: u64 },

    #[error("A deletion request is already pending for {submission_id} ({request_id})")]
    DuplicatePendingRequest {
        submission_id: String,
        request_id: String,
    },

    #[error("Submission not found: {0}")]
    SubmissionNotFound(String),

    #[error("Ledger entry does not record submission {submission_id}")]
    LedgerMismatch { submission_id: String },

    #[error("Stored fingerprint does not match content of submission {submission_id}")]
    FingerprintMismatch { submission_id: String },

    #[error("Failed to parse {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl IntegrityError {
    /// Whether the caller can simply retry or correct input.
    ///
    /// Nothing has been committed when any of these are returned.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::EmptyContent
                | Self::Oracle(_)
                | Self::OracleTimeout { .. }
                | Self::DuplicatePendingRequest { .. }
                | Self::SubmissionNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(IntegrityError::OracleTimeout { seconds: 5 }.is_recoverable());
        assert!(IntegrityError::DuplicatePendingRequest {
            submission_id: "sub-1".into(),
            request_id: "dr-1".into(),
        }
        .is_recoverable());
        assert!(!IntegrityError::Hash(EncodingError { valid_up_to: 0 }).is_recoverable());
    }

    #[test]
    fn test_messages() {
        let err = IntegrityError::OracleTimeout { seconds: 60 };
        assert_eq!(err.to_string(), "Similarity analysis timed out after 60s");
    }
}
