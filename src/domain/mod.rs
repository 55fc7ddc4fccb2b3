//! Domain types for veritas.
//!
//! This module contains the core data structures:
//! - Submission, LedgerEntry: analysed documents and their proof-of-existence records
//! - Segment, SimilarityAnalysis: output of the similarity oracle
//! - DeletionRequest, AccessLog, Identity: governance and audit records

pub mod analysis;
pub mod governance;
pub mod submission;

// Re-export commonly used types
pub use analysis::{Reference, Segment, SimilarityAnalysis};
pub use governance::{AccessLog, DeletionRequest, Identity, RequestStatus, UserRole};
pub use submission::{
    LedgerEntry, Submission, SubmissionStatus, ACTION_DRAFT_CHECK, ACTION_FINAL_SUBMISSION, UNTITLED,
};
