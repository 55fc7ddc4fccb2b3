//! Integrity core.
//!
//! This module contains:
//! - Ledger: append-only proof-of-existence records
//! - SubmissionStore: analysed document snapshots
//! - VerificationService: fingerprint lookups against both
//! - GovernanceWorkflow: deletion requests
//! - Archive: file-backed persistence with atomic commits
//! - AnalysisPipeline: fingerprint → oracle → commit

pub mod access_log;
pub mod archive;
pub mod error;
pub mod governance;
pub mod ledger;
pub mod pipeline;
pub mod submissions;
pub mod verification;

// Re-export commonly used types
pub use access_log::AccessLogBook;
pub use archive::Archive;
pub use error::IntegrityError;
pub use governance::GovernanceWorkflow;
pub use ledger::{Ledger, LookupPolicy};
pub use pipeline::{truncate_chars, AnalysisOutcome, AnalysisPipeline, AnalysisRequest};
pub use submissions::{ScoreStats, SubmissionStore, CRITICAL_THRESHOLD, REVIEW_THRESHOLD};
pub use verification::{VerificationResult, VerificationService};
