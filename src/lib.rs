//! veritas - content-integrity ledger
//!
//! Fingerprints documents, records proof of their existence on an
//! append-only ledger, verifies content against that ledger, and maps
//! passages flagged by an external similarity oracle back onto the exact
//! text they came from.
//!
//! # Architecture
//!
//! - Content is identified by its SHA-256 fingerprint
//! - The ledger is append-only: entries are never edited or removed
//! - Analysis is all-or-nothing: a submission, its ledger entry and its
//!   access log are committed together or not at all
//! - Deletion is a governance request, never an erasure
//!
//! # Modules
//!
//! - `integrity`: Hasher and segment aligner
//! - `domain`: Data structures (Submission, LedgerEntry, Segment, ...)
//! - `core`: Ledger, stores, verification, governance, archive, pipeline
//! - `adapters`: Similarity oracle integrations
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Analyse and record a document
//! veritas analyze --title "Essay" -i essay.txt
//!
//! # Check whether exact content was recorded
//! veritas verify -i essay.txt
//!
//! # File a deletion request
//! veritas request-deletion <submission-id>
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod integrity;

// Re-export main types at crate root for convenience
pub use adapters::{OracleError, SimilarityOracle};
pub use self::core::{
    AnalysisPipeline, AnalysisRequest, Archive, IntegrityError, Ledger, LookupPolicy,
    SubmissionStore, VerificationResult, VerificationService,
};
pub use domain::{DeletionRequest, LedgerEntry, Segment, SimilarityAnalysis, Submission};
pub use integrity::{align, hash_content, Alignment, Fingerprint, Run};
