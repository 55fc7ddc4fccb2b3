//! Analysis pipeline: fingerprint → similarity oracle → commit.
//!
//! The pipeline is all-or-nothing. Any failure before the commit (blank
//! input, oracle error, oracle timeout) returns an error with nothing
//! written; the commit itself is atomic in the [`Archive`]. There is no
//! automatic retry: the caller re-invokes the whole pipeline.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use super::access_log::{ANALYSIS_ENTITY, ANALYSIS_PURPOSE};
use super::archive::Archive;
use super::error::IntegrityError;
use crate::adapters::SimilarityOracle;
use crate::config::OracleSettings;
use crate::domain::{
    AccessLog, Identity, LedgerEntry, SimilarityAnalysis, Submission, SubmissionStatus, UNTITLED,
};
use crate::integrity::{align, hash_content, Alignment, EncodingError};

/// A document to analyse
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub title: String,
    pub content: String,
    pub status: SubmissionStatus,
}

impl AnalysisRequest {
    /// Draft analysis of `content`
    pub fn draft(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            status: SubmissionStatus::Draft,
        }
    }

    /// Build a request from raw bytes that must be UTF-8 text
    pub fn from_bytes(
        title: impl Into<String>,
        bytes: Vec<u8>,
        status: SubmissionStatus,
    ) -> Result<Self, IntegrityError> {
        let content = String::from_utf8(bytes).map_err(|e| EncodingError {
            valid_up_to: e.utf8_error().valid_up_to(),
        })?;
        Ok(Self {
            title: title.into(),
            content,
            status,
        })
    }

    /// Mark the analysis as a final submission
    pub fn finalized(mut self) -> Self {
        self.status = SubmissionStatus::Final;
        self
    }

    fn normalized_title(&self) -> String {
        let title = self.title.trim();
        if title.is_empty() {
            UNTITLED.to_string()
        } else {
            title.to_string()
        }
    }
}

/// Everything produced by one successful analysis
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub submission: Submission,
    pub entry: LedgerEntry,
    pub analysis: SimilarityAnalysis,
    pub alignment: Alignment,
}

/// Runs documents through the oracle and records them on the ledger
pub struct AnalysisPipeline<O> {
    oracle: O,
    identity: Identity,
    timeout: Duration,
    max_input_chars: usize,
}

impl<O: SimilarityOracle> AnalysisPipeline<O> {
    /// Create a pipeline with default limits
    pub fn new(oracle: O, identity: Identity) -> Self {
        let defaults = OracleSettings::default();
        Self {
            oracle,
            identity,
            timeout: Duration::from_secs(defaults.timeout_seconds),
            max_input_chars: defaults.max_input_chars,
        }
    }

    /// Create a pipeline using configured limits
    pub fn from_settings(oracle: O, identity: Identity, settings: &OracleSettings) -> Self {
        Self::new(oracle, identity)
            .with_timeout(Duration::from_secs(settings.timeout_seconds))
            .with_max_input_chars(settings.max_input_chars)
    }

    /// Bound the oracle call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Limit how much of the document is sent to the oracle
    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    /// Analyse a document and record it
    #[instrument(skip(self, archive, request), fields(oracle = %self.oracle.name(), title = %request.title))]
    pub async fn run(
        &self,
        archive: &mut Archive,
        request: AnalysisRequest,
    ) -> Result<AnalysisOutcome, IntegrityError> {
        if request.content.trim().is_empty() {
            return Err(IntegrityError::EmptyContent);
        }

        let hash = hash_content(&request.content);
        debug!(%hash, "Document fingerprinted");

        let excerpt = truncate_chars(&request.content, self.max_input_chars);
        let analysis = match timeout(self.timeout, self.oracle.analyze(excerpt)).await {
            Ok(Ok(analysis)) => analysis.normalized(),
            Ok(Err(e)) => {
                warn!(error = %e, "Similarity analysis failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Similarity analysis timed out");
                return Err(IntegrityError::OracleTimeout {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let title = request.normalized_title();

        // Version is assigned by the archive under its lock
        let submission = Submission::new(
            title.clone(),
            request.content,
            self.identity.id.clone(),
            request.status,
            analysis.score,
            1,
        )
        .with_explanation(analysis.summary.clone());
        let entry = LedgerEntry::for_submission(&submission, self.identity.name.clone());
        let access = AccessLog::new(ANALYSIS_ENTITY, ANALYSIS_PURPOSE, title);

        let submission = archive
            .commit_analysis(submission, entry.clone(), access)
            .await?;

        let alignment = align(&submission.content, &analysis.segments);
        if alignment.dropped() > 0 {
            debug!(
                applied = alignment.applied(),
                dropped = alignment.dropped(),
                "Some oracle segments could not be placed"
            );
        }

        info!(
            submission_id = %submission.id,
            score = submission.similarity_score,
            version = submission.version,
            "Analysis complete"
        );

        Ok(AnalysisOutcome {
            submission,
            entry,
            analysis,
            alignment,
        })
    }
}

/// First `max_chars` characters of `text`, never splitting a char
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
