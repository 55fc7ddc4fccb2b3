//! Similarity oracle adapters.
//!
//! The oracle is an external service that reads a document and reports an
//! overall similarity score plus the passages it believes overlap with other
//! sources. It is treated as opaque, possibly slow and possibly failing: one
//! attempt, failures surfaced to the caller.

pub mod chat;
pub mod fixture;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::SimilarityAnalysis;

pub use chat::ChatCompletionsOracle;
pub use fixture::FixtureOracle;

/// Failures talking to or understanding the oracle
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("No API key configured (set VERITAS_API_KEY or OPENAI_API_KEY)")]
    MissingApiKey,

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Oracle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Oracle response contained no analysis")]
    EmptyResponse,

    #[error("Failed to parse oracle response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read analysis fixture: {0}")]
    Io(#[from] std::io::Error),
}

/// External similarity-analysis service
#[async_trait]
pub trait SimilarityOracle: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Analyse a document excerpt
    async fn analyze(&self, text: &str) -> Result<SimilarityAnalysis, OracleError>;
}

#[async_trait]
impl<T: SimilarityOracle + ?Sized> SimilarityOracle for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn analyze(&self, text: &str) -> Result<SimilarityAnalysis, OracleError> {
        (**self).analyze(text).await
    }
}
