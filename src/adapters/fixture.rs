//! Offline oracle that replays a saved analysis.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{OracleError, SimilarityOracle};
use crate::domain::SimilarityAnalysis;

/// Oracle returning a fixed analysis
pub enum FixtureOracle {
    /// Analysis held in memory
    Inline(SimilarityAnalysis),

    /// Analysis read from a JSON file on each call
    File(PathBuf),
}

impl FixtureOracle {
    pub fn inline(analysis: SimilarityAnalysis) -> Self {
        Self::Inline(analysis)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }
}

#[async_trait]
impl SimilarityOracle for FixtureOracle {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn analyze(&self, _text: &str) -> Result<SimilarityAnalysis, OracleError> {
        let analysis = match self {
            FixtureOracle::Inline(analysis) => analysis.clone(),
            FixtureOracle::File(path) => {
                let content = tokio::fs::read_to_string(path).await?;
                serde_json::from_str(&content)?
            }
        };
        Ok(analysis.normalized())
    }
}
