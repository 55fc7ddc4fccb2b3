//! Analysis Pipeline Integration Tests
//!
//! hash → oracle → commit, including the all-or-nothing failure paths.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

use veritas::adapters::{FixtureOracle, OracleError, SimilarityOracle};
use veritas::core::{AnalysisPipeline, AnalysisRequest, Archive, IntegrityError};
use veritas::domain::{Identity, Segment, SimilarityAnalysis, ACTION_DRAFT_CHECK, ACTION_FINAL_SUBMISSION};
use veritas::hash_content;

fn analysis(score: f64, segments: Vec<Segment>) -> SimilarityAnalysis {
    SimilarityAnalysis {
        score,
        summary: "Moderate overlap with published work".to_string(),
        segments,
        references: Vec::new(),
    }
}

fn identity() -> Identity {
    Identity {
        id: "u-7".to_string(),
        name: "Test Student".to_string(),
        ..Identity::default()
    }
}

/// Oracle that always fails
struct FailingOracle;

#[async_trait]
impl SimilarityOracle for FailingOracle {
    fn name(&self) -> &str {
        "failing"
    }

    async fn analyze(&self, _text: &str) -> Result<SimilarityAnalysis, OracleError> {
        Err(OracleError::EmptyResponse)
    }
}

/// Oracle that never answers in time
struct SlowOracle;

#[async_trait]
impl SimilarityOracle for SlowOracle {
    fn name(&self) -> &str {
        "slow"
    }

    async fn analyze(&self, _text: &str) -> Result<SimilarityAnalysis, OracleError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(analysis(0.0, Vec::new()))
    }
}

/// Oracle that remembers what it was sent
#[derive(Default)]
struct RecordingOracle {
    seen: Arc<Mutex<Option<String>>>,
}

#[async_trait]
impl SimilarityOracle for RecordingOracle {
    fn name(&self) -> &str {
        "recording"
    }

    async fn analyze(&self, text: &str) -> Result<SimilarityAnalysis, OracleError> {
        *self.seen.lock().unwrap() = Some(text.to_string());
        Ok(analysis(5.0, Vec::new()))
    }
}

#[tokio::test]
async fn test_successful_analysis_records_everything() {
    let temp = TempDir::new().unwrap();
    let mut archive = Archive::open(temp.path()).await.unwrap();
    let oracle = FixtureOracle::inline(analysis(42.0, vec![Segment::new("quick brown", 0.9)]));
    let pipeline = AnalysisPipeline::new(oracle, identity());

    let outcome = pipeline
        .run(&mut archive, AnalysisRequest::draft("Fox essay", "The quick brown fox"))
        .await
        .unwrap();

    let submission = &outcome.submission;
    assert_eq!(submission.hash, hash_content("The quick brown fox"));
    assert_eq!(submission.similarity_score, 42.0);
    assert_eq!(submission.author_id, "u-7");
    assert_eq!(submission.version, 1);
    assert_eq!(submission.ai_explanation.as_deref(), Some("Moderate overlap with published work"));

    assert_eq!(outcome.entry.submission_id, submission.id);
    assert_eq!(outcome.entry.actor, "Test Student");
    assert_eq!(outcome.entry.action, ACTION_DRAFT_CHECK);

    assert_eq!(outcome.alignment.applied(), 1);
    assert_eq!(outcome.alignment.text(), "The quick brown fox");

    assert_eq!(archive.submissions().len(), 1);
    assert_eq!(archive.ledger().len(), 1);
    assert_eq!(archive.access_log().len(), 1);
    assert_eq!(archive.access_log().records()[0].resource_id, "Fox essay");

    let verdict = archive.verifier().verify("The quick brown fox");
    assert!(verdict.is_consistent());
}

#[tokio::test]
async fn test_oracle_failure_commits_nothing() {
    let temp = TempDir::new().unwrap();
    let mut archive = Archive::open(temp.path()).await.unwrap();
    let pipeline = AnalysisPipeline::new(FailingOracle, identity());

    let err = pipeline
        .run(&mut archive, AnalysisRequest::draft("Essay", "some text"))
        .await
        .unwrap_err();

    assert!(matches!(err, IntegrityError::Oracle(OracleError::EmptyResponse)));
    assert!(err.is_recoverable());
    assert!(archive.submissions().is_empty());
    assert!(archive.ledger().is_empty());
    assert!(archive.access_log().is_empty());
    assert!(!temp.path().join("ledger.json").exists());
}

#[tokio::test]
async fn test_oracle_timeout_is_recoverable() {
    let temp = TempDir::new().unwrap();
    let mut archive = Archive::open(temp.path()).await.unwrap();
    let pipeline = AnalysisPipeline::new(SlowOracle, identity()).with_timeout(Duration::from_millis(50));

    let result = pipeline
        .run(&mut archive, AnalysisRequest::draft("Essay", "some text"))
        .await;

    let err = assert_err!(result);
    assert!(matches!(err, IntegrityError::OracleTimeout { .. }));
    assert!(archive.ledger().is_empty());
}

#[tokio::test]
async fn test_blank_content_is_rejected_before_oracle() {
    let temp = TempDir::new().unwrap();
    let mut archive = Archive::open(temp.path()).await.unwrap();
    let oracle = RecordingOracle::default();
    let pipeline = AnalysisPipeline::new(oracle, identity());

    let err = pipeline
        .run(&mut archive, AnalysisRequest::draft("Essay", "  \n\t "))
        .await
        .unwrap_err();

    assert!(matches!(err, IntegrityError::EmptyContent));
    assert!(archive.submissions().is_empty());
}

#[tokio::test]
async fn test_only_leading_chars_are_sent() {
    let temp = TempDir::new().unwrap();
    let mut archive = Archive::open(temp.path()).await.unwrap();
    let oracle = RecordingOracle::default();
    let seen = Arc::clone(&oracle.seen);
    let pipeline = AnalysisPipeline::new(oracle, identity()).with_max_input_chars(10);

    let content = "é".repeat(25);
    let outcome = assert_ok!(
        pipeline
            .run(&mut archive, AnalysisRequest::draft("Long", content.clone()))
            .await
    );

    assert_eq!(seen.lock().unwrap().as_deref(), Some("é".repeat(10).as_str()));

    // The full document is still what gets fingerprinted and stored
    assert_eq!(outcome.submission.content, content);
    assert_eq!(outcome.submission.hash, hash_content(&content));
}

#[tokio::test]
async fn test_reanalysis_increments_version() {
    let temp = TempDir::new().unwrap();
    let mut archive = Archive::open(temp.path()).await.unwrap();
    let pipeline = AnalysisPipeline::new(FixtureOracle::inline(analysis(10.0, Vec::new())), identity());

    let first = pipeline
        .run(&mut archive, AnalysisRequest::draft("Thesis", "draft one"))
        .await
        .unwrap();
    let second = pipeline
        .run(&mut archive, AnalysisRequest::draft("Thesis", "draft two"))
        .await
        .unwrap();
    let other = pipeline
        .run(&mut archive, AnalysisRequest::draft("Other", "draft one"))
        .await
        .unwrap();

    assert_eq!(first.submission.version, 1);
    assert_eq!(second.submission.version, 2);
    assert_eq!(other.submission.version, 1);
    assert_eq!(archive.ledger().len(), 3);
}

#[tokio::test]
async fn test_final_submission_action() {
    let temp = TempDir::new().unwrap();
    let mut archive = Archive::open(temp.path()).await.unwrap();
    let pipeline = AnalysisPipeline::new(FixtureOracle::inline(analysis(3.0, Vec::new())), identity());

    let outcome = pipeline
        .run(&mut archive, AnalysisRequest::draft("Thesis", "final text").finalized())
        .await
        .unwrap();

    assert_eq!(outcome.entry.action, ACTION_FINAL_SUBMISSION);
}

#[tokio::test]
async fn test_untitled_default() {
    let temp = TempDir::new().unwrap();
    let mut archive = Archive::open(temp.path()).await.unwrap();
    let pipeline = AnalysisPipeline::new(FixtureOracle::inline(analysis(3.0, Vec::new())), identity());

    let outcome = pipeline
        .run(&mut archive, AnalysisRequest::draft("", "text"))
        .await
        .unwrap();

    assert_eq!(outcome.submission.title, veritas::domain::UNTITLED);
}

#[tokio::test]
async fn test_version_increments_across_archive_handles() {
    let temp = TempDir::new().unwrap();
    let mut first = Archive::open(temp.path()).await.unwrap();
    let mut second = Archive::open(temp.path()).await.unwrap();
    let pipeline = AnalysisPipeline::new(FixtureOracle::inline(analysis(10.0, Vec::new())), identity());

    let one = pipeline
        .run(&mut first, AnalysisRequest::draft("Thesis", "draft one"))
        .await
        .unwrap();
    let two = pipeline
        .run(&mut second, AnalysisRequest::draft("Thesis", "draft two"))
        .await
        .unwrap();

    assert_eq!(one.submission.version, 1);
    assert_eq!(two.submission.version, 2);

    let reopened = Archive::open(temp.path()).await.unwrap();
    assert_eq!(reopened.submissions().get(&two.submission.id).unwrap().version, 2);
}
