//! Submissions and their proof-of-existence ledger entries.
//!
//! A submission is a snapshot of one document at the moment it was analysed.
//! Snapshots are never edited: re-analysing a document produces a new
//! submission with a higher `version`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::integrity::{hash_content, Fingerprint};

/// Ledger action recorded for a draft analysis
pub const ACTION_DRAFT_CHECK: &str = "DRAFT_CHECK";

/// Ledger action recorded for a final submission
pub const ACTION_FINAL_SUBMISSION: &str = "FINAL_SUBMISSION";

/// Title used when the author leaves it blank
pub const UNTITLED: &str = "Untitled Draft";

/// Lifecycle status of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    /// Work in progress
    Draft,

    /// Submitted for grading
    Final,
}

impl SubmissionStatus {
    /// Ledger action tag for a submission recorded with this status
    pub fn ledger_action(self) -> &'static str {
        match self {
            Self::Draft => ACTION_DRAFT_CHECK,
            Self::Final => ACTION_FINAL_SUBMISSION,
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "DRAFT"),
            Self::Final => write!(f, "FINAL"),
        }
    }
}

/// One analysed document snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Unique identifier (`sub-<uuid>`)
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// The audited payload
    pub content: String,

    /// Fingerprint of `content` at creation time
    pub hash: Fingerprint,

    /// When the submission was created
    pub timestamp: DateTime<Utc>,

    /// Draft or final
    pub status: SubmissionStatus,

    /// Author identity
    pub author_id: String,

    /// Overall similarity score reported by the oracle (0-100)
    pub similarity_score: f64,

    /// Oracle summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_explanation: Option<String>,

    /// Position in the document lineage (author + title), starting at 1
    pub version: u32,
}

impl Submission {
    /// Create a new submission, fingerprinting `content`
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author_id: impl Into<String>,
        status: SubmissionStatus,
        similarity_score: f64,
        version: u32,
    ) -> Self {
        let content = content.into();
        let title = title.into();
        let title = if title.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            title
        };

        Self {
            id: format!("sub-{}", Uuid::new_v4().simple()),
            hash: hash_content(&content),
            title,
            content,
            timestamp: Utc::now(),
            status,
            author_id: author_id.into(),
            similarity_score: similarity_score.clamp(0.0, 100.0),
            ai_explanation: None,
            version: version.max(1),
        }
    }

    /// Attach the oracle's summary
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.ai_explanation = Some(explanation.into());
        self
    }

    /// Whether the stored fingerprint still matches the content
    pub fn hash_matches(&self) -> bool {
        hash_content(&self.content) == self.hash
    }

    /// Whether this submission belongs to the `author_id` + `title` lineage
    pub fn same_lineage(&self, author_id: &str, title: &str) -> bool {
        self.author_id == author_id && self.title == title
    }
}

/// Immutable proof-of-existence record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Fingerprint of the recorded content (not unique across entries)
    pub hash: Fingerprint,

    /// Submission that produced this entry
    pub submission_id: String,

    /// When the entry was recorded
    pub timestamp: DateTime<Utc>,

    /// Who recorded it
    pub actor: String,

    /// Free-form action tag, e.g. `DRAFT_CHECK`
    pub action: String,
}

impl LedgerEntry {
    /// Create a ledger entry with the current timestamp
    pub fn new(
        hash: Fingerprint,
        submission_id: impl Into<String>,
        actor: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            hash,
            submission_id: submission_id.into(),
            timestamp: Utc::now(),
            actor: actor.into(),
            action: action.into(),
        }
    }

    /// Entry recording `submission`, tagged by its status
    pub fn for_submission(submission: &Submission, actor: impl Into<String>) -> Self {
        Self::new(
            submission.hash.clone(),
            submission.id.clone(),
            actor,
            submission.status.ledger_action(),
        )
    }

    /// Whether this entry records `submission`
    pub fn records(&self, submission: &Submission) -> bool {
        self.hash == submission.hash && self.submission_id == submission.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_submission_fingerprints_content() {
        let sub = Submission::new("Essay", "body text", "u-1", SubmissionStatus::Draft, 12.0, 1);
        assert!(sub.id.starts_with("sub-"));
        assert_eq!(sub.hash, hash_content("body text"));
        assert!(sub.hash_matches());
    }

    #[test]
    fn test_blank_title_defaults() {
        let sub = Submission::new("   ", "x", "u-1", SubmissionStatus::Draft, 0.0, 1);
        assert_eq!(sub.title, UNTITLED);
    }

    #[test]
    fn test_score_and_version_are_bounded() {
        let sub = Submission::new("t", "x", "u-1", SubmissionStatus::Draft, 140.0, 0);
        assert_eq!(sub.similarity_score, 100.0);
        assert_eq!(sub.version, 1);
    }

    #[test]
    fn test_ledger_entry_for_submission() {
        let sub = Submission::new("t", "x", "u-1", SubmissionStatus::Final, 5.0, 1);
        let entry = LedgerEntry::for_submission(&sub, "Demo Student");
        assert!(entry.records(&sub));
        assert_eq!(entry.action, ACTION_FINAL_SUBMISSION);
    }

    #[test]
    fn test_serialized_field_names() {
        let sub = Submission::new("t", "x", "u-1", SubmissionStatus::Draft, 5.0, 1);
        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json["status"], "DRAFT");
        assert_eq!(json["authorId"], "u-1");
        assert!(json.get("similarityScore").is_some());
        assert!(json.get("aiExplanation").is_none());

        let parsed: Submission = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, sub);
    }
}
