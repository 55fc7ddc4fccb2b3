//! Collection of analysed submissions.
//!
//! Held newest first, like the ledger. Lookups by fingerprint use the same
//! [`LookupPolicy`] so the two stores agree for any hash recorded through
//! the normal commit path.

use serde::{Deserialize, Serialize};

use super::ledger::LookupPolicy;
use crate::domain::Submission;
use crate::integrity::Fingerprint;

/// Score above which a submission is listed for review
pub const REVIEW_THRESHOLD: f64 = 20.0;

/// Score above which a submission counts as critical
pub const CRITICAL_THRESHOLD: f64 = 30.0;

/// Owned collection of submissions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionStore {
    /// Newest first
    submissions: Vec<Submission>,
}

impl SubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a submission as the newest item
    pub fn add(&mut self, submission: Submission) {
        self.submissions.insert(0, submission);
    }

    /// Remove a submission by ID
    pub fn remove(&mut self, id: &str) -> Option<Submission> {
        let pos = self.submissions.iter().position(|s| s.id == id)?;
        Some(self.submissions.remove(pos))
    }

    /// Get a submission by ID
    pub fn get(&self, id: &str) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All submissions, newest first, optionally truncated
    pub fn list(&self, limit: Option<usize>) -> &[Submission] {
        let len = limit.map_or(self.submissions.len(), |l| l.min(self.submissions.len()));
        &self.submissions[..len]
    }

    /// Most recent submission with this fingerprint
    pub fn find_by_hash(&self, hash: &Fingerprint) -> Option<&Submission> {
        self.find_by_hash_with(hash, LookupPolicy::MostRecent)
    }

    /// Submission with this fingerprint chosen by `policy`
    pub fn find_by_hash_with(&self, hash: &Fingerprint, policy: LookupPolicy) -> Option<&Submission> {
        policy.select(self.submissions.iter().filter(|s| &s.hash == hash))
    }

    /// Version number for the next analysis of the `author_id` + `title` lineage
    pub fn next_version(&self, author_id: &str, title: &str) -> u32 {
        self.submissions
            .iter()
            .filter(|s| s.same_lineage(author_id, title))
            .map(|s| s.version)
            .max()
            .map_or(1, |v| v + 1)
    }

    /// Submissions scoring above the review threshold, newest first
    pub fn flagged_for_review(&self) -> Vec<&Submission> {
        self.submissions
            .iter()
            .filter(|s| s.similarity_score > REVIEW_THRESHOLD)
            .collect()
    }

    /// Aggregate score statistics
    pub fn stats(&self) -> ScoreStats {
        let mut stats = ScoreStats {
            total: self.submissions.len(),
            ..Default::default()
        };

        for submission in &self.submissions {
            let score = submission.similarity_score;
            let bucket = if score <= 10.0 {
                0
            } else if score <= 20.0 {
                1
            } else if score <= CRITICAL_THRESHOLD {
                2
            } else {
                3
            };
            stats.histogram[bucket] += 1;
            if score > CRITICAL_THRESHOLD {
                stats.critical += 1;
            }
        }

        if stats.total > 0 {
            let sum: f64 = self.submissions.iter().map(|s| s.similarity_score).sum();
            stats.mean_score = sum / stats.total as f64;
        }

        stats
    }

    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }
}

/// Similarity score summary across all submissions
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreStats {
    pub total: usize,
    pub mean_score: f64,
    pub critical: usize,
    /// Counts for 0-10%, 11-20%, 21-30%, 31%+
    pub histogram: [usize; 4],
}

impl ScoreStats {
    pub const BUCKET_LABELS: [&'static str; 4] = ["0-10%", "11-20%", "21-30%", "31%+"];
}
