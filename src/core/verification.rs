//! Authenticity verification against the ledger.
//!
//! `verify` hashes the candidate text, looks the fingerprint up in the
//! ledger and, independently, in the submission store. The two lookups are
//! not required to agree: a submission may have been removed while its
//! ledger entry lives on, so `Found` carries an optional submission.
//!
//! Verification is a pure read. Callers that want an audit trail record an
//! access log themselves.

use serde::Serialize;

use super::ledger::{Ledger, LookupPolicy};
use super::submissions::SubmissionStore;
use crate::domain::{LedgerEntry, Submission};
use crate::integrity::{hash_content, Fingerprint};

/// Verdict for one piece of content
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum VerificationResult {
    /// The fingerprint is on the ledger
    Found {
        hash: Fingerprint,
        entry: LedgerEntry,
        /// Matching submission, if one is still stored
        submission: Option<Submission>,
    },

    /// The fingerprint was never recorded
    NotFound { hash: Fingerprint },
}

impl VerificationResult {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Fingerprint of the verified content
    pub fn hash(&self) -> &Fingerprint {
        match self {
            Self::Found { hash, .. } | Self::NotFound { hash } => hash,
        }
    }

    pub fn entry(&self) -> Option<&LedgerEntry> {
        match self {
            Self::Found { entry, .. } => Some(entry),
            Self::NotFound { .. } => None,
        }
    }

    pub fn submission(&self) -> Option<&Submission> {
        match self {
            Self::Found { submission, .. } => submission.as_ref(),
            Self::NotFound { .. } => None,
        }
    }

    /// Found, with a stored submission that the ledger entry points at
    pub fn is_consistent(&self) -> bool {
        match self {
            Self::Found {
                entry,
                submission: Some(submission),
                ..
            } => entry.submission_id == submission.id,
            _ => false,
        }
    }
}

/// Read-only view over the ledger and submission store
#[derive(Debug, Clone, Copy)]
pub struct VerificationService<'a> {
    ledger: &'a Ledger,
    submissions: &'a SubmissionStore,
    policy: LookupPolicy,
}

impl<'a> VerificationService<'a> {
    /// Create a service using most-recent-wins lookups
    pub fn new(ledger: &'a Ledger, submissions: &'a SubmissionStore) -> Self {
        Self {
            ledger,
            submissions,
            policy: LookupPolicy::MostRecent,
        }
    }

    /// Use a different match policy for duplicate fingerprints
    pub fn with_policy(mut self, policy: LookupPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Verify a piece of content
    pub fn verify(&self, content: &str) -> VerificationResult {
        self.verify_fingerprint(&hash_content(content))
    }

    /// Verify a fingerprint computed elsewhere
    pub fn verify_fingerprint(&self, hash: &Fingerprint) -> VerificationResult {
        let entry = self.ledger.find_by_hash_with(hash, self.policy);
        let submission = self.submissions.find_by_hash_with(hash, self.policy);

        match entry {
            Some(entry) => VerificationResult::Found {
                hash: hash.clone(),
                entry: entry.clone(),
                submission: submission.cloned(),
            },
            None => VerificationResult::NotFound { hash: hash.clone() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SubmissionStatus;

    fn record(ledger: &mut Ledger, store: &mut SubmissionStore, content: &str) -> Submission {
        let sub = Submission::new("Essay", content, "u-1", SubmissionStatus::Draft, 3.0, 1);
        ledger.append(LedgerEntry::for_submission(&sub, "tester"));
        store.add(sub.clone());
        sub
    }

    #[test]
    fn test_found_and_consistent() {
        let (mut ledger, mut store) = (Ledger::new(), SubmissionStore::new());
        let sub = record(&mut ledger, &mut store, "original work");

        let result = VerificationService::new(&ledger, &store).verify("original work");
        assert!(result.is_found());
        assert!(result.is_consistent());
        assert_eq!(result.submission().unwrap().id, sub.id);
        assert_eq!(result.entry().unwrap().submission_id, sub.id);
    }

    #[test]
    fn test_not_found_carries_hash() {
        let (ledger, store) = (Ledger::new(), SubmissionStore::new());
        let result = VerificationService::new(&ledger, &store).verify("never seen");

        assert!(!result.is_found());
        assert!(result.entry().is_none());
        assert!(result.submission().is_none());
        assert_eq!(result.hash(), &hash_content("never seen"));
    }

    #[test]
    fn test_found_without_submission() {
        let (mut ledger, mut store) = (Ledger::new(), SubmissionStore::new());
        let sub = record(&mut ledger, &mut store, "removed later");
        store.remove(&sub.id);

        let result = VerificationService::new(&ledger, &store).verify("removed later");
        assert!(result.is_found());
        assert!(result.submission().is_none());
        assert!(!result.is_consistent());
    }

    #[test]
    fn test_policy_selects_entry() {
        let (mut ledger, mut store) = (Ledger::new(), SubmissionStore::new());
        let first = record(&mut ledger, &mut store, "resubmitted");
        let second = record(&mut ledger, &mut store, "resubmitted");

        let service = VerificationService::new(&ledger, &store);
        assert_eq!(service.verify("resubmitted").entry().unwrap().submission_id, second.id);

        let earliest = service.with_policy(LookupPolicy::Earliest).verify("resubmitted");
        assert_eq!(earliest.entry().unwrap().submission_id, first.id);
        assert!(earliest.is_consistent());
    }
}
