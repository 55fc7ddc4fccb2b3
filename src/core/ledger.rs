//! Append-only proof-of-existence ledger.
//!
//! Entries are held newest first. Identical content may be recorded more
//! than once, so lookups take an explicit [`LookupPolicy`]; the default is
//! most-recent-wins.

use serde::{Deserialize, Serialize};

use crate::domain::LedgerEntry;
use crate::integrity::Fingerprint;

/// Which record wins when several share a fingerprint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LookupPolicy {
    /// The most recently recorded match
    #[default]
    MostRecent,

    /// The first match ever recorded
    Earliest,
}

impl LookupPolicy {
    /// Pick from a newest-first sequence according to the policy
    pub(crate) fn select<'a, T, I>(self, mut newest_first: I) -> Option<&'a T>
    where
        I: DoubleEndedIterator<Item = &'a T>,
    {
        match self {
            LookupPolicy::MostRecent => newest_first.next(),
            LookupPolicy::Earliest => newest_first.next_back(),
        }
    }
}

/// Hash-indexed, append-only record store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    /// Newest first
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry. It is visible to every subsequent read.
    pub fn append(&mut self, entry: LedgerEntry) {
        self.entries.insert(0, entry);
    }

    /// Most recent entry for `hash`
    pub fn find_by_hash(&self, hash: &Fingerprint) -> Option<&LedgerEntry> {
        self.find_by_hash_with(hash, LookupPolicy::MostRecent)
    }

    /// Entry for `hash` chosen by `policy`
    pub fn find_by_hash_with(&self, hash: &Fingerprint, policy: LookupPolicy) -> Option<&LedgerEntry> {
        policy.select(self.entries.iter().filter(|e| &e.hash == hash))
    }

    /// Every entry for `hash`, newest first
    pub fn find_all_by_hash(&self, hash: &Fingerprint) -> Vec<&LedgerEntry> {
        self.entries.iter().filter(|e| &e.hash == hash).collect()
    }

    /// Entries recorded for a submission, newest first
    pub fn for_submission(&self, submission_id: &str) -> Vec<&LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| e.submission_id == submission_id)
            .collect()
    }

    /// All entries, newest first
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Up to `limit` most recent entries
    pub fn recent(&self, limit: usize) -> &[LedgerEntry] {
        &self.entries[..limit.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
