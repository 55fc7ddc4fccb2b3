//! Persistence-backed store for every integrity collection.
//!
//! Each collection is a pretty-printed JSON list (newest first) in the
//! archive directory, read at open and rewritten in full after a change:
//!
//! ```text
//! ~/.veritas/
//! ├── .veritas.lock            # held while a mutation is in progress
//! ├── submissions.json
//! ├── ledger.json
//! ├── access_log.json
//! └── deletion_requests.json
//! ```
//!
//! Mutations run under an exclusive file lock: reload from disk, apply the
//! change to a copy, stage every touched collection in a synced temp file,
//! then rename the temp files into place and swap the in-memory state. An
//! error before the renames leaves both disk and memory untouched. Each
//! rename is atomic on its own; a crash part way through the renames can
//! leave only the earlier files replaced, so they are ordered to make that
//! intermediate state a legal one.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{debug, info};

use super::access_log::AccessLogBook;
use super::error::IntegrityError;
use super::governance::GovernanceWorkflow;
use super::ledger::Ledger;
use super::submissions::SubmissionStore;
use super::verification::VerificationService;
use crate::domain::{AccessLog, DeletionRequest, LedgerEntry, Submission};

const LOCK_FILE: &str = ".veritas.lock";

/// Replacement order for an analysis commit, ledger first
const COMMIT_ORDER: [Collection; 3] = [
    Collection::Ledger,
    Collection::Submissions,
    Collection::AccessLog,
];

/// One persisted collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Submissions,
    Ledger,
    AccessLog,
    DeletionRequests,
}

impl Collection {
    fn file_name(self) -> &'static str {
        match self {
            Collection::Submissions => "submissions.json",
            Collection::Ledger => "ledger.json",
            Collection::AccessLog => "access_log.json",
            Collection::DeletionRequests => "deletion_requests.json",
        }
    }
}

/// In-memory copy of every collection
#[derive(Debug, Clone, Default)]
struct ArchiveState {
    submissions: SubmissionStore,
    ledger: Ledger,
    access_log: AccessLogBook,
    governance: GovernanceWorkflow,
}

impl ArchiveState {
    fn serialize(&self, collection: Collection) -> Result<String, serde_json::Error> {
        match collection {
            Collection::Submissions => serde_json::to_string_pretty(&self.submissions),
            Collection::Ledger => serde_json::to_string_pretty(&self.ledger),
            Collection::AccessLog => serde_json::to_string_pretty(&self.access_log),
            Collection::DeletionRequests => serde_json::to_string_pretty(&self.governance),
        }
    }
}

/// File-backed archive of submissions, ledger, access log and requests
#[derive(Debug)]
pub struct Archive {
    root: PathBuf,
    state: ArchiveState,
}

impl Archive {
    /// Open (or create) the archive in `root`
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, IntegrityError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;

        let state = load_state(&root).await?;
        debug!(
            root = %root.display(),
            submissions = state.submissions.len(),
            ledger = state.ledger.len(),
            "Archive opened"
        );

        Ok(Self { root, state })
    }

    /// Open the archive in the configured home directory
    pub async fn open_default() -> anyhow::Result<Self> {
        let home = crate::config::veritas_home()?;
        Ok(Self::open(home).await?)
    }

    /// Directory holding the collection files
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn submissions(&self) -> &SubmissionStore {
        &self.state.submissions
    }

    pub fn ledger(&self) -> &Ledger {
        &self.state.ledger
    }

    pub fn access_log(&self) -> &AccessLogBook {
        &self.state.access_log
    }

    pub fn governance(&self) -> &GovernanceWorkflow {
        &self.state.governance
    }

    /// Verification service over the current state
    pub fn verifier(&self) -> VerificationService<'_> {
        VerificationService::new(&self.state.ledger, &self.state.submissions)
    }

    /// Re-read every collection from disk
    pub async fn reload(&mut self) -> Result<(), IntegrityError> {
        self.state = load_state(&self.root).await?;
        Ok(())
    }

    /// Record an analysed submission, its ledger entry and its access log
    /// in one locked transaction.
    ///
    /// The lineage version is assigned here from the state reloaded under
    /// the lock, so two handles on one directory never reuse a version.
    /// Returns the submission as stored.
    ///
    /// The ledger is replaced first. If the process dies before the
    /// submission file is renamed, the ledger entry outlives its
    /// submission, which verification already reports as `Found` with no
    /// stored submission.
    pub async fn commit_analysis(
        &mut self,
        mut submission: Submission,
        entry: LedgerEntry,
        access: AccessLog,
    ) -> Result<Submission, IntegrityError> {
        if !submission.hash_matches() {
            return Err(IntegrityError::FingerprintMismatch {
                submission_id: submission.id,
            });
        }
        if !entry.records(&submission) {
            return Err(IntegrityError::LedgerMismatch {
                submission_id: submission.id,
            });
        }

        let committed = self
            .transact(&COMMIT_ORDER, move |state| {
                submission.version = state
                    .submissions
                    .next_version(&submission.author_id, &submission.title);
                state.submissions.add(submission.clone());
                state.ledger.append(entry);
                state.access_log.record(access);
                Ok(submission)
            })
            .await?;

        info!(
            submission_id = %committed.id,
            hash = %committed.hash,
            version = committed.version,
            "Submission recorded on ledger"
        );
        Ok(committed)
    }

    /// Remove a submission. Its ledger entries are kept.
    pub async fn remove_submission(&mut self, id: &str) -> Result<Submission, IntegrityError> {
        let removed = self
            .transact(&[Collection::Submissions], |state| {
                state
                    .submissions
                    .remove(id)
                    .ok_or_else(|| IntegrityError::SubmissionNotFound(id.to_string()))
            })
            .await?;

        info!(submission_id = %removed.id, "Submission removed");
        Ok(removed)
    }

    /// File a deletion request through the governance workflow
    pub async fn file_deletion_request(
        &mut self,
        submission_id: &str,
    ) -> Result<DeletionRequest, IntegrityError> {
        self.transact(&[Collection::DeletionRequests], |state| {
            let ArchiveState {
                submissions,
                governance,
                ..
            } = state;
            governance.file(submissions, submission_id)
        })
        .await
    }

    /// Append an access log record
    pub async fn record_access(&mut self, log: AccessLog) -> Result<(), IntegrityError> {
        self.transact(&[Collection::AccessLog], |state| {
            state.access_log.record(log);
            Ok(())
        })
        .await
    }

    async fn transact<T, F>(&mut self, touched: &[Collection], apply: F) -> Result<T, IntegrityError>
    where
        F: FnOnce(&mut ArchiveState) -> Result<T, IntegrityError>,
    {
        let lock_path = self.root.join(LOCK_FILE);
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;
        lock.lock_exclusive()?;

        // Another process may have written since we last looked
        let mut next = load_state(&self.root).await?;
        let value = apply(&mut next)?;

        let mut staged = Vec::with_capacity(touched.len());
        for &collection in touched {
            let json = next.serialize(collection)?;
            let mut tmp = NamedTempFile::new_in(&self.root)?;
            tmp.write_all(json.as_bytes())?;
            tmp.flush()?;
            tmp.as_file().sync_all()?;
            staged.push((tmp, self.root.join(collection.file_name())));
        }

        for (tmp, path) in staged {
            tmp.persist(&path).map_err(|e| e.error)?;
        }

        self.state = next;
        // Lock is released when `lock` is dropped
        drop(lock);
        Ok(value)
    }
}

async fn load_state(root: &Path) -> Result<ArchiveState, IntegrityError> {
    Ok(ArchiveState {
        submissions: load_collection(root, Collection::Submissions).await?,
        ledger: load_collection(root, Collection::Ledger).await?,
        access_log: load_collection(root, Collection::AccessLog).await?,
        governance: load_collection(root, Collection::DeletionRequests).await?,
    })
}

async fn load_collection<T>(root: &Path, collection: Collection) -> Result<T, IntegrityError>
where
    T: DeserializeOwned + Default,
{
    let path = root.join(collection.file_name());
    if !path.exists() {
        return Ok(T::default());
    }

    let content = fs::read_to_string(&path).await?;
    if content.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(&content).map_err(|source| IntegrityError::Corrupt { path, source })
}
