//! Deletion-request workflow.
//!
//! Per submission: `none -> PENDING -> {APPROVED, REJECTED}`. Only filing is
//! handled here; review happens outside this crate. Filing never touches the
//! ledger or the submission itself.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::IntegrityError;
use super::submissions::SubmissionStore;
use crate::domain::DeletionRequest;

/// Tracks deletion requests, newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GovernanceWorkflow {
    requests: Vec<DeletionRequest>,
}

impl GovernanceWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// File a deletion request for a submission.
    ///
    /// Fails with `SubmissionNotFound` for unknown IDs and with
    /// `DuplicatePendingRequest` while an earlier request is still pending.
    /// No state changes on failure.
    pub fn file(
        &mut self,
        submissions: &SubmissionStore,
        submission_id: &str,
    ) -> Result<DeletionRequest, IntegrityError> {
        if !submissions.contains(submission_id) {
            return Err(IntegrityError::SubmissionNotFound(submission_id.to_string()));
        }

        if let Some(existing) = self.pending_for(submission_id) {
            return Err(IntegrityError::DuplicatePendingRequest {
                submission_id: submission_id.to_string(),
                request_id: existing.id.clone(),
            });
        }

        let request = DeletionRequest::pending(submission_id);
        info!(request_id = %request.id, submission_id, "Deletion request filed");
        self.requests.insert(0, request.clone());
        Ok(request)
    }

    /// The pending request for a submission, if any
    pub fn pending_for(&self, submission_id: &str) -> Option<&DeletionRequest> {
        self.requests
            .iter()
            .find(|r| r.submission_id == submission_id && r.is_pending())
    }

    /// All pending requests, newest first
    pub fn pending(&self) -> Vec<&DeletionRequest> {
        self.requests.iter().filter(|r| r.is_pending()).collect()
    }

    /// Every request, newest first
    pub fn requests(&self) -> &[DeletionRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RequestStatus, Submission, SubmissionStatus};

    fn store_with(id_out: &mut String) -> SubmissionStore {
        let mut store = SubmissionStore::new();
        let sub = Submission::new("Essay", "text", "u-1", SubmissionStatus::Draft, 0.0, 1);
        *id_out = sub.id.clone();
        store.add(sub);
        store
    }

    #[test]
    fn test_file_creates_pending_request() {
        let mut id = String::new();
        let store = store_with(&mut id);
        let mut workflow = GovernanceWorkflow::new();

        let request = workflow.file(&store, &id).unwrap();
        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.submission_id, id);
        assert_eq!(workflow.pending_for(&id).unwrap().id, request.id);
    }

    #[test]
    fn test_duplicate_pending_is_rejected() {
        let mut id = String::new();
        let store = store_with(&mut id);
        let mut workflow = GovernanceWorkflow::new();

        let first = workflow.file(&store, &id).unwrap();
        let err = workflow.file(&store, &id).unwrap_err();

        match err {
            IntegrityError::DuplicatePendingRequest {
                submission_id,
                request_id,
            } => {
                assert_eq!(submission_id, id);
                assert_eq!(request_id, first.id);
            }
            other => panic!("Expected DuplicatePendingRequest, got {other:?}"),
        }
        assert_eq!(workflow.len(), 1);
    }

    #[test]
    fn test_unknown_submission() {
        let store = SubmissionStore::new();
        let mut workflow = GovernanceWorkflow::new();
        assert!(matches!(
            workflow.file(&store, "sub-missing"),
            Err(IntegrityError::SubmissionNotFound(_))
        ));
        assert!(workflow.is_empty());
    }

    #[test]
    fn test_refiling_after_resolution_is_allowed() {
        let mut id = String::new();
        let store = store_with(&mut id);
        let mut workflow: GovernanceWorkflow = serde_json::from_value(serde_json::json!([{
            "id": "dr-old",
            "submissionId": id,
            "status": "REJECTED",
            "requestDate": "2026-01-01T00:00:00Z"
        }]))
        .unwrap();

        assert!(workflow.pending_for(&id).is_none());
        workflow.file(&store, &id).unwrap();
        assert_eq!(workflow.len(), 2);
        assert_eq!(workflow.pending().len(), 1);
    }
}
