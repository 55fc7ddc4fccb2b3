//! Append-only access audit trail.

use serde::{Deserialize, Serialize};

use crate::domain::AccessLog;

/// Entity recorded when the analysis pipeline processes a document
pub const ANALYSIS_ENTITY: &str = "AI Analysis Service";
/// Purpose recorded when the analysis pipeline processes a document
pub const ANALYSIS_PURPOSE: &str = "Initial Plagiarism Check";

/// Entity recorded by callers that run a verification
pub const VERIFICATION_ENTITY: &str = "Verification Portal";
/// Purpose recorded by callers that run a verification
pub const VERIFICATION_PURPOSE: &str = "Authenticity Check";

/// Write-only log of who processed what, newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessLogBook {
    records: Vec<AccessLog>,
}

impl AccessLogBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, log: AccessLog) {
        self.records.insert(0, log);
    }

    /// Up to `limit` most recent records
    pub fn recent(&self, limit: usize) -> &[AccessLog] {
        &self.records[..limit.min(self.records.len())]
    }

    pub fn records(&self) -> &[AccessLog] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
