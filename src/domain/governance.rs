//! Deletion requests, access logs and the placeholder identity record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a deletion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Filed, awaiting governance review
    Pending,

    /// Approved by governance (terminal)
    Approved,

    /// Rejected by governance (terminal)
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Approved => write!(f, "APPROVED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// A user request to erase a submission's association with them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionRequest {
    pub id: String,
    pub submission_id: String,
    pub status: RequestStatus,
    pub request_date: DateTime<Utc>,
}

impl DeletionRequest {
    /// File a new request in PENDING state
    pub fn pending(submission_id: impl Into<String>) -> Self {
        Self {
            id: format!("dr-{}", Uuid::new_v4().simple()),
            submission_id: submission_id.into(),
            status: RequestStatus::Pending,
            request_date: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

/// Audit record of who processed a resource and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessLog {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub entity: String,
    pub purpose: String,
    pub resource_id: String,
}

impl AccessLog {
    pub fn new(
        entity: impl Into<String>,
        purpose: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("log-{}", Uuid::new_v4().simple()),
            timestamp: Utc::now(),
            entity: entity.into(),
            purpose: purpose.into(),
            resource_id: resource_id.into(),
        }
    }
}

/// Role of the acting user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Faculty,
    Admin,
}

/// Placeholder identity attached to submissions and ledger entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub role: UserRole,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            id: "u-12345".to_string(),
            name: "Anonymous".to_string(),
            role: UserRole::Student,
        }
    }
}
