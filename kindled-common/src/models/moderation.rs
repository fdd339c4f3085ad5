// kindled-common/src/models/moderation.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// One user hiding another. Blocks are one-directional; the allocator
/// only consults the blocker's side when it builds a candidate pool.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BlockedUser {
    pub id: Uuid,
    pub blocker_id: Uuid,
    pub blocked_user_id: Uuid,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Both directions of the block relationship between two users.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct BlockStatus {
    pub is_blocked: bool,
    pub blocked_by_me: bool,
    pub blocked_by_target: bool,
}

/// Input for filing a report. At least one of reported_user_id /
/// conversation_id must be set.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    pub reported_user_id: Option<Uuid>,
    pub conversation_id: Option<Uuid>,
    pub report_type: String,
    pub description: Option<String>,
    pub evidence: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    UnderReview,
    Resolved,
    Dismissed,
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStatus::Pending => write!(f, "pending"),
            ReportStatus::UnderReview => write!(f, "under_review"),
            ReportStatus::Resolved => write!(f, "resolved"),
            ReportStatus::Dismissed => write!(f, "dismissed"),
        }
    }
}

impl FromStr for ReportStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReportStatus::Pending),
            "under_review" => Ok(ReportStatus::UnderReview),
            "resolved" => Ok(ReportStatus::Resolved),
            "dismissed" => Ok(ReportStatus::Dismissed),
            _ => Err(format!("Unknown report status: {}", s)),
        }
    }
}

impl From<String> for ReportStatus {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(ReportStatus::Pending)
    }
}

/// A safety report against a user and/or a conversation. At least one
/// of the two subjects is always set.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub reported_user_id: Option<Uuid>,
    pub conversation_id: Option<Uuid>,
    /// "inappropriate_photos", "fake_profile", "harassment", "spam", ...
    pub report_type: String,
    pub description: Option<String>,
    /// Message ids, photo ids, etc.
    pub evidence: Option<Value>,
    pub status: ReportStatus,
    pub resolution_notes: Option<String>,
    pub resolved_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
