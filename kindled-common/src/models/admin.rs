// kindled-common/src/models/admin.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    SuperAdmin,
    Moderator,
    Reviewer,
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdminRole::SuperAdmin => write!(f, "super_admin"),
            AdminRole::Moderator => write!(f, "moderator"),
            AdminRole::Reviewer => write!(f, "reviewer"),
        }
    }
}

impl FromStr for AdminRole {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(AdminRole::SuperAdmin),
            "moderator" => Ok(AdminRole::Moderator),
            "reviewer" => Ok(AdminRole::Reviewer),
            _ => Err(format!("Unknown admin role: {}", s)),
        }
    }
}

impl From<String> for AdminRole {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(AdminRole::Reviewer)
    }
}

/// A staff account. Shares the user id space with user_profiles; a row
/// here is what grants the admin capability.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: Uuid,
    pub admin_email: String,
    pub role: AdminRole,
    /// Array of permission strings.
    pub permissions: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
