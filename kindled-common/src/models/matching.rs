// kindled-common/src/models/matching.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How the owning user reacted to a proposed match. NULL in the
/// database until the user interacts.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    Like,
    Pass,
    Skip,
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionType::Like => write!(f, "like"),
            InteractionType::Pass => write!(f, "pass"),
            InteractionType::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for InteractionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(InteractionType::Like),
            "pass" => Ok(InteractionType::Pass),
            "skip" => Ok(InteractionType::Skip),
            _ => Err(format!("Unknown interaction type: {}", s)),
        }
    }
}

/// A one-directional proposal from `user_id` to `matched_user_id` for a
/// given batch date. The pair (user_id, matched_user_id) is globally
/// unique: a user is never offered the same candidate twice, on any day.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub matched_user_id: Uuid,
    pub batch_date: NaiveDate,
    /// 0-100 compatibility score. Advisory only; nothing filters or
    /// ranks on it.
    pub match_score: i32,
    pub viewed_at: Option<DateTime<Utc>>,
    pub interaction_type: Option<InteractionType>,
    pub created_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user_id == user_id || self.matched_user_id == user_id
    }

    /// The participant that is not `user_id`.
    pub fn counterpart(&self, user_id: Uuid) -> Uuid {
        if self.user_id == user_id {
            self.matched_user_id
        } else {
            self.user_id
        }
    }
}

/// What one allocator run handed back: the freshly inserted records and
/// how much of today's quota is still unspent.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MatchBatch {
    pub new_matches: Vec<MatchRecord>,
    pub remaining: i64,
}
