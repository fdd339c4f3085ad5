// kindled-common/src/models/conversation.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state. `active` and `snoozed` cycle freely; `ended` is
/// terminal and nothing leaves it.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Snoozed,
    Ended,
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationStatus::Active => write!(f, "active"),
            ConversationStatus::Snoozed => write!(f, "snoozed"),
            ConversationStatus::Ended => write!(f, "ended"),
        }
    }
}

impl FromStr for ConversationStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ConversationStatus::Active),
            "snoozed" => Ok(ConversationStatus::Snoozed),
            "ended" => Ok(ConversationStatus::Ended),
            _ => Err(format!("Unknown conversation status: {}", s)),
        }
    }
}

impl From<String> for ConversationStatus {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(ConversationStatus::Active)
    }
}

/// A bidirectional messaging channel between exactly two users, seeded
/// by user1's opener. Never deleted; `ended` is the soft-terminal state.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub initial_opener_message: String,
    pub status: ConversationStatus,
    /// Advisory. No background job flips a conversation back to active
    /// when this passes; un-snoozing is manual.
    pub snoozed_until: Option<DateTime<Utc>>,
    pub snooze_duration: Option<String>,
    pub ended_by: Option<Uuid>,
    pub ended_reason: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub user1_unread_count: i32,
    pub user2_unread_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user1_id == user_id || self.user2_id == user_id
    }

    /// The participant that is not `user_id`.
    pub fn counterpart(&self, user_id: Uuid) -> Uuid {
        if self.user1_id == user_id {
            self.user2_id
        } else {
            self.user1_id
        }
    }

    pub fn is_ended(&self) -> bool {
        self.status == ConversationStatus::Ended
    }

    pub fn unread_count_for(&self, user_id: Uuid) -> i32 {
        if self.user1_id == user_id {
            self.user1_unread_count
        } else {
            self.user2_unread_count
        }
    }
}
