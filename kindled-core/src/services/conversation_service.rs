// kindled-core/src/services/conversation_service.rs

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use kindled_common::models::{Conversation, ConversationStatus};
use kindled_common::traits::repository_traits::{ConversationRepository, MatchRepository};
use kindled_common::Error;

/// Minimum opener length, in characters after trimming. Applies only at
/// conversation creation; ordinary sends are never re-checked.
pub const MIN_OPENER_CHARS: usize = 36;

/// Owns the conversation state machine: creation behind the opener
/// gate, the active/snoozed cycle, and the terminal end transition.
pub struct ConversationService {
    conversation_repo: Arc<dyn ConversationRepository>,
    match_repo: Arc<dyn MatchRepository>,
}

impl ConversationService {
    pub fn new(
        conversation_repo: Arc<dyn ConversationRepository>,
        match_repo: Arc<dyn MatchRepository>,
    ) -> Self {
        Self {
            conversation_repo,
            match_repo,
        }
    }

    /// none -> active. The opener must carry at least MIN_OPENER_CHARS
    /// characters post-trim or nothing is created.
    pub async fn open_conversation(
        &self,
        caller: Uuid,
        match_id: Uuid,
        opener: &str,
    ) -> Result<Conversation, Error> {
        let trimmed = opener.trim();
        let got = trimmed.chars().count();
        if got < MIN_OPENER_CHARS {
            return Err(Error::OpenerTooShort {
                min: MIN_OPENER_CHARS,
                got,
            });
        }

        let record = self
            .match_repo
            .get(match_id)
            .await?
            .ok_or_else(|| Error::not_found("Match"))?;

        if !record.involves(caller) {
            return Err(Error::Unauthorized(
                "Not a participant in this match".to_string(),
            ));
        }

        let now = Utc::now();
        let conversation = Conversation {
            id: Uuid::new_v4(),
            user1_id: record.user_id,
            user2_id: record.matched_user_id,
            initial_opener_message: trimmed.to_string(),
            status: ConversationStatus::Active,
            snoozed_until: None,
            snooze_duration: None,
            ended_by: None,
            ended_reason: None,
            last_message_at: None,
            user1_unread_count: 0,
            user2_unread_count: 0,
            created_at: now,
            updated_at: now,
        };

        self.conversation_repo.create(&conversation).await?;
        info!("conversation {} opened from match {}", conversation.id, match_id);
        Ok(conversation)
    }

    pub async fn get(&self, caller: Uuid, conversation_id: Uuid) -> Result<Conversation, Error> {
        let conversation = self
            .conversation_repo
            .get(conversation_id)
            .await?
            .ok_or_else(|| Error::not_found("Conversation"))?;

        if !conversation.involves(caller) {
            return Err(Error::Unauthorized(
                "Not a participant in this conversation".to_string(),
            ));
        }

        Ok(conversation)
    }

    /// The caller's inbox: active and snoozed conversations. Snoozed
    /// ones stay listed; the snooze timer is advisory.
    pub async fn list_for_user(&self, caller: Uuid) -> Result<Vec<Conversation>, Error> {
        self.conversation_repo.list_open_for_user(caller).await
    }

    /// active|snoozed -> snoozed. Re-snoozing before expiry simply
    /// overwrites the timer; the later write wins.
    pub async fn snooze(
        &self,
        caller: Uuid,
        conversation_id: Uuid,
        hours: i64,
    ) -> Result<Conversation, Error> {
        if hours <= 0 {
            return Err(Error::Validation(
                "Snooze duration must be a positive number of hours".to_string(),
            ));
        }

        let mut conversation = self.get(caller, conversation_id).await?;
        if conversation.is_ended() {
            return Err(Error::ConversationEnded);
        }

        conversation.status = ConversationStatus::Snoozed;
        conversation.snoozed_until = Some(Utc::now() + Duration::hours(hours));
        conversation.snooze_duration = Some(format!("{}h", hours));

        self.conversation_repo.update(&conversation).await?;
        Ok(conversation)
    }

    /// active|snoozed -> ended. Terminal: every later send, snooze or
    /// end against this conversation fails.
    pub async fn end(
        &self,
        caller: Uuid,
        conversation_id: Uuid,
        reason: Option<String>,
    ) -> Result<Conversation, Error> {
        let mut conversation = self.get(caller, conversation_id).await?;
        if conversation.is_ended() {
            return Err(Error::ConversationEnded);
        }

        conversation.status = ConversationStatus::Ended;
        conversation.ended_by = Some(caller);
        conversation.ended_reason = reason;

        self.conversation_repo.update(&conversation).await?;
        info!("conversation {} ended by {}", conversation_id, caller);
        Ok(conversation)
    }
}
