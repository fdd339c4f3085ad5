// kindled-core/src/services/message_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use kindled_common::models::Message;
use kindled_common::traits::repository_traits::{ConversationRepository, MessageRepository};
use kindled_common::Error;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 100;

/// Message delivery and read-state inside a conversation. Delivery is
/// refused once the conversation has ended; there is no other gate and
/// in particular no length check, that rule lives on the opener only.
pub struct MessageService {
    conversation_repo: Arc<dyn ConversationRepository>,
    message_repo: Arc<dyn MessageRepository>,
}

impl MessageService {
    pub fn new(
        conversation_repo: Arc<dyn ConversationRepository>,
        message_repo: Arc<dyn MessageRepository>,
    ) -> Self {
        Self {
            conversation_repo,
            message_repo,
        }
    }

    pub async fn send_message(
        &self,
        caller: Uuid,
        conversation_id: Uuid,
        content: &str,
    ) -> Result<Message, Error> {
        if content.is_empty() {
            return Err(Error::Validation("Message cannot be empty".to_string()));
        }

        let mut conversation = self
            .conversation_repo
            .get(conversation_id)
            .await?
            .ok_or_else(|| Error::not_found("Conversation"))?;

        if !conversation.involves(caller) {
            return Err(Error::Unauthorized(
                "Not a participant in this conversation".to_string(),
            ));
        }
        if conversation.is_ended() {
            return Err(Error::ConversationEnded);
        }

        let message = Message::new(conversation_id, caller, content.to_string());
        self.message_repo.create(&message).await?;

        // Delivery bumps the conversation and the recipient's unread
        // counter; the sender's own counter is untouched.
        conversation.last_message_at = Some(message.created_at);
        if conversation.user1_id == caller {
            conversation.user2_unread_count += 1;
        } else {
            conversation.user1_unread_count += 1;
        }
        self.conversation_repo.update(&conversation).await?;

        Ok(message)
    }

    /// Page of messages plus the conversation's total, oldest first.
    pub async fn list_messages(
        &self,
        caller: Uuid,
        conversation_id: Uuid,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<Message>, i64), Error> {
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

        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = offset.unwrap_or(0).max(0);

        let messages = self
            .message_repo
            .list_for_conversation(conversation_id, limit, offset)
            .await?;
        let total = self
            .message_repo
            .count_for_conversation(conversation_id)
            .await?;

        Ok((messages, total))
    }

    /// Marks the counterpart's messages read and zeroes the caller's
    /// unread counter.
    pub async fn mark_read(&self, caller: Uuid, conversation_id: Uuid) -> Result<u64, Error> {
        let mut conversation = self
            .conversation_repo
            .get(conversation_id)
            .await?
            .ok_or_else(|| Error::not_found("Conversation"))?;

        if !conversation.involves(caller) {
            return Err(Error::Unauthorized(
                "Not a participant in this conversation".to_string(),
            ));
        }

        let other = conversation.counterpart(caller);
        let changed = self
            .message_repo
            .mark_read(conversation_id, other, Utc::now())
            .await?;

        if conversation.user1_id == caller {
            conversation.user1_unread_count = 0;
        } else {
            conversation.user2_unread_count = 0;
        }
        self.conversation_repo.update(&conversation).await?;

        Ok(changed)
    }

    /// Total unread across every conversation the caller is part of,
    /// ended ones included.
    pub async fn unread_total(&self, caller: Uuid) -> Result<i64, Error> {
        let conversations = self.conversation_repo.list_for_user(caller).await?;
        Ok(conversations
            .iter()
            .map(|c| c.unread_count_for(caller) as i64)
            .sum())
    }
}
