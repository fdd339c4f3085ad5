// src/repositories/postgres/conversations.rs

use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use async_trait::async_trait;
use kindled_common::models::Conversation;
use kindled_common::traits::repository_traits::ConversationRepository;
use kindled_common::Error;

pub struct PostgresConversationRepository {
    pool: Pool<Postgres>,
}

impl PostgresConversationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const CONVERSATION_COLUMNS: &str = r#"
    id, user1_id, user2_id, initial_opener_message, status, snoozed_until,
    snooze_duration, ended_by, ended_reason, last_message_at,
    user1_unread_count, user2_unread_count, created_at, updated_at
"#;

fn row_to_conversation(row: &PgRow) -> Result<Conversation, Error> {
    Ok(Conversation {
        id: row.try_get("id")?,
        user1_id: row.try_get("user1_id")?,
        user2_id: row.try_get("user2_id")?,
        initial_opener_message: row.try_get("initial_opener_message")?,
        status: row.try_get::<String, _>("status")?.into(),
        snoozed_until: row.try_get("snoozed_until")?,
        snooze_duration: row.try_get("snooze_duration")?,
        ended_by: row.try_get("ended_by")?,
        ended_reason: row.try_get("ended_reason")?,
        last_message_at: row.try_get("last_message_at")?,
        user1_unread_count: row.try_get("user1_unread_count")?,
        user2_unread_count: row.try_get("user2_unread_count")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ConversationRepository for PostgresConversationRepository {
    async fn create(&self, conversation: &Conversation) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO conversations (
                id, user1_id, user2_id, initial_opener_message, status,
                snoozed_until, snooze_duration, ended_by, ended_reason,
                last_message_at, user1_unread_count, user2_unread_count,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(conversation.id)
        .bind(conversation.user1_id)
        .bind(conversation.user2_id)
        .bind(&conversation.initial_opener_message)
        .bind(conversation.status.to_string())
        .bind(conversation.snoozed_until)
        .bind(&conversation.snooze_duration)
        .bind(conversation.ended_by)
        .bind(&conversation.ended_reason)
        .bind(conversation.last_message_at)
        .bind(conversation.user1_unread_count)
        .bind(conversation.user2_unread_count)
        .bind(conversation.created_at)
        .bind(conversation.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Conversation>, Error> {
        let row = sqlx::query(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_conversation).transpose()
    }

    async fn update(&self, conversation: &Conversation) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE conversations
            SET status = $1,
                snoozed_until = $2,
                snooze_duration = $3,
                ended_by = $4,
                ended_reason = $5,
                last_message_at = $6,
                user1_unread_count = $7,
                user2_unread_count = $8,
                updated_at = $9
            WHERE id = $10
            "#,
        )
        .bind(conversation.status.to_string())
        .bind(conversation.snoozed_until)
        .bind(&conversation.snooze_duration)
        .bind(conversation.ended_by)
        .bind(&conversation.ended_reason)
        .bind(conversation.last_message_at)
        .bind(conversation.user1_unread_count)
        .bind(conversation.user2_unread_count)
        .bind(Utc::now())
        .bind(conversation.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_open_for_user(&self, user_id: Uuid) -> Result<Vec<Conversation>, Error> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {CONVERSATION_COLUMNS} FROM conversations
            WHERE (user1_id = $1 OR user2_id = $1)
              AND status IN ('active', 'snoozed')
            ORDER BY last_message_at DESC NULLS LAST, created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_conversation).collect()
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Conversation>, Error> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {CONVERSATION_COLUMNS} FROM conversations
            WHERE user1_id = $1 OR user2_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_conversation).collect()
    }

    async fn count_all(&self) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM conversations")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("cnt")?)
    }
}
