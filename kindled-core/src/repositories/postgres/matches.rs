// src/repositories/postgres/matches.rs

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use async_trait::async_trait;
use kindled_common::models::{InteractionType, MatchRecord};
use kindled_common::traits::repository_traits::MatchRepository;
use kindled_common::Error;

use super::is_unique_violation;

pub struct PostgresMatchRepository {
    pool: Pool<Postgres>,
}

impl PostgresMatchRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_match(row: &PgRow) -> Result<MatchRecord, Error> {
    let interaction: Option<String> = row.try_get("interaction_type")?;
    Ok(MatchRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        matched_user_id: row.try_get("matched_user_id")?,
        batch_date: row.try_get("batch_date")?,
        match_score: row.try_get("match_score")?,
        viewed_at: row.try_get("viewed_at")?,
        interaction_type: interaction.and_then(|s| s.parse().ok()),
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

#[async_trait]
impl MatchRepository for PostgresMatchRepository {
    async fn create(&self, record: &MatchRecord) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_matches (
                id, user_id, matched_user_id, batch_date, match_score,
                viewed_at, interaction_type, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.matched_user_id)
        .bind(record.batch_date)
        .bind(record.match_score)
        .bind(record.viewed_at)
        .bind(record.interaction_type.map(|i| i.to_string()))
        .bind(record.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            // Another allocation run claimed this candidate first.
            Err(ref e) if is_unique_violation(e, "unique_match_pair") => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<MatchRecord>, Error> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, matched_user_id, batch_date, match_score,
                   viewed_at, interaction_type, created_at
            FROM user_matches
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_match).transpose()
    }

    async fn count_for_day(&self, user_id: Uuid, batch_date: NaiveDate) -> Result<i64, Error> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS cnt FROM user_matches WHERE user_id = $1 AND batch_date = $2",
        )
        .bind(user_id)
        .bind(batch_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("cnt")?)
    }

    async fn list_matched_user_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, Error> {
        let rows = sqlx::query("SELECT matched_user_id FROM user_matches WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|r| r.try_get("matched_user_id").map_err(Error::from))
            .collect()
    }

    async fn record_interaction(
        &self,
        id: Uuid,
        interaction: InteractionType,
        viewed_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        sqlx::query(
            "UPDATE user_matches SET interaction_type = $1, viewed_at = $2 WHERE id = $3",
        )
        .bind(interaction.to_string())
        .bind(viewed_at)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn count_all(&self) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM user_matches")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("cnt")?)
    }
}
