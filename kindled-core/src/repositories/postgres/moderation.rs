// src/repositories/postgres/moderation.rs

use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use async_trait::async_trait;
use kindled_common::models::{BlockedUser, Report, ReportStatus};
use kindled_common::traits::repository_traits::ModerationRepository;
use kindled_common::Error;

use super::is_unique_violation;

pub struct PostgresModerationRepository {
    pool: Pool<Postgres>,
}

impl PostgresModerationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_block(row: &PgRow) -> Result<BlockedUser, Error> {
    Ok(BlockedUser {
        id: row.try_get("id")?,
        blocker_id: row.try_get("blocker_id")?,
        blocked_user_id: row.try_get("blocked_user_id")?,
        reason: row.try_get("reason")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_report(row: &PgRow) -> Result<Report, Error> {
    Ok(Report {
        id: row.try_get("id")?,
        reporter_id: row.try_get("reporter_id")?,
        reported_user_id: row.try_get("reported_user_id")?,
        conversation_id: row.try_get("conversation_id")?,
        report_type: row.try_get("report_type")?,
        description: row.try_get("description")?,
        evidence: row.try_get("evidence")?,
        status: row.try_get::<String, _>("status")?.into(),
        resolution_notes: row.try_get("resolution_notes")?,
        resolved_by: row.try_get("resolved_by")?,
        resolved_at: row.try_get("resolved_at")?,
        created_at: row.try_get("created_at")?,
    })
}

const REPORT_COLUMNS: &str = r#"
    id, reporter_id, reported_user_id, conversation_id, report_type,
    description, evidence, status, resolution_notes, resolved_by,
    resolved_at, created_at
"#;

#[async_trait]
impl ModerationRepository for PostgresModerationRepository {
    async fn create_block(&self, block: &BlockedUser) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO blocked_users (id, blocker_id, blocked_user_id, reason, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(block.id)
        .bind(block.blocker_id)
        .bind(block.blocked_user_id)
        .bind(&block.reason)
        .bind(block.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(true),
            Err(ref e) if is_unique_violation(e, "unique_block_pair") => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_block(&self, blocker_id: Uuid, blocked_user_id: Uuid) -> Result<(), Error> {
        sqlx::query("DELETE FROM blocked_users WHERE blocker_id = $1 AND blocked_user_id = $2")
            .bind(blocker_id)
            .bind(blocked_user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_block(
        &self,
        blocker_id: Uuid,
        blocked_user_id: Uuid,
    ) -> Result<Option<BlockedUser>, Error> {
        let row = sqlx::query(
            r#"
            SELECT id, blocker_id, blocked_user_id, reason, created_at
            FROM blocked_users
            WHERE blocker_id = $1 AND blocked_user_id = $2
            "#,
        )
        .bind(blocker_id)
        .bind(blocked_user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_block).transpose()
    }

    async fn list_blocks(&self, blocker_id: Uuid) -> Result<Vec<BlockedUser>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, blocker_id, blocked_user_id, reason, created_at
            FROM blocked_users
            WHERE blocker_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(blocker_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_block).collect()
    }

    async fn list_blocked_ids(&self, blocker_id: Uuid) -> Result<Vec<Uuid>, Error> {
        let rows = sqlx::query("SELECT blocked_user_id FROM blocked_users WHERE blocker_id = $1")
            .bind(blocker_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|r| r.try_get("blocked_user_id").map_err(Error::from))
            .collect()
    }

    async fn create_report(&self, report: &Report) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO reports (
                id, reporter_id, reported_user_id, conversation_id, report_type,
                description, evidence, status, resolution_notes, resolved_by,
                resolved_at, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(report.id)
        .bind(report.reporter_id)
        .bind(report.reported_user_id)
        .bind(report.conversation_id)
        .bind(&report.report_type)
        .bind(&report.description)
        .bind(&report.evidence)
        .bind(report.status.to_string())
        .bind(&report.resolution_notes)
        .bind(report.resolved_by)
        .bind(report.resolved_at)
        .bind(report.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_report(&self, id: Uuid) -> Result<Option<Report>, Error> {
        let row = sqlx::query(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_report).transpose()
    }

    async fn update_report(&self, report: &Report) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE reports
            SET status = $1,
                resolution_notes = $2,
                resolved_by = $3,
                resolved_at = $4
            WHERE id = $5
            "#,
        )
        .bind(report.status.to_string())
        .bind(&report.resolution_notes)
        .bind(report.resolved_by)
        .bind(report.resolved_at)
        .bind(report.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_reports_by_reporter(&self, reporter_id: Uuid) -> Result<Vec<Report>, Error> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {REPORT_COLUMNS} FROM reports
            WHERE reporter_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(reporter_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_report).collect()
    }

    async fn list_reports_by_status(&self, status: ReportStatus) -> Result<Vec<Report>, Error> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {REPORT_COLUMNS} FROM reports
            WHERE status = $1
            ORDER BY created_at ASC
            "#
        ))
        .bind(status.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_report).collect()
    }

    async fn count_reports(&self, status: Option<ReportStatus>) -> Result<i64, Error> {
        let row = match status {
            Some(s) => {
                sqlx::query("SELECT COUNT(*) AS cnt FROM reports WHERE status = $1")
                    .bind(s.to_string())
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT COUNT(*) AS cnt FROM reports")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(row.try_get("cnt")?)
    }
}
