// src/repositories/postgres/admin.rs

use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use async_trait::async_trait;
use kindled_common::models::AdminUser;
use kindled_common::traits::repository_traits::AdminRepository;
use kindled_common::Error;

pub struct PostgresAdminRepository {
    pool: Pool<Postgres>,
}

impl PostgresAdminRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminRepository for PostgresAdminRepository {
    async fn get(&self, user_id: Uuid) -> Result<Option<AdminUser>, Error> {
        let row = sqlx::query(
            r#"
            SELECT id, admin_email, role, permissions, created_at, updated_at
            FROM admin_users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(r) = row {
            Ok(Some(AdminUser {
                id: r.try_get("id")?,
                admin_email: r.try_get("admin_email")?,
                role: r.try_get::<String, _>("role")?.into(),
                permissions: r.try_get("permissions")?,
                created_at: r.try_get("created_at")?,
                updated_at: r.try_get("updated_at")?,
            }))
        } else {
            Ok(None)
        }
    }
}
