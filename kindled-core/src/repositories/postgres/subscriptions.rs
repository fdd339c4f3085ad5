// src/repositories/postgres/subscriptions.rs

use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use async_trait::async_trait;
use kindled_common::models::{ReferralCode, Subscription, SubscriptionStatus};
use kindled_common::traits::repository_traits::SubscriptionRepository;
use kindled_common::Error;

pub struct PostgresSubscriptionRepository {
    pool: Pool<Postgres>,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_subscription(row: &PgRow) -> Result<Subscription, Error> {
    let provider: Option<String> = row.try_get("payment_provider")?;
    Ok(Subscription {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        tier: row.try_get::<String, _>("tier")?.into(),
        status: row.try_get::<String, _>("status")?.into(),
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        renewal_date: row.try_get("renewal_date")?,
        payment_provider: provider.and_then(|s| s.parse().ok()),
        transaction_id: row.try_get("transaction_id")?,
        auto_renewal: row.try_get("auto_renewal")?,
        referral_code: row.try_get("referral_code")?,
        referred_by: row.try_get("referred_by")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_referral_code(row: &PgRow) -> Result<ReferralCode, Error> {
    Ok(ReferralCode {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        created_by: row.try_get("created_by")?,
        tier: row.try_get::<String, _>("tier")?.into(),
        max_uses: row.try_get("max_uses")?,
        current_uses: row.try_get("current_uses")?,
        expires_at: row.try_get("expires_at")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn get_for_user(&self, user_id: Uuid) -> Result<Option<Subscription>, Error> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, tier, status, start_date, end_date, renewal_date,
                   payment_provider, transaction_id, auto_renewal, referral_code,
                   referred_by, created_at, updated_at
            FROM subscriptions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_subscription).transpose()
    }

    async fn upsert(&self, subscription: &Subscription) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, user_id, tier, status, start_date, end_date, renewal_date,
                payment_provider, transaction_id, auto_renewal, referral_code,
                referred_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (user_id) DO UPDATE
            SET tier = EXCLUDED.tier,
                status = EXCLUDED.status,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                renewal_date = EXCLUDED.renewal_date,
                payment_provider = EXCLUDED.payment_provider,
                transaction_id = EXCLUDED.transaction_id,
                auto_renewal = EXCLUDED.auto_renewal,
                referral_code = EXCLUDED.referral_code,
                referred_by = EXCLUDED.referred_by,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(subscription.id)
        .bind(subscription.user_id)
        .bind(subscription.tier.to_string())
        .bind(subscription.status.to_string())
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .bind(subscription.renewal_date)
        .bind(subscription.payment_provider.map(|p| p.to_string()))
        .bind(&subscription.transaction_id)
        .bind(subscription.auto_renewal)
        .bind(&subscription.referral_code)
        .bind(subscription.referred_by)
        .bind(subscription.created_at)
        .bind(subscription.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn count_by_status(&self, status: SubscriptionStatus) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM subscriptions WHERE status = $1")
            .bind(status.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("cnt")?)
    }

    async fn get_referral_code(&self, code: &str) -> Result<Option<ReferralCode>, Error> {
        let row = sqlx::query(
            r#"
            SELECT id, code, created_by, tier, max_uses, current_uses,
                   expires_at, is_active, created_at
            FROM referral_codes
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_referral_code).transpose()
    }

    async fn increment_referral_use(&self, code_id: Uuid) -> Result<(), Error> {
        sqlx::query("UPDATE referral_codes SET current_uses = current_uses + 1 WHERE id = $1")
            .bind(code_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
