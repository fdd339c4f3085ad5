// src/repositories/postgres/profile.rs

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use async_trait::async_trait;
use kindled_common::models::{
    MatchPreferences, ProfileView, SubscriptionTier, UserProfile, VerificationStatus,
};
use kindled_common::traits::repository_traits::ProfileRepository;
use kindled_common::Error;

pub struct PostgresProfileRepository {
    pool: Pool<Postgres>,
}

impl PostgresProfileRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const PROFILE_COLUMNS: &str = r#"
    id, phone_number, phone_verified, date_of_birth, sex, location,
    latitude, longitude, bio, interests, verification_status,
    verification_rejection_reason, badges, profile_completeness,
    subscription_tier, subscription_expires_at, last_active_at,
    is_accepting_chats, created_at, updated_at
"#;

fn row_to_profile(row: &PgRow) -> Result<UserProfile, Error> {
    Ok(UserProfile {
        id: row.try_get("id")?,
        phone_number: row.try_get("phone_number")?,
        phone_verified: row.try_get("phone_verified")?,
        date_of_birth: row.try_get("date_of_birth")?,
        sex: row.try_get("sex")?,
        location: row.try_get("location")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        bio: row.try_get("bio")?,
        interests: row.try_get("interests")?,
        verification_status: row.try_get::<String, _>("verification_status")?.into(),
        verification_rejection_reason: row.try_get("verification_rejection_reason")?,
        badges: row.try_get("badges")?,
        profile_completeness: row.try_get("profile_completeness")?,
        subscription_tier: row.try_get::<String, _>("subscription_tier")?.into(),
        subscription_expires_at: row.try_get("subscription_expires_at")?,
        last_active_at: row.try_get("last_active_at")?,
        is_accepting_chats: row.try_get("is_accepting_chats")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn row_to_preferences(row: &PgRow) -> Result<MatchPreferences, Error> {
    Ok(MatchPreferences {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        min_age: row.try_get("min_age")?,
        max_age: row.try_get("max_age")?,
        preferred_sex: row.try_get("preferred_sex")?,
        max_distance: row.try_get("max_distance")?,
        accepted_locations: row.try_get("accepted_locations")?,
        required_interests: row.try_get("required_interests")?,
        excluded_interests: row.try_get("excluded_interests")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl ProfileRepository for PostgresProfileRepository {
    async fn create(&self, profile: &UserProfile) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (
                id, phone_number, phone_verified, date_of_birth, sex, location,
                latitude, longitude, bio, interests, verification_status,
                verification_rejection_reason, badges, profile_completeness,
                subscription_tier, subscription_expires_at, last_active_at,
                is_accepting_chats, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20)
            "#,
        )
        .bind(profile.id)
        .bind(&profile.phone_number)
        .bind(profile.phone_verified)
        .bind(profile.date_of_birth)
        .bind(&profile.sex)
        .bind(&profile.location)
        .bind(profile.latitude)
        .bind(profile.longitude)
        .bind(&profile.bio)
        .bind(&profile.interests)
        .bind(profile.verification_status.to_string())
        .bind(&profile.verification_rejection_reason)
        .bind(&profile.badges)
        .bind(profile.profile_completeness)
        .bind(profile.subscription_tier.to_string())
        .bind(profile.subscription_expires_at)
        .bind(profile.last_active_at)
        .bind(profile.is_accepting_chats)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<UserProfile>, Error> {
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_profile).transpose()
    }

    async fn update(&self, profile: &UserProfile) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE user_profiles
            SET phone_number = $1,
                phone_verified = $2,
                date_of_birth = $3,
                sex = $4,
                location = $5,
                latitude = $6,
                longitude = $7,
                bio = $8,
                interests = $9,
                verification_status = $10,
                verification_rejection_reason = $11,
                badges = $12,
                profile_completeness = $13,
                subscription_tier = $14,
                subscription_expires_at = $15,
                last_active_at = $16,
                is_accepting_chats = $17,
                updated_at = $18
            WHERE id = $19
            "#,
        )
        .bind(&profile.phone_number)
        .bind(profile.phone_verified)
        .bind(profile.date_of_birth)
        .bind(&profile.sex)
        .bind(&profile.location)
        .bind(profile.latitude)
        .bind(profile.longitude)
        .bind(&profile.bio)
        .bind(&profile.interests)
        .bind(profile.verification_status.to_string())
        .bind(&profile.verification_rejection_reason)
        .bind(&profile.badges)
        .bind(profile.profile_completeness)
        .bind(profile.subscription_tier.to_string())
        .bind(profile.subscription_expires_at)
        .bind(profile.last_active_at)
        .bind(profile.is_accepting_chats)
        .bind(Utc::now())
        .bind(profile.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        sqlx::query("DELETE FROM user_profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UserProfile>, Error> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PROFILE_COLUMNS} FROM user_profiles
            ORDER BY created_at ASC, id ASC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_profile).collect()
    }

    async fn list_approved(&self, exclude_user: Uuid) -> Result<Vec<UserProfile>, Error> {
        // Deterministic candidate order; the allocator depends on it.
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PROFILE_COLUMNS} FROM user_profiles
            WHERE verification_status = 'approved'
              AND id <> $1
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(exclude_user)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_profile).collect()
    }

    async fn list_by_verification_status(
        &self,
        status: VerificationStatus,
    ) -> Result<Vec<UserProfile>, Error> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PROFILE_COLUMNS} FROM user_profiles
            WHERE verification_status = $1
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(status.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_profile).collect()
    }

    async fn set_subscription_tier(&self, id: Uuid, tier: SubscriptionTier) -> Result<(), Error> {
        sqlx::query(
            "UPDATE user_profiles SET subscription_tier = $1, updated_at = $2 WHERE id = $3",
        )
        .bind(tier.to_string())
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn count_all(&self) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM user_profiles")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("cnt")?)
    }

    async fn count_by_verification_status(
        &self,
        status: VerificationStatus,
    ) -> Result<i64, Error> {
        let row =
            sqlx::query("SELECT COUNT(*) AS cnt FROM user_profiles WHERE verification_status = $1")
                .bind(status.to_string())
                .fetch_one(&self.pool)
                .await?;
        Ok(row.try_get("cnt")?)
    }

    async fn count_by_tier(&self, tier: SubscriptionTier) -> Result<i64, Error> {
        let row =
            sqlx::query("SELECT COUNT(*) AS cnt FROM user_profiles WHERE subscription_tier = $1")
                .bind(tier.to_string())
                .fetch_one(&self.pool)
                .await?;
        Ok(row.try_get("cnt")?)
    }

    async fn get_preferences(&self, user_id: Uuid) -> Result<Option<MatchPreferences>, Error> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, min_age, max_age, preferred_sex, max_distance,
                   accepted_locations, required_interests, excluded_interests,
                   created_at, updated_at
            FROM match_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_preferences).transpose()
    }

    async fn upsert_preferences(&self, prefs: &MatchPreferences) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO match_preferences (
                id, user_id, min_age, max_age, preferred_sex, max_distance,
                accepted_locations, required_interests, excluded_interests,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (user_id) DO UPDATE
            SET min_age = EXCLUDED.min_age,
                max_age = EXCLUDED.max_age,
                preferred_sex = EXCLUDED.preferred_sex,
                max_distance = EXCLUDED.max_distance,
                accepted_locations = EXCLUDED.accepted_locations,
                required_interests = EXCLUDED.required_interests,
                excluded_interests = EXCLUDED.excluded_interests,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(prefs.id)
        .bind(prefs.user_id)
        .bind(prefs.min_age)
        .bind(prefs.max_age)
        .bind(&prefs.preferred_sex)
        .bind(prefs.max_distance)
        .bind(&prefs.accepted_locations)
        .bind(&prefs.required_interests)
        .bind(&prefs.excluded_interests)
        .bind(prefs.created_at)
        .bind(prefs.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_view(&self, view: &ProfileView) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO profile_views (id, viewer_id, viewed_user_id, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(view.id)
        .bind(view.viewer_id)
        .bind(view.viewed_user_id)
        .bind(view.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
