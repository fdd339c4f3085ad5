// kindled-common/src/traits/repository_traits.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::Error;
use crate::models::{
    AdminUser, BlockedUser, Conversation, InteractionType, MatchPreferences, MatchRecord, Message,
    ProfileView, Report, ReportStatus, ReferralCode, Subscription, SubscriptionStatus,
    SubscriptionTier, UserProfile, VerificationStatus,
};

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn create(&self, profile: &UserProfile) -> Result<(), Error>;
    async fn get(&self, id: Uuid) -> Result<Option<UserProfile>, Error>;
    async fn update(&self, profile: &UserProfile) -> Result<(), Error>;
    /// Deletes the profile row; dependent rows go with it (FK cascade).
    async fn delete(&self, id: Uuid) -> Result<(), Error>;
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UserProfile>, Error>;

    /// Approved profiles other than `exclude_user`, ordered by
    /// (created_at ASC, id ASC). The allocator filters blocked/already
    /// matched ids on top of this.
    async fn list_approved(&self, exclude_user: Uuid) -> Result<Vec<UserProfile>, Error>;
    async fn list_by_verification_status(
        &self,
        status: VerificationStatus,
    ) -> Result<Vec<UserProfile>, Error>;

    async fn set_subscription_tier(&self, id: Uuid, tier: SubscriptionTier) -> Result<(), Error>;

    async fn count_all(&self) -> Result<i64, Error>;
    async fn count_by_verification_status(&self, status: VerificationStatus)
        -> Result<i64, Error>;
    async fn count_by_tier(&self, tier: SubscriptionTier) -> Result<i64, Error>;

    async fn get_preferences(&self, user_id: Uuid) -> Result<Option<MatchPreferences>, Error>;
    async fn upsert_preferences(&self, prefs: &MatchPreferences) -> Result<(), Error>;

    /// Best-effort view tracking; callers log failures instead of
    /// surfacing them.
    async fn record_view(&self, view: &ProfileView) -> Result<(), Error>;
}

#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Returns false when the (user_id, matched_user_id) pair already
    /// exists: a concurrent allocator run claimed the candidate first,
    /// which callers treat as "skip", not as a failure.
    async fn create(&self, record: &MatchRecord) -> Result<bool, Error>;
    async fn get(&self, id: Uuid) -> Result<Option<MatchRecord>, Error>;
    async fn count_for_day(&self, user_id: Uuid, batch_date: NaiveDate) -> Result<i64, Error>;
    /// Every matched_user_id ever proposed to `user_id`, across all dates.
    async fn list_matched_user_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, Error>;
    async fn record_interaction(
        &self,
        id: Uuid,
        interaction: InteractionType,
        viewed_at: DateTime<Utc>,
    ) -> Result<(), Error>;
    async fn count_all(&self) -> Result<i64, Error>;
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn create(&self, conversation: &Conversation) -> Result<(), Error>;
    async fn get(&self, id: Uuid) -> Result<Option<Conversation>, Error>;
    /// Whole-row update; concurrent writers are last-write-wins, which
    /// is the documented policy for snooze/end races.
    async fn update(&self, conversation: &Conversation) -> Result<(), Error>;
    /// Active + snoozed conversations the user participates in.
    async fn list_open_for_user(&self, user_id: Uuid) -> Result<Vec<Conversation>, Error>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Conversation>, Error>;
    async fn count_all(&self) -> Result<i64, Error>;
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn create(&self, message: &Message) -> Result<(), Error>;
    /// Ordered by created_at ASC.
    async fn list_for_conversation(
        &self,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, Error>;
    async fn count_for_conversation(&self, conversation_id: Uuid) -> Result<i64, Error>;
    /// Flips is_read/read_at on the unread messages `sender_id` sent
    /// into the conversation. Returns how many rows changed.
    async fn mark_read(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        read_at: DateTime<Utc>,
    ) -> Result<u64, Error>;
}

#[async_trait]
pub trait ModerationRepository: Send + Sync {
    /// Returns false when the block pair already exists.
    async fn create_block(&self, block: &BlockedUser) -> Result<bool, Error>;
    async fn delete_block(&self, blocker_id: Uuid, blocked_user_id: Uuid) -> Result<(), Error>;
    async fn get_block(
        &self,
        blocker_id: Uuid,
        blocked_user_id: Uuid,
    ) -> Result<Option<BlockedUser>, Error>;
    async fn list_blocks(&self, blocker_id: Uuid) -> Result<Vec<BlockedUser>, Error>;
    async fn list_blocked_ids(&self, blocker_id: Uuid) -> Result<Vec<Uuid>, Error>;

    async fn create_report(&self, report: &Report) -> Result<(), Error>;
    async fn get_report(&self, id: Uuid) -> Result<Option<Report>, Error>;
    async fn update_report(&self, report: &Report) -> Result<(), Error>;
    async fn list_reports_by_reporter(&self, reporter_id: Uuid) -> Result<Vec<Report>, Error>;
    async fn list_reports_by_status(&self, status: ReportStatus) -> Result<Vec<Report>, Error>;
    async fn count_reports(&self, status: Option<ReportStatus>) -> Result<i64, Error>;
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn get_for_user(&self, user_id: Uuid) -> Result<Option<Subscription>, Error>;
    /// Insert-or-replace keyed on user_id (one subscription per user).
    async fn upsert(&self, subscription: &Subscription) -> Result<(), Error>;
    async fn count_by_status(&self, status: SubscriptionStatus) -> Result<i64, Error>;

    async fn get_referral_code(&self, code: &str) -> Result<Option<ReferralCode>, Error>;
    async fn increment_referral_use(&self, code_id: Uuid) -> Result<(), Error>;
}

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn get(&self, user_id: Uuid) -> Result<Option<AdminUser>, Error>;
}
