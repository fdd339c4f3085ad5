// kindled-core/src/services/admin_service.rs

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use kindled_common::models::{
    AdminUser, Report, ReportStatus, Subscription, SubscriptionStatus, SubscriptionTier,
    UserProfile, VerificationStatus,
};
use kindled_common::traits::repository_traits::{
    AdminRepository, ConversationRepository, MatchRepository, ModerationRepository,
    ProfileRepository, SubscriptionRepository,
};
use kindled_common::Error;

/// Moderation/back-office operations. The admin capability is one
/// lookup (`require_admin`), applied at the route layer instead of
/// being re-implemented per endpoint.
pub struct AdminService {
    admin_repo: Arc<dyn AdminRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    match_repo: Arc<dyn MatchRepository>,
    conversation_repo: Arc<dyn ConversationRepository>,
    moderation_repo: Arc<dyn ModerationRepository>,
    subscription_repo: Arc<dyn SubscriptionRepository>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserDetail {
    pub profile: UserProfile,
    pub subscription: Option<Subscription>,
    pub reports_filed: Vec<Report>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformAnalytics {
    pub total_users: i64,
    pub verified_users: i64,
    pub premium_users: i64,
    pub total_matches: i64,
    pub total_conversations: i64,
    pub active_subscriptions: i64,
    pub total_reports: i64,
    pub pending_reports: i64,
    pub subscription_tier_breakdown: TierBreakdown,
    pub verification_breakdown: VerificationBreakdown,
}

#[derive(Debug, Serialize)]
pub struct TierBreakdown {
    pub free: i64,
    pub premium: i64,
    pub vip: i64,
}

#[derive(Debug, Serialize)]
pub struct VerificationBreakdown {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

impl AdminService {
    pub fn new(
        admin_repo: Arc<dyn AdminRepository>,
        profile_repo: Arc<dyn ProfileRepository>,
        match_repo: Arc<dyn MatchRepository>,
        conversation_repo: Arc<dyn ConversationRepository>,
        moderation_repo: Arc<dyn ModerationRepository>,
        subscription_repo: Arc<dyn SubscriptionRepository>,
    ) -> Self {
        Self {
            admin_repo,
            profile_repo,
            match_repo,
            conversation_repo,
            moderation_repo,
            subscription_repo,
        }
    }

    /// The single admin capability check.
    pub async fn require_admin(&self, user_id: Uuid) -> Result<AdminUser, Error> {
        self.admin_repo
            .get(user_id)
            .await?
            .ok_or_else(|| Error::Unauthorized("Admin access required".to_string()))
    }

    pub async fn has_admin_role(&self, user_id: Uuid) -> Result<bool, Error> {
        Ok(self.admin_repo.get(user_id).await?.is_some())
    }

    pub async fn pending_verifications(&self) -> Result<Vec<UserProfile>, Error> {
        self.profile_repo
            .list_by_verification_status(VerificationStatus::Pending)
            .await
    }

    pub async fn approve_profile(&self, user_id: Uuid) -> Result<UserProfile, Error> {
        let mut profile = self
            .profile_repo
            .get(user_id)
            .await?
            .ok_or_else(|| Error::not_found("User"))?;

        profile.verification_status = VerificationStatus::Approved;
        profile.verification_rejection_reason = None;
        add_badge(&mut profile.badges, "verified");
        profile.updated_at = Utc::now();

        self.profile_repo.update(&profile).await?;
        info!("profile {} approved", user_id);
        Ok(profile)
    }

    pub async fn reject_profile(
        &self,
        user_id: Uuid,
        reason: String,
    ) -> Result<UserProfile, Error> {
        let mut profile = self
            .profile_repo
            .get(user_id)
            .await?
            .ok_or_else(|| Error::not_found("User"))?;

        profile.verification_status = VerificationStatus::Rejected;
        profile.verification_rejection_reason = Some(reason);
        profile.updated_at = Utc::now();

        self.profile_repo.update(&profile).await?;
        info!("profile {} rejected", user_id);
        Ok(profile)
    }

    pub async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<UserProfile>, i64), Error> {
        let limit = limit.unwrap_or(20).clamp(1, 100);
        let offset = offset.unwrap_or(0).max(0);

        let users = self.profile_repo.list(limit, offset).await?;
        let total = self.profile_repo.count_all().await?;
        Ok((users, total))
    }

    pub async fn user_detail(&self, user_id: Uuid) -> Result<AdminUserDetail, Error> {
        let profile = self
            .profile_repo
            .get(user_id)
            .await?
            .ok_or_else(|| Error::not_found("User"))?;

        let subscription = self.subscription_repo.get_for_user(user_id).await?;
        let reports_filed = self
            .moderation_repo
            .list_reports_by_reporter(user_id)
            .await?;

        Ok(AdminUserDetail {
            profile,
            subscription,
            reports_filed,
        })
    }

    pub async fn reports_queue(&self, status: Option<ReportStatus>) -> Result<Vec<Report>, Error> {
        self.moderation_repo
            .list_reports_by_status(status.unwrap_or(ReportStatus::Pending))
            .await
    }

    pub async fn resolve_report(
        &self,
        admin_id: Uuid,
        report_id: Uuid,
        status: ReportStatus,
        notes: Option<String>,
    ) -> Result<Report, Error> {
        let mut report = self
            .moderation_repo
            .get_report(report_id)
            .await?
            .ok_or_else(|| Error::not_found("Report"))?;

        report.status = status;
        report.resolution_notes = notes;
        report.resolved_by = Some(admin_id);
        report.resolved_at = Some(Utc::now());

        self.moderation_repo.update_report(&report).await?;
        Ok(report)
    }

    pub async fn analytics(&self) -> Result<PlatformAnalytics, Error> {
        let total_users = self.profile_repo.count_all().await?;
        let approved = self
            .profile_repo
            .count_by_verification_status(VerificationStatus::Approved)
            .await?;
        let pending = self
            .profile_repo
            .count_by_verification_status(VerificationStatus::Pending)
            .await?;
        let rejected = self
            .profile_repo
            .count_by_verification_status(VerificationStatus::Rejected)
            .await?;

        let free = self
            .profile_repo
            .count_by_tier(SubscriptionTier::Free)
            .await?;
        let premium = self
            .profile_repo
            .count_by_tier(SubscriptionTier::Premium)
            .await?;
        let vip = self.profile_repo.count_by_tier(SubscriptionTier::Vip).await?;

        Ok(PlatformAnalytics {
            total_users,
            verified_users: approved,
            premium_users: premium + vip,
            total_matches: self.match_repo.count_all().await?,
            total_conversations: self.conversation_repo.count_all().await?,
            active_subscriptions: self
                .subscription_repo
                .count_by_status(SubscriptionStatus::Active)
                .await?,
            total_reports: self.moderation_repo.count_reports(None).await?,
            pending_reports: self
                .moderation_repo
                .count_reports(Some(ReportStatus::Pending))
                .await?,
            subscription_tier_breakdown: TierBreakdown { free, premium, vip },
            verification_breakdown: VerificationBreakdown {
                pending,
                approved,
                rejected,
            },
        })
    }

    /// Ends every conversation the user still has open. The profile row
    /// stays; the account just goes quiet.
    pub async fn suspend_user(&self, admin_id: Uuid, user_id: Uuid) -> Result<u64, Error> {
        let conversations = self.conversation_repo.list_for_user(user_id).await?;
        let mut ended = 0;

        for mut conversation in conversations {
            if conversation.is_ended() {
                continue;
            }
            conversation.status = kindled_common::models::ConversationStatus::Ended;
            conversation.ended_by = Some(admin_id);
            conversation.ended_reason = Some("account suspended".to_string());
            self.conversation_repo.update(&conversation).await?;
            ended += 1;
        }

        info!("suspended {}: ended {} conversations", user_id, ended);
        Ok(ended)
    }

    /// Deletes the profile; dependent rows cascade away with it.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), Error> {
        self.profile_repo
            .get(user_id)
            .await?
            .ok_or_else(|| Error::not_found("User"))?;
        self.profile_repo.delete(user_id).await?;
        info!("deleted user {}", user_id);
        Ok(())
    }
}

fn add_badge(badges: &mut Value, badge: &str) {
    match badges {
        Value::Array(arr) => {
            if !arr.iter().any(|b| b == badge) {
                arr.push(json!(badge));
            }
        }
        _ => *badges = json!([badge]),
    }
}
