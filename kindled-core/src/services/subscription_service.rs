// kindled-core/src/services/subscription_service.rs

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use kindled_common::models::{
    PaymentProvider, Subscription, SubscriptionStatus, SubscriptionTier, TierInfo,
};
use kindled_common::traits::repository_traits::{ProfileRepository, SubscriptionRepository};
use kindled_common::Error;

const SUBSCRIPTION_PERIOD_DAYS: i64 = 30;

/// Subscription upgrades, cancellation, referral redemption and the
/// store webhooks. Tier changes are mirrored onto the profile so the
/// allocator quota follows immediately.
pub struct SubscriptionService {
    subscription_repo: Arc<dyn SubscriptionRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
}

impl SubscriptionService {
    pub fn new(
        subscription_repo: Arc<dyn SubscriptionRepository>,
        profile_repo: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            subscription_repo,
            profile_repo,
        }
    }

    /// None means the implicit free/inactive default.
    pub async fn status(&self, user_id: Uuid) -> Result<Option<Subscription>, Error> {
        self.subscription_repo.get_for_user(user_id).await
    }

    pub async fn subscribe(
        &self,
        user_id: Uuid,
        tier: SubscriptionTier,
    ) -> Result<Subscription, Error> {
        let now = Utc::now();
        let existing = self.subscription_repo.get_for_user(user_id).await?;

        let subscription = Subscription {
            id: existing.as_ref().map(|s| s.id).unwrap_or_else(Uuid::new_v4),
            user_id,
            tier,
            status: SubscriptionStatus::Active,
            start_date: now,
            end_date: Some(now + Duration::days(SUBSCRIPTION_PERIOD_DAYS)),
            renewal_date: None,
            payment_provider: existing.as_ref().and_then(|s| s.payment_provider),
            transaction_id: existing.as_ref().and_then(|s| s.transaction_id.clone()),
            auto_renewal: existing.as_ref().map(|s| s.auto_renewal).unwrap_or(true),
            referral_code: existing.as_ref().and_then(|s| s.referral_code.clone()),
            referred_by: existing.as_ref().and_then(|s| s.referred_by),
            created_at: existing.as_ref().map(|s| s.created_at).unwrap_or(now),
            updated_at: now,
        };

        self.subscription_repo.upsert(&subscription).await?;
        self.profile_repo.set_subscription_tier(user_id, tier).await?;

        info!("{} subscribed to {}", user_id, tier);
        Ok(subscription)
    }

    /// Stops renewal. The profile keeps its tier until expiry; there is
    /// no background downgrade job.
    pub async fn cancel(&self, user_id: Uuid) -> Result<Subscription, Error> {
        let mut subscription = self
            .subscription_repo
            .get_for_user(user_id)
            .await?
            .ok_or_else(|| Error::not_found("Subscription"))?;

        subscription.status = SubscriptionStatus::Cancelled;
        subscription.auto_renewal = false;
        subscription.updated_at = Utc::now();

        self.subscription_repo.upsert(&subscription).await?;
        Ok(subscription)
    }

    pub async fn apply_referral(&self, user_id: Uuid, code: &str) -> Result<Subscription, Error> {
        let now = Utc::now();
        let referral = self
            .subscription_repo
            .get_referral_code(code)
            .await?
            .filter(|c| c.is_active)
            .ok_or_else(|| Error::Validation("Invalid referral code".to_string()))?;

        if let Some(max) = referral.max_uses {
            if referral.current_uses >= max {
                return Err(Error::Validation("Referral code limit reached".to_string()));
            }
        }
        if let Some(expires) = referral.expires_at {
            if expires < now {
                return Err(Error::Validation("Referral code expired".to_string()));
            }
        }

        let existing = self.subscription_repo.get_for_user(user_id).await?;
        let subscription = Subscription {
            id: existing.as_ref().map(|s| s.id).unwrap_or_else(Uuid::new_v4),
            user_id,
            tier: referral.tier,
            status: SubscriptionStatus::Active,
            start_date: now,
            end_date: None,
            renewal_date: None,
            payment_provider: None,
            transaction_id: None,
            auto_renewal: existing.as_ref().map(|s| s.auto_renewal).unwrap_or(true),
            referral_code: Some(referral.code.clone()),
            referred_by: Some(referral.created_by),
            created_at: existing.as_ref().map(|s| s.created_at).unwrap_or(now),
            updated_at: now,
        };

        self.subscription_repo.upsert(&subscription).await?;
        self.subscription_repo
            .increment_referral_use(referral.id)
            .await?;
        self.profile_repo
            .set_subscription_tier(user_id, referral.tier)
            .await?;

        info!("{} redeemed referral code {}", user_id, referral.code);
        Ok(subscription)
    }

    /// Store webhook: the product id decides the tier; unknown products
    /// fall back to premium. Receipt verification happens upstream.
    pub async fn process_iap(
        &self,
        provider: PaymentProvider,
        user_id: Uuid,
        product_id: &str,
        transaction_id: &str,
    ) -> Result<Subscription, Error> {
        let tier = if product_id.ends_with("vip_monthly") {
            SubscriptionTier::Vip
        } else {
            SubscriptionTier::Premium
        };

        let now = Utc::now();
        let existing = self.subscription_repo.get_for_user(user_id).await?;
        let subscription = Subscription {
            id: existing.as_ref().map(|s| s.id).unwrap_or_else(Uuid::new_v4),
            user_id,
            tier,
            status: SubscriptionStatus::Active,
            start_date: existing.as_ref().map(|s| s.start_date).unwrap_or(now),
            end_date: existing.as_ref().and_then(|s| s.end_date),
            renewal_date: None,
            payment_provider: Some(provider),
            transaction_id: Some(transaction_id.to_string()),
            auto_renewal: existing.as_ref().map(|s| s.auto_renewal).unwrap_or(true),
            referral_code: existing.as_ref().and_then(|s| s.referral_code.clone()),
            referred_by: existing.as_ref().and_then(|s| s.referred_by),
            created_at: existing.as_ref().map(|s| s.created_at).unwrap_or(now),
            updated_at: now,
        };

        self.subscription_repo.upsert(&subscription).await?;
        self.profile_repo.set_subscription_tier(user_id, tier).await?;

        Ok(subscription)
    }

    /// The public tier catalog, daily quotas included.
    pub fn tiers(&self) -> Vec<TierInfo> {
        vec![
            TierInfo {
                tier: SubscriptionTier::Free,
                name: "Free".to_string(),
                matches_per_day: SubscriptionTier::Free.daily_quota(),
                price: None,
                features: vec!["Basic profile".to_string()],
            },
            TierInfo {
                tier: SubscriptionTier::Premium,
                name: "Premium".to_string(),
                matches_per_day: SubscriptionTier::Premium.daily_quota(),
                price: Some("$19.99/month".to_string()),
                features: vec![
                    "50 matches/day".to_string(),
                    "Unlimited messaging".to_string(),
                ],
            },
            TierInfo {
                tier: SubscriptionTier::Vip,
                name: "VIP".to_string(),
                matches_per_day: SubscriptionTier::Vip.daily_quota(),
                price: Some("$39.99/month".to_string()),
                features: vec![
                    "100 matches/day".to_string(),
                    "Priority support".to_string(),
                ],
            },
        ]
    }
}
