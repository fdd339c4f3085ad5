// kindled-common/src/models/subscription.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscription level. The tier is what the daily match quota hangs off.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Premium,
    Vip,
}

impl SubscriptionTier {
    /// Daily match quota for this tier.
    pub fn daily_quota(&self) -> i64 {
        match self {
            SubscriptionTier::Free => 5,
            SubscriptionTier::Premium => 50,
            SubscriptionTier::Vip => 100,
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionTier::Free => write!(f, "free"),
            SubscriptionTier::Premium => write!(f, "premium"),
            SubscriptionTier::Vip => write!(f, "vip"),
        }
    }
}

impl FromStr for SubscriptionTier {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(SubscriptionTier::Free),
            "premium" => Ok(SubscriptionTier::Premium),
            "vip" => Ok(SubscriptionTier::Vip),
            _ => Err(format!("Unknown subscription tier: {}", s)),
        }
    }
}

/// Unknown tiers fall back to free (and therefore the free quota).
impl From<String> for SubscriptionTier {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(SubscriptionTier::Free)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Inactive,
    Expired,
    Cancelled,
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionStatus::Active => write!(f, "active"),
            SubscriptionStatus::Inactive => write!(f, "inactive"),
            SubscriptionStatus::Expired => write!(f, "expired"),
            SubscriptionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "inactive" => Ok(SubscriptionStatus::Inactive),
            "expired" => Ok(SubscriptionStatus::Expired),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            _ => Err(format!("Unknown subscription status: {}", s)),
        }
    }
}

impl From<String> for SubscriptionStatus {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(SubscriptionStatus::Inactive)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentProvider {
    AppleIap,
    GooglePlay,
    Stripe,
}

impl fmt::Display for PaymentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentProvider::AppleIap => write!(f, "apple_iap"),
            PaymentProvider::GooglePlay => write!(f, "google_play"),
            PaymentProvider::Stripe => write!(f, "stripe"),
        }
    }
}

impl FromStr for PaymentProvider {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apple_iap" => Ok(PaymentProvider::AppleIap),
            "google_play" => Ok(PaymentProvider::GooglePlay),
            "stripe" => Ok(PaymentProvider::Stripe),
            _ => Err(format!("Unknown payment provider: {}", s)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tier: SubscriptionTier,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub renewal_date: Option<DateTime<Utc>>,
    pub payment_provider: Option<PaymentProvider>,
    pub transaction_id: Option<String>,
    pub auto_renewal: bool,
    pub referral_code: Option<String>,
    pub referred_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReferralCode {
    pub id: Uuid,
    pub code: String,
    pub created_by: Uuid,
    /// Subscription tier granted on redemption.
    pub tier: SubscriptionTier,
    pub max_uses: Option<i32>,
    pub current_uses: i32,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// One entry of the public tier catalog.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TierInfo {
    pub tier: SubscriptionTier,
    pub name: String,
    pub matches_per_day: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    pub features: Vec<String>,
}

