// kindled-common/src/models/profile.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::subscription::SubscriptionTier;

/// Moderation state of a profile. Only admins move a profile out of
/// `Pending`; ordinary profile edits never touch this field.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationStatus::Pending => write!(f, "pending"),
            VerificationStatus::Approved => write!(f, "approved"),
            VerificationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for VerificationStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(VerificationStatus::Pending),
            "approved" => Ok(VerificationStatus::Approved),
            "rejected" => Ok(VerificationStatus::Rejected),
            _ => Err(format!("Unknown verification status: {}", s)),
        }
    }
}

impl From<String> for VerificationStatus {
    fn from(s: String) -> Self {
        s.parse().unwrap_or(VerificationStatus::Pending)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub phone_number: Option<String>,
    pub phone_verified: bool,
    pub date_of_birth: Option<NaiveDate>,
    pub sex: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub bio: Option<String>,
    /// Array of interest tags.
    pub interests: Value,
    pub verification_status: VerificationStatus,
    pub verification_rejection_reason: Option<String>,
    /// Array of badges: "verified", "premium", ...
    pub badges: Value,
    pub profile_completeness: i32,
    pub subscription_tier: SubscriptionTier,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub last_active_at: Option<DateTime<Utc>>,
    pub is_accepting_chats: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// A fresh, unverified profile with everything else defaulted.
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            phone_number: None,
            phone_verified: false,
            date_of_birth: None,
            sex: None,
            location: None,
            latitude: None,
            longitude: None,
            bio: None,
            interests: Value::Array(vec![]),
            verification_status: VerificationStatus::Pending,
            verification_rejection_reason: None,
            badges: Value::Array(vec![]),
            profile_completeness: 0,
            subscription_tier: SubscriptionTier::Free,
            subscription_expires_at: None,
            last_active_at: None,
            is_accepting_chats: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.verification_status == VerificationStatus::Approved
    }
}

/// Discovery preferences. Advisory only: the allocator does not filter
/// on these (there is no ranking algorithm in this system).
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MatchPreferences {
    pub id: Uuid,
    pub user_id: Uuid,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub preferred_sex: Option<String>,
    /// In km.
    pub max_distance: Option<i32>,
    pub accepted_locations: Option<Value>,
    pub required_interests: Option<Value>,
    pub excluded_interests: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial profile edit: only fields that are present change. Nothing
/// here can touch verification_status or the subscription tier.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub sex: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub bio: Option<String>,
    pub interests: Option<Vec<String>>,
}

impl ProfileUpdate {
    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(v) = &self.phone_number {
            profile.phone_number = Some(v.clone());
        }
        if let Some(v) = self.date_of_birth {
            profile.date_of_birth = Some(v);
        }
        if let Some(v) = &self.sex {
            profile.sex = Some(v.clone());
        }
        if let Some(v) = &self.location {
            profile.location = Some(v.clone());
        }
        if let Some(v) = self.latitude {
            profile.latitude = Some(v);
        }
        if let Some(v) = self.longitude {
            profile.longitude = Some(v);
        }
        if let Some(v) = &self.bio {
            profile.bio = Some(v.clone());
        }
        if let Some(v) = &self.interests {
            profile.interests = Value::Array(
                v.iter().map(|s| Value::String(s.clone())).collect(),
            );
        }
    }
}

/// Partial preferences edit, same present-fields-win semantics.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub preferred_sex: Option<String>,
    pub max_distance: Option<i32>,
    pub accepted_locations: Option<Vec<String>>,
    pub required_interests: Option<Vec<String>>,
    pub excluded_interests: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: Uuid,
    pub viewer_id: Uuid,
    pub viewed_user_id: Uuid,
    pub created_at: DateTime<Utc>,
}
