// kindled-core/src/test_utils/helpers.rs

use chrono::{Duration, Utc};
use uuid::Uuid;

use kindled_common::models::{SubscriptionTier, UserProfile, VerificationStatus};

/// An approved profile, ready to participate in matching. `seq` staggers
/// created_at so candidate ordering is deterministic across a batch of
/// fixtures built in the same instant.
pub fn approved_profile(seq: i64) -> UserProfile {
    let mut profile = UserProfile::new(Uuid::new_v4());
    profile.verification_status = VerificationStatus::Approved;
    profile.created_at = Utc::now() - Duration::hours(24) + Duration::seconds(seq);
    profile.updated_at = profile.created_at;
    profile
}

pub fn approved_profile_with_tier(seq: i64, tier: SubscriptionTier) -> UserProfile {
    let mut profile = approved_profile(seq);
    profile.subscription_tier = tier;
    profile
}

pub fn pending_profile(seq: i64) -> UserProfile {
    let mut profile = approved_profile(seq);
    profile.verification_status = VerificationStatus::Pending;
    profile
}
