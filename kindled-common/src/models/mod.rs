// kindled-common/src/models/mod.rs

pub mod admin;
pub mod conversation;
pub mod matching;
pub mod message;
pub mod moderation;
pub mod profile;
pub mod subscription;

pub use admin::{AdminRole, AdminUser};
pub use conversation::{Conversation, ConversationStatus};
pub use matching::{InteractionType, MatchBatch, MatchRecord};
pub use message::Message;
pub use moderation::{BlockStatus, BlockedUser, NewReport, Report, ReportStatus};
pub use profile::{
    MatchPreferences, PreferencesUpdate, ProfileUpdate, ProfileView, UserProfile,
    VerificationStatus,
};
pub use subscription::{
    PaymentProvider, ReferralCode, Subscription, SubscriptionStatus, SubscriptionTier, TierInfo,
};
