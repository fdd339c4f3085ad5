// kindled-core/src/test_utils/memory.rs

use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use async_trait::async_trait;
use kindled_common::models::{
    AdminUser, BlockedUser, Conversation, ConversationStatus, InteractionType, MatchPreferences,
    MatchRecord, Message, ProfileView, ReferralCode, Report, ReportStatus, Subscription,
    SubscriptionStatus, SubscriptionTier, UserProfile, VerificationStatus,
};
use kindled_common::traits::repository_traits::{
    AdminRepository, ConversationRepository, MatchRepository, MessageRepository,
    ModerationRepository, ProfileRepository, SubscriptionRepository,
};
use kindled_common::Error;

#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: Mutex<Vec<UserProfile>>,
    preferences: Mutex<Vec<MatchPreferences>>,
    views: Mutex<Vec<ProfileView>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view_count(&self) -> usize {
        self.views.lock().unwrap().len()
    }
}

fn sorted_by_creation(mut profiles: Vec<UserProfile>) -> Vec<UserProfile> {
    profiles.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
    profiles
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn create(&self, profile: &UserProfile) -> Result<(), Error> {
        self.profiles.lock().unwrap().push(profile.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<UserProfile>, Error> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn update(&self, profile: &UserProfile) -> Result<(), Error> {
        let mut profiles = self.profiles.lock().unwrap();
        if let Some(existing) = profiles.iter_mut().find(|p| p.id == profile.id) {
            *existing = profile.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), Error> {
        self.profiles.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UserProfile>, Error> {
        let all = sorted_by_creation(self.profiles.lock().unwrap().clone());
        Ok(all
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn list_approved(&self, exclude_user: Uuid) -> Result<Vec<UserProfile>, Error> {
        let all = sorted_by_creation(self.profiles.lock().unwrap().clone());
        Ok(all
            .into_iter()
            .filter(|p| p.id != exclude_user && p.is_approved())
            .collect())
    }

    async fn list_by_verification_status(
        &self,
        status: VerificationStatus,
    ) -> Result<Vec<UserProfile>, Error> {
        let all = sorted_by_creation(self.profiles.lock().unwrap().clone());
        Ok(all
            .into_iter()
            .filter(|p| p.verification_status == status)
            .collect())
    }

    async fn set_subscription_tier(&self, id: Uuid, tier: SubscriptionTier) -> Result<(), Error> {
        let mut profiles = self.profiles.lock().unwrap();
        if let Some(profile) = profiles.iter_mut().find(|p| p.id == id) {
            profile.subscription_tier = tier;
            profile.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn count_all(&self) -> Result<i64, Error> {
        Ok(self.profiles.lock().unwrap().len() as i64)
    }

    async fn count_by_verification_status(
        &self,
        status: VerificationStatus,
    ) -> Result<i64, Error> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.verification_status == status)
            .count() as i64)
    }

    async fn count_by_tier(&self, tier: SubscriptionTier) -> Result<i64, Error> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.subscription_tier == tier)
            .count() as i64)
    }

    async fn get_preferences(&self, user_id: Uuid) -> Result<Option<MatchPreferences>, Error> {
        Ok(self
            .preferences
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn upsert_preferences(&self, prefs: &MatchPreferences) -> Result<(), Error> {
        let mut preferences = self.preferences.lock().unwrap();
        if let Some(existing) = preferences.iter_mut().find(|p| p.user_id == prefs.user_id) {
            *existing = prefs.clone();
        } else {
            preferences.push(prefs.clone());
        }
        Ok(())
    }

    async fn record_view(&self, view: &ProfileView) -> Result<(), Error> {
        self.views.lock().unwrap().push(view.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryMatchRepository {
    matches: Mutex<Vec<MatchRecord>>,
}

impl InMemoryMatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<MatchRecord> {
        self.matches.lock().unwrap().clone()
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    async fn create(&self, record: &MatchRecord) -> Result<bool, Error> {
        let mut matches = self.matches.lock().unwrap();
        // Mirrors the unique_match_pair constraint.
        if matches
            .iter()
            .any(|m| m.user_id == record.user_id && m.matched_user_id == record.matched_user_id)
        {
            return Ok(false);
        }
        matches.push(record.clone());
        Ok(true)
    }

    async fn get(&self, id: Uuid) -> Result<Option<MatchRecord>, Error> {
        Ok(self
            .matches
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn count_for_day(&self, user_id: Uuid, batch_date: NaiveDate) -> Result<i64, Error> {
        Ok(self
            .matches
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.user_id == user_id && m.batch_date == batch_date)
            .count() as i64)
    }

    async fn list_matched_user_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, Error> {
        Ok(self
            .matches
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.matched_user_id)
            .collect())
    }

    async fn record_interaction(
        &self,
        id: Uuid,
        interaction: InteractionType,
        viewed_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let mut matches = self.matches.lock().unwrap();
        if let Some(record) = matches.iter_mut().find(|m| m.id == id) {
            record.interaction_type = Some(interaction);
            record.viewed_at = Some(viewed_at);
        }
        Ok(())
    }

    async fn count_all(&self) -> Result<i64, Error> {
        Ok(self.matches.lock().unwrap().len() as i64)
    }
}

#[derive(Default)]
pub struct InMemoryConversationRepository {
    conversations: Mutex<Vec<Conversation>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn create(&self, conversation: &Conversation) -> Result<(), Error> {
        self.conversations.lock().unwrap().push(conversation.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Conversation>, Error> {
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn update(&self, conversation: &Conversation) -> Result<(), Error> {
        let mut conversations = self.conversations.lock().unwrap();
        if let Some(existing) = conversations.iter_mut().find(|c| c.id == conversation.id) {
            *existing = conversation.clone();
        }
        Ok(())
    }

    async fn list_open_for_user(&self, user_id: Uuid) -> Result<Vec<Conversation>, Error> {
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .filter(|c| {
                c.involves(user_id)
                    && matches!(
                        c.status,
                        ConversationStatus::Active | ConversationStatus::Snoozed
                    )
            })
            .cloned()
            .collect())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Conversation>, Error> {
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.involves(user_id))
            .cloned()
            .collect())
    }

    async fn count_all(&self) -> Result<i64, Error> {
        Ok(self.conversations.lock().unwrap().len() as i64)
    }
}

#[derive(Default)]
pub struct InMemoryMessageRepository {
    messages: Mutex<Vec<Message>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create(&self, message: &Message) -> Result<(), Error> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn list_for_conversation(
        &self,
        conversation_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Message>, Error> {
        let mut messages: Vec<Message> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);
        Ok(messages
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_for_conversation(&self, conversation_id: Uuid) -> Result<i64, Error> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .count() as i64)
    }

    async fn mark_read(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        read_at: DateTime<Utc>,
    ) -> Result<u64, Error> {
        let mut messages = self.messages.lock().unwrap();
        let mut changed = 0;
        for message in messages
            .iter_mut()
            .filter(|m| m.conversation_id == conversation_id && m.sender_id == sender_id && !m.is_read)
        {
            message.is_read = true;
            message.read_at = Some(read_at);
            changed += 1;
        }
        Ok(changed)
    }
}

#[derive(Default)]
pub struct InMemoryModerationRepository {
    blocks: Mutex<Vec<BlockedUser>>,
    reports: Mutex<Vec<Report>>,
}

impl InMemoryModerationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ModerationRepository for InMemoryModerationRepository {
    async fn create_block(&self, block: &BlockedUser) -> Result<bool, Error> {
        let mut blocks = self.blocks.lock().unwrap();
        if blocks
            .iter()
            .any(|b| b.blocker_id == block.blocker_id && b.blocked_user_id == block.blocked_user_id)
        {
            return Ok(false);
        }
        blocks.push(block.clone());
        Ok(true)
    }

    async fn delete_block(&self, blocker_id: Uuid, blocked_user_id: Uuid) -> Result<(), Error> {
        self.blocks
            .lock()
            .unwrap()
            .retain(|b| !(b.blocker_id == blocker_id && b.blocked_user_id == blocked_user_id));
        Ok(())
    }

    async fn get_block(
        &self,
        blocker_id: Uuid,
        blocked_user_id: Uuid,
    ) -> Result<Option<BlockedUser>, Error> {
        Ok(self
            .blocks
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.blocker_id == blocker_id && b.blocked_user_id == blocked_user_id)
            .cloned())
    }

    async fn list_blocks(&self, blocker_id: Uuid) -> Result<Vec<BlockedUser>, Error> {
        Ok(self
            .blocks
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.blocker_id == blocker_id)
            .cloned()
            .collect())
    }

    async fn list_blocked_ids(&self, blocker_id: Uuid) -> Result<Vec<Uuid>, Error> {
        Ok(self
            .blocks
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.blocker_id == blocker_id)
            .map(|b| b.blocked_user_id)
            .collect())
    }

    async fn create_report(&self, report: &Report) -> Result<(), Error> {
        self.reports.lock().unwrap().push(report.clone());
        Ok(())
    }

    async fn get_report(&self, id: Uuid) -> Result<Option<Report>, Error> {
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn update_report(&self, report: &Report) -> Result<(), Error> {
        let mut reports = self.reports.lock().unwrap();
        if let Some(existing) = reports.iter_mut().find(|r| r.id == report.id) {
            *existing = report.clone();
        }
        Ok(())
    }

    async fn list_reports_by_reporter(&self, reporter_id: Uuid) -> Result<Vec<Report>, Error> {
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.reporter_id == reporter_id)
            .cloned()
            .collect())
    }

    async fn list_reports_by_status(&self, status: ReportStatus) -> Result<Vec<Report>, Error> {
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.status == status)
            .cloned()
            .collect())
    }

    async fn count_reports(&self, status: Option<ReportStatus>) -> Result<i64, Error> {
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .filter(|r| status.map(|s| r.status == s).unwrap_or(true))
            .count() as i64)
    }
}

#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: Mutex<Vec<Subscription>>,
    referral_codes: Mutex<Vec<ReferralCode>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_referral_code(&self, code: ReferralCode) {
        self.referral_codes.lock().unwrap().push(code);
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn get_for_user(&self, user_id: Uuid) -> Result<Option<Subscription>, Error> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.user_id == user_id)
            .cloned())
    }

    async fn upsert(&self, subscription: &Subscription) -> Result<(), Error> {
        let mut subscriptions = self.subscriptions.lock().unwrap();
        if let Some(existing) = subscriptions
            .iter_mut()
            .find(|s| s.user_id == subscription.user_id)
        {
            *existing = subscription.clone();
        } else {
            subscriptions.push(subscription.clone());
        }
        Ok(())
    }

    async fn count_by_status(&self, status: SubscriptionStatus) -> Result<i64, Error> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.status == status)
            .count() as i64)
    }

    async fn get_referral_code(&self, code: &str) -> Result<Option<ReferralCode>, Error> {
        Ok(self
            .referral_codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.code == code)
            .cloned())
    }

    async fn increment_referral_use(&self, code_id: Uuid) -> Result<(), Error> {
        let mut codes = self.referral_codes.lock().unwrap();
        if let Some(code) = codes.iter_mut().find(|c| c.id == code_id) {
            code.current_uses += 1;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAdminRepository {
    admins: Mutex<Vec<AdminUser>>,
}

impl InMemoryAdminRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, admin: AdminUser) {
        self.admins.lock().unwrap().push(admin);
    }
}

#[async_trait]
impl AdminRepository for InMemoryAdminRepository {
    async fn get(&self, user_id: Uuid) -> Result<Option<AdminUser>, Error> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == user_id)
            .cloned())
    }
}
