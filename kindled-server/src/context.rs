//! kindled-server/src/context.rs
//!
//! Builds the global ServerContext: database, repositories, services.

use std::sync::Arc;

use tracing::info;

use kindled_common::traits::repository_traits::{
    AdminRepository, ConversationRepository, MatchRepository, MessageRepository,
    ModerationRepository, ProfileRepository, SubscriptionRepository,
};
use kindled_core::repositories::postgres::{
    PostgresAdminRepository, PostgresConversationRepository, PostgresMatchRepository,
    PostgresMessageRepository, PostgresModerationRepository, PostgresProfileRepository,
    PostgresSubscriptionRepository,
};
use kindled_core::services::{
    AdminService, ConversationService, MatchingService, MessageService, ModerationService,
    ProfileService, SubscriptionService,
};
use kindled_core::{Database, Error};

use crate::Args;

/// A bag of references to the database and the domain services, shared
/// with every request handler.
pub struct ServerContext {
    pub db: Database,
    pub matching: Arc<MatchingService>,
    pub conversations: Arc<ConversationService>,
    pub messages: Arc<MessageService>,
    pub profiles: Arc<ProfileService>,
    pub moderation: Arc<ModerationService>,
    pub subscriptions: Arc<SubscriptionService>,
    pub admin: Arc<AdminService>,
}

impl ServerContext {
    pub async fn new(args: &Args) -> Result<Self, Error> {
        // 1) Connect and migrate.
        let db = Database::new(&args.database_url).await?;
        db.migrate().await?;

        // 2) Build repositories over the shared pool.
        let profile_repo: Arc<dyn ProfileRepository> =
            Arc::new(PostgresProfileRepository::new(db.pool().clone()));
        let match_repo: Arc<dyn MatchRepository> =
            Arc::new(PostgresMatchRepository::new(db.pool().clone()));
        let conversation_repo: Arc<dyn ConversationRepository> =
            Arc::new(PostgresConversationRepository::new(db.pool().clone()));
        let message_repo: Arc<dyn MessageRepository> =
            Arc::new(PostgresMessageRepository::new(db.pool().clone()));
        let moderation_repo: Arc<dyn ModerationRepository> =
            Arc::new(PostgresModerationRepository::new(db.pool().clone()));
        let subscription_repo: Arc<dyn SubscriptionRepository> =
            Arc::new(PostgresSubscriptionRepository::new(db.pool().clone()));
        let admin_repo: Arc<dyn AdminRepository> =
            Arc::new(PostgresAdminRepository::new(db.pool().clone()));

        // 3) Wire services.
        let matching = Arc::new(MatchingService::new(
            profile_repo.clone(),
            match_repo.clone(),
            moderation_repo.clone(),
        ));
        let conversations = Arc::new(ConversationService::new(
            conversation_repo.clone(),
            match_repo.clone(),
        ));
        let messages = Arc::new(MessageService::new(
            conversation_repo.clone(),
            message_repo.clone(),
        ));
        let profiles = Arc::new(ProfileService::new(profile_repo.clone()));
        let moderation = Arc::new(ModerationService::new(moderation_repo.clone()));
        let subscriptions = Arc::new(SubscriptionService::new(
            subscription_repo.clone(),
            profile_repo.clone(),
        ));
        let admin = Arc::new(AdminService::new(
            admin_repo,
            profile_repo,
            match_repo,
            conversation_repo,
            moderation_repo,
            subscription_repo,
        ));

        info!("server context ready");

        Ok(Self {
            db,
            matching,
            conversations,
            messages,
            profiles,
            moderation,
            subscriptions,
            admin,
        })
    }
}
