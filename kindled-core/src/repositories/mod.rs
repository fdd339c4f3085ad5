// kindled-core/src/repositories/mod.rs

pub mod postgres;

pub use postgres::{
    PostgresAdminRepository, PostgresConversationRepository, PostgresMatchRepository,
    PostgresMessageRepository, PostgresModerationRepository, PostgresProfileRepository,
    PostgresSubscriptionRepository,
};
