// kindled-core/src/repositories/postgres/mod.rs

pub mod admin;
pub mod conversations;
pub mod matches;
pub mod messages;
pub mod moderation;
pub mod profile;
pub mod subscriptions;

pub use admin::PostgresAdminRepository;
pub use conversations::PostgresConversationRepository;
pub use matches::PostgresMatchRepository;
pub use messages::PostgresMessageRepository;
pub use moderation::PostgresModerationRepository;
pub use profile::PostgresProfileRepository;
pub use subscriptions::PostgresSubscriptionRepository;

/// True when `err` is a unique-constraint violation on the named
/// constraint. Used to turn insert races into "skip" instead of failure.
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(constraint),
        _ => false,
    }
}
