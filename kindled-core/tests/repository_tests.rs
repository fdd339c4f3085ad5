// kindled-core/tests/repository_tests.rs
//
// Postgres-backed repository tests. These need a disposable database;
// point TEST_DATABASE_URL at one and run with `cargo test -- --ignored`.

use std::sync::Arc;

use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use kindled_common::models::{ConversationStatus, InteractionType, MatchRecord, Message};
use kindled_common::traits::repository_traits::{
    ConversationRepository, MatchRepository, MessageRepository, ModerationRepository,
    ProfileRepository,
};
use kindled_core::repositories::postgres::{
    PostgresConversationRepository, PostgresMatchRepository, PostgresMessageRepository,
    PostgresModerationRepository, PostgresProfileRepository,
};
use kindled_core::services::{ConversationService, MatchingService, MessageService};
use kindled_core::test_utils::helpers::*;
use kindled_core::{Database, Error};

async fn create_test_db_pool() -> Result<Pool<Postgres>, Error> {
    let url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| "postgres://kindled@localhost/kindled_test".to_string());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    Ok(pool)
}

/// Wipes out test data so each test can start fresh.
async fn clean_database(pool: &Pool<Postgres>) -> Result<(), Error> {
    sqlx::query(
        r#"
        TRUNCATE TABLE
            user_profiles,
            admin_users,
            user_matches,
            match_preferences,
            conversations,
            messages,
            subscriptions,
            referral_codes,
            blocked_users,
            reports,
            profile_views
        RESTART IDENTITY CASCADE;
    "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn setup_test_database() -> Result<Database, Error> {
    let pool = create_test_db_pool().await?;
    let db = Database::from_pool(pool);
    db.migrate().await?;
    clean_database(db.pool()).await?;
    Ok(db)
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL pointing at a disposable Postgres"]
async fn test_profile_repository_roundtrip() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let repo = PostgresProfileRepository::new(db.pool().clone());

    let profile = approved_profile(0);
    repo.create(&profile).await?;

    let retrieved = repo.get(profile.id).await?.expect("profile should exist");
    assert_eq!(retrieved.id, profile.id);
    assert!(retrieved.is_approved());
    assert!(retrieved.is_accepting_chats);

    let mut updated = retrieved.clone();
    updated.bio = Some("updated".to_string());
    repo.update(&updated).await?;
    let retrieved = repo.get(profile.id).await?.expect("profile should exist");
    assert_eq!(retrieved.bio.as_deref(), Some("updated"));

    repo.delete(profile.id).await?;
    assert!(repo.get(profile.id).await?.is_none());
    Ok(())
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL pointing at a disposable Postgres"]
async fn test_match_unique_pair_constraint() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let profiles = PostgresProfileRepository::new(db.pool().clone());
    let matches = PostgresMatchRepository::new(db.pool().clone());

    let a = approved_profile(0);
    let b = approved_profile(1);
    profiles.create(&a).await?;
    profiles.create(&b).await?;

    let record = MatchRecord {
        id: Uuid::new_v4(),
        user_id: a.id,
        matched_user_id: b.id,
        batch_date: Utc::now().date_naive(),
        match_score: 50,
        viewed_at: None,
        interaction_type: None,
        created_at: Utc::now(),
    };
    assert!(matches.create(&record).await?);

    // Second insert of the same pair loses to unique_match_pair and is
    // reported as a skip, not an error.
    let duplicate = MatchRecord {
        id: Uuid::new_v4(),
        ..record.clone()
    };
    assert!(!matches.create(&duplicate).await?);

    assert_eq!(matches.count_all().await?, 1);

    matches
        .record_interaction(record.id, InteractionType::Like, Utc::now())
        .await?;
    let stored = matches.get(record.id).await?.expect("match should exist");
    assert_eq!(stored.interaction_type, Some(InteractionType::Like));
    Ok(())
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL pointing at a disposable Postgres"]
async fn test_full_match_to_conversation_flow() -> Result<(), Error> {
    let db = setup_test_database().await?;

    let profile_repo = Arc::new(PostgresProfileRepository::new(db.pool().clone()));
    let match_repo = Arc::new(PostgresMatchRepository::new(db.pool().clone()));
    let conversation_repo = Arc::new(PostgresConversationRepository::new(db.pool().clone()));
    let message_repo = Arc::new(PostgresMessageRepository::new(db.pool().clone()));
    let moderation_repo = Arc::new(PostgresModerationRepository::new(db.pool().clone()));

    let matching = MatchingService::new(
        profile_repo.clone(),
        match_repo.clone(),
        moderation_repo.clone(),
    );
    let conversations = ConversationService::new(conversation_repo.clone(), match_repo.clone());
    let messages = MessageService::new(conversation_repo.clone(), message_repo.clone());

    let me = approved_profile(0);
    profile_repo.create(&me).await?;
    for seq in 1..=3 {
        profile_repo.create(&approved_profile(seq)).await?;
    }

    let batch = matching
        .allocate_daily_batch(me.id, Utc::now().date_naive())
        .await?;
    assert_eq!(batch.new_matches.len(), 3);
    assert_eq!(batch.remaining, 2);

    let conversation = conversations
        .open_conversation(me.id, batch.new_matches[0].id, &"y".repeat(36))
        .await?;
    assert_eq!(conversation.status, ConversationStatus::Active);

    messages.send_message(me.id, conversation.id, "hey").await?;
    let other = conversation.counterpart(me.id);
    let stored = conversations.get(other, conversation.id).await?;
    assert_eq!(stored.unread_count_for(other), 1);

    conversations.end(other, conversation.id, None).await?;
    let err = messages
        .send_message(me.id, conversation.id, "gone?")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConversationEnded));
    Ok(())
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL pointing at a disposable Postgres"]
async fn test_message_mark_read_and_block_pair() -> Result<(), Error> {
    let db = setup_test_database().await?;
    let profiles = PostgresProfileRepository::new(db.pool().clone());
    let conversations = PostgresConversationRepository::new(db.pool().clone());
    let messages = PostgresMessageRepository::new(db.pool().clone());
    let moderation = PostgresModerationRepository::new(db.pool().clone());

    let a = approved_profile(0);
    let b = approved_profile(1);
    profiles.create(&a).await?;
    profiles.create(&b).await?;

    let now = Utc::now();
    let conversation = kindled_common::models::Conversation {
        id: Uuid::new_v4(),
        user1_id: a.id,
        user2_id: b.id,
        initial_opener_message: "z".repeat(36),
        status: ConversationStatus::Active,
        snoozed_until: None,
        snooze_duration: None,
        ended_by: None,
        ended_reason: None,
        last_message_at: None,
        user1_unread_count: 0,
        user2_unread_count: 0,
        created_at: now,
        updated_at: now,
    };
    conversations.create(&conversation).await?;

    messages
        .create(&Message::new(conversation.id, a.id, "one".to_string()))
        .await?;
    messages
        .create(&Message::new(conversation.id, a.id, "two".to_string()))
        .await?;

    let changed = messages.mark_read(conversation.id, a.id, Utc::now()).await?;
    assert_eq!(changed, 2);
    let changed = messages.mark_read(conversation.id, a.id, Utc::now()).await?;
    assert_eq!(changed, 0);

    let block = kindled_common::models::BlockedUser {
        id: Uuid::new_v4(),
        blocker_id: a.id,
        blocked_user_id: b.id,
        reason: None,
        created_at: Utc::now(),
    };
    assert!(moderation.create_block(&block).await?);
    let duplicate = kindled_common::models::BlockedUser {
        id: Uuid::new_v4(),
        ..block.clone()
    };
    assert!(!moderation.create_block(&duplicate).await?);
    Ok(())
}
