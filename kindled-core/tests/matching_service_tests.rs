// kindled-core/tests/matching_service_tests.rs
//
// Allocator policy tests over the in-memory repositories.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use kindled_common::models::{InteractionType, MatchRecord, SubscriptionTier};
use kindled_common::traits::repository_traits::{
    MatchRepository, ModerationRepository, ProfileRepository,
};
use kindled_common::Error;
use kindled_core::services::MatchingService;
use kindled_core::test_utils::helpers::*;
use kindled_core::test_utils::memory::{
    InMemoryMatchRepository, InMemoryModerationRepository, InMemoryProfileRepository,
};

struct Fixture {
    profile_repo: Arc<InMemoryProfileRepository>,
    match_repo: Arc<InMemoryMatchRepository>,
    moderation_repo: Arc<InMemoryModerationRepository>,
    service: MatchingService,
}

fn fixture() -> Fixture {
    let profile_repo = Arc::new(InMemoryProfileRepository::new());
    let match_repo = Arc::new(InMemoryMatchRepository::new());
    let moderation_repo = Arc::new(InMemoryModerationRepository::new());
    let service = MatchingService::new(
        profile_repo.clone(),
        match_repo.clone(),
        moderation_repo.clone(),
    );
    Fixture {
        profile_repo,
        match_repo,
        moderation_repo,
        service,
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[tokio::test]
async fn free_tier_never_exceeds_five_per_day() -> Result<(), Error> {
    let fx = fixture();

    let me = approved_profile(0);
    fx.profile_repo.create(&me).await?;
    for seq in 1..=10 {
        fx.profile_repo.create(&approved_profile(seq)).await?;
    }

    let batch = fx.service.allocate_daily_batch(me.id, today()).await?;
    assert_eq!(batch.new_matches.len(), 5);
    assert_eq!(batch.remaining, 0);

    // Same day, quota spent: idempotent no-op, not an error.
    let again = fx.service.allocate_daily_batch(me.id, today()).await?;
    assert!(again.new_matches.is_empty());
    assert_eq!(again.remaining, 0);

    assert_eq!(fx.match_repo.all().len(), 5);
    Ok(())
}

#[tokio::test]
async fn pair_uniqueness_is_global_across_days() -> Result<(), Error> {
    let fx = fixture();

    let me = approved_profile(0);
    fx.profile_repo.create(&me).await?;
    for seq in 1..=3 {
        fx.profile_repo.create(&approved_profile(seq)).await?;
    }

    let day1 = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
    let day2 = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();

    let first = fx.service.allocate_daily_batch(me.id, day1).await?;
    assert_eq!(first.new_matches.len(), 3);

    // Next day the quota resets, but every candidate was already
    // proposed once, so nothing new is offered.
    let second = fx.service.allocate_daily_batch(me.id, day2).await?;
    assert!(second.new_matches.is_empty());
    assert_eq!(second.remaining, 5);

    let all = fx.match_repo.all();
    assert_eq!(all.len(), 3);
    for m in &all {
        let dupes = all
            .iter()
            .filter(|o| o.user_id == m.user_id && o.matched_user_id == m.matched_user_id)
            .count();
        assert_eq!(dupes, 1);
    }
    Ok(())
}

#[tokio::test]
async fn blocked_users_are_never_candidates() -> Result<(), Error> {
    let fx = fixture();

    let me = approved_profile(0);
    let blocked = approved_profile(1);
    let other = approved_profile(2);
    fx.profile_repo.create(&me).await?;
    fx.profile_repo.create(&blocked).await?;
    fx.profile_repo.create(&other).await?;

    let block = kindled_common::models::BlockedUser {
        id: Uuid::new_v4(),
        blocker_id: me.id,
        blocked_user_id: blocked.id,
        reason: None,
        created_at: Utc::now(),
    };
    assert!(fx.moderation_repo.create_block(&block).await?);

    let batch = fx.service.allocate_daily_batch(me.id, today()).await?;
    assert_eq!(batch.new_matches.len(), 1);
    assert_eq!(batch.new_matches[0].matched_user_id, other.id);
    Ok(())
}

#[tokio::test]
async fn unverified_profile_is_rejected() -> Result<(), Error> {
    let fx = fixture();

    let me = pending_profile(0);
    fx.profile_repo.create(&me).await?;
    fx.profile_repo.create(&approved_profile(1)).await?;

    let err = fx
        .service
        .allocate_daily_batch(me.id, today())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ProfileNotVerified));
    assert!(fx.match_repo.all().is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_profile_is_not_found() {
    let fx = fixture();
    let err = fx
        .service
        .allocate_daily_batch(Uuid::new_v4(), today())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn premium_user_with_48_matches_gets_at_most_two_more() -> Result<(), Error> {
    let fx = fixture();

    let me = approved_profile_with_tier(0, SubscriptionTier::Premium);
    fx.profile_repo.create(&me).await?;

    // 48 of today's 50 already spent.
    for _ in 0..48 {
        let record = MatchRecord {
            id: Uuid::new_v4(),
            user_id: me.id,
            matched_user_id: Uuid::new_v4(),
            batch_date: today(),
            match_score: 0,
            viewed_at: None,
            interaction_type: None,
            created_at: Utc::now(),
        };
        assert!(fx.match_repo.create(&record).await?);
    }

    for seq in 1..=5 {
        fx.profile_repo.create(&approved_profile(seq)).await?;
    }

    let batch = fx.service.allocate_daily_batch(me.id, today()).await?;
    assert_eq!(batch.new_matches.len(), 2);
    assert_eq!(batch.remaining, 0);
    Ok(())
}

#[tokio::test]
async fn empty_candidate_pool_is_a_successful_empty_batch() -> Result<(), Error> {
    let fx = fixture();

    let me = approved_profile(0);
    fx.profile_repo.create(&me).await?;
    // One pending profile: not a candidate.
    fx.profile_repo.create(&pending_profile(1)).await?;

    let batch = fx.service.allocate_daily_batch(me.id, today()).await?;
    assert!(batch.new_matches.is_empty());
    assert_eq!(batch.remaining, 5);
    Ok(())
}

#[tokio::test]
async fn candidates_come_in_creation_order() -> Result<(), Error> {
    let fx = fixture();

    let me = approved_profile_with_tier(0, SubscriptionTier::Free);
    fx.profile_repo.create(&me).await?;

    let mut expected = Vec::new();
    for seq in 1..=7 {
        let candidate = approved_profile(seq);
        fx.profile_repo.create(&candidate).await?;
        expected.push(candidate.id);
    }

    let batch = fx.service.allocate_daily_batch(me.id, today()).await?;
    let got: Vec<Uuid> = batch.new_matches.iter().map(|m| m.matched_user_id).collect();
    assert_eq!(got, expected[..5].to_vec());
    Ok(())
}

#[tokio::test]
async fn only_the_owner_records_interactions() -> Result<(), Error> {
    let fx = fixture();

    let me = approved_profile(0);
    let candidate = approved_profile(1);
    fx.profile_repo.create(&me).await?;
    fx.profile_repo.create(&candidate).await?;

    let batch = fx.service.allocate_daily_batch(me.id, today()).await?;
    let match_id = batch.new_matches[0].id;

    // The matched-against user does not own the record.
    let err = fx
        .service
        .record_interaction(candidate.id, match_id, InteractionType::Like)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));

    fx.service
        .record_interaction(me.id, match_id, InteractionType::Like)
        .await?;

    let stored = fx.match_repo.get(match_id).await?.unwrap();
    assert_eq!(stored.interaction_type, Some(InteractionType::Like));
    assert!(stored.viewed_at.is_some());

    let err = fx
        .service
        .record_interaction(me.id, Uuid::new_v4(), InteractionType::Pass)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn get_match_returns_counterpart_profile() -> Result<(), Error> {
    let fx = fixture();

    let me = approved_profile(0);
    let candidate = approved_profile(1);
    fx.profile_repo.create(&me).await?;
    fx.profile_repo.create(&candidate).await?;

    let batch = fx.service.allocate_daily_batch(me.id, today()).await?;
    let match_id = batch.new_matches[0].id;

    let (record, other) = fx.service.get_match(me.id, match_id).await?;
    assert_eq!(record.id, match_id);
    assert_eq!(other.id, candidate.id);

    // Either participant may look, a stranger may not.
    let (_, from_other_side) = fx.service.get_match(candidate.id, match_id).await?;
    assert_eq!(from_other_side.id, me.id);

    let err = fx
        .service
        .get_match(Uuid::new_v4(), match_id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
    Ok(())
}
