// kindled-core/tests/services_tests.rs
//
// Profile, moderation, subscription and admin service tests over the
// in-memory repositories.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use kindled_common::models::{
    AdminRole, AdminUser, ConversationStatus, NewReport, PreferencesUpdate, ProfileUpdate,
    ReferralCode, ReportStatus, SubscriptionStatus, SubscriptionTier, VerificationStatus,
};
use kindled_common::traits::repository_traits::{
    ConversationRepository, ProfileRepository, SubscriptionRepository,
};
use kindled_common::Error;
use kindled_core::services::{
    AdminService, ConversationService, MatchingService, ModerationService, ProfileService,
    SubscriptionService,
};
use kindled_core::test_utils::helpers::*;
use kindled_core::test_utils::memory::*;

struct Fixture {
    profile_repo: Arc<InMemoryProfileRepository>,
    match_repo: Arc<InMemoryMatchRepository>,
    conversation_repo: Arc<InMemoryConversationRepository>,
    moderation_repo: Arc<InMemoryModerationRepository>,
    subscription_repo: Arc<InMemorySubscriptionRepository>,
    admin_repo: Arc<InMemoryAdminRepository>,
    profiles: ProfileService,
    moderation: ModerationService,
    subscriptions: SubscriptionService,
    admin: AdminService,
}

fn fixture() -> Fixture {
    let profile_repo = Arc::new(InMemoryProfileRepository::new());
    let match_repo = Arc::new(InMemoryMatchRepository::new());
    let conversation_repo = Arc::new(InMemoryConversationRepository::new());
    let moderation_repo = Arc::new(InMemoryModerationRepository::new());
    let subscription_repo = Arc::new(InMemorySubscriptionRepository::new());
    let admin_repo = Arc::new(InMemoryAdminRepository::new());

    Fixture {
        profiles: ProfileService::new(profile_repo.clone()),
        moderation: ModerationService::new(moderation_repo.clone()),
        subscriptions: SubscriptionService::new(subscription_repo.clone(), profile_repo.clone()),
        admin: AdminService::new(
            admin_repo.clone(),
            profile_repo.clone(),
            match_repo.clone(),
            conversation_repo.clone(),
            moderation_repo.clone(),
            subscription_repo.clone(),
        ),
        profile_repo,
        match_repo,
        conversation_repo,
        moderation_repo,
        subscription_repo,
        admin_repo,
    }
}

fn admin_user(id: Uuid) -> AdminUser {
    AdminUser {
        id,
        admin_email: "mods@kindled.app".to_string(),
        role: AdminRole::Moderator,
        permissions: json!([]),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// ---- profiles ------------------------------------------------------------

#[tokio::test]
async fn profile_upsert_is_partial() -> Result<(), Error> {
    let fx = fixture();
    let user = Uuid::new_v4();

    let created = fx
        .profiles
        .upsert_profile(
            user,
            ProfileUpdate {
                bio: Some("hiker, baker, terrible at bios".to_string()),
                location: Some("Lisbon".to_string()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(created.verification_status, VerificationStatus::Pending);
    assert_eq!(created.bio.as_deref(), Some("hiker, baker, terrible at bios"));

    // A later update that only touches location keeps the bio.
    let updated = fx
        .profiles
        .upsert_profile(
            user,
            ProfileUpdate {
                location: Some("Porto".to_string()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(updated.location.as_deref(), Some("Porto"));
    assert_eq!(updated.bio.as_deref(), Some("hiker, baker, terrible at bios"));
    Ok(())
}

#[tokio::test]
async fn toggle_accepting_chats_flips() -> Result<(), Error> {
    let fx = fixture();
    let profile = approved_profile(0);
    fx.profile_repo.create(&profile).await?;

    let toggled = fx.profiles.toggle_accepting_chats(profile.id).await?;
    assert!(!toggled.is_accepting_chats);
    let toggled = fx.profiles.toggle_accepting_chats(profile.id).await?;
    assert!(toggled.is_accepting_chats);
    Ok(())
}

#[tokio::test]
async fn public_profile_views_are_recorded_except_self_views() -> Result<(), Error> {
    let fx = fixture();
    let subject = approved_profile(0);
    let viewer = approved_profile(1);
    fx.profile_repo.create(&subject).await?;
    fx.profile_repo.create(&viewer).await?;

    fx.profiles.get_public_profile(viewer.id, subject.id).await?;
    assert_eq!(fx.profile_repo.view_count(), 1);

    fx.profiles.get_public_profile(subject.id, subject.id).await?;
    assert_eq!(fx.profile_repo.view_count(), 1);

    let err = fx
        .profiles
        .get_public_profile(viewer.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn preferences_upsert_and_fetch() -> Result<(), Error> {
    let fx = fixture();
    let user = Uuid::new_v4();

    assert!(fx.profiles.get_preferences(user).await?.is_none());

    let prefs = fx
        .profiles
        .upsert_preferences(
            user,
            PreferencesUpdate {
                min_age: Some(25),
                max_age: Some(40),
                max_distance: Some(50),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(prefs.min_age, Some(25));

    let prefs = fx
        .profiles
        .upsert_preferences(
            user,
            PreferencesUpdate {
                max_distance: Some(100),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(prefs.max_distance, Some(100));
    assert_eq!(prefs.min_age, Some(25));
    Ok(())
}

// ---- moderation ----------------------------------------------------------

#[tokio::test]
async fn blocking_yourself_or_twice_is_rejected() -> Result<(), Error> {
    let fx = fixture();
    let me = Uuid::new_v4();
    let other = Uuid::new_v4();

    let err = fx.moderation.block(me, me, None).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    fx.moderation.block(me, other, Some("spam".to_string())).await?;
    let err = fx.moderation.block(me, other, None).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let blocks = fx.moderation.list_blocks(me).await?;
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].blocked_user_id, other);
    Ok(())
}

#[tokio::test]
async fn block_status_sees_both_directions() -> Result<(), Error> {
    let fx = fixture();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    fx.moderation.block(a, b, None).await?;

    let from_a = fx.moderation.block_status(a, b).await?;
    assert!(from_a.is_blocked && from_a.blocked_by_me && !from_a.blocked_by_target);

    let from_b = fx.moderation.block_status(b, a).await?;
    assert!(from_b.is_blocked && !from_b.blocked_by_me && from_b.blocked_by_target);

    // Unblock is idempotent.
    fx.moderation.unblock(a, b).await?;
    fx.moderation.unblock(a, b).await?;
    let after = fx.moderation.block_status(a, b).await?;
    assert!(!after.is_blocked);
    Ok(())
}

#[tokio::test]
async fn reports_need_a_subject_and_not_yourself() -> Result<(), Error> {
    let fx = fixture();
    let me = Uuid::new_v4();
    let other = Uuid::new_v4();

    let err = fx
        .moderation
        .report(
            me,
            NewReport {
                report_type: "spam".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = fx
        .moderation
        .report(
            me,
            NewReport {
                reported_user_id: Some(me),
                report_type: "spam".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let report = fx
        .moderation
        .report(
            me,
            NewReport {
                reported_user_id: Some(other),
                report_type: "harassment".to_string(),
                description: Some("unsolicited sonnets".to_string()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(report.status, ReportStatus::Pending);

    let mine = fx.moderation.my_reports(me).await?;
    assert_eq!(mine.len(), 1);
    Ok(())
}

// ---- subscriptions -------------------------------------------------------

#[tokio::test]
async fn subscribing_syncs_the_profile_tier() -> Result<(), Error> {
    let fx = fixture();
    let profile = approved_profile(0);
    fx.profile_repo.create(&profile).await?;

    assert!(fx.subscriptions.status(profile.id).await?.is_none());

    let subscription = fx
        .subscriptions
        .subscribe(profile.id, SubscriptionTier::Premium)
        .await?;
    assert_eq!(subscription.status, SubscriptionStatus::Active);
    assert!(subscription.end_date.unwrap() > Utc::now());

    let stored = fx.profile_repo.get(profile.id).await?.unwrap();
    assert_eq!(stored.subscription_tier, SubscriptionTier::Premium);

    // The allocator quota follows the new tier immediately.
    let matching = MatchingService::new(
        fx.profile_repo.clone(),
        fx.match_repo.clone(),
        fx.moderation_repo.clone(),
    );
    let batch = matching
        .allocate_daily_batch(profile.id, Utc::now().date_naive())
        .await?;
    assert_eq!(batch.remaining, 50);
    Ok(())
}

#[tokio::test]
async fn cancel_requires_a_subscription() -> Result<(), Error> {
    let fx = fixture();
    let profile = approved_profile(0);
    fx.profile_repo.create(&profile).await?;

    let err = fx.subscriptions.cancel(profile.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    fx.subscriptions
        .subscribe(profile.id, SubscriptionTier::Vip)
        .await?;
    let cancelled = fx.subscriptions.cancel(profile.id).await?;
    assert_eq!(cancelled.status, SubscriptionStatus::Cancelled);
    assert!(!cancelled.auto_renewal);
    Ok(())
}

#[tokio::test]
async fn referral_codes_gate_on_active_uses_and_expiry() -> Result<(), Error> {
    let fx = fixture();
    let profile = approved_profile(0);
    let referrer = approved_profile(1);
    fx.profile_repo.create(&profile).await?;
    fx.profile_repo.create(&referrer).await?;

    let err = fx
        .subscriptions
        .apply_referral(profile.id, "NOPE")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    fx.subscription_repo.insert_referral_code(ReferralCode {
        id: Uuid::new_v4(),
        code: "MAXED".to_string(),
        created_by: referrer.id,
        tier: SubscriptionTier::Premium,
        max_uses: Some(1),
        current_uses: 1,
        expires_at: None,
        is_active: true,
        created_at: Utc::now(),
    });
    let err = fx
        .subscriptions
        .apply_referral(profile.id, "MAXED")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    fx.subscription_repo.insert_referral_code(ReferralCode {
        id: Uuid::new_v4(),
        code: "STALE".to_string(),
        created_by: referrer.id,
        tier: SubscriptionTier::Premium,
        max_uses: None,
        current_uses: 0,
        expires_at: Some(Utc::now() - Duration::days(1)),
        is_active: true,
        created_at: Utc::now(),
    });
    let err = fx
        .subscriptions
        .apply_referral(profile.id, "STALE")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    fx.subscription_repo.insert_referral_code(ReferralCode {
        id: Uuid::new_v4(),
        code: "FRIEND".to_string(),
        created_by: referrer.id,
        tier: SubscriptionTier::Vip,
        max_uses: Some(10),
        current_uses: 0,
        expires_at: None,
        is_active: true,
        created_at: Utc::now(),
    });
    let subscription = fx.subscriptions.apply_referral(profile.id, "FRIEND").await?;
    assert_eq!(subscription.tier, SubscriptionTier::Vip);
    assert_eq!(subscription.referred_by, Some(referrer.id));

    let code = fx
        .subscription_repo
        .get_referral_code("FRIEND")
        .await?
        .unwrap();
    assert_eq!(code.current_uses, 1);
    Ok(())
}

#[tokio::test]
async fn tier_catalog_carries_the_daily_quotas() {
    let fx = fixture();
    let tiers = fx.subscriptions.tiers();
    let quotas: Vec<i64> = tiers.iter().map(|t| t.matches_per_day).collect();
    assert_eq!(quotas, vec![5, 50, 100]);
}

#[tokio::test]
async fn iap_webhooks_map_products_to_tiers() -> Result<(), Error> {
    let fx = fixture();
    let profile = approved_profile(0);
    fx.profile_repo.create(&profile).await?;

    let subscription = fx
        .subscriptions
        .process_iap(
            kindled_common::models::PaymentProvider::AppleIap,
            profile.id,
            "com.kindled.vip_monthly",
            "txn-1",
        )
        .await?;
    assert_eq!(subscription.tier, SubscriptionTier::Vip);

    let subscription = fx
        .subscriptions
        .process_iap(
            kindled_common::models::PaymentProvider::GooglePlay,
            profile.id,
            "something_unrecognized",
            "txn-2",
        )
        .await?;
    assert_eq!(subscription.tier, SubscriptionTier::Premium);
    assert_eq!(subscription.transaction_id.as_deref(), Some("txn-2"));
    Ok(())
}

// ---- admin ---------------------------------------------------------------

#[tokio::test]
async fn require_admin_gates_on_the_admin_table() -> Result<(), Error> {
    let fx = fixture();
    let someone = Uuid::new_v4();

    let err = fx.admin.require_admin(someone).await.unwrap_err();
    assert!(matches!(err, Error::Unauthorized(_)));
    assert!(!fx.admin.has_admin_role(someone).await?);

    fx.admin_repo.insert(admin_user(someone));
    let admin = fx.admin.require_admin(someone).await?;
    assert_eq!(admin.role, AdminRole::Moderator);
    Ok(())
}

#[tokio::test]
async fn verification_review_approves_and_rejects() -> Result<(), Error> {
    let fx = fixture();
    let pending = pending_profile(0);
    fx.profile_repo.create(&pending).await?;

    let queue = fx.admin.pending_verifications().await?;
    assert_eq!(queue.len(), 1);

    let approved = fx.admin.approve_profile(pending.id).await?;
    assert_eq!(approved.verification_status, VerificationStatus::Approved);
    assert!(approved.badges.as_array().unwrap().iter().any(|b| b == "verified"));
    assert!(fx.admin.pending_verifications().await?.is_empty());

    let rejected = fx
        .admin
        .reject_profile(pending.id, "photos do not match".to_string())
        .await?;
    assert_eq!(rejected.verification_status, VerificationStatus::Rejected);
    assert_eq!(
        rejected.verification_rejection_reason.as_deref(),
        Some("photos do not match")
    );

    let err = fx.admin.approve_profile(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn report_resolution_records_the_admin() -> Result<(), Error> {
    let fx = fixture();
    let admin_id = Uuid::new_v4();
    fx.admin_repo.insert(admin_user(admin_id));

    let reporter = Uuid::new_v4();
    let report = fx
        .moderation
        .report(
            reporter,
            NewReport {
                reported_user_id: Some(Uuid::new_v4()),
                report_type: "spam".to_string(),
                ..Default::default()
            },
        )
        .await?;

    let queue = fx.admin.reports_queue(None).await?;
    assert_eq!(queue.len(), 1);

    let resolved = fx
        .admin
        .resolve_report(
            admin_id,
            report.id,
            ReportStatus::Resolved,
            Some("warned the user".to_string()),
        )
        .await?;
    assert_eq!(resolved.status, ReportStatus::Resolved);
    assert_eq!(resolved.resolved_by, Some(admin_id));
    assert!(resolved.resolved_at.is_some());

    assert!(fx.admin.reports_queue(None).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn analytics_counts_line_up() -> Result<(), Error> {
    let fx = fixture();

    fx.profile_repo.create(&approved_profile(0)).await?;
    fx.profile_repo
        .create(&approved_profile_with_tier(1, SubscriptionTier::Premium))
        .await?;
    fx.profile_repo.create(&pending_profile(2)).await?;

    let analytics = fx.admin.analytics().await?;
    assert_eq!(analytics.total_users, 3);
    assert_eq!(analytics.verified_users, 2);
    assert_eq!(analytics.premium_users, 1);
    assert_eq!(analytics.subscription_tier_breakdown.free, 2);
    assert_eq!(analytics.subscription_tier_breakdown.premium, 1);
    assert_eq!(analytics.verification_breakdown.pending, 1);
    Ok(())
}

#[tokio::test]
async fn suspension_ends_every_open_conversation() -> Result<(), Error> {
    let fx = fixture();
    let admin_id = Uuid::new_v4();
    fx.admin_repo.insert(admin_user(admin_id));

    let target = approved_profile(0);
    let other = approved_profile(1);
    fx.profile_repo.create(&target).await?;
    fx.profile_repo.create(&other).await?;

    // Give the target two conversations, one already ended.
    let conversations = ConversationService::new(fx.conversation_repo.clone(), fx.match_repo.clone());
    let matching = MatchingService::new(
        fx.profile_repo.clone(),
        fx.match_repo.clone(),
        fx.moderation_repo.clone(),
    );
    let batch = matching
        .allocate_daily_batch(target.id, Utc::now().date_naive())
        .await?;
    let open = conversations
        .open_conversation(target.id, batch.new_matches[0].id, &"x".repeat(40))
        .await?;

    let ended = fx.admin.suspend_user(admin_id, target.id).await?;
    assert_eq!(ended, 1);

    let after = fx.conversation_repo.get(open.id).await?.unwrap();
    assert_eq!(after.status, ConversationStatus::Ended);
    assert_eq!(after.ended_by, Some(admin_id));
    assert_eq!(after.ended_reason.as_deref(), Some("account suspended"));

    // Idempotent: nothing left to end.
    assert_eq!(fx.admin.suspend_user(admin_id, target.id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn delete_user_removes_the_profile() -> Result<(), Error> {
    let fx = fixture();
    let target = approved_profile(0);
    fx.profile_repo.create(&target).await?;

    fx.admin.delete_user(target.id).await?;
    assert!(fx.profile_repo.get(target.id).await?.is_none());

    let err = fx.admin.delete_user(target.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn user_detail_aggregates_profile_subscription_reports() -> Result<(), Error> {
    let fx = fixture();
    let target = approved_profile(0);
    fx.profile_repo.create(&target).await?;
    fx.subscriptions
        .subscribe(target.id, SubscriptionTier::Premium)
        .await?;
    fx.moderation
        .report(
            target.id,
            NewReport {
                reported_user_id: Some(Uuid::new_v4()),
                report_type: "spam".to_string(),
                ..Default::default()
            },
        )
        .await?;

    let detail = fx.admin.user_detail(target.id).await?;
    assert_eq!(detail.profile.id, target.id);
    assert_eq!(
        detail.subscription.unwrap().tier,
        SubscriptionTier::Premium
    );
    assert_eq!(detail.reports_filed.len(), 1);

    let (users, total) = fx.admin.list_users(None, None).await?;
    assert_eq!(total, 1);
    assert_eq!(users.len(), 1);
    Ok(())
}
