// kindled-core/src/services/matching_service.rs

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rand::Rng;
use tracing::{debug, info};
use uuid::Uuid;

use kindled_common::models::{InteractionType, MatchBatch, MatchRecord, UserProfile};
use kindled_common::traits::repository_traits::{
    MatchRepository, ModerationRepository, ProfileRepository,
};
use kindled_common::Error;

/// Computes and persists a user's daily match batch, and records the
/// user's reaction to individual proposals.
pub struct MatchingService {
    profile_repo: Arc<dyn ProfileRepository>,
    match_repo: Arc<dyn MatchRepository>,
    moderation_repo: Arc<dyn ModerationRepository>,
}

impl MatchingService {
    pub fn new(
        profile_repo: Arc<dyn ProfileRepository>,
        match_repo: Arc<dyn MatchRepository>,
        moderation_repo: Arc<dyn ModerationRepository>,
    ) -> Self {
        Self {
            profile_repo,
            match_repo,
            moderation_repo,
        }
    }

    /// Runs one allocation for `user_id` against `today`.
    ///
    /// The date is a parameter, not a clock read, so the quota window is
    /// explicit and the whole computation stays deterministic under test.
    /// Running again on the same day is an idempotent no-op once the
    /// quota is spent.
    pub async fn allocate_daily_batch(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<MatchBatch, Error> {
        let profile = self
            .profile_repo
            .get(user_id)
            .await?
            .ok_or_else(|| Error::not_found("Profile"))?;

        if !profile.is_approved() {
            return Err(Error::ProfileNotVerified);
        }

        // 1) Tier quota minus what today already consumed.
        let quota = profile.subscription_tier.daily_quota();
        let already = self.match_repo.count_for_day(user_id, today).await?;
        let remaining = (quota - already).max(0);

        if remaining == 0 {
            debug!("allocation no-op for {}: quota {} spent", user_id, quota);
            return Ok(MatchBatch {
                new_matches: vec![],
                remaining: 0,
            });
        }

        // 2) Candidate pool: approved profiles minus the requester's
        // blocks and everyone ever proposed to them. The matched set is
        // global across all batch dates, not just today's.
        let blocked: HashSet<Uuid> = self
            .moderation_repo
            .list_blocked_ids(user_id)
            .await?
            .into_iter()
            .collect();
        let matched: HashSet<Uuid> = self
            .match_repo
            .list_matched_user_ids(user_id)
            .await?
            .into_iter()
            .collect();

        let candidates = self.profile_repo.list_approved(user_id).await?;

        // 3) Insert up to `remaining` records. A candidate whose insert
        // loses the unique_match_pair race went to a concurrent run of
        // this allocator; skip it rather than fail the batch.
        let mut new_matches = Vec::new();
        for candidate in candidates
            .iter()
            .filter(|c| !blocked.contains(&c.id) && !matched.contains(&c.id))
            .take(remaining as usize)
        {
            let record = new_match_record(user_id, candidate, today);
            if self.match_repo.create(&record).await? {
                new_matches.push(record);
            }
        }

        info!(
            "allocated {} matches for {} ({} of {} remaining)",
            new_matches.len(),
            user_id,
            remaining - new_matches.len() as i64,
            quota
        );

        Ok(MatchBatch {
            remaining: remaining - new_matches.len() as i64,
            new_matches,
        })
    }

    /// The match plus the counterpart's profile, for either participant.
    pub async fn get_match(
        &self,
        caller: Uuid,
        match_id: Uuid,
    ) -> Result<(MatchRecord, UserProfile), Error> {
        let record = self
            .match_repo
            .get(match_id)
            .await?
            .ok_or_else(|| Error::not_found("Match"))?;

        if !record.involves(caller) {
            return Err(Error::Unauthorized(
                "Not a participant in this match".to_string(),
            ));
        }

        let other = self
            .profile_repo
            .get(record.counterpart(caller))
            .await?
            .ok_or_else(|| Error::not_found("User"))?;

        Ok((record, other))
    }

    /// Records like/pass/skip. Only the user the batch was allocated for
    /// owns the record; even the matched-against user may not touch it.
    pub async fn record_interaction(
        &self,
        caller: Uuid,
        match_id: Uuid,
        interaction: InteractionType,
    ) -> Result<(), Error> {
        let record = self
            .match_repo
            .get(match_id)
            .await?
            .ok_or_else(|| Error::not_found("Match"))?;

        if record.user_id != caller {
            return Err(Error::Unauthorized(
                "Only the match owner can record an interaction".to_string(),
            ));
        }

        self.match_repo
            .record_interaction(match_id, interaction, Utc::now())
            .await
    }
}

fn new_match_record(user_id: Uuid, candidate: &UserProfile, today: NaiveDate) -> MatchRecord {
    MatchRecord {
        id: Uuid::new_v4(),
        user_id,
        matched_user_id: candidate.id,
        batch_date: today,
        // Advisory only; nothing downstream filters or ranks on it.
        match_score: rand::rng().random_range(0..100),
        viewed_at: None,
        interaction_type: None,
        created_at: Utc::now(),
    }
}
