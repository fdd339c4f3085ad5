// kindled-core/src/services/profile_service.rs

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use kindled_common::models::{
    MatchPreferences, PreferencesUpdate, ProfileUpdate, ProfileView, UserProfile,
};
use kindled_common::traits::repository_traits::ProfileRepository;
use kindled_common::Error;

pub struct ProfileService {
    profile_repo: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(profile_repo: Arc<dyn ProfileRepository>) -> Self {
        Self { profile_repo }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserProfile, Error> {
        self.profile_repo
            .get(user_id)
            .await?
            .ok_or_else(|| Error::not_found("Profile"))
    }

    /// Create-or-update with partial semantics: absent fields keep their
    /// stored value. Verification status is admin-owned and never
    /// touched here.
    pub async fn upsert_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<UserProfile, Error> {
        match self.profile_repo.get(user_id).await? {
            Some(mut profile) => {
                update.apply_to(&mut profile);
                profile.updated_at = Utc::now();
                self.profile_repo.update(&profile).await?;
                Ok(profile)
            }
            None => {
                let mut profile = UserProfile::new(user_id);
                update.apply_to(&mut profile);
                self.profile_repo.create(&profile).await?;
                Ok(profile)
            }
        }
    }

    /// Another user's profile. Looking at someone else leaves a
    /// profile-view record behind; failures there are logged, never
    /// surfaced to the viewer.
    pub async fn get_public_profile(
        &self,
        viewer: Uuid,
        user_id: Uuid,
    ) -> Result<UserProfile, Error> {
        let profile = self
            .profile_repo
            .get(user_id)
            .await?
            .ok_or_else(|| Error::not_found("Profile"))?;

        if viewer != user_id {
            let view = ProfileView {
                id: Uuid::new_v4(),
                viewer_id: viewer,
                viewed_user_id: user_id,
                created_at: Utc::now(),
            };
            if let Err(e) = self.profile_repo.record_view(&view).await {
                warn!("failed to record profile view: {}", e);
            }
        }

        Ok(profile)
    }

    pub async fn toggle_accepting_chats(&self, user_id: Uuid) -> Result<UserProfile, Error> {
        let mut profile = self
            .profile_repo
            .get(user_id)
            .await?
            .ok_or_else(|| Error::not_found("Profile"))?;

        profile.is_accepting_chats = !profile.is_accepting_chats;
        profile.updated_at = Utc::now();
        self.profile_repo.update(&profile).await?;
        Ok(profile)
    }

    pub async fn get_preferences(&self, user_id: Uuid) -> Result<Option<MatchPreferences>, Error> {
        self.profile_repo.get_preferences(user_id).await
    }

    pub async fn upsert_preferences(
        &self,
        user_id: Uuid,
        update: PreferencesUpdate,
    ) -> Result<MatchPreferences, Error> {
        let now = Utc::now();
        let mut prefs = match self.profile_repo.get_preferences(user_id).await? {
            Some(p) => p,
            None => MatchPreferences {
                id: Uuid::new_v4(),
                user_id,
                min_age: None,
                max_age: None,
                preferred_sex: None,
                max_distance: None,
                accepted_locations: None,
                required_interests: None,
                excluded_interests: None,
                created_at: now,
                updated_at: now,
            },
        };

        if let Some(v) = update.min_age {
            prefs.min_age = Some(v);
        }
        if let Some(v) = update.max_age {
            prefs.max_age = Some(v);
        }
        if let Some(v) = update.preferred_sex {
            prefs.preferred_sex = Some(v);
        }
        if let Some(v) = update.max_distance {
            prefs.max_distance = Some(v);
        }
        if let Some(v) = update.accepted_locations {
            prefs.accepted_locations = Some(serde_json::json!(v));
        }
        if let Some(v) = update.required_interests {
            prefs.required_interests = Some(serde_json::json!(v));
        }
        if let Some(v) = update.excluded_interests {
            prefs.excluded_interests = Some(serde_json::json!(v));
        }
        prefs.updated_at = now;

        self.profile_repo.upsert_preferences(&prefs).await?;
        Ok(prefs)
    }
}
