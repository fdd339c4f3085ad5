// kindled-core/src/services/moderation_service.rs

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use kindled_common::models::{BlockStatus, BlockedUser, NewReport, Report, ReportStatus};
use kindled_common::traits::repository_traits::ModerationRepository;
use kindled_common::Error;

/// User-facing safety actions: blocks and reports. Blocks feed straight
/// into the allocator's candidate exclusion.
pub struct ModerationService {
    moderation_repo: Arc<dyn ModerationRepository>,
}

impl ModerationService {
    pub fn new(moderation_repo: Arc<dyn ModerationRepository>) -> Self {
        Self { moderation_repo }
    }

    pub async fn block(
        &self,
        caller: Uuid,
        blocked_user_id: Uuid,
        reason: Option<String>,
    ) -> Result<BlockedUser, Error> {
        if caller == blocked_user_id {
            return Err(Error::Validation("Cannot block yourself".to_string()));
        }

        let block = BlockedUser {
            id: Uuid::new_v4(),
            blocker_id: caller,
            blocked_user_id,
            reason,
            created_at: Utc::now(),
        };

        // unique_block_pair carries the duplicate check, racing callers
        // included.
        if !self.moderation_repo.create_block(&block).await? {
            return Err(Error::Validation("User already blocked".to_string()));
        }

        info!("{} blocked {}", caller, blocked_user_id);
        Ok(block)
    }

    /// Idempotent: unblocking someone who is not blocked is a no-op.
    pub async fn unblock(&self, caller: Uuid, blocked_user_id: Uuid) -> Result<(), Error> {
        self.moderation_repo
            .delete_block(caller, blocked_user_id)
            .await
    }

    pub async fn list_blocks(&self, caller: Uuid) -> Result<Vec<BlockedUser>, Error> {
        self.moderation_repo.list_blocks(caller).await
    }

    pub async fn block_status(&self, caller: Uuid, other: Uuid) -> Result<BlockStatus, Error> {
        let by_me = self.moderation_repo.get_block(caller, other).await?;
        let by_target = self.moderation_repo.get_block(other, caller).await?;

        Ok(BlockStatus {
            is_blocked: by_me.is_some() || by_target.is_some(),
            blocked_by_me: by_me.is_some(),
            blocked_by_target: by_target.is_some(),
        })
    }

    pub async fn report(&self, caller: Uuid, input: NewReport) -> Result<Report, Error> {
        if input.reported_user_id.is_none() && input.conversation_id.is_none() {
            return Err(Error::Validation(
                "Must specify reportedUserId or conversationId".to_string(),
            ));
        }
        if input.reported_user_id == Some(caller) {
            return Err(Error::Validation("Cannot report yourself".to_string()));
        }

        let report = Report {
            id: Uuid::new_v4(),
            reporter_id: caller,
            reported_user_id: input.reported_user_id,
            conversation_id: input.conversation_id,
            report_type: input.report_type,
            description: input.description,
            evidence: input.evidence,
            status: ReportStatus::Pending,
            resolution_notes: None,
            resolved_by: None,
            resolved_at: None,
            created_at: Utc::now(),
        };

        self.moderation_repo.create_report(&report).await?;
        Ok(report)
    }

    pub async fn my_reports(&self, caller: Uuid) -> Result<Vec<Report>, Error> {
        self.moderation_repo.list_reports_by_reporter(caller).await
    }
}
