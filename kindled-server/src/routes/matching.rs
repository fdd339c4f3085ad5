// kindled-server/src/routes/matching.rs

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use kindled_common::models::InteractionType;
use kindled_common::Error;

use crate::context::ServerContext;
use crate::server::{ApiResult, AuthedUser};

pub fn router() -> Router<Arc<ServerContext>> {
    Router::new()
        .route("/api/matches", get(daily_batch))
        .route("/api/matches/{match_id}", get(match_details))
        .route("/api/matches/{match_id}/interact", post(interact))
}

/// Runs the allocator for the caller against today's date.
async fn daily_batch(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
) -> ApiResult<Json<Value>> {
    let today = Utc::now().date_naive();
    let batch = ctx.matching.allocate_daily_batch(caller, today).await?;

    Ok(Json(json!({
        "matches": batch.new_matches,
        "count": batch.new_matches.len(),
        "remaining": batch.remaining,
    })))
}

async fn match_details(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
    Path(match_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let (record, profile) = ctx.matching.get_match(caller, match_id).await?;
    Ok(Json(json!({ "match": record, "profile": profile })))
}

#[derive(Debug, Deserialize)]
struct InteractBody {
    action: String,
}

async fn interact(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
    Path(match_id): Path<Uuid>,
    Json(body): Json<InteractBody>,
) -> ApiResult<Json<Value>> {
    let interaction: InteractionType = body
        .action
        .parse()
        .map_err(|e: String| Error::Validation(e))?;

    ctx.matching
        .record_interaction(caller, match_id, interaction)
        .await?;
    Ok(Json(json!({ "success": true })))
}
