// kindled-server/src/routes/moderation.rs

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use kindled_common::models::NewReport;

use crate::context::ServerContext;
use crate::server::{ApiResult, AuthedUser};

pub fn router() -> Router<Arc<ServerContext>> {
    Router::new()
        .route("/api/blocks", post(block).get(list_blocks))
        .route("/api/blocks/status/{user_id}", get(block_status))
        .route("/api/blocks/{user_id}", delete(unblock))
        .route("/api/reports", post(report).get(my_reports))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockBody {
    blocked_user_id: Uuid,
    reason: Option<String>,
}

async fn block(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
    Json(body): Json<BlockBody>,
) -> ApiResult<Json<Value>> {
    let block = ctx
        .moderation
        .block(caller, body.blocked_user_id, body.reason)
        .await?;
    Ok(Json(json!({ "block": block, "message": "User blocked" })))
}

async fn unblock(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    ctx.moderation.unblock(caller, user_id).await?;
    Ok(Json(json!({ "message": "User unblocked" })))
}

async fn list_blocks(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
) -> ApiResult<Json<Value>> {
    let blocks = ctx.moderation.list_blocks(caller).await?;
    Ok(Json(json!({ "blockedUsers": blocks, "count": blocks.len() })))
}

async fn block_status(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let status = ctx.moderation.block_status(caller, user_id).await?;
    Ok(Json(json!(status)))
}

async fn report(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
    Json(body): Json<NewReport>,
) -> ApiResult<Json<Value>> {
    let report = ctx.moderation.report(caller, body).await?;
    Ok(Json(json!({ "report": report, "message": "Report submitted" })))
}

async fn my_reports(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
) -> ApiResult<Json<Value>> {
    let reports = ctx.moderation.my_reports(caller).await?;
    Ok(Json(json!({ "reports": reports, "count": reports.len() })))
}
