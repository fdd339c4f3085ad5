// kindled-server/src/routes/conversations.rs

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::context::ServerContext;
use crate::server::{ApiResult, AuthedUser};

pub fn router() -> Router<Arc<ServerContext>> {
    Router::new()
        .route("/api/conversations", post(create).get(list))
        .route("/api/conversations/{conversation_id}", get(details))
        .route("/api/conversations/{conversation_id}/snooze", post(snooze))
        .route("/api/conversations/{conversation_id}/end", post(end))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateBody {
    match_id: Uuid,
    message: String,
}

/// Create a conversation from a match. The opener gate (36 characters
/// minimum, post-trim) lives in the service.
async fn create(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
    Json(body): Json<CreateBody>,
) -> ApiResult<Json<Value>> {
    let conversation = ctx
        .conversations
        .open_conversation(caller, body.match_id, &body.message)
        .await?;
    Ok(Json(json!({ "conversation": conversation })))
}

async fn list(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
) -> ApiResult<Json<Value>> {
    let conversations = ctx.conversations.list_for_user(caller).await?;
    Ok(Json(json!({ "conversations": conversations })))
}

async fn details(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
    Path(conversation_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let conversation = ctx.conversations.get(caller, conversation_id).await?;
    Ok(Json(json!({ "conversation": conversation })))
}

#[derive(Debug, Deserialize)]
struct SnoozeBody {
    hours: i64,
}

async fn snooze(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
    Path(conversation_id): Path<Uuid>,
    Json(body): Json<SnoozeBody>,
) -> ApiResult<Json<Value>> {
    let conversation = ctx
        .conversations
        .snooze(caller, conversation_id, body.hours)
        .await?;
    Ok(Json(json!({ "conversation": conversation })))
}

#[derive(Debug, Deserialize, Default)]
struct EndBody {
    reason: Option<String>,
}

async fn end(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
    Path(conversation_id): Path<Uuid>,
    body: Option<Json<EndBody>>,
) -> ApiResult<Json<Value>> {
    let reason = body.and_then(|Json(b)| b.reason);
    let conversation = ctx.conversations.end(caller, conversation_id, reason).await?;
    Ok(Json(json!({ "conversation": conversation })))
}
