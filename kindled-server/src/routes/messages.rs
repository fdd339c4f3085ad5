// kindled-server/src/routes/messages.rs

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::context::ServerContext;
use crate::server::{ApiResult, AuthedUser};

pub fn router() -> Router<Arc<ServerContext>> {
    Router::new()
        .route("/api/messages", post(send))
        .route("/api/messages/unread-count", get(unread_count))
        .route("/api/messages/{conversation_id}", get(list))
        .route("/api/messages/{conversation_id}/mark-read", post(mark_read))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendBody {
    conversation_id: Uuid,
    content: String,
}

async fn send(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
    Json(body): Json<SendBody>,
) -> ApiResult<Json<Value>> {
    let message = ctx
        .messages
        .send_message(caller, body.conversation_id, &body.content)
        .await?;
    Ok(Json(json!({ "message": message })))
}

#[derive(Debug, Deserialize, Default)]
struct PageQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

async fn list(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
    Path(conversation_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Value>> {
    let (messages, total) = ctx
        .messages
        .list_messages(caller, conversation_id, page.limit, page.offset)
        .await?;
    Ok(Json(json!({ "messages": messages, "total": total })))
}

async fn mark_read(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
    Path(conversation_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    ctx.messages.mark_read(caller, conversation_id).await?;
    Ok(Json(json!({ "success": true })))
}

async fn unread_count(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
) -> ApiResult<Json<Value>> {
    let unread = ctx.messages.unread_total(caller).await?;
    Ok(Json(json!({ "unreadCount": unread })))
}
