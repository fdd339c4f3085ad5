// kindled-server/src/routes/admin.rs

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use kindled_common::models::ReportStatus;
use kindled_common::Error;

use crate::context::ServerContext;
use crate::server::{AdminCaller, ApiResult};

pub fn router() -> Router<Arc<ServerContext>> {
    Router::new()
        .route("/api/admin/verification/pending", get(pending_verifications))
        .route("/api/admin/verification/approve/{user_id}", post(approve))
        .route("/api/admin/verification/reject/{user_id}", post(reject))
        .route("/api/admin/users", get(list_users))
        .route("/api/admin/users/{user_id}", get(user_detail).delete(delete_user))
        .route("/api/admin/users/{user_id}/suspend", post(suspend))
        .route("/api/admin/reports", get(reports_queue))
        .route("/api/admin/reports/{report_id}", post(resolve_report))
        .route("/api/admin/analytics", get(analytics))
}

async fn pending_verifications(
    State(ctx): State<Arc<ServerContext>>,
    _admin: AdminCaller,
) -> ApiResult<Json<Value>> {
    let profiles = ctx.admin.pending_verifications().await?;
    Ok(Json(json!({
        "pendingReviews": profiles.len(),
        "profiles": profiles,
    })))
}

async fn approve(
    State(ctx): State<Arc<ServerContext>>,
    _admin: AdminCaller,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let profile = ctx.admin.approve_profile(user_id).await?;
    Ok(Json(json!({ "profile": profile, "message": "Profile approved" })))
}

#[derive(Debug, Deserialize)]
struct RejectBody {
    reason: String,
}

async fn reject(
    State(ctx): State<Arc<ServerContext>>,
    _admin: AdminCaller,
    Path(user_id): Path<Uuid>,
    Json(body): Json<RejectBody>,
) -> ApiResult<Json<Value>> {
    let profile = ctx.admin.reject_profile(user_id, body.reason).await?;
    Ok(Json(json!({ "profile": profile, "message": "Profile rejected" })))
}

#[derive(Debug, Deserialize, Default)]
struct PageQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

async fn list_users(
    State(ctx): State<Arc<ServerContext>>,
    _admin: AdminCaller,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Value>> {
    let (users, total) = ctx.admin.list_users(page.limit, page.offset).await?;
    Ok(Json(json!({
        "users": users,
        "total": total,
        "limit": page.limit.unwrap_or(20),
        "offset": page.offset.unwrap_or(0),
    })))
}

async fn user_detail(
    State(ctx): State<Arc<ServerContext>>,
    _admin: AdminCaller,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let detail = ctx.admin.user_detail(user_id).await?;
    Ok(Json(json!(detail)))
}

#[derive(Debug, Deserialize, Default)]
struct ReportsQuery {
    status: Option<String>,
}

async fn reports_queue(
    State(ctx): State<Arc<ServerContext>>,
    _admin: AdminCaller,
    Query(query): Query<ReportsQuery>,
) -> ApiResult<Json<Value>> {
    let status = query
        .status
        .map(|s| s.parse::<ReportStatus>())
        .transpose()
        .map_err(Error::Validation)?;

    let reports = ctx.admin.reports_queue(status).await?;
    Ok(Json(json!({
        "status": status.unwrap_or(ReportStatus::Pending),
        "reports": reports,
        "count": reports.len(),
    })))
}

#[derive(Debug, Deserialize)]
struct ResolveBody {
    status: String,
    notes: Option<String>,
}

async fn resolve_report(
    State(ctx): State<Arc<ServerContext>>,
    AdminCaller(admin): AdminCaller,
    Path(report_id): Path<Uuid>,
    Json(body): Json<ResolveBody>,
) -> ApiResult<Json<Value>> {
    let status = body
        .status
        .parse::<ReportStatus>()
        .map_err(Error::Validation)?;

    let report = ctx
        .admin
        .resolve_report(admin.id, report_id, status, body.notes)
        .await?;
    Ok(Json(json!({ "report": report })))
}

async fn analytics(
    State(ctx): State<Arc<ServerContext>>,
    _admin: AdminCaller,
) -> ApiResult<Json<Value>> {
    let analytics = ctx.admin.analytics().await?;
    Ok(Json(json!({ "analytics": analytics })))
}

async fn suspend(
    State(ctx): State<Arc<ServerContext>>,
    AdminCaller(admin): AdminCaller,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let ended = ctx.admin.suspend_user(admin.id, user_id).await?;
    Ok(Json(json!({
        "message": format!("User {} suspended", user_id),
        "conversationsEnded": ended,
    })))
}

async fn delete_user(
    State(ctx): State<Arc<ServerContext>>,
    _admin: AdminCaller,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    ctx.admin.delete_user(user_id).await?;
    Ok(Json(json!({ "message": format!("User {} deleted", user_id) })))
}
