// kindled-server/src/routes/profiles.rs

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use uuid::Uuid;

use kindled_common::models::{PreferencesUpdate, ProfileUpdate};
use kindled_common::Error;

use crate::context::ServerContext;
use crate::server::{ApiResult, AuthedUser};

pub fn router() -> Router<Arc<ServerContext>> {
    Router::new()
        .route("/api/profile", get(own_profile).put(upsert_profile))
        .route(
            "/api/profile/toggle-accepting-chats",
            post(toggle_accepting_chats),
        )
        .route("/api/profiles/{user_id}", get(public_profile))
        .route(
            "/api/match-preferences",
            get(preferences).put(upsert_preferences),
        )
}

/// The caller's own profile, with preferences and subscription.
async fn own_profile(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
) -> ApiResult<Json<Value>> {
    let profile = ctx.profiles.get_profile(caller).await?;
    let preferences = ctx.profiles.get_preferences(caller).await?;
    let subscription = ctx.subscriptions.status(caller).await?;

    Ok(Json(json!({
        "profile": profile,
        "preferences": preferences,
        "subscription": subscription,
    })))
}

async fn upsert_profile(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<Value>> {
    let profile = ctx.profiles.upsert_profile(caller, update).await?;
    Ok(Json(json!({ "profile": profile })))
}

async fn public_profile(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let profile = ctx.profiles.get_public_profile(caller, user_id).await?;
    Ok(Json(json!({ "profile": profile })))
}

async fn toggle_accepting_chats(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
) -> ApiResult<Json<Value>> {
    let profile = ctx.profiles.toggle_accepting_chats(caller).await?;
    Ok(Json(json!({ "profile": profile })))
}

async fn preferences(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
) -> ApiResult<Json<Value>> {
    let preferences = ctx
        .profiles
        .get_preferences(caller)
        .await?
        .ok_or_else(|| Error::not_found("Preferences"))?;
    Ok(Json(json!({ "preferences": preferences })))
}

async fn upsert_preferences(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
    Json(update): Json<PreferencesUpdate>,
) -> ApiResult<Json<Value>> {
    let preferences = ctx.profiles.upsert_preferences(caller, update).await?;
    Ok(Json(json!({ "preferences": preferences })))
}
