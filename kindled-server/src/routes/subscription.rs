// kindled-server/src/routes/subscription.rs

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use kindled_common::models::{PaymentProvider, SubscriptionTier};

use crate::context::ServerContext;
use crate::server::{ApiResult, AuthedUser};

pub fn router() -> Router<Arc<ServerContext>> {
    Router::new()
        .route("/api/subscription", post(subscribe))
        .route("/api/subscription/status", get(status))
        .route("/api/subscription/cancel", post(cancel))
        .route("/api/subscription/referral", post(referral))
        .route("/api/subscription/tiers", get(tiers))
        .route("/api/subscription/webhook/apple", post(apple_webhook))
        .route("/api/subscription/webhook/google", post(google_webhook))
}

async fn status(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
) -> ApiResult<Json<Value>> {
    match ctx.subscriptions.status(caller).await? {
        Some(subscription) => Ok(Json(json!(subscription))),
        // No row yet: the implicit free default.
        None => Ok(Json(json!({ "tier": "free", "status": "inactive" }))),
    }
}

#[derive(Debug, Deserialize)]
struct SubscribeBody {
    tier: String,
}

async fn subscribe(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
    Json(body): Json<SubscribeBody>,
) -> ApiResult<Json<Value>> {
    // Unknown tier strings deliberately fall back to free.
    let tier = SubscriptionTier::from(body.tier);
    let subscription = ctx.subscriptions.subscribe(caller, tier).await?;
    Ok(Json(json!({ "subscription": subscription })))
}

async fn cancel(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
) -> ApiResult<Json<Value>> {
    ctx.subscriptions.cancel(caller).await?;
    Ok(Json(json!({ "message": "Subscription cancelled" })))
}

#[derive(Debug, Deserialize)]
struct ReferralBody {
    code: String,
}

async fn referral(
    State(ctx): State<Arc<ServerContext>>,
    AuthedUser(caller): AuthedUser,
    Json(body): Json<ReferralBody>,
) -> ApiResult<Json<Value>> {
    let subscription = ctx.subscriptions.apply_referral(caller, &body.code).await?;
    Ok(Json(json!({
        "subscription": subscription,
        "message": "Subscription activated with referral code",
    })))
}

async fn tiers(State(ctx): State<Arc<ServerContext>>) -> ApiResult<Json<Value>> {
    Ok(Json(json!({ "tiers": ctx.subscriptions.tiers() })))
}

/// Store webhooks carry their own user id; the store, not the user, is
/// the authenticated party upstream.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppleWebhookBody {
    user_id: Uuid,
    transaction_id: String,
    product_id: String,
}

async fn apple_webhook(
    State(ctx): State<Arc<ServerContext>>,
    Json(body): Json<AppleWebhookBody>,
) -> ApiResult<Json<Value>> {
    ctx.subscriptions
        .process_iap(
            PaymentProvider::AppleIap,
            body.user_id,
            &body.product_id,
            &body.transaction_id,
        )
        .await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleWebhookBody {
    user_id: Uuid,
    product_id: String,
    purchase_token: String,
}

async fn google_webhook(
    State(ctx): State<Arc<ServerContext>>,
    Json(body): Json<GoogleWebhookBody>,
) -> ApiResult<Json<Value>> {
    ctx.subscriptions
        .process_iap(
            PaymentProvider::GooglePlay,
            body.user_id,
            &body.product_id,
            &body.purchase_token,
        )
        .await?;
    Ok(Json(json!({ "success": true })))
}
