//! kindled-server/src/server.rs
//!
//! Router assembly, the error-to-status mapping, and the request
//! extractors for the authenticated caller and the admin capability.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::error;
use uuid::Uuid;

use kindled_common::models::AdminUser;
use kindled_common::Error;

use crate::context::ServerContext;
use crate::routes;

pub fn build_router(ctx: ServerContext) -> Router {
    Router::new()
        .merge(routes::profiles::router())
        .merge(routes::matching::router())
        .merge(routes::conversations::router())
        .merge(routes::messages::router())
        .merge(routes::moderation::router())
        .merge(routes::subscription::router())
        .merge(routes::admin::router())
        .with_state(Arc::new(ctx))
        .layer(TraceLayer::new_for_http())
}

pub type ApiResult<T> = Result<T, ApiError>;

/// The wire form of an error: a status plus a human-readable message.
/// Validation failures keep their message; infrastructure failures are
/// logged and collapsed into a generic 500.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn unauthenticated() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Authentication required".to_string(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status = match &err {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::ProfileNotVerified | Error::Unauthorized(_) => StatusCode::FORBIDDEN,
            Error::OpenerTooShort { .. } | Error::ConversationEnded | Error::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Database(_) | Error::Migration(_) | Error::Json(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("internal error: {}", err);
            return Self {
                status,
                message: "Internal server error".to_string(),
            };
        }

        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// The verified caller id, as supplied by the upstream auth layer in
/// the x-user-id header. The core trusts this id without further
/// validation.
pub struct AuthedUser(pub Uuid);

impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .map(AuthedUser)
            .ok_or_else(ApiError::unauthenticated)
    }
}

/// An authenticated caller that also passes the admin capability check.
pub struct AdminCaller(pub AdminUser);

impl FromRequestParts<Arc<ServerContext>> for AdminCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ServerContext>,
    ) -> Result<Self, Self::Rejection> {
        let AuthedUser(caller) = AuthedUser::from_request_parts(parts, state).await?;
        let admin = state.admin.require_admin(caller).await?;
        Ok(AdminCaller(admin))
    }
}
