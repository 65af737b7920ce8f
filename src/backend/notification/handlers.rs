/**
 * Push Subscription Handler
 *
 * POST /api/notifications/subscribe stores the opaque subscription
 * descriptor sent by the client against the authenticated user. The
 * descriptor is not interpreted here; the transport reads it at delivery
 * time.
 */

use axum::{extract::State, http::StatusCode, response::Json};
use serde::Deserialize;
use sqlx::PgPool;

use crate::backend::auth::users::set_push_subscription;
use crate::backend::error::ApiError;
use crate::backend::middleware::auth::AuthUser;

/// Subscription registration body
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    /// Opaque endpoint descriptor as produced by the client platform
    pub subscription: serde_json::Value,
}

/// Register the authenticated user's push endpoint
///
/// # Errors
///
/// * `400 Bad Request` - descriptor is not a JSON object
pub async fn subscribe(
    State(pool): State<PgPool>,
    AuthUser(user): AuthUser,
    Json(request): Json<SubscribeRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    if !request.subscription.is_object() {
        return Err(ApiError::validation("subscription must be an object"));
    }

    set_push_subscription(&pool, user.user_id, &request.subscription).await?;

    tracing::info!("[Push] Subscription registered for user {}", user.user_id);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "Subscription successful" })),
    ))
}
