/**
 * Current User Handler
 *
 * This module implements GET /api/auth/me, returning the authenticated
 * user's info (never the password hash).
 */

use axum::{extract::State, response::Json};
use sqlx::PgPool;

use crate::backend::auth::handlers::types::UserResponse;
use crate::backend::auth::users::get_user_by_id;
use crate::backend::error::ApiError;
use crate::backend::middleware::auth::AuthUser;

/// Get the current authenticated user
///
/// # Errors
///
/// * `401 Unauthorized` - missing or invalid credential (middleware)
/// * `404 Not Found` - token references a deleted user
pub async fn get_me(
    State(pool): State<PgPool>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = get_user_by_id(&pool, user.user_id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    Ok(Json(UserResponse::from(&user)))
}
