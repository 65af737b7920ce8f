/**
 * Login Handler
 *
 * This module implements the login handler for POST /api/auth/login.
 * Login is accepted by email or by username; accounts without a password
 * credential (Google-linked) cannot log in here.
 */

use axum::{extract::State, response::Json};
use sqlx::PgPool;

use crate::backend::auth::handlers::types::{AuthResponse, LoginRequest, UserResponse};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::get_user_by_email_or_username;
use crate::backend::error::ApiError;

/// Login handler
///
/// # Errors
///
/// * `400 Bad Request` - missing email/username or password
/// * `401 Unauthorized` - unknown user or wrong password
pub async fn login(
    State(pool): State<PgPool>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if request.email_or_username.is_empty() || request.password.is_empty() {
        return Err(ApiError::validation(
            "Please provide email/username and password",
        ));
    }

    tracing::info!("Login request for: {}", request.email_or_username);

    let user = get_user_by_email_or_username(&pool, &request.email_or_username)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Login failed, user not found: {}", request.email_or_username);
            ApiError::Unauthenticated(
                "User not found. Please check your email/username and try again.".to_string(),
            )
        })?;

    // Google-linked accounts carry no password credential
    let password_hash = user.password_hash.as_deref().ok_or_else(|| {
        tracing::warn!("Password login attempted for external account: {}", user.username);
        ApiError::Unauthenticated("This account uses Google sign-in.".to_string())
    })?;

    let password_valid = bcrypt::verify(&request.password, password_hash).map_err(|e| {
        tracing::error!("Password verification failed: {:?}", e);
        ApiError::upstream("password verification failed")
    })?;

    if !password_valid {
        tracing::warn!("Invalid password for: {}", request.email_or_username);
        return Err(ApiError::Unauthenticated(
            "Invalid password. Please try again.".to_string(),
        ));
    }

    let token = create_token(user.id, user.username.clone(), user.email.clone()).map_err(|e| {
        tracing::error!("Failed to create token: {:?}", e);
        ApiError::upstream("token generation failed")
    })?;

    tracing::info!("User logged in: {}", user.username);

    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}
