/**
 * Google Sign-in Handler
 *
 * This module implements POST /api/auth/google: sign in (or sign up) with a
 * Google ID token. The token is verified against Google's tokeninfo
 * endpoint; accounts created this way carry no password credential and are
 * linked through the Google subject id instead.
 *
 * # Flow
 *
 * 1. Verify the ID token with Google; check the audience when
 *    GOOGLE_CLIENT_ID is configured
 * 2. Existing account linked to this Google id: log in
 * 3. Email registered with a password: reject (credentials must not merge
 *    silently)
 * 4. Otherwise create a new account; the first sign-in must supply a
 *    username
 */

use axum::{extract::State, response::Json};
use serde::Deserialize;
use sqlx::PgPool;

use crate::backend::auth::handlers::signup::is_valid_username;
use crate::backend::auth::handlers::types::{AuthResponse, GoogleAuthRequest, UserResponse};
use crate::backend::auth::sessions::create_token;
use crate::backend::auth::users::{
    create_google_user, get_user_by_email, get_user_by_google_id, get_user_by_username, User,
};
use crate::backend::error::ApiError;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Claims returned by Google's tokeninfo endpoint
#[derive(Debug, Deserialize)]
struct GoogleTokenInfo {
    /// Google subject id
    sub: String,
    email: String,
    /// Audience (our client id)
    aud: String,
    picture: Option<String>,
}

/// Verify an ID token against Google's tokeninfo endpoint
async fn verify_id_token(id_token: &str) -> Result<GoogleTokenInfo, ApiError> {
    let url = format!("{TOKENINFO_URL}?id_token={id_token}");
    let response = reqwest::get(&url).await.map_err(|e| {
        tracing::error!("[Auth] tokeninfo request failed: {:?}", e);
        ApiError::upstream("identity provider unavailable")
    })?;

    if !response.status().is_success() {
        tracing::warn!("[Auth] Google rejected ID token: {}", response.status());
        return Err(ApiError::Unauthenticated("Invalid Google token".to_string()));
    }

    let info: GoogleTokenInfo = response.json().await.map_err(|e| {
        tracing::error!("[Auth] tokeninfo response malformed: {:?}", e);
        ApiError::upstream("identity provider returned malformed response")
    })?;

    // Audience check is enforced only when a client id is configured
    if let Ok(client_id) = std::env::var("GOOGLE_CLIENT_ID") {
        if info.aud != client_id {
            tracing::warn!("[Auth] ID token audience mismatch");
            return Err(ApiError::Unauthenticated("Invalid Google token".to_string()));
        }
    }

    Ok(info)
}

fn issue_response(user: &User) -> Result<Json<AuthResponse>, ApiError> {
    let token = create_token(user.id, user.username.clone(), user.email.clone()).map_err(|e| {
        tracing::error!("Failed to create token: {:?}", e);
        ApiError::upstream("token generation failed")
    })?;
    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(user),
    }))
}

/// Google sign-in / sign-up handler
///
/// # Errors
///
/// * `400 Bad Request` - first sign-in without a (valid) username
/// * `401 Unauthorized` - token rejected by Google
/// * `409 Conflict` - email already registered with a password, or username
///   taken
pub async fn google_auth(
    State(pool): State<PgPool>,
    Json(request): Json<GoogleAuthRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let info = verify_id_token(&request.id_token).await?;

    // Already linked: plain login
    if let Some(user) = get_user_by_google_id(&pool, &info.sub).await? {
        tracing::info!("Google login for: {}", user.username);
        return issue_response(&user);
    }

    // Same email but a password account: don't merge credentials silently
    if get_user_by_email(&pool, &info.email).await?.is_some() {
        tracing::warn!("Google sign-in for password-registered email: {}", info.email);
        return Err(ApiError::Conflict(
            "Email already registered. Log in with your password instead.".to_string(),
        ));
    }

    // First sign-in: create the account
    let username = request.username.ok_or_else(|| {
        ApiError::validation("username is required for the first Google sign-in")
    })?;

    if !is_valid_username(&username) {
        return Err(ApiError::validation(
            "Username must be 3-30 chars, start with a letter, and contain only letters, numbers, and underscores",
        ));
    }

    if get_user_by_username(&pool, &username).await?.is_some() {
        return Err(ApiError::Conflict("Username already taken".to_string()));
    }

    let user = create_google_user(&pool, username, info.email, info.sub, info.picture).await?;
    tracing::info!("Google account created: {}", user.username);

    issue_response(&user)
}
