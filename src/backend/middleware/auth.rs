/**
 * Authentication Guard
 *
 * This module protects routes that require user authentication. The
 * `AuthUser` extractor pulls the bearer token out of the Authorization
 * header, verifies it, and hands the user identity to the handler; a
 * handler that takes `AuthUser` cannot run unauthenticated.
 *
 * Rejections go through the crate-wide `ApiError` contract, so a missing
 * or invalid credential produces the same JSON error shape as every other
 * failure.
 */

use axum::http::header::AUTHORIZATION;
use uuid::Uuid;

use crate::backend::auth::sessions::verify_token;
use crate::backend::error::ApiError;

/// Authenticated user data extracted from JWT token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

/// Verify the Authorization header and produce the authenticated user
///
/// 1. Extracts the JWT from the `Authorization: Bearer <token>` header
/// 2. Verifies signature and expiry
/// 3. Parses the user identity out of the claims
pub fn authenticate_request(headers: &axum::http::HeaderMap) -> Result<AuthenticatedUser, ApiError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing Authorization header");
            ApiError::Unauthenticated("No token, authorization denied".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::warn!("Invalid Authorization header format");
        ApiError::Unauthenticated("No token, authorization denied".to_string())
    })?;

    let claims = verify_token(token).map_err(|e| {
        tracing::warn!("Invalid token: {:?}", e);
        ApiError::Unauthenticated("Token is not valid".to_string())
    })?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|e| {
        tracing::error!("Invalid user ID in token: {:?}", e);
        ApiError::Unauthenticated("Token is not valid".to_string())
    })?;

    Ok(AuthenticatedUser {
        user_id,
        username: claims.username,
        email: claims.email,
    })
}

/// Axum extractor for the authenticated user
///
/// Use as a handler parameter to require authentication:
///
/// ```rust,ignore
/// async fn handler(AuthUser(user): AuthUser) { /* user.user_id ... */ }
/// ```
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        // A previous extraction on the same request is reused
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(AuthUser(user.clone()));
        }

        let user = authenticate_request(&parts.headers)?;
        parts.extensions.insert(user.clone());
        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::sessions::create_token;
    use axum::http::{HeaderMap, HeaderValue};

    fn headers_with_token(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_authenticate_valid_token() {
        let user_id = Uuid::new_v4();
        let token =
            create_token(user_id, "alice".to_string(), "alice@example.com".to_string()).unwrap();

        let user = authenticate_request(&headers_with_token(&token)).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn test_missing_header_rejected() {
        let result = authenticate_request(&HeaderMap::new());
        assert!(matches!(result, Err(ApiError::Unauthenticated(_))));
    }

    #[test]
    fn test_malformed_scheme_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Token abc"));
        let result = authenticate_request(&headers);
        assert!(matches!(result, Err(ApiError::Unauthenticated(_))));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let result = authenticate_request(&headers_with_token("not.a.jwt"));
        assert!(matches!(result, Err(ApiError::Unauthenticated(_))));
    }
}
