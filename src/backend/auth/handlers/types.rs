/**
 * Authentication Request/Response Types
 *
 * JSON shapes for the auth endpoints. Field names follow the camelCase
 * convention of the HTTP surface.
 */

use serde::{Deserialize, Serialize};

use crate::backend::auth::users::User;

/// Signup request body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Login request body; accepts either email or username
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email_or_username: String,
    pub password: String,
}

/// Google sign-in request body
///
/// `username` is only required on the first sign-in, when the account does
/// not exist yet.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleAuthRequest {
    pub id_token: String,
    pub username: Option<String>,
}

/// User info returned by auth endpoints (never includes credentials)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub profile_picture: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            profile_picture: user.profile_picture.clone(),
        }
    }
}

/// Auth response: a bearer token plus the user it identifies
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_request_accepts_camel_case() {
        let json = r#"{"emailOrUsername": "alice", "password": "password123"}"#;
        let request: LoginRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.email_or_username, "alice");
    }

    #[test]
    fn test_user_response_omits_credentials() {
        let json = serde_json::to_value(UserResponse {
            id: "x".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            profile_picture: None,
        })
        .unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
    }
}
