/**
 * User Model and Database Operations
 *
 * This module handles user data and database operations. A user carries an
 * optional password credential (absent for Google-linked accounts) and an
 * optional push subscription descriptor used by the notification fan-out.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User struct representing a user in the database
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID)
    pub id: Uuid,
    /// Username (unique)
    pub username: String,
    /// User email address (unique)
    pub email: String,
    /// Hashed password (bcrypt); None for externally-authenticated accounts
    pub password_hash: Option<String>,
    /// Whether the account was created through Google sign-in
    pub is_google_user: bool,
    /// Google subject id for externally-authenticated accounts
    pub google_id: Option<String>,
    /// Optional profile picture URL
    pub profile_picture: Option<String>,
    /// Opaque push subscription descriptor; None when the user has not
    /// registered a notification endpoint
    pub push_subscription: Option<serde_json::Value>,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
    /// Updated at timestamp
    pub updated_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, username, email, password_hash, is_google_user, google_id, \
     profile_picture, push_subscription, created_at, updated_at";

/// Create a new password-credentialed user
pub async fn create_user(
    pool: &PgPool,
    username: String,
    email: String,
    password_hash: String,
) -> Result<User, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (id, username, email, password_hash, is_google_user, created_at, updated_at)
        VALUES ($1, $2, $3, $4, FALSE, $5, $6)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&username)
    .bind(&email)
    .bind(&password_hash)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Create a new Google-linked user (no password credential)
pub async fn create_google_user(
    pool: &PgPool,
    username: String,
    email: String,
    google_id: String,
    profile_picture: Option<String>,
) -> Result<User, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let user = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (id, username, email, is_google_user, google_id, profile_picture, created_at, updated_at)
        VALUES ($1, $2, $3, TRUE, $4, $5, $6, $7)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&username)
    .bind(&email)
    .bind(&google_id)
    .bind(&profile_picture)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Get user by ID
pub async fn get_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Get user by email
pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Get user by username
pub async fn get_user_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
}

/// Get user by email or username (login accepts either)
pub async fn get_user_by_email_or_username(
    pool: &PgPool,
    email_or_username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1 OR username = $1"
    ))
    .bind(email_or_username)
    .fetch_optional(pool)
    .await
}

/// Get user by Google subject id
pub async fn get_user_by_google_id(
    pool: &PgPool,
    google_id: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE google_id = $1"
    ))
    .bind(google_id)
    .fetch_optional(pool)
    .await
}

/// Store the opaque push subscription descriptor for a user
pub async fn set_push_subscription(
    pool: &PgPool,
    user_id: Uuid,
    subscription: &serde_json::Value,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET push_subscription = $1, updated_at = $2 WHERE id = $3")
        .bind(subscription)
        .bind(Utc::now())
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Clear a user's push subscription
///
/// Called when the transport reports the endpoint as permanently invalid so
/// future fan-outs skip it.
pub async fn clear_push_subscription(pool: &PgPool, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET push_subscription = NULL, updated_at = $1 WHERE id = $2")
        .bind(Utc::now())
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Resolve a display name for an optional author reference
///
/// Returns None for anonymous content (absent author link). A dangling
/// author id resolves to None as well rather than failing the read.
pub async fn resolve_display_name(
    pool: &PgPool,
    author_id: Option<Uuid>,
) -> Result<Option<String>, sqlx::Error> {
    let Some(id) = author_id else {
        return Ok(None);
    };
    let username: Option<(String,)> =
        sqlx::query_as("SELECT username FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(username.map(|row| row.0))
}
