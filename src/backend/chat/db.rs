/**
 * Chat Message Model and Database Operations
 *
 * Chat messages are ephemeral: every row is inserted with an `expires_at`
 * horizon 48 hours out, and the expiry sweeper removes expired rows along
 * with their stored files. `expires_at` doubles as the persisted
 * "deletion due" record, so pending file deletions survive restarts.
 */

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// How long a chat message (and its uploaded file) lives
pub const MESSAGE_TTL_HOURS: i64 = 48;

/// Chat message record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub community_id: Uuid,
    /// None when the message was sent anonymously
    pub author_id: Option<Uuid>,
    pub content: String,
    pub is_anonymous: bool,
    pub reply_to: Option<Uuid>,
    pub file_url: Option<String>,
    pub file_kind: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Chat message joined with its author's display name
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChatMessageWithAuthor {
    pub id: Uuid,
    pub community_id: Uuid,
    pub author_id: Option<Uuid>,
    pub author_username: Option<String>,
    pub content: String,
    pub is_anonymous: bool,
    pub reply_to: Option<Uuid>,
    pub file_url: Option<String>,
    pub file_kind: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

const MESSAGE_COLUMNS: &str = "id, community_id, author_id, content, is_anonymous, reply_to, \
     file_url, file_kind, created_at, expires_at";

/// Parameters for inserting a chat message
#[derive(Debug, Clone)]
pub struct NewChatMessage {
    pub community_id: Uuid,
    pub author_id: Option<Uuid>,
    pub content: String,
    pub is_anonymous: bool,
    pub reply_to: Option<Uuid>,
    pub file_url: Option<String>,
    pub file_kind: Option<String>,
}

/// Insert a chat message with its 48-hour expiry horizon
pub async fn insert_message(
    pool: &PgPool,
    new: NewChatMessage,
) -> Result<ChatMessage, sqlx::Error> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(MESSAGE_TTL_HOURS);

    sqlx::query_as::<_, ChatMessage>(&format!(
        r#"
        INSERT INTO chat_messages
            (id, community_id, author_id, content, is_anonymous, reply_to, file_url, file_kind, created_at, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING {MESSAGE_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(new.community_id)
    .bind(new.author_id)
    .bind(&new.content)
    .bind(new.is_anonymous)
    .bind(new.reply_to)
    .bind(&new.file_url)
    .bind(&new.file_kind)
    .bind(now)
    .bind(expires_at)
    .fetch_one(pool)
    .await
}

/// The latest `limit` unexpired messages of a community, oldest first
pub async fn list_recent(
    pool: &PgPool,
    community_id: Uuid,
    limit: i64,
) -> Result<Vec<ChatMessageWithAuthor>, sqlx::Error> {
    let mut messages = sqlx::query_as::<_, ChatMessageWithAuthor>(
        r#"
        SELECT m.id, m.community_id, m.author_id, u.username AS author_username,
               m.content, m.is_anonymous, m.reply_to, m.file_url, m.file_kind,
               m.created_at, m.expires_at
        FROM chat_messages m
        LEFT JOIN users u ON u.id = m.author_id
        WHERE m.community_id = $1 AND m.expires_at > $2
        ORDER BY m.created_at DESC
        LIMIT $3
        "#,
    )
    .bind(community_id)
    .bind(Utc::now())
    .bind(limit)
    .fetch_all(pool)
    .await?;

    messages.reverse();
    Ok(messages)
}

/// Get a chat message by id
pub async fn get_message(pool: &PgPool, id: Uuid) -> Result<Option<ChatMessage>, sqlx::Error> {
    sqlx::query_as::<_, ChatMessage>(&format!(
        "SELECT {MESSAGE_COLUMNS} FROM chat_messages WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Delete a chat message
pub async fn delete_message(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM chat_messages WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Messages past their expiry horizon: (id, stored file url if any)
pub async fn expired_messages(
    pool: &PgPool,
    now: DateTime<Utc>,
) -> Result<Vec<(Uuid, Option<String>)>, sqlx::Error> {
    sqlx::query_as("SELECT id, file_url FROM chat_messages WHERE expires_at <= $1")
        .bind(now)
        .fetch_all(pool)
        .await
}
