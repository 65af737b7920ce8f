/**
 * Post Model and Database Operations
 *
 * A post belongs to one community and optionally to one author (no author
 * link means the post is anonymous). Media attachments and reactions live
 * in their own tables; the reaction table's primary key keeps the liked and
 * disliked sets mutually exclusive per user.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::storage::MediaKind;

/// Post record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub community_id: Uuid,
    /// None when the post was created anonymously
    pub author_id: Option<Uuid>,
    pub title: String,
    /// None exactly when the post carries media
    pub content: Option<String>,
    pub is_anonymous: bool,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One media attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub url: String,
}

const POST_COLUMNS: &str =
    "id, community_id, author_id, title, content, is_anonymous, is_pinned, created_at, updated_at";

/// Parameters for persisting a post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub community_id: Uuid,
    pub author_id: Option<Uuid>,
    pub title: String,
    pub content: Option<String>,
    pub is_anonymous: bool,
    pub media: Vec<MediaItem>,
}

/// Persist a post and its media attachments
pub async fn insert_post(pool: &PgPool, new: NewPost) -> Result<Post, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let post = sqlx::query_as::<_, Post>(&format!(
        r#"
        INSERT INTO posts (id, community_id, author_id, title, content, is_anonymous, is_pinned, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7, $8)
        RETURNING {POST_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(new.community_id)
    .bind(new.author_id)
    .bind(&new.title)
    .bind(&new.content)
    .bind(new.is_anonymous)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    for (position, item) in new.media.iter().enumerate() {
        sqlx::query("INSERT INTO post_media (post_id, position, kind, url) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(position as i32)
            .bind(item.kind.as_str())
            .bind(&item.url)
            .execute(pool)
            .await?;
    }

    Ok(post)
}

/// Get a post by id
pub async fn get_post(pool: &PgPool, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Ordered media attachments of a post
pub async fn get_media(pool: &PgPool, post_id: Uuid) -> Result<Vec<MediaItem>, sqlx::Error> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT kind, url FROM post_media WHERE post_id = $1 ORDER BY position")
            .bind(post_id)
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(kind, url)| MediaKind::parse(&kind).map(|kind| MediaItem { kind, url }))
        .collect())
}

/// Update a post's title and content
pub async fn update_post(
    pool: &PgPool,
    id: Uuid,
    title: &str,
    content: Option<&str>,
) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(&format!(
        r#"
        UPDATE posts SET title = $1, content = $2, updated_at = $3
        WHERE id = $4
        RETURNING {POST_COLUMNS}
        "#
    ))
    .bind(title)
    .bind(content)
    .bind(Utc::now())
    .bind(id)
    .fetch_one(pool)
    .await
}

/// Delete a post (media and reactions cascade)
pub async fn delete_post(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// The posts of a community, in link order
pub async fn get_posts_for_community(
    pool: &PgPool,
    community_id: Uuid,
) -> Result<Vec<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(&format!(
        r#"
        SELECT p.{cols}
        FROM posts p
        JOIN community_posts cp ON cp.post_id = p.id
        WHERE cp.community_id = $1
        ORDER BY cp.linked_at
        "#,
        cols = POST_COLUMNS.replace(", ", ", p.")
    ))
    .bind(community_id)
    .fetch_all(pool)
    .await
}

/// The stored reaction of one user on one post, if any
pub async fn get_reaction(
    pool: &PgPool,
    post_id: Uuid,
    user_id: Uuid,
) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT reaction FROM post_reactions WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|r| r.0))
}

/// Store a reaction, replacing any previous one atomically
pub async fn upsert_reaction(
    pool: &PgPool,
    post_id: Uuid,
    user_id: Uuid,
    reaction: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO post_reactions (post_id, user_id, reaction, created_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (post_id, user_id) DO UPDATE SET reaction = EXCLUDED.reaction
        "#,
    )
    .bind(post_id)
    .bind(user_id)
    .bind(reaction)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

/// Remove a user's reaction (back to neutral)
pub async fn clear_reaction(pool: &PgPool, post_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM post_reactions WHERE post_id = $1 AND user_id = $2")
        .bind(post_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// The liking and disliking user sets of a post
pub async fn get_reaction_sets(
    pool: &PgPool,
    post_id: Uuid,
) -> Result<(Vec<Uuid>, Vec<Uuid>), sqlx::Error> {
    let rows: Vec<(Uuid, String)> = sqlx::query_as(
        "SELECT user_id, reaction FROM post_reactions WHERE post_id = $1 ORDER BY created_at",
    )
    .bind(post_id)
    .fetch_all(pool)
    .await?;

    let mut liked_by = Vec::new();
    let mut disliked_by = Vec::new();
    for (user_id, reaction) in rows {
        match reaction.as_str() {
            "like" => liked_by.push(user_id),
            "dislike" => disliked_by.push(user_id),
            _ => {}
        }
    }
    Ok((liked_by, disliked_by))
}
