/**
 * Community Model and Database Operations
 *
 * A community owns a membership set (`community_members`) and an ordered
 * post sequence (`community_posts`). Appending to the post sequence is a
 * separate write from the post row itself; the creation pipeline documents
 * the resulting consistency window.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::notification::fanout::PushTarget;

/// Community record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Community {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub profile_image: Option<String>,
    pub banner_image: Option<String>,
    pub creator_id: Uuid,
    pub admin_id: Uuid,
    pub is_private: bool,
    /// Generated lazily; None until first issued
    pub invite_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Directory listing entry (public fields only)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CommunitySummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub profile_image: Option<String>,
}

const COMMUNITY_COLUMNS: &str = "id, name, description, profile_image, banner_image, creator_id, \
     admin_id, is_private, invite_code, created_at, updated_at";

/// Parameters for creating a community
#[derive(Debug, Clone)]
pub struct NewCommunity {
    pub name: String,
    pub description: String,
    pub profile_image: Option<String>,
    pub banner_image: Option<String>,
    pub creator_id: Uuid,
    pub is_private: bool,
}

/// Create a community
///
/// The creator becomes the admin and the first member.
pub async fn create_community(pool: &PgPool, new: NewCommunity) -> Result<Community, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let community = sqlx::query_as::<_, Community>(&format!(
        r#"
        INSERT INTO communities
            (id, name, description, profile_image, banner_image, creator_id, admin_id, is_private, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6, $7, $8, $9)
        RETURNING {COMMUNITY_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&new.name)
    .bind(&new.description)
    .bind(&new.profile_image)
    .bind(&new.banner_image)
    .bind(new.creator_id)
    .bind(new.is_private)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    add_member(pool, id, new.creator_id).await?;

    Ok(community)
}

/// Get a community by id
pub async fn get_community(pool: &PgPool, id: Uuid) -> Result<Option<Community>, sqlx::Error> {
    sqlx::query_as::<_, Community>(&format!(
        "SELECT {COMMUNITY_COLUMNS} FROM communities WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// List all communities for the public directory
pub async fn list_communities(pool: &PgPool) -> Result<Vec<CommunitySummary>, sqlx::Error> {
    sqlx::query_as::<_, CommunitySummary>(
        "SELECT id, name, description, profile_image FROM communities ORDER BY created_at",
    )
    .fetch_all(pool)
    .await
}

/// List the communities a user belongs to
pub async fn get_user_communities(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<CommunitySummary>, sqlx::Error> {
    sqlx::query_as::<_, CommunitySummary>(
        r#"
        SELECT c.id, c.name, c.description, c.profile_image
        FROM communities c
        JOIN community_members m ON m.community_id = c.id
        WHERE m.user_id = $1
        ORDER BY m.joined_at
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Find a community by its invite code
pub async fn find_by_invite_code(
    pool: &PgPool,
    code: &str,
) -> Result<Option<Community>, sqlx::Error> {
    sqlx::query_as::<_, Community>(&format!(
        "SELECT {COMMUNITY_COLUMNS} FROM communities WHERE invite_code = $1"
    ))
    .bind(code)
    .fetch_optional(pool)
    .await
}

/// Persist a freshly issued invite code
///
/// The unique index on `invite_code` backstops the lookup-then-set retry
/// loop in `invite::issue_invite_code`.
pub async fn set_invite_code(
    pool: &PgPool,
    community_id: Uuid,
    code: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE communities SET invite_code = $1, updated_at = $2 WHERE id = $3")
        .bind(code)
        .bind(Utc::now())
        .bind(community_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Whether a user is a member of a community
pub async fn is_member(
    pool: &PgPool,
    community_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i32,)> = sqlx::query_as(
        "SELECT 1 FROM community_members WHERE community_id = $1 AND user_id = $2",
    )
    .bind(community_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

/// Add a user to the membership set (idempotent)
pub async fn add_member(pool: &PgPool, community_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO community_members (community_id, user_id, joined_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (community_id, user_id) DO NOTHING
        "#,
    )
    .bind(community_id)
    .bind(user_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

/// Size of the membership set
pub async fn member_count(pool: &PgPool, community_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM community_members WHERE community_id = $1")
            .bind(community_id)
            .fetch_one(pool)
            .await?;
    Ok(row.0)
}

/// Delete a community
pub async fn delete_community(pool: &PgPool, community_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM communities WHERE id = $1")
        .bind(community_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Append a post to the community's post sequence
pub async fn link_post(pool: &PgPool, community_id: Uuid, post_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO community_posts (community_id, post_id, linked_at) VALUES ($1, $2, $3)",
    )
    .bind(community_id)
    .bind(post_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}

/// Remove a post from the community's post sequence
pub async fn unlink_post(
    pool: &PgPool,
    community_id: Uuid,
    post_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM community_posts WHERE community_id = $1 AND post_id = $2")
        .bind(community_id)
        .bind(post_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// The community's post sequence, in link order
pub async fn get_post_ids(pool: &PgPool, community_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
    let rows: Vec<(Uuid,)> = sqlx::query_as(
        "SELECT post_id FROM community_posts WHERE community_id = $1 ORDER BY linked_at",
    )
    .bind(community_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|row| row.0).collect())
}

/// Every member with a registered push endpoint
pub async fn get_members_with_push(
    pool: &PgPool,
    community_id: Uuid,
) -> Result<Vec<PushTarget>, sqlx::Error> {
    let rows: Vec<(Uuid, serde_json::Value)> = sqlx::query_as(
        r#"
        SELECT u.id, u.push_subscription
        FROM users u
        JOIN community_members m ON m.user_id = u.id
        WHERE m.community_id = $1 AND u.push_subscription IS NOT NULL
        "#,
    )
    .bind(community_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(user_id, subscription)| PushTarget {
            user_id,
            subscription,
        })
        .collect())
}
