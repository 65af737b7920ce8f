/**
 * Community HTTP Handlers
 *
 * Handlers for the community directory, creation, membership (direct join
 * and invite-code join), deletion, and admin moderation.
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::community::db::{self, Community, CommunitySummary, NewCommunity};
use crate::backend::community::invite;
use crate::backend::error::ApiError;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::post::db as post_db;
use crate::backend::post::handlers::build_post_response;
use crate::backend::post::types::PostResponse;
use crate::backend::realtime::CommunityBroadcastState;
use crate::shared::RealtimeEvent;

/// Community creation body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommunityRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub profile_image: Option<String>,
    pub banner_image: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

/// A community as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub profile_image: Option<String>,
    pub banner_image: Option<String>,
    pub creator: Uuid,
    pub admin: Uuid,
    pub is_private: bool,
    pub invite_code: Option<String>,
    pub member_count: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl CommunityResponse {
    fn build(community: Community, member_count: i64) -> Self {
        Self {
            id: community.id,
            name: community.name,
            description: community.description,
            profile_image: community.profile_image,
            banner_image: community.banner_image,
            creator: community.creator_id,
            admin: community.admin_id,
            is_private: community.is_private,
            invite_code: community.invite_code,
            member_count,
            created_at: community.created_at,
        }
    }
}

/// Community detail: the community plus its post sequence
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityDetailResponse {
    #[serde(flatten)]
    pub community: CommunityResponse,
    pub posts: Vec<PostResponse>,
}

/// List all communities (public directory)
pub async fn list_communities(
    State(pool): State<PgPool>,
) -> Result<Json<Vec<CommunitySummary>>, ApiError> {
    Ok(Json(db::list_communities(&pool).await?))
}

/// Create a community
///
/// The creator becomes admin and first member; the response carries the
/// community's freshly issued invite code.
pub async fn create_community(
    State(pool): State<PgPool>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreateCommunityRequest>,
) -> Result<(StatusCode, Json<CommunityResponse>), ApiError> {
    let name = request.name.unwrap_or_default();
    let description = request.description.unwrap_or_default();

    if name.trim().is_empty() || description.trim().is_empty() {
        return Err(ApiError::validation("Missing required fields"));
    }

    let mut community = db::create_community(
        &pool,
        NewCommunity {
            name,
            description,
            profile_image: request.profile_image,
            banner_image: request.banner_image,
            creator_id: user.user_id,
            is_private: request.is_private,
        },
    )
    .await?;

    // First request for the code; issued here so the response carries it
    let code = invite::issue_invite_code(&pool, community.id).await?;
    community.invite_code = Some(code);

    tracing::info!(
        "[Community] Community {} created by {}",
        community.id,
        user.username
    );

    let member_count = db::member_count(&pool, community.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(CommunityResponse::build(community, member_count)),
    ))
}

/// List the communities the requester belongs to
pub async fn get_user_communities(
    State(pool): State<PgPool>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<CommunitySummary>>, ApiError> {
    Ok(Json(db::get_user_communities(&pool, user.user_id).await?))
}

/// Get a community with its post sequence
pub async fn get_community(
    State(pool): State<PgPool>,
    Path(community_id): Path<Uuid>,
) -> Result<Json<CommunityDetailResponse>, ApiError> {
    let community = db::get_community(&pool, community_id)
        .await?
        .ok_or(ApiError::NotFound("community"))?;

    let member_count = db::member_count(&pool, community_id).await?;

    let mut posts = Vec::new();
    for post in post_db::get_posts_for_community(&pool, community_id).await? {
        posts.push(build_post_response(&pool, post).await?);
    }

    Ok(Json(CommunityDetailResponse {
        community: CommunityResponse::build(community, member_count),
        posts,
    }))
}

/// Join a public community directly
///
/// Private communities are joined through their invite code.
pub async fn join_community(
    State(pool): State<PgPool>,
    AuthUser(user): AuthUser,
    Path(community_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let community = db::get_community(&pool, community_id)
        .await?
        .ok_or(ApiError::NotFound("community"))?;

    if community.is_private {
        return Err(ApiError::Forbidden(
            "This community is private; join with an invite code".to_string(),
        ));
    }

    db::add_member(&pool, community_id, user.user_id).await?;

    tracing::info!("[Community] {} joined community {}", user.username, community_id);

    Ok(Json(serde_json::json!({ "message": "Joined community successfully" })))
}

/// Join a community via its invite code
pub async fn join_by_invite_code(
    State(pool): State<PgPool>,
    AuthUser(user): AuthUser,
    Path(invite_code): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let community = db::find_by_invite_code(&pool, &invite_code)
        .await?
        .ok_or(ApiError::NotFound("community"))?;

    db::add_member(&pool, community.id, user.user_id).await?;

    tracing::info!(
        "[Community] {} joined community {} by invite code",
        user.username,
        community.id
    );

    Ok(Json(serde_json::json!({
        "message": "Joined community successfully",
        "communityId": community.id,
    })))
}

/// Delete a community; admin only
pub async fn delete_community(
    State(pool): State<PgPool>,
    AuthUser(user): AuthUser,
    Path(community_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let community = db::get_community(&pool, community_id)
        .await?
        .ok_or(ApiError::NotFound("community"))?;

    if community.admin_id != user.user_id {
        return Err(ApiError::Forbidden(
            "Not authorized to delete this community".to_string(),
        ));
    }

    db::delete_community(&pool, community_id).await?;

    tracing::info!("[Community] Community {} deleted by its admin", community_id);

    Ok(Json(serde_json::json!({ "message": "Community deleted successfully" })))
}

/// Delete any post in the community; admin only
pub async fn admin_delete_post(
    State(pool): State<PgPool>,
    State(broadcast_state): State<CommunityBroadcastState>,
    AuthUser(user): AuthUser,
    Path((community_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let community = db::get_community(&pool, community_id)
        .await?
        .ok_or(ApiError::NotFound("community"))?;

    if community.admin_id != user.user_id {
        return Err(ApiError::Forbidden(
            "Not authorized to delete this post".to_string(),
        ));
    }

    let post = post_db::get_post(&pool, post_id)
        .await?
        .filter(|p| p.community_id == community_id)
        .ok_or(ApiError::NotFound("post"))?;

    post_db::delete_post(&pool, post.id).await?;
    db::unlink_post(&pool, community_id, post.id).await?;

    broadcast_state.broadcast(RealtimeEvent::post_deleted(community_id, post.id));

    tracing::info!(
        "[Community] Post {} removed from community {} by admin",
        post.id,
        community_id
    );

    Ok(Json(serde_json::json!({ "message": "Post deleted successfully" })))
}
