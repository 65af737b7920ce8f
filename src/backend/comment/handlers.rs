/**
 * Comment HTTP Handlers
 *
 * POST /api/posts/{id}/comments and DELETE /api/posts/{id}/comments/{cid}.
 * Deletion is allowed to the comment's author or to the admin of the
 * community the post belongs to.
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::comment::db;
use crate::backend::community::db as community_db;
use crate::backend::error::ApiError;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::post::db as post_db;
use crate::backend::post::types::{AuthorResponse, CommentResponse};

/// Comment creation body
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// Create a comment on a post
///
/// # Errors
///
/// * `400 Bad Request` - empty content
/// * `404 Not Found` - unknown post
pub async fn create_comment(
    State(pool): State<PgPool>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<Uuid>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    if request.content.trim().is_empty() {
        return Err(ApiError::validation("content is required"));
    }

    post_db::get_post(&pool, post_id)
        .await?
        .ok_or(ApiError::NotFound("post"))?;

    let comment = db::create_comment(&pool, post_id, user.user_id, &request.content).await?;

    tracing::info!("[Comment] Comment {} added to post {}", comment.id, post_id);

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            id: comment.id,
            author: AuthorResponse {
                id: user.user_id,
                username: user.username,
            },
            content: comment.content,
            created_at: comment.created_at,
        }),
    ))
}

/// Delete a comment; author or community admin
///
/// # Errors
///
/// * `403 Forbidden` - requester is neither the author nor the admin
/// * `404 Not Found` - unknown post or comment, or comment on another post
pub async fn delete_comment(
    State(pool): State<PgPool>,
    AuthUser(user): AuthUser,
    Path((post_id, comment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let comment = db::get_comment(&pool, comment_id)
        .await?
        .filter(|c| c.post_id == post_id)
        .ok_or(ApiError::NotFound("comment"))?;

    let is_author = comment.author_id == user.user_id;

    let is_admin = if is_author {
        false
    } else {
        let post = post_db::get_post(&pool, post_id)
            .await?
            .ok_or(ApiError::NotFound("post"))?;
        community_db::get_community(&pool, post.community_id)
            .await?
            .map(|community| community.admin_id == user.user_id)
            .unwrap_or(false)
    };

    if !is_author && !is_admin {
        return Err(ApiError::Forbidden(
            "Not authorized to delete this comment".to_string(),
        ));
    }

    db::delete_comment(&pool, comment_id).await?;

    tracing::info!(
        "[Comment] Comment {} deleted by {}",
        comment_id,
        if is_author { "author" } else { "admin" }
    );

    Ok(Json(serde_json::json!({ "message": "Comment deleted successfully" })))
}
