/**
 * Post HTTP Handlers
 *
 * Handlers for creating (via the pipeline), reading, updating, deleting,
 * and reacting to posts. Creation accepts either a JSON body (text posts)
 * or a multipart form carrying a `media` file.
 */

use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::Json,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::auth::users::resolve_display_name;
use crate::backend::comment::db as comment_db;
use crate::backend::community::db as community_db;
use crate::backend::error::ApiError;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::post::db::{self, Post};
use crate::backend::post::pipeline;
use crate::backend::post::reaction::{toggle_reaction, ReactionKind};
use crate::backend::post::types::{
    CreatePostInput, CreatePostRequest, PostResponse, PostShape, UpdatePostRequest, UploadedFile,
};
use crate::backend::server::state::AppState;
use crate::shared::RealtimeEvent;

/// Assemble the full API response for a stored post
pub(crate) async fn build_post_response(
    pool: &PgPool,
    post: Post,
) -> Result<PostResponse, ApiError> {
    let media = db::get_media(pool, post.id).await?;
    let author_username = resolve_display_name(pool, post.author_id).await?;
    let (liked_by, disliked_by) = db::get_reaction_sets(pool, post.id).await?;
    let comments = comment_db::get_comments_with_authors(pool, post.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(PostResponse::build(
        post,
        media,
        author_username,
        liked_by,
        disliked_by,
        comments,
    ))
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

/// Parse the creation input out of a multipart form
///
/// Recognized fields: `title`, `content`, `isAnonymous`, `postType`, and at
/// most one `media` file.
async fn parse_multipart_input(mut multipart: Multipart) -> Result<CreatePostInput, ApiError> {
    let mut title = String::new();
    let mut content: Option<String> = None;
    let mut is_anonymous = false;
    let mut selector = "text".to_string();
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => {
                title = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(format!("malformed title field: {e}")))?;
            }
            "content" => {
                content = Some(field.text().await.map_err(|e| {
                    ApiError::validation(format!("malformed content field: {e}"))
                })?);
            }
            "isAnonymous" => {
                let value = field.text().await.map_err(|e| {
                    ApiError::validation(format!("malformed isAnonymous field: {e}"))
                })?;
                is_anonymous = value == "true";
            }
            "postType" => {
                selector = field.text().await.map_err(|e| {
                    ApiError::validation(format!("malformed postType field: {e}"))
                })?;
            }
            "media" => {
                if file.is_some() {
                    return Err(ApiError::validation(
                        "a media post requires exactly one attached file",
                    ));
                }
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("malformed media field: {e}")))?
                    .to_vec();
                file = Some(UploadedFile {
                    filename,
                    content_type,
                    data,
                });
            }
            other => {
                tracing::debug!("[Pipeline] Ignoring unknown multipart field '{}'", other);
            }
        }
    }

    Ok(CreatePostInput {
        title,
        content,
        shape: PostShape::parse(&selector)?,
        is_anonymous,
        file,
    })
}

/// Parse the creation input out of either request flavor
async fn parse_create_request(request: Request) -> Result<CreatePostInput, ApiError> {
    if is_multipart(&request) {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|e| ApiError::validation(format!("invalid multipart request: {e}")))?;
        return parse_multipart_input(multipart).await;
    }

    let Json(body): Json<CreatePostRequest> = Json::from_request(request, &())
        .await
        .map_err(|e| ApiError::validation(format!("invalid JSON body: {e}")))?;

    // A bare JSON body defaults to the text shape; it cannot carry a file
    let selector = body.post_type.unwrap_or_else(|| "text".to_string());

    Ok(CreatePostInput {
        title: body.title.unwrap_or_default(),
        content: body.content,
        shape: PostShape::parse(&selector)?,
        is_anonymous: body.is_anonymous,
        file: None,
    })
}

/// Create a post in a community (the pipeline entry point)
///
/// # Errors
///
/// * `400 Bad Request` - shape validation failure
/// * `403 Forbidden` - non-member, when the membership policy is on
/// * `404 Not Found` - unknown community
/// * `502 Bad Gateway` - media upload failure (nothing was persisted)
pub async fn create_post(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(community_id): Path<Uuid>,
    request: Request,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let input = parse_create_request(request).await?;

    let response = pipeline::create_post(
        &app_state.db_pool,
        app_state.object_store.as_ref(),
        app_state.push_transport.as_ref(),
        &app_state.community_broadcast,
        &user,
        community_id,
        input,
        app_state.config.require_membership_to_post,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Get a post with author display name and nested comments
pub async fn get_post(
    State(pool): State<PgPool>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = db::get_post(&pool, post_id)
        .await?
        .ok_or(ApiError::NotFound("post"))?;

    Ok(Json(build_post_response(&pool, post).await?))
}

/// Update a post's title/content; author only
///
/// An anonymous post carries no author reference, so nobody can edit it.
pub async fn update_post(
    State(pool): State<PgPool>,
    State(broadcast_state): State<crate::backend::realtime::CommunityBroadcastState>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<Uuid>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = db::get_post(&pool, post_id)
        .await?
        .ok_or(ApiError::NotFound("post"))?;

    if post.author_id != Some(user.user_id) {
        return Err(ApiError::Forbidden(
            "Not authorized to update this post".to_string(),
        ));
    }

    if request.title.trim().is_empty() {
        return Err(ApiError::validation("title is required"));
    }

    let updated = db::update_post(&pool, post_id, &request.title, request.content.as_deref())
        .await?;
    let community_id = updated.community_id;
    let response = build_post_response(&pool, updated).await?;

    // Best-effort: an update is still an update even if nobody is listening
    if let Ok(payload) = serde_json::to_value(&response) {
        broadcast_state.broadcast(RealtimeEvent::post_updated(community_id, payload));
    }

    Ok(Json(response))
}

/// Delete a post; author only
///
/// Removes the post and detaches it from the community's post sequence,
/// then broadcasts `postDeleted` with the id.
pub async fn delete_post(
    State(pool): State<PgPool>,
    State(broadcast_state): State<crate::backend::realtime::CommunityBroadcastState>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let post = db::get_post(&pool, post_id)
        .await?
        .ok_or(ApiError::NotFound("post"))?;

    if post.author_id != Some(user.user_id) {
        return Err(ApiError::Forbidden(
            "Not authorized to delete this post".to_string(),
        ));
    }

    db::delete_post(&pool, post_id).await?;
    community_db::unlink_post(&pool, post.community_id, post_id).await?;

    broadcast_state.broadcast(RealtimeEvent::post_deleted(post.community_id, post_id));

    tracing::info!("[Post] Post {} deleted by its author", post_id);

    Ok(Json(serde_json::json!({ "message": "Post deleted successfully" })))
}

async fn react(
    pool: &PgPool,
    user_id: Uuid,
    post_id: Uuid,
    kind: ReactionKind,
) -> Result<Json<PostResponse>, ApiError> {
    let post = db::get_post(pool, post_id)
        .await?
        .ok_or(ApiError::NotFound("post"))?;

    let state = toggle_reaction(pool, post_id, user_id, kind).await?;
    tracing::debug!(
        "[Post] User {} toggled {} on post {}: now {:?}",
        user_id,
        kind.as_str(),
        post_id,
        state
    );

    Ok(Json(build_post_response(pool, post).await?))
}

/// Toggle a like; returns the updated post
pub async fn like_post(
    State(pool): State<PgPool>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<PostResponse>, ApiError> {
    react(&pool, user.user_id, post_id, ReactionKind::Like).await
}

/// Toggle a dislike; returns the updated post
pub async fn dislike_post(
    State(pool): State<PgPool>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<Uuid>,
) -> Result<Json<PostResponse>, ApiError> {
    react(&pool, user.user_id, post_id, ReactionKind::Dislike).await
}
