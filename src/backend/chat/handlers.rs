/**
 * Chat HTTP Handlers
 *
 * Handlers for listing, sending, and deleting ephemeral chat messages.
 * Sending requires community membership; an optional file is uploaded to
 * the `chat_files/` namespace and expires together with the message.
 */

use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::chat::db::{self, ChatMessage, ChatMessageWithAuthor, NewChatMessage};
use crate::backend::community::db as community_db;
use crate::backend::error::ApiError;
use crate::backend::middleware::auth::AuthUser;
use crate::backend::post::types::{AuthorResponse, UploadedFile};
use crate::backend::server::state::AppState;
use crate::backend::storage::MediaKind;
use crate::shared::RealtimeEvent;

/// Folder namespace for chat uploads inside the object store
const CHAT_FOLDER: &str = "chat_files";

/// How many messages a history request returns
const HISTORY_LIMIT: i64 = 50;

/// A stored file attached to a chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatFileResponse {
    pub url: String,
    pub kind: String,
}

/// A chat message as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub id: Uuid,
    pub community: Uuid,
    pub author: Option<AuthorResponse>,
    pub content: String,
    pub is_anonymous: bool,
    pub reply_to: Option<Uuid>,
    pub file: Option<ChatFileResponse>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

impl ChatMessageResponse {
    fn from_message(message: ChatMessage, author_username: Option<String>) -> Self {
        let author = match (message.author_id, author_username) {
            (Some(id), Some(username)) => Some(AuthorResponse { id, username }),
            _ => None,
        };
        let file = match (message.file_url, message.file_kind) {
            (Some(url), Some(kind)) => Some(ChatFileResponse { url, kind }),
            _ => None,
        };
        Self {
            id: message.id,
            community: message.community_id,
            author,
            content: message.content,
            is_anonymous: message.is_anonymous,
            reply_to: message.reply_to,
            file,
            created_at: message.created_at,
            expires_at: message.expires_at,
        }
    }
}

impl From<ChatMessageWithAuthor> for ChatMessageResponse {
    fn from(message: ChatMessageWithAuthor) -> Self {
        let author = match (message.author_id, message.author_username) {
            (Some(id), Some(username)) if !message.is_anonymous => {
                Some(AuthorResponse { id, username })
            }
            _ => None,
        };
        let file = match (message.file_url, message.file_kind) {
            (Some(url), Some(kind)) => Some(ChatFileResponse { url, kind }),
            _ => None,
        };
        Self {
            id: message.id,
            community: message.community_id,
            author,
            content: message.content,
            is_anonymous: message.is_anonymous,
            reply_to: message.reply_to,
            file,
            created_at: message.created_at,
            expires_at: message.expires_at,
        }
    }
}

/// JSON body of POST /api/communities/{id}/chat (no file)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatMessageRequest {
    pub content: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    pub reply_to: Option<Uuid>,
}

/// Parsed chat message input
#[derive(Debug, Clone)]
struct ChatInput {
    content: String,
    is_anonymous: bool,
    reply_to: Option<Uuid>,
    file: Option<UploadedFile>,
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

async fn parse_chat_request(request: Request) -> Result<ChatInput, ApiError> {
    if !is_multipart(&request) {
        let Json(body): Json<CreateChatMessageRequest> = Json::from_request(request, &())
            .await
            .map_err(|e| ApiError::validation(format!("invalid JSON body: {e}")))?;
        return Ok(ChatInput {
            content: body.content.unwrap_or_default(),
            is_anonymous: body.is_anonymous,
            reply_to: body.reply_to,
            file: None,
        });
    }

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| ApiError::validation(format!("invalid multipart request: {e}")))?;

    let mut content = String::new();
    let mut is_anonymous = false;
    let mut reply_to = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "content" => {
                content = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(format!("malformed content field: {e}")))?;
            }
            "isAnonymous" => {
                let value = field.text().await.map_err(|e| {
                    ApiError::validation(format!("malformed isAnonymous field: {e}"))
                })?;
                is_anonymous = value == "true";
            }
            "replyTo" => {
                let value = field.text().await.map_err(|e| {
                    ApiError::validation(format!("malformed replyTo field: {e}"))
                })?;
                reply_to = Some(
                    Uuid::parse_str(&value)
                        .map_err(|_| ApiError::validation("replyTo must be a message id"))?,
                );
            }
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("malformed file field: {e}")))?
                    .to_vec();
                file = Some(UploadedFile {
                    filename,
                    content_type,
                    data,
                });
            }
            other => {
                tracing::debug!("[Chat] Ignoring unknown multipart field '{}'", other);
            }
        }
    }

    Ok(ChatInput {
        content,
        is_anonymous,
        reply_to,
        file,
    })
}

/// List the latest chat messages of a community, oldest first
pub async fn get_chat_messages(
    State(pool): State<PgPool>,
    AuthUser(_user): AuthUser,
    Path(community_id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessageResponse>>, ApiError> {
    community_db::get_community(&pool, community_id)
        .await?
        .ok_or(ApiError::NotFound("community"))?;

    let messages = db::list_recent(&pool, community_id, HISTORY_LIMIT).await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

/// Send a chat message; members only
///
/// # Errors
///
/// * `400 Bad Request` - empty content
/// * `403 Forbidden` - requester is not a member
/// * `404 Not Found` - unknown community
/// * `502 Bad Gateway` - file upload failure (nothing persisted)
pub async fn create_chat_message(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(community_id): Path<Uuid>,
    request: Request,
) -> Result<(StatusCode, Json<ChatMessageResponse>), ApiError> {
    let pool = &app_state.db_pool;

    community_db::get_community(pool, community_id)
        .await?
        .ok_or(ApiError::NotFound("community"))?;

    if !community_db::is_member(pool, community_id, user.user_id).await? {
        return Err(ApiError::Forbidden(
            "You are not a member of this community".to_string(),
        ));
    }

    let input = parse_chat_request(request).await?;

    if input.content.trim().is_empty() {
        return Err(ApiError::validation("content is required"));
    }

    // Upload before the insert; a failed upload aborts the message
    let (file_url, file_kind) = match input.file {
        Some(file) => {
            let stored = app_state
                .object_store
                .put(CHAT_FOLDER, &file.filename, &file.content_type, file.data)
                .await
                .map_err(|e| {
                    tracing::error!("[Chat] File upload failed: {:?}", e);
                    ApiError::upstream("file upload failed")
                })?;
            let kind = MediaKind::from_content_type(&stored.content_type);
            (Some(stored.url), Some(kind.as_str().to_string()))
        }
        None => (None, None),
    };

    let author_id = if input.is_anonymous {
        None
    } else {
        Some(user.user_id)
    };

    let message = db::insert_message(
        pool,
        NewChatMessage {
            community_id,
            author_id,
            content: input.content,
            is_anonymous: input.is_anonymous,
            reply_to: input.reply_to,
            file_url,
            file_kind,
        },
    )
    .await?;

    let author_username = if message.author_id.is_some() {
        Some(user.username.clone())
    } else {
        None
    };
    let response = ChatMessageResponse::from_message(message, author_username);

    // Best-effort live delivery to connected clients
    if let Ok(payload) = serde_json::to_value(&response) {
        app_state
            .community_broadcast
            .broadcast(RealtimeEvent::chat_message(community_id, payload));
    }

    Ok((StatusCode::CREATED, Json(response)))
}

/// Delete a chat message; author only
pub async fn delete_chat_message(
    State(pool): State<PgPool>,
    AuthUser(user): AuthUser,
    Path(message_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let message = db::get_message(&pool, message_id)
        .await?
        .ok_or(ApiError::NotFound("message"))?;

    if message.author_id != Some(user.user_id) {
        return Err(ApiError::Forbidden(
            "Not authorized to delete this message".to_string(),
        ));
    }

    db::delete_message(&pool, message_id).await?;

    Ok(Json(serde_json::json!({ "message": "Message deleted successfully" })))
}
