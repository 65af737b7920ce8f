/**
 * Post API Types
 *
 * Request and response shapes for the post endpoints. Field names follow
 * the camelCase convention of the HTTP surface.
 */

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::comment::db::CommentWithAuthor;
use crate::backend::error::ApiError;
use crate::backend::post::db::{MediaItem, Post};

/// The shape selector of a new post
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostShape {
    Text,
    Media,
}

impl PostShape {
    /// Parse the `postType` selector; anything but `text`/`media` is
    /// rejected as a validation error
    pub fn parse(selector: &str) -> Result<PostShape, ApiError> {
        match selector {
            "text" => Ok(PostShape::Text),
            "media" => Ok(PostShape::Media),
            other => Err(ApiError::validation(format!(
                "unknown postType '{other}', expected 'text' or 'media'"
            ))),
        }
    }
}

/// A file received with a `media` post or chat message
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Parsed input of the creation pipeline, shape still unvalidated
#[derive(Debug, Clone)]
pub struct CreatePostInput {
    pub title: String,
    pub content: Option<String>,
    pub shape: PostShape,
    pub is_anonymous: bool,
    pub file: Option<UploadedFile>,
}

/// JSON body of POST /api/communities/{id}/posts (text shape)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    pub post_type: Option<String>,
}

/// JSON body of PUT /api/posts/{id}
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub title: String,
    pub content: Option<String>,
}

/// Resolved author of a post or comment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub username: String,
}

/// A comment as returned inside a post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub author: AuthorResponse,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<CommentWithAuthor> for CommentResponse {
    fn from(comment: CommentWithAuthor) -> Self {
        Self {
            id: comment.id,
            author: AuthorResponse {
                id: comment.author_id,
                username: comment.author_username,
            },
            content: comment.content,
            created_at: comment.created_at,
        }
    }
}

/// A post as returned by the API, with its author resolved
///
/// `author` is None exactly when the post is anonymous; the requester's
/// identity is never recorded on such a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub community: Uuid,
    pub author: Option<AuthorResponse>,
    pub title: String,
    pub content: Option<String>,
    pub media: Vec<MediaItem>,
    pub is_anonymous: bool,
    pub is_pinned: bool,
    pub liked_by: Vec<Uuid>,
    pub disliked_by: Vec<Uuid>,
    pub comments: Vec<CommentResponse>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl PostResponse {
    /// Assemble a response from its stored parts
    pub fn build(
        post: Post,
        media: Vec<MediaItem>,
        author_username: Option<String>,
        liked_by: Vec<Uuid>,
        disliked_by: Vec<Uuid>,
        comments: Vec<CommentResponse>,
    ) -> Self {
        let author = match (post.author_id, author_username) {
            (Some(id), Some(username)) => Some(AuthorResponse { id, username }),
            _ => None,
        };

        Self {
            id: post.id,
            community: post.community_id,
            author,
            title: post.title,
            content: post.content,
            media,
            is_anonymous: post.is_anonymous,
            is_pinned: post.is_pinned,
            liked_by,
            disliked_by,
            comments,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post(author_id: Option<Uuid>, is_anonymous: bool) -> Post {
        Post {
            id: Uuid::new_v4(),
            community_id: Uuid::new_v4(),
            author_id,
            title: "Hello".to_string(),
            content: Some("World".to_string()),
            is_anonymous,
            is_pinned: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_parse_shape_selectors() {
        assert_eq!(PostShape::parse("text").unwrap(), PostShape::Text);
        assert_eq!(PostShape::parse("media").unwrap(), PostShape::Media);
        assert!(PostShape::parse("poll").is_err());
        assert!(PostShape::parse("").is_err());
    }

    #[test]
    fn test_anonymous_post_has_no_author() {
        let response = PostResponse::build(post(None, true), vec![], None, vec![], vec![], vec![]);
        assert!(response.author.is_none());
        assert!(response.is_anonymous);
    }

    #[test]
    fn test_authored_post_resolves_author() {
        let author_id = Uuid::new_v4();
        let response = PostResponse::build(
            post(Some(author_id), false),
            vec![],
            Some("alice".to_string()),
            vec![],
            vec![],
            vec![],
        );
        let author = response.author.unwrap();
        assert_eq!(author.id, author_id);
        assert_eq!(author.username, "alice");
    }

    #[test]
    fn test_response_uses_camel_case() {
        let response = PostResponse::build(post(None, true), vec![], None, vec![], vec![], vec![]);
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("isAnonymous").is_some());
        assert!(json.get("likedBy").is_some());
        assert!(json.get("is_anonymous").is_none());
    }
}
