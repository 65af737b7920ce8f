/**
 * Post Creation Pipeline
 *
 * Orchestrates everything a single new post triggers: shape validation,
 * optional media upload, persistence, community linkage, realtime
 * broadcast, and push fan-out.
 *
 * # Steps and guarantees
 *
 * 1. Validate the shape: `text` requires non-empty content, `media`
 *    requires exactly one file; title is always required. Nothing is
 *    written before validation passes.
 * 2. Resolve anonymity: an anonymous post is persisted with no author
 *    reference, though the requester was still authenticated to get here.
 * 3. For `media` posts, upload the file under the `post_media/` namespace.
 *    Upload failure aborts creation; no partial post is persisted.
 * 4. Persist the post.
 * 5. Append the post to the community's post sequence. A failure here
 *    leaves an orphaned post: logged and surfaced, not rolled back.
 * 6. Broadcast a `postCreated` event on the community's channel, author
 *    display name resolved (never resolved when anonymous).
 * 7. Fan out push notifications to every member with a registered
 *    endpoint. Deliveries are independent; permanent-invalidity signals
 *    clear the member's stored endpoint. Nothing here fails the request.
 *
 * Steps 4-5 are sequential; 6 and 7 run concurrently after 5 and are
 * awaited before the response is produced.
 */

use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::community::db as community_db;
use crate::backend::error::ApiError;
use crate::backend::middleware::auth::AuthenticatedUser;
use crate::backend::notification::fanout::notify_community_members;
use crate::backend::notification::push::{PushMessage, PushTransport};
use crate::backend::post::db::{self, MediaItem, NewPost};
use crate::backend::post::types::{CreatePostInput, PostResponse, PostShape};
use crate::backend::realtime::broadcast::CommunityBroadcastState;
use crate::backend::storage::{MediaKind, ObjectStore};
use crate::shared::RealtimeEvent;

/// Folder namespace owned by the pipeline inside the object store
const MEDIA_FOLDER: &str = "post_media";

/// Validate the shape-dependent payload of a new post
///
/// Rejects before any mutation:
/// - missing/empty title, regardless of shape
/// - `text` without non-empty content
/// - `media` without a file, or with text content attached
pub fn validate_input(input: &CreatePostInput) -> Result<(), ApiError> {
    if input.title.trim().is_empty() {
        return Err(ApiError::validation("title is required"));
    }

    match input.shape {
        PostShape::Text => {
            let has_content = input
                .content
                .as_deref()
                .is_some_and(|c| !c.trim().is_empty());
            if !has_content {
                return Err(ApiError::validation("content is required for a text post"));
            }
            if input.file.is_some() {
                return Err(ApiError::validation("a text post cannot carry a file"));
            }
        }
        PostShape::Media => {
            if input.file.is_none() {
                return Err(ApiError::validation(
                    "a media post requires exactly one attached file",
                ));
            }
            if input.content.as_deref().is_some_and(|c| !c.trim().is_empty()) {
                return Err(ApiError::validation(
                    "a media post cannot carry text content",
                ));
            }
        }
    }

    Ok(())
}

/// Run the creation pipeline for one post
///
/// `require_membership` is the configurable posting policy; when off
/// (the default), non-members may post.
#[allow(clippy::too_many_arguments)]
pub async fn create_post(
    pool: &PgPool,
    object_store: &dyn ObjectStore,
    push_transport: &dyn PushTransport,
    broadcast_state: &CommunityBroadcastState,
    requester: &AuthenticatedUser,
    community_id: Uuid,
    input: CreatePostInput,
    require_membership: bool,
) -> Result<PostResponse, ApiError> {
    // Step 1: validate before touching anything
    validate_input(&input)?;

    let community = community_db::get_community(pool, community_id)
        .await?
        .ok_or(ApiError::NotFound("community"))?;

    if require_membership
        && !community_db::is_member(pool, community_id, requester.user_id).await?
    {
        return Err(ApiError::Forbidden(
            "You are not a member of this community".to_string(),
        ));
    }

    // Step 3: media upload, before any persistence
    let media = match input.shape {
        PostShape::Text => Vec::new(),
        PostShape::Media => {
            // validate_input guarantees the file is present
            let Some(file) = input.file.as_ref() else {
                return Err(ApiError::validation(
                    "a media post requires exactly one attached file",
                ));
            };

            // Only image and video resources may back a post
            let declared_kind = MediaKind::from_content_type(&file.content_type);
            if declared_kind == MediaKind::Document {
                return Err(ApiError::validation(
                    "post media must be an image or a video",
                ));
            }

            let stored = object_store
                .put(
                    MEDIA_FOLDER,
                    &file.filename,
                    &file.content_type,
                    file.data.clone(),
                )
                .await
                .map_err(|e| {
                    tracing::error!("[Pipeline] Media upload failed: {:?}", e);
                    ApiError::upstream("media upload failed")
                })?;

            // Kind comes from the resource type the store reports
            let kind = MediaKind::from_content_type(&stored.content_type);
            vec![MediaItem {
                kind,
                url: stored.url,
            }]
        }
    };

    // Step 2: anonymity means the post carries no author reference at all
    let author_id = if input.is_anonymous {
        None
    } else {
        Some(requester.user_id)
    };

    // Step 4: persist the post
    let post = db::insert_post(
        pool,
        NewPost {
            community_id,
            author_id,
            title: input.title.clone(),
            content: input.content.clone().filter(|c| !c.trim().is_empty()),
            is_anonymous: input.is_anonymous,
            media,
        },
    )
    .await?;

    tracing::info!("[Pipeline] Post {} persisted in community {}", post.id, community_id);

    // Step 5: append to the community's post sequence. The post already
    // exists; failing here orphans it.
    if let Err(e) = community_db::link_post(pool, community_id, post.id).await {
        tracing::error!(
            "[Pipeline] Post {} persisted but not linked to community {}: {:?}",
            post.id,
            community_id,
            e
        );
        return Err(ApiError::Database(e));
    }

    // Author display name resolved once, for the response and the broadcast
    let author_username = crate::backend::auth::users::resolve_display_name(pool, post.author_id)
        .await?;

    let post_id = post.id;
    let post_title = post.title.clone();
    let media = db::get_media(pool, post_id).await?;
    let response = PostResponse::build(post, media, author_username, vec![], vec![], vec![]);

    // Steps 6 and 7: broadcast and fan-out, concurrently and best-effort.
    // Both are awaited before responding.
    let event_payload = serde_json::to_value(&response)
        .map_err(|e| ApiError::upstream(format!("event serialization failed: {e}")))?;
    let message = PushMessage::post_created(&community.name, &post_title, post_id);

    let broadcast_task = async {
        let subscriber_count = broadcast_state.broadcast(RealtimeEvent::post_created(
            community_id,
            event_payload,
        ));
        tracing::debug!(
            "[Pipeline] postCreated broadcast reached {} subscribers",
            subscriber_count
        );
    };
    let fanout_task = notify_community_members(pool, push_transport, community_id, &message);

    let ((), _report) = tokio::join!(broadcast_task, fanout_task);

    // Step 8: the fully persisted, author-resolved post
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::post::types::UploadedFile;
    use assert_matches::assert_matches;

    fn text_input(title: &str, content: Option<&str>) -> CreatePostInput {
        CreatePostInput {
            title: title.to_string(),
            content: content.map(|c| c.to_string()),
            shape: PostShape::Text,
            is_anonymous: false,
            file: None,
        }
    }

    fn media_input(title: &str, file: Option<UploadedFile>) -> CreatePostInput {
        CreatePostInput {
            title: title.to_string(),
            content: None,
            shape: PostShape::Media,
            is_anonymous: false,
            file,
        }
    }

    fn png_file() -> UploadedFile {
        UploadedFile {
            filename: "photo.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    #[test]
    fn test_text_post_requires_content() {
        assert_matches!(
            validate_input(&text_input("Hello", None)),
            Err(ApiError::Validation(_))
        );
        assert_matches!(
            validate_input(&text_input("Hello", Some("   "))),
            Err(ApiError::Validation(_))
        );
        assert!(validate_input(&text_input("Hello", Some("World"))).is_ok());
    }

    #[test]
    fn test_title_required_regardless_of_shape() {
        assert_matches!(
            validate_input(&text_input("", Some("World"))),
            Err(ApiError::Validation(_))
        );
        assert_matches!(
            validate_input(&media_input("   ", Some(png_file()))),
            Err(ApiError::Validation(_))
        );
    }

    #[test]
    fn test_media_post_requires_file() {
        assert_matches!(
            validate_input(&media_input("Hello", None)),
            Err(ApiError::Validation(_))
        );
        assert!(validate_input(&media_input("Hello", Some(png_file()))).is_ok());
    }

    #[test]
    fn test_shapes_are_mutually_exclusive() {
        let mut with_both = media_input("Hello", Some(png_file()));
        with_both.content = Some("also text".to_string());
        assert_matches!(validate_input(&with_both), Err(ApiError::Validation(_)));

        let mut text_with_file = text_input("Hello", Some("World"));
        text_with_file.file = Some(png_file());
        assert_matches!(validate_input(&text_with_file), Err(ApiError::Validation(_)));
    }
}
