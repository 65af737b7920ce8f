/**
 * API Route Handlers
 *
 * This module wires every `/api` endpoint to its handler.
 *
 * # Routes
 *
 * ## Authentication
 * - `POST /api/auth/signup` - User registration
 * - `POST /api/auth/login` - User login (email or username)
 * - `POST /api/auth/google` - Google identity sign-in
 * - `GET /api/auth/me` - Current user info
 *
 * ## Communities
 * - `GET /api/communities` - Public directory
 * - `POST /api/communities` - Create (returns the invite code)
 * - `GET /api/communities/user` - Communities the requester belongs to
 * - `GET /api/communities/{id}` - Community with its post sequence
 * - `POST /api/communities/{id}/join` - Join a public community
 * - `POST /api/communities/join/{inviteCode}` - Join by invite code
 * - `DELETE /api/communities/{id}` - Admin delete
 * - `DELETE /api/communities/{id}/posts/{postId}` - Admin post removal
 * - `GET /api/communities/{id}/events` - SSE realtime subscription
 *
 * ## Posts & comments
 * - `POST /api/communities/{id}/posts` - Create (the pipeline)
 * - `GET /api/posts/{id}` - Post with author and comments
 * - `PUT /api/posts/{id}` / `DELETE /api/posts/{id}` - Author-only
 * - `POST /api/posts/{id}/like` / `.../dislike` - Reaction toggles
 * - `POST /api/posts/{id}/comments` - Comment
 * - `DELETE /api/posts/{id}/comments/{cid}` - Author-or-admin delete
 *
 * ## Chat & notifications
 * - `GET/POST /api/communities/{id}/chat` - Ephemeral chat
 * - `DELETE /api/chat/{messageId}` - Author delete
 * - `POST /api/notifications/subscribe` - Register a push endpoint
 *
 * # Authentication
 *
 * Mutating routes require a bearer token; their handlers take the
 * `AuthUser` extractor, which rejects unauthenticated requests with 401.
 * Reads (directory, community detail, single post, realtime subscription)
 * are public.
 */

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::backend::auth::{get_me, google_auth, login, signup};
use crate::backend::chat::handlers::{
    create_chat_message, delete_chat_message, get_chat_messages,
};
use crate::backend::comment::handlers::{create_comment, delete_comment};
use crate::backend::community::handlers::{
    admin_delete_post, create_community, delete_community, get_community, get_user_communities,
    join_by_invite_code, join_community, list_communities,
};
use crate::backend::notification::handlers::subscribe;
use crate::backend::post::handlers::{
    create_post, delete_post, dislike_post, get_post, like_post, update_post,
};
use crate::backend::realtime::subscription::handle_community_subscription;
use crate::backend::server::state::AppState;

/// Configure API routes
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Authentication endpoints
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/google", post(google_auth))
        .route("/api/auth/me", get(get_me))
        // Push subscription registration
        .route("/api/notifications/subscribe", post(subscribe))
        // Communities
        .route("/api/communities", get(list_communities).post(create_community))
        .route("/api/communities/user", get(get_user_communities))
        .route(
            "/api/communities/{id}",
            get(get_community).delete(delete_community),
        )
        .route("/api/communities/{id}/join", post(join_community))
        .route("/api/communities/join/{invite_code}", post(join_by_invite_code))
        .route(
            "/api/communities/{id}/posts/{post_id}",
            delete(admin_delete_post),
        )
        // Realtime subscription
        .route(
            "/api/communities/{id}/events",
            get(handle_community_subscription),
        )
        // The post-creation pipeline
        .route("/api/communities/{id}/posts", post(create_post))
        // Posts
        .route(
            "/api/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/api/posts/{id}/like", post(like_post))
        .route("/api/posts/{id}/dislike", post(dislike_post))
        // Comments
        .route("/api/posts/{id}/comments", post(create_comment))
        .route(
            "/api/posts/{id}/comments/{comment_id}",
            delete(delete_comment),
        )
        // Ephemeral chat
        .route(
            "/api/communities/{id}/chat",
            get(get_chat_messages).post(create_chat_message),
        )
        .route("/api/chat/{message_id}", delete(delete_chat_message))
}
