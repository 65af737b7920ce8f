//! Backend Module
//!
//! Server-side code for the Palaver community platform: the axum HTTP
//! server, persistence, authentication, realtime broadcasting, object
//! storage, and push notification fan-out.

/// Authentication: JWT sessions, user store, auth handlers
pub mod auth;

/// Ephemeral community chat
pub mod chat;

/// Comments on posts
pub mod comment;

/// Communities, membership, and invite codes
pub mod community;

/// Error taxonomy and HTTP serialization
pub mod error;

/// Request middleware (bearer authentication)
pub mod middleware;

/// Push notification transport and fan-out
pub mod notification;

/// Posts, reactions, and the post-creation pipeline
pub mod post;

/// Per-community realtime broadcast channels and SSE subscriptions
pub mod realtime;

/// Route configuration
pub mod routes;

/// Server state, configuration, and initialization
pub mod server;

/// Object storage for media uploads
pub mod storage;
