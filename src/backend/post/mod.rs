//! Post Module
//!
//! Posts, their media attachments and reactions, and the post-creation
//! pipeline (persist, link, broadcast, push fan-out).

/// Post model and database operations
pub mod db;

/// Reaction toggle state machine
pub mod reaction;

/// The post-creation pipeline
pub mod pipeline;

/// API request/response shapes
pub mod types;

/// HTTP handlers
pub mod handlers;
