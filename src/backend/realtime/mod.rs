//! Realtime Module
//!
//! Per-community broadcast channels and the SSE subscription endpoint that
//! delivers them to connected clients.

/// Broadcast channel registry
pub mod broadcast;

/// SSE subscription handler
pub mod subscription;

pub use broadcast::CommunityBroadcastState;
