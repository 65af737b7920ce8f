//! Chat Module
//!
//! Ephemeral community chat. Messages (and their uploaded files) live for
//! 48 hours; the expiry sweeper purges them from the store.

/// Chat message model and database operations
pub mod db;

/// HTTP handlers
pub mod handlers;

/// Expiry sweeper
pub mod expiry;
