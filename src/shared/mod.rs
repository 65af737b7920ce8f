//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the HTTP surface and the server internals. All types are designed for
//! serialization and transmission over HTTP.

/// Real-time event system
pub mod event;

/// Shared error types
pub mod error;

/// Re-export commonly used types for convenience
pub use error::SharedError;
pub use event::{EventType, RealtimeEvent};
