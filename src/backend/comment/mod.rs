//! Comment Module
//!
//! Comments on posts: created by authenticated authors, deleted by the
//! author or the community admin.

/// Comment model and database operations
pub mod db;

/// HTTP handlers
pub mod handlers;
