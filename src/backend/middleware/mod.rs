//! Request Middleware
//!
//! Guards for routes that require authentication.

/// Bearer-token authentication guard and extractor
pub mod auth;

pub use auth::{AuthUser, AuthenticatedUser};
