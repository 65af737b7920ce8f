//! Authentication Module
//!
//! JWT session management, the user store, and the auth HTTP handlers.

/// Session management and JWT tokens
pub mod sessions;

/// User model and database operations
pub mod users;

/// HTTP handlers for signup, login, me, and Google identity
pub mod handlers;

pub use handlers::{get_me, google_auth, login, signup};
