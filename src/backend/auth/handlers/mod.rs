//! Authentication HTTP Handlers
//!
//! Handlers for user registration, login, Google identity sign-in, and the
//! current-user endpoint.

/// Request/response types
pub mod types;

/// POST /api/auth/signup
pub mod signup;

/// POST /api/auth/login
pub mod login;

/// GET /api/auth/me
pub mod me;

/// POST /api/auth/google
pub mod google;

pub use google::google_auth;
pub use login::login;
pub use me::get_me;
pub use signup::signup;
