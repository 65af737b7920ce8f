//! Backend Error Handling
//!
//! One error taxonomy for the whole HTTP surface and one serialization
//! contract at the boundary.

/// Error type definitions
pub mod types;

/// Conversion to HTTP responses
pub mod conversion;

pub use types::ApiError;
