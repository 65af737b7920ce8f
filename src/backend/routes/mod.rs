//! Route Configuration
//!
//! Router assembly for the HTTP surface.

/// Main router creation
pub mod router;

/// API route configuration
pub mod api_routes;
