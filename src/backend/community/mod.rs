//! Community Module
//!
//! Communities, their membership set, their ordered post sequence, and
//! invite-code issuance.

/// Community model and database operations
pub mod db;

/// Invite-code issuance
pub mod invite;

/// HTTP handlers
pub mod handlers;
