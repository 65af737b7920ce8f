// Increase recursion limit for complex async operations
#![recursion_limit = "256"]

//! Palaver - Main Library
//!
//! Palaver is a social community platform backend built with Rust. Users join
//! communities, post text or media content, comment, react, chat ephemerally,
//! and receive realtime and push notifications.
//!
//! # Overview
//!
//! This library provides the core functionality for Palaver, including:
//! - REST API over PostgreSQL (axum + sqlx)
//! - The post-creation pipeline: persist, link, broadcast, push fan-out
//! - Per-community realtime event channels delivered over SSE
//! - Push notification fan-out with per-recipient failure isolation
//! - Object storage for media uploads (S3-compatible)
//! - Ephemeral community chat with store-enforced expiry
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared between the API surface and the server
//!   - Realtime event types, shared validation errors
//!
//! - **`backend`** - Server-side code
//!   - Axum HTTP server, routes, and middleware
//!   - Community, post, comment, and chat persistence
//!   - Authentication (JWT + bcrypt, Google identity linkage)
//!   - Realtime broadcasting and push notification fan-out
//!
//! # Error Handling
//!
//! The library uses Rust's standard error handling:
//!
//! - `Result<T, E>` for fallible operations
//! - A single `ApiError` taxonomy serialized once at the HTTP boundary
//! - Custom error types in `shared::error` and `backend::error`
//!
//! # Thread Safety
//!
//! All server state is thread-safe: the connection pool, the per-community
//! broadcast registry, and the storage/push clients are shared via `Arc` and
//! cloned into handlers through axum state extraction.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
