/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct serves as the central state container for the
 * application, holding:
 * - The PostgreSQL connection pool
 * - The per-community realtime broadcast registry
 * - The object store and push transport clients
 * - Server configuration (posting policy, port)
 *
 * Everything is dependency-injected through this struct; there is no
 * module-level global state.
 *
 * # Thread Safety
 *
 * All state is designed to be thread-safe:
 * - `PgPool` is internally reference-counted
 * - `CommunityBroadcastState` shares one registry across clones
 * - The storage and push clients are shared via `Arc<dyn ...>`
 *
 * # State Extraction
 *
 * The `FromRef` implementations allow Axum handlers to extract specific
 * parts of the state without needing the entire `AppState`. This follows
 * Axum's recommended pattern for state management.
 */

use axum::extract::FromRef;
use sqlx::PgPool;
use std::sync::Arc;

use crate::backend::notification::push::PushTransport;
use crate::backend::realtime::broadcast::CommunityBroadcastState;
use crate::backend::server::config::ServerConfig;
use crate::backend::storage::ObjectStore;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub db_pool: PgPool,

    /// Per-community realtime broadcast channels
    pub community_broadcast: CommunityBroadcastState,

    /// Object store for media uploads
    pub object_store: Arc<dyn ObjectStore>,

    /// Push delivery transport for the notification fan-out
    pub push_transport: Arc<dyn PushTransport>,

    /// Server configuration
    pub config: Arc<ServerConfig>,
}

/// Allow handlers to extract the pool directly
impl FromRef<AppState> for PgPool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

/// Allow handlers to extract the broadcast registry directly
impl FromRef<AppState> for CommunityBroadcastState {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.community_broadcast.clone()
    }
}

/// Allow handlers to extract the object store directly
impl FromRef<AppState> for Arc<dyn ObjectStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.object_store.clone()
    }
}

/// Allow handlers to extract the push transport directly
impl FromRef<AppState> for Arc<dyn PushTransport> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.push_transport.clone()
    }
}

/// Allow handlers to extract the configuration directly
impl FromRef<AppState> for Arc<ServerConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}
