/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP server,
 * including state creation, database loading, background tasks, and route
 * configuration.
 *
 * # Initialization Process
 *
 * 1. Load configuration and connect to the database (migrations run here)
 * 2. Build the object store and push transport clients
 * 3. Create the per-community broadcast registry
 * 4. Create the router
 * 5. Spawn the background tasks: idle-channel cleanup and chat expiry
 *    sweeping
 *
 * The expiry sweeper reads the persisted `expires_at` horizons, so chat
 * file deletions that were pending when the process stopped are picked up
 * again after a restart.
 */

use axum::Router;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::chat::expiry::{spawn_expiry_sweeper, SWEEP_INTERVAL};
use crate::backend::notification::push::HttpPushTransport;
use crate::backend::realtime::broadcast::CommunityBroadcastState;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, load_object_store, ServerConfig};
use crate::backend::server::state::AppState;

/// Idle broadcast channels are swept on this cadence
const CHANNEL_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Create and configure the Axum application
///
/// # Errors
///
/// Fails when the database is unreachable or unconfigured; the server
/// cannot run without its store.
pub async fn create_app() -> Result<Router, Box<dyn std::error::Error>> {
    tracing::info!("Initializing Palaver backend server");

    let config = Arc::new(ServerConfig::from_env());

    // Step 1: database (required)
    let db_pool = load_database()
        .await
        .ok_or("DATABASE_URL must be set and reachable")?;

    // Step 2: external collaborators
    let object_store = load_object_store().await;
    let push_transport = Arc::new(HttpPushTransport::new());

    // Step 3: realtime broadcast registry
    let community_broadcast = CommunityBroadcastState::new();

    tracing::info!("State and broadcast registry initialized");

    let app_state = AppState {
        db_pool: db_pool.clone(),
        community_broadcast: community_broadcast.clone(),
        object_store: object_store.clone(),
        push_transport,
        config,
    };

    // Step 4: router
    let app = create_router(app_state);

    // Step 5: background tasks
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CHANNEL_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            community_broadcast.cleanup_inactive_channels();
            tracing::debug!("Cleaned up inactive community broadcast channels");
        }
    });

    spawn_expiry_sweeper(db_pool, object_store, SWEEP_INTERVAL);

    tracing::info!("Router configured with cleanup and expiry tasks");

    Ok(app)
}
