/**
 * Real-time Subscription Handler
 *
 * This module implements the Server-Sent Events (SSE) subscription handler
 * for `GET /api/communities/{id}/events`. Clients subscribe to a single
 * community's channel and receive its `postCreated`, `postUpdated`,
 * `postDeleted`, and `chatMessage` events.
 *
 * # Event Filtering
 *
 * Clients can filter events by type using the `types` query parameter:
 * - `?types=postCreated,postDeleted` - only those events
 * - No parameter - all event types
 *
 * # Connection Management
 *
 * - Connections are kept alive using the SSE keep-alive mechanism
 * - Lagged subscribers skip forward instead of dropping the connection
 */

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, Sse},
};
use futures_util::stream;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::backend::community::db as community_db;
use crate::backend::error::ApiError;
use crate::backend::realtime::broadcast::CommunityBroadcastState;
use crate::shared::EventType;

/// Handle a community realtime subscription
///
/// # Errors
///
/// * `404 Not Found` - unknown community
pub async fn handle_community_subscription(
    State(pool): State<PgPool>,
    State(broadcast_state): State<CommunityBroadcastState>,
    Path(community_id): Path<Uuid>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    // Subscribing to a community that doesn't exist is a 404, not a silent
    // empty stream
    community_db::get_community(&pool, community_id)
        .await?
        .ok_or(ApiError::NotFound("community"))?;

    // Parse event types filter from query parameters
    let event_types_filter: Option<Vec<EventType>> = query
        .get("types")
        .map(|types_str| {
            types_str
                .split(',')
                .map(|s| s.trim())
                .filter_map(EventType::parse)
                .collect()
        })
        .filter(|v: &Vec<_>| !v.is_empty());

    if let Some(ref types) = event_types_filter {
        tracing::info!(
            "[Realtime] Subscription to community {} filtered to {:?}",
            community_id,
            types
        );
    } else {
        tracing::info!(
            "[Realtime] Subscription to community {} for all event types",
            community_id
        );
    }

    let broadcast_rx = broadcast_state.subscribe(community_id);
    let filter = event_types_filter;

    // Create SSE stream that listens to the community's broadcast channel.
    // Loop until we get a meaningful event that passes the filter; axum's
    // keep-alive mechanism maintains the connection in between.
    let stream = stream::unfold((broadcast_rx, filter), move |(mut rx, filter)| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Some(ref filter_types) = filter {
                        if !filter_types.contains(&event.event_type) {
                            continue;
                        }
                    }

                    let event_data = match serde_json::to_string(&event) {
                        Ok(data) => data,
                        Err(e) => {
                            tracing::error!("[Realtime] Failed to serialize event: {:?}", e);
                            continue;
                        }
                    };

                    let sse_event = Event::default()
                        .event(event.event_type.name())
                        .data(event_data);

                    return Some((Ok(sse_event), (rx, filter)));
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Realtime] Receiver lagged, skipped {} events", skipped);
                    continue;
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                    tracing::warn!("[Realtime] Broadcast channel closed, ending stream");
                    return None;
                }
            }
        }
    });

    let sse = Sse::new(stream).keep_alive(axum::response::sse::KeepAlive::default());

    Ok(sse)
}
