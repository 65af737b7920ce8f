/**
 * Real-time Event Broadcasting
 *
 * This module manages per-community broadcast channels for real-time event
 * delivery. Each community gets its own `tokio::sync::broadcast` channel to
 * prevent cross-talk; channels are created lazily on first use and swept
 * when they have no subscribers left.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::shared::RealtimeEvent;

/// Channel capacity per community; slow subscribers past this lag are
/// skipped forward, not blocked on
const CHANNEL_CAPACITY: usize = 1000;

/// Broadcast state for community realtime channels
///
/// Can be cloned and shared across handlers; all clones address the same
/// registry.
#[derive(Clone)]
pub struct CommunityBroadcastState {
    channels: Arc<Mutex<HashMap<Uuid, broadcast::Sender<RealtimeEvent>>>>,
}

impl CommunityBroadcastState {
    pub fn new() -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Get or create the broadcast sender for a community
    pub fn get_sender(&self, community_id: Uuid) -> broadcast::Sender<RealtimeEvent> {
        let mut channels = self.channels.lock().unwrap();
        channels
            .entry(community_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Subscribe to a community's channel
    pub fn subscribe(&self, community_id: Uuid) -> broadcast::Receiver<RealtimeEvent> {
        self.get_sender(community_id).subscribe()
    }

    /// Broadcast an event to all subscribers of its community
    ///
    /// Returns the number of subscribers that received the event. Having no
    /// subscribers is not an error; the event is simply dropped.
    pub fn broadcast(&self, event: RealtimeEvent) -> usize {
        let sender = {
            let channels = self.channels.lock().unwrap();
            channels.get(&event.community_id).cloned()
        };

        match sender {
            Some(sender) => match sender.send(event) {
                Ok(subscriber_count) => {
                    tracing::debug!(
                        "[Realtime] Event broadcast to {} subscribers",
                        subscriber_count
                    );
                    subscriber_count
                }
                Err(_) => {
                    tracing::debug!("[Realtime] No subscribers to receive event");
                    0
                }
            },
            None => 0,
        }
    }

    /// Clean up channels with no subscribers
    pub fn cleanup_inactive_channels(&self) {
        self.channels
            .lock()
            .unwrap()
            .retain(|_, sender| sender.receiver_count() > 0);
    }

    /// Subscriber count for a community (for debugging)
    pub fn subscriber_count(&self, community_id: Uuid) -> usize {
        self.channels
            .lock()
            .unwrap()
            .get(&community_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for CommunityBroadcastState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::EventType;

    #[tokio::test]
    async fn test_broadcast_reaches_subscriber() {
        let state = CommunityBroadcastState::new();
        let community_id = Uuid::new_v4();

        let mut rx = state.subscribe(community_id);
        let event = RealtimeEvent::post_created(community_id, serde_json::json!({"title": "x"}));

        let count = state.broadcast(event.clone());
        assert_eq!(count, 1);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.event_type, EventType::PostCreated);
    }

    #[tokio::test]
    async fn test_broadcast_without_subscribers() {
        let state = CommunityBroadcastState::new();
        let community_id = Uuid::new_v4();

        let event = RealtimeEvent::post_deleted(community_id, Uuid::new_v4());
        assert_eq!(state.broadcast(event), 0);
    }

    #[tokio::test]
    async fn test_channels_do_not_cross_talk() {
        let state = CommunityBroadcastState::new();
        let community_a = Uuid::new_v4();
        let community_b = Uuid::new_v4();

        let mut rx_a = state.subscribe(community_a);
        let _rx_b = state.subscribe(community_b);

        state.broadcast(RealtimeEvent::post_created(
            community_a,
            serde_json::json!({"title": "only for a"}),
        ));

        let received = rx_a.recv().await.unwrap();
        assert_eq!(received.community_id, community_a);
        // Community B's channel saw nothing
        assert_eq!(state.subscriber_count(community_b), 1);
    }

    #[tokio::test]
    async fn test_cleanup_removes_idle_channels() {
        let state = CommunityBroadcastState::new();
        let community_id = Uuid::new_v4();

        {
            let _rx = state.subscribe(community_id);
            assert_eq!(state.subscriber_count(community_id), 1);
        }

        // Receiver dropped; sweep should remove the channel
        state.cleanup_inactive_channels();
        assert_eq!(state.subscriber_count(community_id), 0);
    }
}
