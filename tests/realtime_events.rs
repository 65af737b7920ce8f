//! Integration tests for the community realtime channels
//!
//! Exercises the per-community broadcast registry the way the SSE endpoint
//! uses it: lazily created channels, community scoping, and subscriber
//! lag tolerance.

use palaver::backend::realtime::CommunityBroadcastState;
use palaver::shared::{EventType, RealtimeEvent};
use uuid::Uuid;

#[tokio::test]
async fn subscribers_receive_post_created_events() {
    let state = CommunityBroadcastState::new();
    let community_id = Uuid::new_v4();

    let mut rx_one = state.subscribe(community_id);
    let mut rx_two = state.subscribe(community_id);

    let payload = serde_json::json!({ "title": "Hello", "content": "World" });
    let count = state.broadcast(RealtimeEvent::post_created(community_id, payload.clone()));
    assert_eq!(count, 2);

    for rx in [&mut rx_one, &mut rx_two] {
        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, EventType::PostCreated);
        assert_eq!(event.community_id, community_id);
        assert_eq!(event.payload, payload);
    }
}

#[tokio::test]
async fn events_never_cross_community_boundaries() {
    let state = CommunityBroadcastState::new();
    let community_a = Uuid::new_v4();
    let community_b = Uuid::new_v4();

    let mut rx_a = state.subscribe(community_a);
    let mut rx_b = state.subscribe(community_b);

    state.broadcast(RealtimeEvent::post_deleted(community_a, Uuid::new_v4()));
    state.broadcast(RealtimeEvent::chat_message(
        community_b,
        serde_json::json!({ "content": "hi" }),
    ));

    let event_a = rx_a.recv().await.unwrap();
    assert_eq!(event_a.event_type, EventType::PostDeleted);
    assert_eq!(event_a.community_id, community_a);

    let event_b = rx_b.recv().await.unwrap();
    assert_eq!(event_b.event_type, EventType::ChatMessage);
    assert_eq!(event_b.community_id, community_b);

    // Each receiver saw exactly its own community's event
    assert!(rx_a.try_recv().is_err());
    assert!(rx_b.try_recv().is_err());
}

#[tokio::test]
async fn event_stream_survives_subscriber_churn() {
    let state = CommunityBroadcastState::new();
    let community_id = Uuid::new_v4();

    {
        let _short_lived = state.subscribe(community_id);
    }
    state.cleanup_inactive_channels();

    // A fresh subscriber on the same community still works after the sweep
    let mut rx = state.subscribe(community_id);
    let count = state.broadcast(RealtimeEvent::post_created(
        community_id,
        serde_json::json!({ "title": "still alive" }),
    ));
    assert_eq!(count, 1);

    let event = rx.recv().await.unwrap();
    assert_eq!(event.payload["title"], "still alive");
}

#[tokio::test]
async fn serialized_events_expose_camel_case_names() {
    let community_id = Uuid::new_v4();
    let event = RealtimeEvent::post_deleted(community_id, Uuid::new_v4());

    assert_eq!(event.event_type.name(), "postDeleted");

    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["event_type"], "postDeleted");
}
