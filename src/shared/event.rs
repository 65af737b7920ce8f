/**
 * Real-time Event System
 *
 * This module defines event types for the community realtime channel.
 * Events describe changes to a community's content: new posts, post
 * updates and deletions, and ephemeral chat messages.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of real-time event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    /// A new post was created in the community
    PostCreated,
    /// An existing post was edited
    PostUpdated,
    /// A post was removed (payload carries only the id)
    PostDeleted,
    /// An ephemeral chat message was sent
    ChatMessage,
    /// Custom event type
    Custom(String),
}

impl EventType {
    /// The SSE event name clients subscribe to
    pub fn name(&self) -> &str {
        match self {
            EventType::PostCreated => "postCreated",
            EventType::PostUpdated => "postUpdated",
            EventType::PostDeleted => "postDeleted",
            EventType::ChatMessage => "chatMessage",
            EventType::Custom(name) => name.as_str(),
        }
    }

    /// Parse an event name as used in the `types` subscription filter
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "postCreated" => Some(EventType::PostCreated),
            "postUpdated" => Some(EventType::PostUpdated),
            "postDeleted" => Some(EventType::PostDeleted),
            "chatMessage" => Some(EventType::ChatMessage),
            custom if !custom.is_empty() => Some(EventType::Custom(custom.to_string())),
            _ => None,
        }
    }
}

/// Real-time event broadcast on a community's channel
///
/// Every event is scoped to a single community; subscribers of that
/// community's channel receive a copy of each event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RealtimeEvent {
    /// Type of event
    pub event_type: EventType,
    /// Community whose channel carries this event
    pub community_id: Uuid,
    /// Event payload (JSON-serializable data)
    pub payload: serde_json::Value,
    /// Timestamp when event occurred (RFC 3339)
    pub timestamp: String,
}

impl RealtimeEvent {
    /// Create a new real-time event
    pub fn new(event_type: EventType, community_id: Uuid, payload: serde_json::Value) -> Self {
        Self {
            event_type,
            community_id,
            payload,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create a `postCreated` event carrying the full post
    pub fn post_created(community_id: Uuid, post: serde_json::Value) -> Self {
        Self::new(EventType::PostCreated, community_id, post)
    }

    /// Create a `postUpdated` event carrying the full post
    pub fn post_updated(community_id: Uuid, post: serde_json::Value) -> Self {
        Self::new(EventType::PostUpdated, community_id, post)
    }

    /// Create a `postDeleted` event carrying only the post id
    pub fn post_deleted(community_id: Uuid, post_id: Uuid) -> Self {
        Self::new(
            EventType::PostDeleted,
            community_id,
            serde_json::json!({ "id": post_id }),
        )
    }

    /// Create a `chatMessage` event carrying the message
    pub fn chat_message(community_id: Uuid, message: serde_json::Value) -> Self {
        Self::new(EventType::ChatMessage, community_id, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_new() {
        let community_id = Uuid::new_v4();
        let event = RealtimeEvent::new(
            EventType::PostCreated,
            community_id,
            serde_json::json!({"title": "Hello"}),
        );
        assert_eq!(event.event_type, EventType::PostCreated);
        assert_eq!(event.community_id, community_id);
        assert!(!event.timestamp.is_empty());
    }

    #[test]
    fn test_post_deleted_carries_only_id() {
        let community_id = Uuid::new_v4();
        let post_id = Uuid::new_v4();
        let event = RealtimeEvent::post_deleted(community_id, post_id);
        assert_eq!(event.event_type, EventType::PostDeleted);
        assert_eq!(event.payload["id"], serde_json::json!(post_id));
        assert!(event.payload.get("title").is_none());
    }

    #[test]
    fn test_event_names() {
        assert_eq!(EventType::PostCreated.name(), "postCreated");
        assert_eq!(EventType::PostUpdated.name(), "postUpdated");
        assert_eq!(EventType::PostDeleted.name(), "postDeleted");
        assert_eq!(EventType::ChatMessage.name(), "chatMessage");
        assert_eq!(EventType::Custom("pinned".to_string()).name(), "pinned");
    }

    #[test]
    fn test_event_parse_roundtrip() {
        for name in ["postCreated", "postUpdated", "postDeleted", "chatMessage"] {
            let parsed = EventType::parse(name).unwrap();
            assert_eq!(parsed.name(), name);
        }
        assert_eq!(EventType::parse(""), None);
        assert_eq!(
            EventType::parse("pinned"),
            Some(EventType::Custom("pinned".to_string()))
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = RealtimeEvent::post_created(Uuid::new_v4(), serde_json::json!({"title": "x"}));
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: RealtimeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event.event_type, deserialized.event_type);
        assert_eq!(event.community_id, deserialized.community_id);
    }
}
