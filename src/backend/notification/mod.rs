//! Push Notifications
//!
//! The push delivery contract, its HTTP implementation, the member fan-out,
//! and the subscription-registration handler.

/// Delivery transport contract and HTTP implementation
pub mod push;

/// Member fan-out with per-recipient failure isolation
pub mod fanout;

/// POST /api/notifications/subscribe
pub mod handlers;

pub use fanout::{notify_community_members, FanOutReport};
pub use push::{DeliveryError, HttpPushTransport, PushMessage, PushTransport};
