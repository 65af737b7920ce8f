/**
 * Push Delivery Transport
 *
 * This module defines the contract for delivering a push message to a
 * previously registered client endpoint, and an HTTP implementation that
 * posts the message to the endpoint recorded in the user's subscription
 * descriptor.
 *
 * # Endpoint invalidation
 *
 * A delivery can fail in two ways: transiently (network trouble, transport
 * 5xx) or permanently (the endpoint is gone). Permanent invalidity is the
 * signal the fan-out uses to clear the member's stored subscription so
 * future fan-outs skip it.
 */

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// The short message delivered to a member on post creation:
/// community name, post title, and a deep link to the post.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub link: String,
}

impl PushMessage {
    /// Build the post-creation notification for a community
    pub fn post_created(community_name: &str, post_title: &str, post_id: uuid::Uuid) -> Self {
        Self {
            title: community_name.to_string(),
            body: post_title.to_string(),
            link: format!("/posts/{post_id}"),
        }
    }
}

/// Push delivery failure
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The endpoint is permanently unusable; the stored subscription should
    /// be cleared
    #[error("push endpoint is permanently invalid")]
    EndpointGone,

    /// Anything else; the delivery is dropped but the subscription is kept
    #[error("push delivery failed: {0}")]
    Transient(String),
}

/// Contract for delivering a push message to one registered endpoint
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Deliver `message` to the endpoint described by `subscription`
    ///
    /// The subscription descriptor is opaque to callers; implementations
    /// interpret whatever shape the registration endpoint stored.
    async fn deliver(
        &self,
        subscription: &serde_json::Value,
        message: &PushMessage,
    ) -> Result<(), DeliveryError>;
}

/// HTTP push transport
///
/// Posts the message as JSON to the `endpoint` URL recorded in the
/// subscription descriptor. 404 and 410 responses mark the endpoint as
/// permanently invalid.
pub struct HttpPushTransport {
    client: reqwest::Client,
}

impl HttpPushTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpPushTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushTransport for HttpPushTransport {
    async fn deliver(
        &self,
        subscription: &serde_json::Value,
        message: &PushMessage,
    ) -> Result<(), DeliveryError> {
        // A descriptor without an endpoint can never become deliverable
        let endpoint = subscription
            .get("endpoint")
            .and_then(|v| v.as_str())
            .ok_or(DeliveryError::EndpointGone)?;

        let response = self
            .client
            .post(endpoint)
            .header("TTL", "86400")
            .json(message)
            .send()
            .await
            .map_err(|e| DeliveryError::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::GONE {
            Err(DeliveryError::EndpointGone)
        } else {
            Err(DeliveryError::Transient(format!(
                "endpoint returned {status}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_created_message() {
        let post_id = uuid::Uuid::new_v4();
        let message = PushMessage::post_created("rustaceans", "Hello", post_id);
        assert_eq!(message.title, "rustaceans");
        assert_eq!(message.body, "Hello");
        assert_eq!(message.link, format!("/posts/{post_id}"));
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_permanent() {
        let transport = HttpPushTransport::new();
        let subscription = serde_json::json!({ "keys": {} });
        let message = PushMessage::post_created("c", "t", uuid::Uuid::new_v4());

        let result = transport.deliver(&subscription, &message).await;
        assert!(matches!(result, Err(DeliveryError::EndpointGone)));
    }
}
