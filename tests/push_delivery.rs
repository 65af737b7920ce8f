//! Integration tests for the HTTP push transport and the fan-out
//!
//! Drives the real `HttpPushTransport` against a mock HTTP server to cover
//! the three delivery outcomes: success, permanent invalidation (410), and
//! transient failure (5xx).

use palaver::backend::notification::fanout::{dispatch_all, DeliveryOutcome, PushTarget};
use palaver::backend::notification::push::{
    DeliveryError, HttpPushTransport, PushMessage, PushTransport,
};
use uuid::Uuid;
use wiremock::matchers::{body_json_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn subscription_for(endpoint: String) -> serde_json::Value {
    serde_json::json!({ "endpoint": endpoint, "keys": { "auth": "opaque" } })
}

#[tokio::test]
async fn delivery_succeeds_against_healthy_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/push/alice"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpPushTransport::new();
    let message = PushMessage::post_created("rustaceans", "Hello", Uuid::new_v4());
    let subscription = subscription_for(format!("{}/push/alice", server.uri()));

    let result = transport.deliver(&subscription, &message).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn delivery_carries_community_name_and_title() {
    let server = MockServer::start().await;
    let post_id = Uuid::new_v4();
    let message = PushMessage::post_created("rustaceans", "Hello", post_id);

    let expected_body = serde_json::to_string(&message).unwrap();
    Mock::given(method("POST"))
        .and(path("/push/bob"))
        .and(body_json_string(&expected_body))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpPushTransport::new();
    let subscription = subscription_for(format!("{}/push/bob", server.uri()));

    transport
        .deliver(&subscription, &message)
        .await
        .expect("delivery should succeed");
}

#[tokio::test]
async fn gone_endpoint_signals_permanent_invalidity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/push/stale"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let transport = HttpPushTransport::new();
    let message = PushMessage::post_created("c", "t", Uuid::new_v4());
    let subscription = subscription_for(format!("{}/push/stale", server.uri()));

    let result = transport.deliver(&subscription, &message).await;
    assert!(matches!(result, Err(DeliveryError::EndpointGone)));
}

#[tokio::test]
async fn server_error_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/push/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let transport = HttpPushTransport::new();
    let message = PushMessage::post_created("c", "t", Uuid::new_v4());
    let subscription = subscription_for(format!("{}/push/flaky", server.uri()));

    let result = transport.deliver(&subscription, &message).await;
    assert!(matches!(result, Err(DeliveryError::Transient(_))));
}

#[tokio::test]
async fn fan_out_isolates_each_member() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/push/ok"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/push/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/push/down"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let gone_user = Uuid::new_v4();
    let targets = vec![
        PushTarget {
            user_id: Uuid::new_v4(),
            subscription: subscription_for(format!("{}/push/ok", server.uri())),
        },
        PushTarget {
            user_id: gone_user,
            subscription: subscription_for(format!("{}/push/gone", server.uri())),
        },
        PushTarget {
            user_id: Uuid::new_v4(),
            subscription: subscription_for(format!("{}/push/down", server.uri())),
        },
    ];

    let transport = HttpPushTransport::new();
    let message = PushMessage::post_created("rustaceans", "Hello", Uuid::new_v4());

    let outcomes = dispatch_all(&transport, &targets, &message).await;

    assert_eq!(outcomes.len(), 3);
    let delivered = outcomes
        .iter()
        .filter(|(_, o)| *o == DeliveryOutcome::Delivered)
        .count();
    let failed = outcomes
        .iter()
        .filter(|(_, o)| *o == DeliveryOutcome::Failed)
        .count();
    let invalid: Vec<_> = outcomes
        .iter()
        .filter(|(_, o)| *o == DeliveryOutcome::EndpointInvalid)
        .collect();

    assert_eq!(delivered, 1);
    assert_eq!(failed, 1);
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid[0].0, gone_user);
}
