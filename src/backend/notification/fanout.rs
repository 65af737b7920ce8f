/**
 * Notification Fan-out
 *
 * Dispatches a push message independently to every community member with a
 * registered endpoint. Deliveries run concurrently and are unordered
 * relative to each other; one member's failure never blocks or fails
 * another's, and nothing here ever escalates to a request-level error.
 *
 * A permanent-invalidity signal from the transport clears that member's
 * stored subscription so future fan-outs skip the endpoint.
 */

use futures_util::future::join_all;
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::auth::users;
use crate::backend::community::db as community_db;
use crate::backend::notification::push::{DeliveryError, PushMessage, PushTransport};

/// One member's registered endpoint
#[derive(Debug, Clone)]
pub struct PushTarget {
    pub user_id: Uuid,
    pub subscription: serde_json::Value,
}

/// Outcome of one member's delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed,
    EndpointInvalid,
}

/// What a fan-out did, for logging and tests
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FanOutReport {
    pub delivered: usize,
    pub failed: usize,
    pub invalidated: usize,
}

/// Dispatch `message` to every target concurrently
///
/// Returns one outcome per target. This function never fails as a whole.
pub async fn dispatch_all(
    transport: &dyn PushTransport,
    targets: &[PushTarget],
    message: &PushMessage,
) -> Vec<(Uuid, DeliveryOutcome)> {
    let deliveries = targets.iter().map(|target| async move {
        match transport.deliver(&target.subscription, message).await {
            Ok(()) => (target.user_id, DeliveryOutcome::Delivered),
            Err(DeliveryError::EndpointGone) => {
                tracing::info!(
                    "[Push] Endpoint permanently invalid for user {}",
                    target.user_id
                );
                (target.user_id, DeliveryOutcome::EndpointInvalid)
            }
            Err(DeliveryError::Transient(reason)) => {
                tracing::warn!(
                    "[Push] Delivery failed for user {}: {}",
                    target.user_id,
                    reason
                );
                (target.user_id, DeliveryOutcome::Failed)
            }
        }
    });

    join_all(deliveries).await
}

/// Fan out a post-creation notification to a community's members
///
/// Fetches every member with a registered endpoint, dispatches to all of
/// them concurrently, and clears the stored subscription of any member
/// whose endpoint the transport reported as permanently invalid.
///
/// All failures are swallowed: a fan-out problem is logged, never surfaced
/// to the caller.
pub async fn notify_community_members(
    pool: &PgPool,
    transport: &dyn PushTransport,
    community_id: Uuid,
    message: &PushMessage,
) -> FanOutReport {
    let targets = match community_db::get_members_with_push(pool, community_id).await {
        Ok(targets) => targets,
        Err(e) => {
            tracing::error!(
                "[Push] Could not load push targets for community {}: {:?}",
                community_id,
                e
            );
            return FanOutReport::default();
        }
    };

    if targets.is_empty() {
        tracing::debug!("[Push] No registered endpoints in community {}", community_id);
        return FanOutReport::default();
    }

    let outcomes = dispatch_all(transport, &targets, message).await;

    let mut report = FanOutReport::default();
    for (user_id, outcome) in outcomes {
        match outcome {
            DeliveryOutcome::Delivered => report.delivered += 1,
            DeliveryOutcome::Failed => report.failed += 1,
            DeliveryOutcome::EndpointInvalid => {
                report.invalidated += 1;
                if let Err(e) = users::clear_push_subscription(pool, user_id).await {
                    tracing::error!(
                        "[Push] Failed to clear invalid endpoint for user {}: {:?}",
                        user_id,
                        e
                    );
                }
            }
        }
    }

    tracing::info!(
        "[Push] Fan-out for community {}: {} delivered, {} failed, {} invalidated",
        community_id,
        report.delivered,
        report.failed,
        report.invalidated
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Transport that fails for configured endpoints
    struct ScriptedTransport {
        gone_endpoints: Vec<String>,
        failing_endpoints: Vec<String>,
        delivered: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(gone: &[&str], failing: &[&str]) -> Self {
            Self {
                gone_endpoints: gone.iter().map(|s| s.to_string()).collect(),
                failing_endpoints: failing.iter().map(|s| s.to_string()).collect(),
                delivered: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PushTransport for ScriptedTransport {
        async fn deliver(
            &self,
            subscription: &serde_json::Value,
            _message: &PushMessage,
        ) -> Result<(), DeliveryError> {
            let endpoint = subscription["endpoint"].as_str().unwrap().to_string();
            if self.gone_endpoints.contains(&endpoint) {
                return Err(DeliveryError::EndpointGone);
            }
            if self.failing_endpoints.contains(&endpoint) {
                return Err(DeliveryError::Transient("scripted failure".to_string()));
            }
            self.delivered.lock().unwrap().push(endpoint);
            Ok(())
        }
    }

    fn target(endpoint: &str) -> PushTarget {
        PushTarget {
            user_id: Uuid::new_v4(),
            subscription: serde_json::json!({ "endpoint": endpoint }),
        }
    }

    #[tokio::test]
    async fn test_all_targets_delivered() {
        let transport = ScriptedTransport::new(&[], &[]);
        let targets = vec![target("https://push/a"), target("https://push/b")];
        let message = PushMessage::post_created("c", "Hello", Uuid::new_v4());

        let outcomes = dispatch_all(&transport, &targets, &message).await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|(_, outcome)| *outcome == DeliveryOutcome::Delivered));
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_others() {
        let transport = ScriptedTransport::new(&[], &["https://push/bad"]);
        let targets = vec![
            target("https://push/a"),
            target("https://push/bad"),
            target("https://push/b"),
        ];
        let message = PushMessage::post_created("c", "Hello", Uuid::new_v4());

        let outcomes = dispatch_all(&transport, &targets, &message).await;
        let delivered = outcomes
            .iter()
            .filter(|(_, o)| *o == DeliveryOutcome::Delivered)
            .count();
        let failed = outcomes
            .iter()
            .filter(|(_, o)| *o == DeliveryOutcome::Failed)
            .count();
        assert_eq!(delivered, 2);
        assert_eq!(failed, 1);
    }

    #[tokio::test]
    async fn test_gone_endpoint_reported_invalid() {
        let transport = ScriptedTransport::new(&["https://push/gone"], &[]);
        let gone_target = target("https://push/gone");
        let gone_user = gone_target.user_id;
        let targets = vec![gone_target, target("https://push/ok")];
        let message = PushMessage::post_created("c", "Hello", Uuid::new_v4());

        let outcomes = dispatch_all(&transport, &targets, &message).await;
        let invalid: Vec<_> = outcomes
            .iter()
            .filter(|(_, o)| *o == DeliveryOutcome::EndpointInvalid)
            .collect();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].0, gone_user);
    }
}
