/**
 * Chat Expiry Sweeper
 *
 * Periodic task that purges expired chat messages and their uploaded
 * files. The `expires_at` column is the durable "deletion due" record:
 * whatever was pending when the process stopped is picked up on the next
 * sweep after restart.
 *
 * File deletions are best-effort; a failed deletion is logged and retried
 * on the next sweep because the row is only removed once its file is gone
 * (or it never had one).
 */

use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::chat::db;
use crate::backend::storage::ObjectStore;

/// How often the sweeper runs
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// Run one sweep: delete expired messages and their files
///
/// Returns the number of rows removed.
pub async fn sweep_expired(
    pool: &PgPool,
    object_store: &dyn ObjectStore,
) -> Result<usize, sqlx::Error> {
    let expired = db::expired_messages(pool, Utc::now()).await?;
    if expired.is_empty() {
        return Ok(0);
    }

    let mut removed = 0;
    for (message_id, file_url) in expired {
        if let Some(url) = file_url {
            if let Err(e) = object_store.delete(&url).await {
                tracing::warn!(
                    "[Chat] File deletion failed for expired message {}, retrying next sweep: {:?}",
                    message_id,
                    e
                );
                continue;
            }
        }
        db::delete_message(pool, message_id).await?;
        removed += 1;
    }

    tracing::info!("[Chat] Expiry sweep removed {} messages", removed);
    Ok(removed)
}

/// Spawn the periodic expiry sweeper
pub fn spawn_expiry_sweeper(
    pool: PgPool,
    object_store: Arc<dyn ObjectStore>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(e) = sweep_expired(&pool, object_store.as_ref()).await {
                tracing::error!("[Chat] Expiry sweep failed: {:?}", e);
            }
        }
    })
}
