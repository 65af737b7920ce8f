/**
 * Server Configuration
 *
 * This module handles loading and validation of server configuration:
 * the PostgreSQL connection, the object store, and the behavior flags.
 *
 * # Configuration Sources
 *
 * Configuration is loaded from environment variables, with sensible
 * defaults for local development where possible:
 *
 * - `DATABASE_URL` - PostgreSQL connection string (required)
 * - `SERVER_PORT` - listen port (default 5000)
 * - `JWT_SECRET` - token signing secret
 * - `REQUIRE_MEMBERSHIP_TO_POST` - membership gate for post creation
 *   (default off, matching the historic behavior)
 * - `STORAGE_BUCKET` / `STORAGE_PUBLIC_URL` - S3 object storage; when
 *   absent the server falls back to the in-memory store
 */

use sqlx::PgPool;
use std::sync::Arc;

use crate::backend::storage::{memory::MemoryObjectStore, ObjectStore, S3ObjectStore};

/// Behavior flags
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Whether post creation requires community membership
    ///
    /// Off by default: posting to a community you have not joined is
    /// allowed, as in the historic behavior. Turn on to close that gap.
    pub require_membership_to_post: bool,
}

impl ServerConfig {
    /// Load configuration from the environment
    pub fn from_env() -> Self {
        let require_membership_to_post = std::env::var("REQUIRE_MEMBERSHIP_TO_POST")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self {
            require_membership_to_post,
        }
    }
}

/// Load and initialize the database connection pool
///
/// This function:
/// 1. Reads `DATABASE_URL` from the environment
/// 2. Creates a PostgreSQL connection pool
/// 3. Runs database migrations
///
/// # Returns
///
/// - `Some(PgPool)` if the database is successfully configured
/// - `None` if `DATABASE_URL` is not set or the connection fails
pub async fn load_database() -> Option<PgPool> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::error!("DATABASE_URL not set.");
            return None;
        }
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            return None;
        }
    };

    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => {
            tracing::info!("Database migrations completed successfully");
        }
        Err(e) => {
            tracing::error!("Failed to run database migrations: {:?}", e);
            // Continue anyway - migrations might have already been run
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}

/// Load the object store
///
/// Uses S3 when a bucket is configured; otherwise falls back to the
/// in-memory store (uploads will not survive a restart).
pub async fn load_object_store() -> Arc<dyn ObjectStore> {
    let bucket = std::env::var("STORAGE_BUCKET").ok();
    let public_url = std::env::var("STORAGE_PUBLIC_URL").ok();

    match (bucket, public_url) {
        (Some(bucket), Some(public_url)) => {
            tracing::info!("Using S3 object storage (bucket: {})", bucket);
            Arc::new(S3ObjectStore::from_env(bucket, public_url).await)
        }
        _ => {
            tracing::warn!(
                "STORAGE_BUCKET/STORAGE_PUBLIC_URL not set; using in-memory object storage"
            );
            Arc::new(MemoryObjectStore::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_policy_defaults_off() {
        // Read whatever the environment holds; absent means off
        if std::env::var("REQUIRE_MEMBERSHIP_TO_POST").is_err() {
            let config = ServerConfig::from_env();
            assert!(!config.require_membership_to_post);
        }
    }
}
