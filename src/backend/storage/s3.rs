/**
 * S3 Object Store
 *
 * S3-compatible implementation of `ObjectStore`. Objects are keyed as
 * `{folder}/{uuid}-{filename}` so repeated uploads of the same filename
 * never collide, and retrieval URLs are built from a configured public
 * base URL (the bucket website endpoint or a CDN in front of it).
 */

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use uuid::Uuid;

use crate::backend::storage::{ObjectStore, StoreError, StoredObject};

/// S3-backed object store
#[derive(Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3ObjectStore {
    /// Create a store for an existing client
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            // Trailing slash would produce double separators in URLs
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build a store from the environment
    ///
    /// Reads AWS credentials/region the standard way, plus:
    /// - `STORAGE_BUCKET` - bucket name
    /// - `STORAGE_PUBLIC_URL` - public base URL for retrieval
    /// - `STORAGE_ENDPOINT` - optional custom endpoint (MinIO-style
    ///   deployments), which also switches to path-style addressing
    pub async fn from_env(bucket: String, public_base_url: String) -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let client = match std::env::var("STORAGE_ENDPOINT") {
            Ok(endpoint) => {
                let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
                    .endpoint_url(endpoint)
                    .force_path_style(true)
                    .build();
                aws_sdk_s3::Client::from_conf(s3_config)
            }
            Err(_) => aws_sdk_s3::Client::new(&sdk_config),
        };

        Self::new(client, bucket, public_base_url)
    }

    fn key_for_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(&self.public_base_url)
            .map(|rest| rest.trim_start_matches('/'))
            .filter(|key| !key.is_empty())
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        folder: &str,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredObject, StoreError> {
        let key = format!("{}/{}-{}", folder, Uuid::new_v4(), filename);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("[Storage] put_object failed for {}: {:?}", key, e);
                StoreError::PutFailed(format!("put {key}: {e}"))
            })?;

        tracing::debug!("[Storage] Stored object {}", key);

        Ok(StoredObject {
            url: format!("{}/{}", self.public_base_url, key),
            content_type: content_type.to_string(),
        })
    }

    async fn delete(&self, url: &str) -> Result<(), StoreError> {
        let key = self
            .key_for_url(url)
            .ok_or_else(|| StoreError::DeleteFailed(format!("foreign url {url}")))?;

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("[Storage] delete_object failed for {}: {:?}", key, e);
                StoreError::DeleteFailed(format!("delete {key}: {e}"))
            })?;

        tracing::debug!("[Storage] Deleted object {}", key);
        Ok(())
    }
}
