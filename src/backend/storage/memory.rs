/**
 * In-memory Object Store
 *
 * `ObjectStore` implementation backed by a map. Used by tests and by local
 * development runs that have no bucket configured; uploads are addressable
 * but not actually retrievable over HTTP.
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::backend::storage::{ObjectStore, StoreError, StoredObject};

/// Map-backed object store
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects currently stored
    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an object with this URL is stored
    pub fn contains(&self, url: &str) -> bool {
        self.objects.lock().unwrap().contains_key(url)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        folder: &str,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredObject, StoreError> {
        let url = format!("memory://{}/{}-{}", folder, Uuid::new_v4(), filename);
        self.objects.lock().unwrap().insert(url.clone(), data);
        Ok(StoredObject {
            url,
            content_type: content_type.to_string(),
        })
    }

    async fn delete(&self, url: &str) -> Result<(), StoreError> {
        self.objects
            .lock()
            .unwrap()
            .remove(url)
            .map(|_| ())
            .ok_or_else(|| StoreError::DeleteFailed(format!("unknown url {url}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_delete() {
        let store = MemoryObjectStore::new();
        let stored = store
            .put("post_media", "photo.png", "image/png", vec![1, 2, 3])
            .await
            .unwrap();

        assert!(stored.url.starts_with("memory://post_media/"));
        assert!(store.contains(&stored.url));

        store.delete(&stored.url).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_url_fails() {
        let store = MemoryObjectStore::new();
        let result = store.delete("memory://post_media/nope").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_same_filename_never_collides() {
        let store = MemoryObjectStore::new();
        let a = store
            .put("chat_files", "file.txt", "text/plain", vec![1])
            .await
            .unwrap();
        let b = store
            .put("chat_files", "file.txt", "text/plain", vec![2])
            .await
            .unwrap();
        assert_ne!(a.url, b.url);
        assert_eq!(store.len(), 2);
    }
}
