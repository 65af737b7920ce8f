/**
 * Object Storage
 *
 * This module defines the object-store contract used for media uploads
 * (post media, chat files) and its implementations. Uploads land under a
 * caller-owned folder namespace and come back as a retrieval URL plus the
 * content type the store reports for the resource; the media kind attached
 * to a post or chat message is inferred from that reported type.
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// S3-compatible implementation
pub mod s3;

/// In-memory implementation used in tests and local development
pub mod memory;

pub use s3::S3ObjectStore;

/// Object storage failure
#[derive(Debug, Error)]
pub enum StoreError {
    /// Upload failure; aborts whatever write depended on it
    #[error("object upload failed: {0}")]
    PutFailed(String),

    /// Deletion failure; deletions are best-effort and callers log this
    #[error("object deletion failed: {0}")]
    DeleteFailed(String),
}

/// A stored object: its retrieval URL and the content type the store
/// reports for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub url: String,
    pub content_type: String,
}

/// Media storage contract for handling uploads and deletions
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Save raw bytes under `folder` and return the stored object
    async fn put(
        &self,
        folder: &str,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredObject, StoreError>;

    /// Delete a previously stored object by its retrieval URL
    async fn delete(&self, url: &str) -> Result<(), StoreError>;
}

/// Kind of an uploaded media resource, inferred from the content type the
/// store reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Document,
}

impl MediaKind {
    /// Infer the media kind from a content type
    ///
    /// Anything that is neither an image nor a video is a document; callers
    /// that only accept image/video (post media) validate on top of this.
    pub fn from_content_type(content_type: &str) -> MediaKind {
        match content_type.parse::<mime::Mime>() {
            Ok(m) if m.type_() == mime::IMAGE => MediaKind::Image,
            Ok(m) if m.type_() == mime::VIDEO => MediaKind::Video,
            _ => MediaKind::Document,
        }
    }

    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
        }
    }

    /// Parse the database representation
    pub fn parse(value: &str) -> Option<MediaKind> {
        match value {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            "document" => Some(MediaKind::Document),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_from_image_content_type() {
        assert_eq!(MediaKind::from_content_type("image/png"), MediaKind::Image);
        assert_eq!(MediaKind::from_content_type("image/jpeg"), MediaKind::Image);
    }

    #[test]
    fn test_media_kind_from_video_content_type() {
        assert_eq!(MediaKind::from_content_type("video/mp4"), MediaKind::Video);
    }

    #[test]
    fn test_media_kind_falls_back_to_document() {
        assert_eq!(
            MediaKind::from_content_type("application/pdf"),
            MediaKind::Document
        );
        assert_eq!(MediaKind::from_content_type("not a mime"), MediaKind::Document);
    }

    #[test]
    fn test_media_kind_db_roundtrip() {
        for kind in [MediaKind::Image, MediaKind::Video, MediaKind::Document] {
            assert_eq!(MediaKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(MediaKind::parse("audio"), None);
    }
}
