//! In-memory storage backend for tests and embedding without a filesystem.

use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
struct StoredObject {
    data: Bytes,
    content_type: String,
}

/// In-memory storage implementation. Objects live in a shared map; cloning
/// the handle shares the underlying store.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
    /// When set, uploads whose key starts with a registered prefix fail.
    /// Used to exercise retry paths.
    fail_keys: Arc<RwLock<HashMap<String, usize>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn url_for(key: &str) -> String {
        format!("memory://{}", key)
    }

    /// Arrange for the next `failures` uploads to keys starting with
    /// `prefix` to fail.
    pub async fn fail_next_uploads(&self, prefix: &str, failures: usize) {
        self.fail_keys
            .write()
            .await
            .insert(prefix.to_string(), failures);
    }

    /// Number of objects currently stored.
    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn content_type_of(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|o| o.content_type.clone())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<String> {
        {
            let mut fail = self.fail_keys.write().await;
            for (prefix, remaining) in fail.iter_mut() {
                if storage_key.starts_with(prefix.as_str()) && *remaining > 0 {
                    *remaining -= 1;
                    return Err(StorageError::UploadFailed(format!(
                        "injected failure for {}",
                        storage_key
                    )));
                }
            }
        }

        self.objects.write().await.insert(
            storage_key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(Self::url_for(storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(storage_key)
            .map(|o| o.data.to_vec())
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.objects
            .write()
            .await
            .remove(storage_key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.objects.read().await.contains_key(storage_key))
    }

    async fn content_length(&self, storage_key: &str) -> StorageResult<u64> {
        self.objects
            .read()
            .await
            .get(storage_key)
            .map(|o| o.data.len() as u64)
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn compose(
        &self,
        source_keys: &[String],
        dest_key: &str,
        content_type: &str,
    ) -> StorageResult<String> {
        if source_keys.is_empty() {
            return Err(StorageError::ComposeFailed(
                "No source objects to compose".to_string(),
            ));
        }

        let mut combined = Vec::new();
        {
            let objects = self.objects.read().await;
            for key in source_keys {
                let obj = objects
                    .get(key)
                    .ok_or_else(|| StorageError::NotFound(key.clone()))?;
                combined.extend_from_slice(&obj.data);
            }
        }

        self.objects.write().await.insert(
            dest_key.to_string(),
            StoredObject {
                data: Bytes::from(combined),
                content_type: content_type.to_string(),
            },
        );
        Ok(Self::url_for(dest_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_and_content_type() {
        let storage = MemoryStorage::new();
        let url = storage
            .upload_with_key("reels/a.mp4", Bytes::from_static(b"xyz"), "video/mp4")
            .await
            .unwrap();
        assert_eq!(url, "memory://reels/a.mp4");
        assert_eq!(storage.download("reels/a.mp4").await.unwrap(), b"xyz");
        assert_eq!(
            storage.content_type_of("reels/a.mp4").await.as_deref(),
            Some("video/mp4")
        );
    }

    #[tokio::test]
    async fn test_injected_failures_then_success() {
        let storage = MemoryStorage::new();
        storage.fail_next_uploads("k", 2).await;
        assert!(storage
            .upload_with_key("k", Bytes::from_static(b"1"), "video/mp4")
            .await
            .is_err());
        assert!(storage
            .upload_with_key("k", Bytes::from_static(b"1"), "video/mp4")
            .await
            .is_err());
        assert!(storage
            .upload_with_key("k", Bytes::from_static(b"1"), "video/mp4")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_compose_missing_source_is_not_found() {
        let storage = MemoryStorage::new();
        let err = storage
            .compose(&["missing".to_string()], "dest", "video/mp4")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
