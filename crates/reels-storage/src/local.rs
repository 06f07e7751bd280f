use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/reels/media")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Rejects keys with path traversal sequences that could escape the base
    /// storage directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(storage_key))
    }

    /// Generate public URL for an object
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Bytes,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(self.generate_url(storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn content_length(&self, storage_key: &str) -> StorageResult<u64> {
        let path = self.key_to_path(storage_key)?;

        let meta = fs::metadata(&path)
            .await
            .map_err(|_| StorageError::NotFound(storage_key.to_string()))?;

        Ok(meta.len())
    }

    async fn compose(
        &self,
        source_keys: &[String],
        dest_key: &str,
        _content_type: &str,
    ) -> StorageResult<String> {
        if source_keys.is_empty() {
            return Err(StorageError::ComposeFailed(
                "No source objects to compose".to_string(),
            ));
        }

        let dest_path = self.key_to_path(dest_key)?;
        self.ensure_parent_dir(&dest_path).await?;

        let start = std::time::Instant::now();

        let mut dest = fs::File::create(&dest_path).await.map_err(|e| {
            StorageError::ComposeFailed(format!(
                "Failed to create file {}: {}",
                dest_path.display(),
                e
            ))
        })?;

        let mut total: u64 = 0;
        for key in source_keys {
            let src_path = self.key_to_path(key)?;
            let mut src = fs::File::open(&src_path)
                .await
                .map_err(|_| StorageError::NotFound(key.clone()))?;
            total += tokio::io::copy(&mut src, &mut dest).await.map_err(|e| {
                StorageError::ComposeFailed(format!("Failed to append {}: {}", key, e))
            })?;
        }

        dest.sync_all().await.map_err(|e| {
            StorageError::ComposeFailed(format!(
                "Failed to sync file {}: {}",
                dest_path.display(),
                e
            ))
        })?;

        tracing::info!(
            dest_key = %dest_key,
            source_count = source_keys.len(),
            size_bytes = total,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage compose successful"
        );

        Ok(self.generate_url(dest_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn test_storage() -> (tempfile::TempDir, LocalStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:3000/media".to_string())
            .await
            .unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn test_upload_download_round_trip() {
        let (_dir, storage) = test_storage().await;
        let url = storage
            .upload_with_key("reels/test.mp4", Bytes::from_static(b"hello"), "video/mp4")
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:3000/media/reels/test.mp4");
        assert_eq!(storage.download("reels/test.mp4").await.unwrap(), b"hello");
        assert_eq!(storage.content_length("reels/test.mp4").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_download_missing_is_not_found() {
        let (_dir, storage) = test_storage().await;
        assert!(matches!(
            storage.download("reels/missing.mp4").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_path_traversal_keys() {
        let (_dir, storage) = test_storage().await;
        assert!(matches!(
            storage.download("../etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.download("/etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_object() {
        let (_dir, storage) = test_storage().await;
        storage
            .upload_with_key("uploads/x/chunk_00000", Bytes::from_static(b"abc"), "video/mp4")
            .await
            .unwrap();
        assert!(storage.exists("uploads/x/chunk_00000").await.unwrap());
        storage.delete("uploads/x/chunk_00000").await.unwrap();
        assert!(!storage.exists("uploads/x/chunk_00000").await.unwrap());
    }

    #[tokio::test]
    async fn test_compose_concatenates_in_order() {
        let (_dir, storage) = test_storage().await;
        let video_id = Uuid::new_v4();
        let keys: Vec<String> = (0..3).map(|i| crate::keys::chunk_key(video_id, i)).collect();
        for (i, key) in keys.iter().enumerate() {
            storage
                .upload_with_key(key, Bytes::from(vec![b'a' + i as u8; 4]), "video/mp4")
                .await
                .unwrap();
        }

        let dest = crate::keys::final_key(video_id, "mp4");
        storage.compose(&keys, &dest, "video/mp4").await.unwrap();

        let data = storage.download(&dest).await.unwrap();
        assert_eq!(data, b"aaaabbbbcccc");
    }

    #[tokio::test]
    async fn test_compose_with_no_sources_fails() {
        let (_dir, storage) = test_storage().await;
        assert!(matches!(
            storage.compose(&[], "reels/out.mp4", "video/mp4").await,
            Err(StorageError::ComposeFailed(_))
        ));
    }
}
