use crate::StorageError;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use std::path::Path;

pub type ByteStream = BoxStream<'static, Result<Bytes, StorageError>>;

/// One entry of a flat, single level listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    pub key: String,
    /// Directory marker object or common prefix; the key ends with `/`
    pub is_directory: bool,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Flat object storage: keys map to byte blobs, nothing else.
///
/// Directory keys end with `/` and are ordinary (usually empty) objects.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Whether an object is stored under exactly `key`
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Size and modification time of `key`, `None` when absent
    async fn metadata(&self, key: &str) -> Result<Option<ObjectEntry>, StorageError>;

    async fn read_all(&self, key: &str) -> Result<Bytes, StorageError>;

    async fn read_stream(&self, key: &str) -> Result<ByteStream, StorageError>;

    /// Stores `data` under `key`, replacing any previous object
    async fn write(&self, key: &str, data: Bytes) -> Result<(), StorageError>;

    /// Stores the content of a local file under `key`
    async fn write_file(&self, key: &str, local_path: &Path) -> Result<(), StorageError> {
        let data = tokio::fs::read(local_path).await?;
        self.write(key, Bytes::from(data)).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Returns whether something was deleted
    async fn delete_if_exists(&self, key: &str) -> Result<bool, StorageError> {
        if self.exists(key).await? {
            self.delete(key).await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Objects and common prefixes directly below `prefix` (one level).
    /// The marker of `prefix` itself may be part of the result.
    async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>, StorageError>;

    async fn copy(&self, src_key: &str, dst_key: &str) -> Result<(), StorageError>;

    /// Copy then delete; not atomic
    async fn rename(&self, src_key: &str, dst_key: &str) -> Result<(), StorageError> {
        self.copy(src_key, dst_key).await?;
        self.delete(src_key).await
    }

    /// Check if backend is local or remote
    fn is_remote(&self) -> bool;
}
