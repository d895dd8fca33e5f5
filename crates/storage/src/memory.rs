use crate::backend::{ByteStream, ObjectEntry, StorageBackend};
use crate::StorageError;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;

#[derive(Clone)]
struct StoredObject {
    data: Bytes,
    last_modified: DateTime<Utc>,
}

/// In-process object store, used for tests and throwaway instances
#[derive(Default)]
pub struct MemoryBackend {
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored keys in lexical order
    pub fn keys(&self) -> Vec<String> {
        self.objects.read().keys().cloned().collect()
    }

    fn entry(key: &str, object: &StoredObject) -> ObjectEntry {
        ObjectEntry {
            key: key.to_string(),
            is_directory: key.ends_with('/'),
            size: object.data.len() as u64,
            last_modified: Some(object.last_modified),
        }
    }
}

#[async_trait::async_trait]
impl StorageBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.objects.read().contains_key(key))
    }

    async fn metadata(&self, key: &str) -> Result<Option<ObjectEntry>, StorageError> {
        Ok(self
            .objects
            .read()
            .get(key)
            .map(|object| Self::entry(key, object)))
    }

    async fn read_all(&self, key: &str) -> Result<Bytes, StorageError> {
        self.objects
            .read()
            .get(key)
            .map(|object| object.data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn read_stream(&self, key: &str) -> Result<ByteStream, StorageError> {
        let data = self.read_all(key).await?;
        Ok(Box::pin(futures::stream::once(async move { Ok(data) })))
    }

    async fn write(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        self.objects.write().insert(
            key.to_string(),
            StoredObject {
                data,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.objects
            .write()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>, StorageError> {
        let objects = self.objects.read();
        let mut entries: Vec<ObjectEntry> = Vec::new();

        let range = objects.range::<str, _>((Bound::Included(prefix), Bound::Unbounded));
        for (key, object) in range {
            let Some(rest) = key.strip_prefix(prefix) else {
                break;
            };

            match rest.find('/') {
                // Deeper key: report its first segment once, as a common prefix
                Some(idx) if idx + 1 < rest.len() => {
                    let dir_key = format!("{}{}", prefix, &rest[..=idx]);
                    if entries.last().map(|e| e.key.as_str()) != Some(dir_key.as_str()) {
                        entries.push(ObjectEntry {
                            key: dir_key,
                            is_directory: true,
                            size: 0,
                            last_modified: None,
                        });
                    }
                }
                // Marker of a direct subdirectory
                Some(_) => {
                    if entries.last().map(|e| e.key.as_str()) != Some(key.as_str()) {
                        entries.push(Self::entry(key, object));
                    }
                }
                None => entries.push(Self::entry(key, object)),
            }
        }

        Ok(entries)
    }

    async fn copy(&self, src_key: &str, dst_key: &str) -> Result<(), StorageError> {
        let data = self.read_all(src_key).await?;
        self.write(dst_key, data).await
    }

    fn is_remote(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> MemoryBackend {
        let backend = MemoryBackend::new();
        for key in ["a/", "a/x.txt", "a/b/", "a/b/y.txt", "a/c/z.txt", "ab.txt"] {
            backend.write(key, Bytes::from_static(b"1")).await.unwrap();
        }
        backend
    }

    #[tokio::test]
    async fn test_list_is_one_level() {
        let backend = seeded().await;

        let keys: Vec<String> = backend
            .list("a/")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.key)
            .collect();

        assert_eq!(keys, vec!["a/", "a/b/", "a/c/", "a/x.txt"]);
    }

    #[tokio::test]
    async fn test_list_root_prefix() {
        let backend = seeded().await;

        let entries = backend.list("").await.unwrap();
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();

        assert_eq!(keys, vec!["a/", "ab.txt"]);
        assert!(entries[0].is_directory);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let backend = MemoryBackend::new();
        assert!(matches!(
            backend.delete("nope").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(!backend.delete_if_exists("nope").await.unwrap());
    }

    #[tokio::test]
    async fn test_rename_moves_bytes() {
        let backend = seeded().await;
        backend.rename("a/x.txt", "a/moved.txt").await.unwrap();

        assert!(!backend.exists("a/x.txt").await.unwrap());
        assert_eq!(backend.read_all("a/moved.txt").await.unwrap(), Bytes::from_static(b"1"));
    }
}
