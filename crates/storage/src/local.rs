use crate::backend::{ByteStream, ObjectEntry, StorageBackend};
use crate::StorageError;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio_util::io::ReaderStream;

/// Local directory used as a flat key space.
///
/// A key maps onto a relative path below `base_path`; a marker key (`dir/`)
/// maps onto a real directory. Parent directories of written files appear
/// implicitly, matching the "descendant proves the directory" rule.
pub struct LocalBackend {
    base_path: PathBuf,
}

impl LocalBackend {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let mut path = self.base_path.clone();
        for segment in key.split('/').filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." || segment.contains('\\') {
                return Err(StorageError::InvalidKey(key.to_string()));
            }
            path.push(segment);
        }
        Ok(path)
    }

    async fn entry_for(key: String, path: &Path) -> Result<Option<ObjectEntry>, StorageError> {
        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let is_directory = metadata.is_dir();
        // A file must not answer for a marker key and vice versa
        if is_directory != key.ends_with('/') && !key.is_empty() {
            return Ok(None);
        }

        Ok(Some(ObjectEntry {
            key,
            is_directory,
            size: if is_directory { 0 } else { metadata.len() },
            last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        }))
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.metadata(key).await?.is_some())
    }

    async fn metadata(&self, key: &str) -> Result<Option<ObjectEntry>, StorageError> {
        let path = self.path_for(key)?;
        Self::entry_for(key.to_string(), &path).await
    }

    async fn read_all(&self, key: &str) -> Result<Bytes, StorageError> {
        if key.ends_with('/') {
            return Ok(Bytes::new());
        }

        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn read_stream(&self, key: &str) -> Result<ByteStream, StorageError> {
        let path = self.path_for(key)?;
        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(ReaderStream::new(file).map(|chunk| chunk.map_err(StorageError::from)).boxed())
    }

    async fn write(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        let path = self.path_for(key)?;

        if key.ends_with('/') {
            tokio::fs::create_dir_all(&path).await?;
            return Ok(());
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| StorageError::UploadError(key.to_string(), e.to_string()))
    }

    async fn write_file(&self, key: &str, local_path: &Path) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(local_path, &path)
            .await
            .map_err(|e| StorageError::UploadError(key.to_string(), e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;

        let result = if key.ends_with('/') {
            // Descendants still imply the directory; only the marker part goes
            if has_entries(&path).await? {
                return Ok(());
            }
            tokio::fs::remove_dir(&path).await
        } else {
            tokio::fs::remove_file(&path).await
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::DeleteError(key.to_string(), e.to_string())),
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>, StorageError> {
        let dir_path = self.path_for(prefix)?;
        let mut entries = Vec::new();

        if !tokio::fs::metadata(&dir_path).await.map(|m| m.is_dir()).unwrap_or(false) {
            return Ok(entries);
        }
        let mut read_dir = tokio::fs::read_dir(&dir_path).await?;

        if !prefix.is_empty() {
            if let Some(marker) = Self::entry_for(prefix.to_string(), &dir_path).await? {
                entries.push(marker);
            }
        }

        while let Some(dir_entry) = read_dir.next_entry().await? {
            let name = dir_entry.file_name().to_string_lossy().to_string();
            let file_type = dir_entry.file_type().await?;
            let key = if file_type.is_dir() {
                format!("{}{}/", prefix, name)
            } else {
                format!("{}{}", prefix, name)
            };

            if let Some(entry) = Self::entry_for(key, &dir_entry.path()).await? {
                entries.push(entry);
            }
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    async fn copy(&self, src_key: &str, dst_key: &str) -> Result<(), StorageError> {
        if src_key.ends_with('/') {
            return self.write(dst_key, Bytes::new()).await;
        }

        let src = self.path_for(src_key)?;
        let dst = self.path_for(dst_key)?;
        if let Some(parent) = dst.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        match tokio::fs::copy(&src, &dst).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(src_key.to_string()))
            }
            Err(e) => Err(StorageError::CopyError(
                src_key.to_string(),
                dst_key.to_string(),
                e.to_string(),
            )),
        }
    }

    fn is_remote(&self) -> bool {
        false
    }
}

async fn has_entries(path: &Path) -> Result<bool, StorageError> {
    match tokio::fs::read_dir(path).await {
        Ok(mut read_dir) => Ok(read_dir.next_entry().await?.is_some()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_marker_maps_to_directory() {
        let temp = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(temp.path().to_path_buf());

        backend.write("Files/docs/", Bytes::new()).await.unwrap();

        assert!(temp.path().join("Files/docs").is_dir());
        assert!(backend.exists("Files/docs/").await.unwrap());
        assert!(!backend.exists("Files/docs").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_includes_marker_and_children() {
        let temp = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(temp.path().to_path_buf());

        backend.write("Files/a.txt", Bytes::from_static(b"abc")).await.unwrap();
        backend.write("Files/sub/", Bytes::new()).await.unwrap();

        let entries = backend.list("Files/").await.unwrap();
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();

        assert_eq!(keys, vec!["Files/", "Files/a.txt", "Files/sub/"]);
        assert_eq!(entries[1].size, 3);
    }

    #[tokio::test]
    async fn test_traversal_keys_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(temp.path().to_path_buf());

        assert!(matches!(
            backend.read_all("Files/../../etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
