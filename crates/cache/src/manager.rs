use super::errors::ThumbnailError;
use super::models::{Thumbnail, ThumbnailManager};
use blobfinder_imaging::PictureEditor;
use blobfinder_models::Node;
use blobfinder_storage::{DirectoryTree, StorageError};
use blobfinder_utils::{decode_path, encode_path, join_key, key_name, parent_key, resolve_relative, split_extension};
use moka::future::Cache;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

type Result<T> = std::result::Result<T, ThumbnailError>;

impl ThumbnailManager {
    /// Creates a manager writing into `cache_dir`; `memory_cache_mb` bounds the
    /// in-memory layer (0 = unlimited)
    pub fn new(
        tree: DirectoryTree,
        editor: Arc<dyn PictureEditor>,
        cache_dir: PathBuf,
        size: u32,
        memory_cache_mb: u64,
    ) -> Self {
        let builder = Cache::builder()
            .weigher(|_key: &Arc<str>, value: &Thumbnail| -> u32 {
                let kb = value.data.len() as u64 / 1024;
                kb.min(u32::MAX as u64) as u32
            })
            .support_invalidation_closures();

        let memory = if memory_cache_mb == 0 {
            builder.build()
        } else {
            builder.max_capacity(memory_cache_mb * 1024).build()
        };

        Self {
            tree,
            editor,
            cache_dir,
            size,
            memory,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// `<dir>/<stem>_<ticks><ext>`, `None` for directories and files without a modification tag
    pub fn thumbnail_key(node: &Node) -> Option<String> {
        if node.is_directory() || node.modified.is_none() {
            return None;
        }

        let name = format!("{}_{}{}", node.stem(), node.modified_ticks(), node.extension());
        Some(join_key(node.parent_key().unwrap_or_default(), &name))
    }

    /// Client facing hash of an image's thumbnail
    pub fn thumbnail_hash(node: &Node) -> Option<String> {
        if !node.is_image() {
            return None;
        }
        Self::thumbnail_key(node).map(|key| encode_path(&format!("/{}", key)))
    }

    /// Source key a thumbnail key was derived from
    pub fn source_key(thumbnail_key: &str) -> Option<String> {
        let (tagged, ext) = split_extension(key_name(thumbnail_key));
        let (stem, ticks) = tagged.rsplit_once('_')?;
        ticks.parse::<i64>().ok()?;

        let name = format!("{}{}", stem, ext);
        Some(join_key(parent_key(thumbnail_key).unwrap_or_default(), &name))
    }

    fn decode_hash(hash: &str) -> Result<String> {
        let decoded = decode_path(hash).map_err(|_| ThumbnailError::InvalidHash(hash.to_string()))?;
        let key = resolve_relative("", &decoded).map_err(|_| ThumbnailError::InvalidHash(hash.to_string()))?;

        if key.is_empty() {
            return Err(ThumbnailError::InvalidHash(hash.to_string()));
        }
        Ok(key)
    }

    fn disk_path(&self, key: &str) -> PathBuf {
        key.split('/').fold(self.cache_dir.clone(), |path, segment| path.join(segment))
    }

    /// Drops the cached thumbnail(s) of a node: the tagged file for a file,
    /// everything below it for a directory
    pub async fn invalidate(&self, node: &Node) -> Result<()> {
        if node.is_directory() {
            return self.invalidate_directory(&node.key).await;
        }

        let node = if node.modified.is_some() {
            node.clone()
        } else {
            match self.tree.file_node(&node.key).await {
                Ok(node) => node,
                Err(StorageError::NotFound(_)) => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        };

        let Some(key) = Self::thumbnail_key(&node) else {
            return Ok(());
        };

        self.memory.invalidate(key.as_str()).await;

        let path = self.disk_path(&key);
        match fs::remove_file(&path).await {
            Ok(()) => tracing::debug!("Removed thumbnail {}", key),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }

    async fn invalidate_directory(&self, dir_key: &str) -> Result<()> {
        if dir_key.is_empty() {
            return Ok(());
        }

        let prefix = format!("{}/", dir_key);
        if let Err(e) = self
            .memory
            .invalidate_entries_if(move |key, _| key.starts_with(prefix.as_str()))
        {
            tracing::warn!("Failed to schedule thumbnail invalidation: {}", e);
        }

        let path = self.disk_path(dir_key);
        match fs::remove_dir_all(&path).await {
            Ok(()) => tracing::debug!("Removed thumbnails under {}", dir_key),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }

    /// Serves a thumbnail by hash: memory, then disk, then generated from storage
    pub async fn get_or_generate(&self, hash: &str) -> Result<Thumbnail> {
        let key = Self::decode_hash(hash)?;

        if let Some(thumbnail) = self.memory.get(key.as_str()).await {
            return Ok(thumbnail);
        }

        let path = self.disk_path(&key);
        let thumbnail = match fs::read(&path).await {
            Ok(data) => Thumbnail {
                data: data.into(),
                mime_type: mime_guess::from_path(&path).first_or_octet_stream().to_string(),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => self.generate(&key, &path).await?,
            Err(e) => return Err(e.into()),
        };

        self.memory.insert(Arc::from(key.as_str()), thumbnail.clone()).await;
        Ok(thumbnail)
    }

    async fn generate(&self, key: &str, path: &Path) -> Result<Thumbnail> {
        let source = Self::source_key(key).ok_or_else(|| ThumbnailError::InvalidHash(key.to_string()))?;

        let data = match self.tree.backend().read_all(&source).await {
            Ok(data) => data,
            Err(StorageError::NotFound(_)) => return Err(ThumbnailError::SourceNotFound(source)),
            Err(e) => return Err(e.into()),
        };

        let editor = Arc::clone(&self.editor);
        let size = self.size;
        let encoded = tokio::task::spawn_blocking(move || editor.thumbnail(&data, size)).await??;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, &encoded.data).await?;
        tracing::debug!("Generated thumbnail {} from {}", key, source);

        Ok(Thumbnail {
            data: encoded.data.into(),
            mime_type: encoded.mime_type,
        })
    }

    pub fn tree(&self) -> &DirectoryTree {
        &self.tree
    }
}
