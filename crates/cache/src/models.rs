use blobfinder_imaging::PictureEditor;
use blobfinder_storage::DirectoryTree;
use bytes::Bytes;
use moka::future::Cache;
use std::path::PathBuf;
use std::sync::Arc;

/// Generates, caches and invalidates image thumbnails.
///
/// Thumbnails live on local disk under `cache_dir`, mirrored by an in-memory
/// LRU layer. The thumbnail key embeds the source's modification tag, so a
/// re-uploaded file with the same name gets a fresh key.
pub struct ThumbnailManager {
    pub(super) tree: DirectoryTree,
    pub(super) editor: Arc<dyn PictureEditor>,
    pub(super) cache_dir: PathBuf,
    pub(super) size: u32,
    pub(super) memory: Cache<Arc<str>, Thumbnail>,
}

/// Encoded thumbnail bytes
#[derive(Clone, Debug)]
pub struct Thumbnail {
    pub data: Bytes,
    pub mime_type: String,
}
