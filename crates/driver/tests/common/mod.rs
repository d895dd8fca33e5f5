#![allow(dead_code)]

use blobfinder_cache::ThumbnailManager;
use blobfinder_driver::Dispatcher;
use blobfinder_imaging::DefaultPictureEditor;
use blobfinder_storage::{DirectoryTree, MemoryBackend, StorageBackend};
use blobfinder_volumes::{FullPath, RootRegistry, RootVolume};
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;

pub struct Harness {
    pub dispatcher: Dispatcher,
    pub backend: Arc<dyn StorageBackend>,
    pub root: Arc<RootVolume>,
    pub roots: Vec<Arc<RootVolume>>,
    pub cache_dir: TempDir,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_root(RootVolume::new("Files")).await
    }

    pub async fn with_root(root: RootVolume) -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new()), root).await
    }

    pub async fn with_backend(backend: Arc<dyn StorageBackend>, root: RootVolume) -> Self {
        Self::with_roots(backend, vec![root]).await
    }

    /// Registers the roots in order; `root` is the first one
    pub async fn with_roots(backend: Arc<dyn StorageBackend>, volumes: Vec<RootVolume>) -> Self {
        let tree = DirectoryTree::new(Arc::clone(&backend));
        let mut registry = RootRegistry::new();
        let mut roots = Vec::with_capacity(volumes.len());

        for mut volume in volumes {
            if volume.alias.is_empty() {
                volume.alias = "Files".to_string();
            }
            volume.thumbnail_url = "http://localhost/thumb/".to_string();

            let root = registry.add_root(volume);
            tree.create_directory(&root.base_key).await.unwrap();
            roots.push(root);
        }

        let cache_dir = tempfile::tempdir().unwrap();
        let editor = Arc::new(DefaultPictureEditor::new());
        let thumbnails = Arc::new(ThumbnailManager::new(
            tree.clone(),
            editor.clone(),
            cache_dir.path().to_path_buf(),
            90,
            0,
        ));

        Self {
            dispatcher: Dispatcher::new(Arc::new(registry), tree, thumbnails, editor),
            backend,
            root: Arc::clone(&roots[0]),
            roots,
            cache_dir,
        }
    }

    pub fn token(&self, key: &str) -> String {
        self.root.encode_key(key).unwrap()
    }

    pub async fn path(&self, key: &str) -> FullPath {
        self.dispatcher.parse_path(&self.token(key)).await.unwrap()
    }

    pub async fn put(&self, key: &str, data: &[u8]) {
        self.backend.write(key, Bytes::copy_from_slice(data)).await.unwrap();
    }

    pub async fn read(&self, key: &str) -> Bytes {
        self.backend.read_all(key).await.unwrap()
    }

    pub async fn exists(&self, key: &str) -> bool {
        self.backend.exists(key).await.unwrap()
    }
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([30, 160, 90]));
    let mut data = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
        .unwrap();
    data
}
