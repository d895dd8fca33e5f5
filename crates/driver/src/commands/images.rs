use crate::dispatcher::{ensure_file, ensure_writable};
use crate::errors::DriverError;
use crate::models::Dispatcher;
use blobfinder_cache::ThumbnailManager;
use blobfinder_imaging::{EncodedImage, ImageError, PictureEditor};
use blobfinder_models::{ChangedResponse, DimResponse, ThumbsResponse};
use blobfinder_volumes::FullPath;
use bytes::Bytes;
use std::sync::Arc;

type Result<T> = std::result::Result<T, DriverError>;

impl Dispatcher {
    pub async fn crop(
        &self,
        path: &FullPath,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<ChangedResponse> {
        self.edit_image(path, move |editor, data| editor.crop(data, x, y, width, height))
            .await
    }

    pub async fn resize(&self, path: &FullPath, width: u32, height: u32) -> Result<ChangedResponse> {
        self.edit_image(path, move |editor, data| editor.resize(data, width, height))
            .await
    }

    pub async fn rotate(&self, path: &FullPath, degree: i32) -> Result<ChangedResponse> {
        self.edit_image(path, move |editor, data| editor.rotate(data, degree))
            .await
    }

    /// Invalidates the thumbnail, runs `edit` on a blocking thread and overwrites the file
    async fn edit_image<F>(&self, path: &FullPath, edit: F) -> Result<ChangedResponse>
    where
        F: FnOnce(&dyn PictureEditor, &[u8]) -> std::result::Result<EncodedImage, ImageError>
            + Send
            + 'static,
    {
        ensure_writable(path)?;
        ensure_file(path)?;

        self.thumbnails.invalidate(&path.node).await?;

        let data = self.tree.backend().read_all(&path.node.key).await?;
        let editor = Arc::clone(&self.editor);
        let image = tokio::task::spawn_blocking(move || edit(editor.as_ref(), &data[..])).await??;

        self.tree
            .backend()
            .write(&path.node.key, Bytes::from(image.data))
            .await?;
        tracing::info!("Edited image {}", path.node.key);

        Ok(ChangedResponse {
            changed: vec![self.entry_for_key(&path.root, &path.node.key).await?],
        })
    }

    /// Pixel dimensions as `"<width>x<height>"`
    pub async fn dim(&self, path: &FullPath) -> Result<DimResponse> {
        ensure_file(path)?;

        let data = self.tree.backend().read_all(&path.node.key).await?;
        let editor = Arc::clone(&self.editor);
        let (width, height) = tokio::task::spawn_blocking(move || editor.image_size(&data)).await??;

        Ok(DimResponse {
            dim: format!("{}x{}", width, height),
        })
    }

    /// Thumbnail hash of every image among the targets
    pub async fn thumbs(&self, paths: &[FullPath]) -> Result<ThumbsResponse> {
        let mut response = ThumbsResponse::default();

        for path in paths.iter().filter(|p| p.node.is_file()) {
            let node = if path.node.modified.is_some() {
                path.node.clone()
            } else {
                self.tree.file_node(&path.node.key).await?
            };

            if let Some(hash) = ThumbnailManager::thumbnail_hash(&node) {
                response.images.insert(path.token.clone(), hash);
            }
        }

        Ok(response)
    }
}
