use blobfinder_cache::ThumbnailManager;
use blobfinder_imaging::PictureEditor;
use blobfinder_storage::DirectoryTree;
use blobfinder_volumes::RootRegistry;
use bytes::Bytes;
use std::sync::Arc;

pub const ZIP_MIME: &str = "application/zip";

/// Executes connector commands against the directory tree.
///
/// Commands run to completion on the calling task and issue storage calls one
/// at a time. Multi-step commands (paste, rename, duplicate, extract) are not
/// atomic: a failure leaves whatever was written so far.
pub struct Dispatcher {
    pub(super) registry: Arc<RootRegistry>,
    pub(super) tree: DirectoryTree,
    pub(super) thumbnails: Arc<ThumbnailManager>,
    pub(super) editor: Arc<dyn PictureEditor>,
}

/// A file received by the `upload` command
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub data: Bytes,
}

/// Parameters of the `upload` command besides the files themselves
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Per-request override of the root's overwrite policy
    pub overwrite: Option<bool>,
    /// Separator placed before the number of a renamed upload, `-` when absent
    pub suffix: Option<String>,
    /// Existing files in the target moved aside to `<stem><suffix><ext>` first
    pub renames: Vec<String>,
}
