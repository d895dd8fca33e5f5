// Re-export the workspace crates under short module names

pub use blobfinder_models as models;
pub use blobfinder_events as events;
pub use blobfinder_utils as utils;
pub use blobfinder_filesystem as filesystem;
pub use blobfinder_config as config;
pub use blobfinder_storage as storage;
pub use blobfinder_volumes as volumes;
pub use blobfinder_imaging as imaging;
pub use blobfinder_cache as cache;
pub use blobfinder_driver as driver;
pub use blobfinder_api as api;

/// Prelude module for convenient imports
pub mod prelude {
    // Responses
    pub use blobfinder_models::{CommandResponse, FileEntry, Node, NodeKind};

    // Events
    pub use blobfinder_events::{AppEvent, EventBus};

    // Configuration
    pub use blobfinder_config::Config;

    // Storage
    pub use blobfinder_storage::{DirectoryTree, LocalBackend, MemoryBackend, StorageBackend};

    // Volumes
    pub use blobfinder_volumes::{FullPath, RootRegistry, RootVolume};

    // Commands
    pub use blobfinder_driver::{Dispatcher, DriverError, UploadFile, UploadOptions};

    // Thumbnails
    pub use blobfinder_cache::ThumbnailManager;
    pub use blobfinder_imaging::{DefaultPictureEditor, PictureEditor};

    // Filesystem
    pub use blobfinder_filesystem::FileSystem;
}
