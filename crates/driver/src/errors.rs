use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Unsupported archive format: {0}")]
    NotSupportedFormat(String),

    #[error("No free name left for {0}")]
    NameSelectionExhausted(String),

    #[error("Upload too large: {0}")]
    UploadTooLarge(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Command not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Failed to extract '{entry}': {source}")]
    ExtractEntry {
        entry: String,
        #[source]
        source: Box<DriverError>,
    },

    #[error("Storage error: {0}")]
    StorageError(#[from] blobfinder_storage::StorageError),

    #[error("Volume error: {0}")]
    VolumeError(#[from] blobfinder_volumes::VolumeError),

    #[error("Thumbnail error: {0}")]
    ThumbnailError(#[from] blobfinder_cache::ThumbnailError),

    #[error("Image error: {0}")]
    ImageError(#[from] blobfinder_imaging::ImageError),

    #[error("Archive error: {0}")]
    ArchiveError(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

impl DriverError {
    /// True when retrying the same command may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            DriverError::StorageError(e) => e.is_transient(),
            DriverError::ExtractEntry { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}
