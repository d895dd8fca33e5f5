use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] blobfinder_storage::StorageError),

    #[error("Image error: {0}")]
    ImageError(#[from] blobfinder_imaging::ImageError),

    #[error("Join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error("Invalid thumbnail hash: {0}")]
    InvalidHash(String),

    #[error("Thumbnail source not found: {0}")]
    SourceNotFound(String),
}
