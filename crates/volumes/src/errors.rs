use thiserror::Error;

#[derive(Error, Debug)]
pub enum VolumeError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("No root volume registered")]
    NoRoots,

    #[error("Storage error: {0}")]
    StorageError(#[from] blobfinder_storage::StorageError),
}
