use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[cfg(feature = "s3")]
    #[error("S3 SDK error: {0}")]
    S3SdkError(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid key '{0}'")]
    InvalidKey(String),

    #[error("Transient failure on '{key}': {message}")]
    Transient { key: String, message: String },

    #[error("Upload failed for '{0}': {1}")]
    UploadError(String, String),

    #[error("Delete failed for '{0}': {1}")]
    DeleteError(String, String),

    #[error("Copy failed from '{0}' to '{1}': {2}")]
    CopyError(String, String, String),

    #[error("Invalid storage configuration: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// Whether retrying the same call later could succeed. Nothing in this
    /// workspace retries, the flag is surfaced to callers and logs.
    pub fn is_transient(&self) -> bool {
        match self {
            StorageError::Transient { .. } => true,
            StorageError::IoError(err) => matches!(
                err.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
            ),
            _ => false,
        }
    }
}
