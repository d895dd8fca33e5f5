use thiserror::Error;

#[derive(Error, Debug)]
pub enum UtilsError {
    #[error("Invalid encoded path: {0}")]
    DecodeError(String),

    #[error("Invalid path: {0}")]
    PathError(String),

    #[error("Path escapes its root: {0}")]
    PathTraversal(String),
}
