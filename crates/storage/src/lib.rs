mod backend;
mod directory;
mod local;
mod memory;
mod errors;

#[cfg(feature = "s3")]
mod s3;

pub use backend::{ByteStream, ObjectEntry, StorageBackend};
pub use directory::{Children, DirectoryTree, TreeStats};
pub use local::LocalBackend;
pub use memory::MemoryBackend;
pub use errors::*;

#[cfg(feature = "s3")]
pub use s3::S3Backend;
