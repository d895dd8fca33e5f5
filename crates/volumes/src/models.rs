use blobfinder_models::Node;
use std::sync::Arc;

/// Prefix of every volume id handed to the client
pub const VOLUME_PREFIX: &str = "a";

/// Separates the volume id from the encoded path inside a token
pub const TOKEN_DELIMITER: char = '_';

/// A configured mount point, immutable once registered
#[derive(Debug, Clone)]
pub struct RootVolume {
    /// `a<N>_`, assigned on registration
    pub id: String,
    pub base_key: String,
    pub url: String,
    pub thumbnail_url: String,
    pub thumbnail_size: u32,
    pub alias: String,
    pub read_only: bool,
    pub locked: bool,
    pub max_upload_size_kb: Option<u64>,
    pub start_key: Option<String>,
    pub upload_overwrite: bool,
    pub upload_allow: Vec<String>,
}

/// Ordered set of mount points
#[derive(Debug, Clone, Default)]
pub struct RootRegistry {
    pub(super) roots: Vec<Arc<RootVolume>>,
}

/// A client token resolved against its root
#[derive(Debug, Clone)]
pub struct FullPath {
    pub root: Arc<RootVolume>,
    pub node: Node,
    pub token: String,
}
