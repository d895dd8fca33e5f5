use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerSettings,
    #[serde(default = "super::defaults::storage_settings")]
    pub storage: StorageSettings,
    #[serde(default = "super::defaults::thumbnail_settings")]
    pub thumbnails: ThumbnailSettings,
    #[serde(default)]
    pub roots: Vec<RootConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    #[serde(default = "super::defaults::tcp_nodelay")]
    pub tcp_nodelay: bool,
    #[serde(default = "super::defaults::timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "super::defaults::max_body_size")]
    pub max_body_size_mb: usize,
    #[serde(default = "super::defaults::allowed_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "super::defaults::max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    #[serde(default = "super::defaults::enable_compression")]
    pub enable_compression: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    Memory,
    S3,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::S3 => write!(f, "s3"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "super::defaults::storage_backend")]
    pub backend: StorageBackend,
    /// Directory used as the flat key space of the local backend
    #[serde(default = "super::defaults::local_path")]
    pub local_path: String,
    #[serde(default = "super::defaults::s3_settings")]
    pub s3: S3Settings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct S3Settings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub endpoint_url: String,
    #[serde(default = "super::defaults::s3_region")]
    pub region: String,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    #[serde(default = "super::defaults::s3_bucket_name")]
    pub bucket_name: String,
    #[serde(default)]
    pub bucket_prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ThumbnailSettings {
    #[serde(default = "super::defaults::thumbnail_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "super::defaults::thumbnail_size")]
    pub size: u32,
    #[serde(default = "super::defaults::thumbnail_memory_cache_mb")]
    pub memory_cache_mb: u64,
}

/// One mount point exposed to the client
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RootConfig {
    pub base_key: String,
    /// Public URL prefix for direct links, empty to disable
    #[serde(default)]
    pub url: String,
    #[serde(default = "super::defaults::root_alias")]
    pub alias: String,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub max_upload_size_kb: Option<u64>,
    #[serde(default)]
    pub start_key: Option<String>,
    #[serde(default)]
    pub upload_overwrite: bool,
    #[serde(default)]
    pub upload_allow: Vec<String>,
}
