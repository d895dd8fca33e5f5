/// Default values for configuration fields

pub fn tcp_nodelay() -> bool {
    true
}

pub fn timeout_secs() -> u64 {
    120  // Recursive copies and archives can take a while
}

pub fn max_body_size() -> usize {
    100
}

pub fn max_concurrent_requests() -> usize {
    1000
}

pub fn allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

pub fn enable_compression() -> bool {
    true
}

// Storage defaults
pub fn storage_backend() -> super::models::StorageBackend {
    super::models::StorageBackend::Local
}

pub fn local_path() -> String {
    "storage".to_string()
}

pub fn s3_region() -> String {
    "auto".to_string()
}

pub fn s3_bucket_name() -> String {
    "blobfinder".to_string()
}

pub fn s3_settings() -> super::models::S3Settings {
    super::models::S3Settings {
        enabled: false,
        endpoint_url: String::new(),
        region: s3_region(),
        access_key_id: String::new(),
        secret_access_key: String::new(),
        bucket_name: s3_bucket_name(),
        bucket_prefix: String::new(),
    }
}

pub fn storage_settings() -> super::models::StorageSettings {
    super::models::StorageSettings {
        backend: storage_backend(),
        local_path: local_path(),
        s3: s3_settings(),
    }
}

// Thumbnail defaults
pub fn thumbnail_cache_dir() -> String {
    "thumbnails".to_string()
}

pub fn thumbnail_size() -> u32 {
    90
}

pub fn thumbnail_memory_cache_mb() -> u64 {
    64  // 0 disables the in-memory layer
}

pub fn thumbnail_settings() -> super::models::ThumbnailSettings {
    super::models::ThumbnailSettings {
        cache_dir: thumbnail_cache_dir(),
        size: thumbnail_size(),
        memory_cache_mb: thumbnail_memory_cache_mb(),
    }
}

pub fn root_alias() -> String {
    "Files".to_string()
}

pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# ===============================================================================
# blobfinder Configuration
# ===============================================================================

[server]
# Network
host = "0.0.0.0"                     # Server bind address (0.0.0.0 = all interfaces)
port = 8080                          # Server port
base_url = "http://localhost:8080"   # Public base URL (used for thumbnail links)

# Performance
tcp_nodelay = true                   # Disable Nagle's algorithm (lower latency)
timeout_secs = 120                   # Request timeout in seconds
max_concurrent_requests = 1000       # Max simultaneous connections
max_body_size_mb = 100               # Max request body size in MB (uploads)
enable_compression = true            # HTTP compression (gzip/brotli/deflate)

# CORS
allowed_origins = ["*"]              # "*" = all origins | ["https://example.com"] for production

# ===============================================================================
# STORAGE BACKEND
# ===============================================================================
[storage]
backend = "local"                    # "local" (directory on disk), "memory" or "s3"
local_path = "storage"               # Directory used by the local backend

# S3 Configuration (only used if backend = "s3")
[storage.s3]
enabled = false                      # Enable S3 storage backend
endpoint_url = ""                    # S3 endpoint (e.g., https://s3.amazonaws.com)
region = "auto"                      # S3 region (e.g., us-east-1 or "auto")
access_key_id = ""                   # Access Key ID
secret_access_key = ""               # Secret Access Key
bucket_name = "blobfinder"           # Bucket name
bucket_prefix = ""                   # Prefix for all keys (optional)

# ===============================================================================
# THUMBNAILS
# ===============================================================================
[thumbnails]
cache_dir = "thumbnails"             # Local directory for generated thumbnails
size = 90                            # Thumbnail edge in pixels
memory_cache_mb = 64                 # In-memory thumbnail cache bound (0 = unbounded)

# ===============================================================================
# ROOTS
# ===============================================================================
[[roots]]
base_key = "Files"                   # Key prefix exposed as the root folder
url = ""                             # Public URL prefix for direct file links (optional)
alias = "Files"                      # Display name of the root folder
read_only = false                    # Reject every modification
locked = false                       # Files cannot be deleted, renamed or moved
upload_overwrite = false             # Replace files with the same name on upload
#max_upload_size_kb = 2048           # Per-file upload limit
#start_key = "Files/Documents"       # Folder opened first
#upload_allow = ["image", "application/pdf"]
"#;
