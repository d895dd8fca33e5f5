use super::models::RootVolume;
use blobfinder_config::RootConfig;
use blobfinder_utils::{encode_path, is_within, normalize_key, relative_to};

impl RootVolume {
    pub fn new(base_key: &str) -> Self {
        Self {
            id: String::new(),
            base_key: normalize_key(base_key),
            url: String::new(),
            thumbnail_url: String::new(),
            thumbnail_size: 90,
            alias: String::new(),
            read_only: false,
            locked: false,
            max_upload_size_kb: None,
            start_key: None,
            upload_overwrite: false,
            upload_allow: Vec::new(),
        }
    }

    /// Builds a volume from its config entry; thumbnails are served from `thumbnail_url`
    pub fn from_config(config: &RootConfig, thumbnail_url: &str, thumbnail_size: u32) -> Self {
        Self {
            url: config.url.clone(),
            thumbnail_url: thumbnail_url.to_string(),
            thumbnail_size,
            alias: config.alias.clone(),
            read_only: config.read_only,
            locked: config.locked,
            max_upload_size_kb: config.max_upload_size_kb,
            start_key: config.start_key.as_deref().map(normalize_key),
            upload_overwrite: config.upload_overwrite,
            upload_allow: config.upload_allow.clone(),
            ..Self::new(&config.base_key)
        }
    }

    pub fn max_upload_size(&self) -> Option<u64> {
        self.max_upload_size_kb.map(|kb| kb * 1024)
    }

    pub fn contains(&self, key: &str) -> bool {
        is_within(&self.base_key, key)
    }

    pub fn is_root_key(&self, key: &str) -> bool {
        normalize_key(key) == self.base_key
    }

    /// Key the client lands on when no target is given
    pub fn start_key(&self) -> &str {
        self.start_key.as_deref().unwrap_or(&self.base_key)
    }

    /// Client token for a key inside this volume, `None` when the key escapes it
    pub fn encode_key(&self, key: &str) -> Option<String> {
        let relative = relative_to(&self.base_key, &normalize_key(key))?;
        Some(format!("{}{}", self.id, encode_path(&relative)))
    }

    /// Key relative to the volume with a leading separator
    pub fn relative_key(&self, key: &str) -> Option<String> {
        relative_to(&self.base_key, &normalize_key(key))
    }

    /// Direct link to a file when the volume publishes a URL prefix
    pub fn public_url(&self, key: &str) -> Option<String> {
        if self.url.is_empty() {
            return None;
        }
        let relative = self.relative_key(key)?;
        Some(format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            relative.trim_start_matches('/')
        ))
    }
}
