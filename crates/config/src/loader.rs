use super::defaults::DEFAULT_CONFIG_TEMPLATE;
use super::errors::ConfigError;
use super::migration::migrate_config_if_needed;
use super::models::Config;
use std::path::Path;
use std::sync::Arc;

impl Config {
    /// Loads configuration from a file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_file_with_events(path, None).await
    }

    /// Loads configuration from a file with optional event bus for notifications
    pub async fn from_file_with_events<P: AsRef<Path>>(
        path: P,
        events: Option<&Arc<blobfinder_events::EventBus>>,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        // Create default config if it doesn't exist
        if !path.exists() {
            create_default_config(path).await?;
        }

        migrate_config_if_needed(path, events).await?;

        let content = tokio::fs::read_to_string(path).await?;
        let config = Self::from_toml(&content)?;

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (idx, root) in self.roots.iter().enumerate() {
            if root.base_key.trim_matches('/').is_empty() {
                return Err(ConfigError::InvalidConfig(format!(
                    "roots[{}].base_key must not be empty",
                    idx
                )));
            }

            if let Some(start) = &root.start_key {
                let base = root.base_key.trim_matches('/');
                let start = start.trim_matches('/');
                if start != base && !start.starts_with(&format!("{}/", base)) {
                    return Err(ConfigError::InvalidConfig(format!(
                        "roots[{}].start_key '{}' is outside base_key '{}'",
                        idx, start, base
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Creates a default configuration file
async fn create_default_config<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
    tokio::fs::write(path, DEFAULT_CONFIG_TEMPLATE).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageBackend;

    #[test]
    fn test_default_template_parses() {
        let config = Config::from_toml(DEFAULT_CONFIG_TEMPLATE).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert_eq!(config.thumbnails.size, 90);
        assert_eq!(config.roots.len(), 1);
        assert_eq!(config.roots[0].base_key, "Files");
        assert!(!config.roots[0].read_only);
    }

    #[test]
    fn test_start_key_outside_root_rejected() {
        let content = r#"
[server]
host = "127.0.0.1"
port = 1
base_url = "http://localhost:1"

[[roots]]
base_key = "Files"
start_key = "Other/Docs"
"#;
        assert!(matches!(
            Config::from_toml(content),
            Err(ConfigError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_created() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");

        let config = Config::from_file(&path).await.unwrap();

        assert!(path.exists());
        assert_eq!(config.roots[0].alias, "Files");
    }
}
