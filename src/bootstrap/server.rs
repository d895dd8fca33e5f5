use blobfinder_config::Config;
use blobfinder_events::{AppEvent, EventBus};
use blobfinder_filesystem::FileSystem;
use blobfinder_storage::DirectoryTree;
use blobfinder_volumes::{RootRegistry, RootVolume};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Registers every configured root and creates the marker of roots that do not exist yet
pub async fn initialize_roots(
    config: &Config,
    tree: &DirectoryTree,
    events: &Arc<EventBus>,
) -> Result<RootRegistry> {
    let thumbnail_url = format!("{}/thumb/", config.server.base_url.trim_end_matches('/'));
    let mut registry = RootRegistry::new();

    for root_config in &config.roots {
        let volume = RootVolume::from_config(root_config, &thumbnail_url, config.thumbnails.size);

        if !tree.directory_exists(&volume.base_key).await? {
            tree.create_directory(&volume.base_key).await?;
            events.emit(AppEvent::RootCreated {
                base_key: volume.base_key.clone(),
            });
        }

        let root = registry.add_root(volume);
        events.emit(AppEvent::RootMounted {
            id: root.id.clone(),
            alias: root.alias.clone(),
            base_key: root.base_key.clone(),
        });
    }

    Ok(registry)
}

pub async fn initialize_thumbnail_cache(config: &Config, events: &Arc<EventBus>) -> Result<PathBuf> {
    let path = FileSystem::ensure_directory(&config.thumbnails.cache_dir, "thumbnail cache").await?;

    events.emit(AppEvent::ThumbnailCacheReady {
        path: path.display().to_string(),
    });

    Ok(path)
}
