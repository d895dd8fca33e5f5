mod bootstrap;

use blobfinder_api::AppState;
use blobfinder_cache::ThumbnailManager;
use blobfinder_config::{Config, StorageBackend as StorageBackendType};
use blobfinder_driver::Dispatcher;
use blobfinder_events::{AppEvent, EventBus};
use blobfinder_imaging::DefaultPictureEditor;
#[cfg(feature = "s3")]
use blobfinder_storage::S3Backend;
use blobfinder_storage::{DirectoryTree, LocalBackend, MemoryBackend, StorageBackend};
use crate::bootstrap::{config, logging, router, server};
use anyhow::Result;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    logging::initialize();

    let events = EventBus::new(false);
    events.emit(AppEvent::Starting);

    let config_path = std::env::var("BLOBFINDER_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = config::load(&config_path, &events).await?;

    let storage = initialize_storage(&config).await?;
    events.emit(AppEvent::StorageReady {
        backend: storage.name().to_string(),
    });

    let tree = DirectoryTree::new(storage);
    let registry = server::initialize_roots(&config, &tree, &events).await?;
    let cache_dir = server::initialize_thumbnail_cache(&config, &events).await?;

    let editor = Arc::new(DefaultPictureEditor::new());
    let thumbnails = Arc::new(ThumbnailManager::new(
        tree.clone(),
        editor.clone(),
        cache_dir,
        config.thumbnails.size,
        config.thumbnails.memory_cache_mb,
    ));

    let dispatcher = Arc::new(Dispatcher::new(Arc::new(registry), tree, thumbnails, editor));
    let app = router::build(&config, AppState::new(dispatcher));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = bind_server(&addr).await?;

    events.emit(AppEvent::Ready {
        addr: addr.to_string(),
        base_url: config.server.base_url.to_string(),
    });

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received, initiating graceful shutdown...");
    };

    axum::serve(listener, app.into_make_service())
        .tcp_nodelay(config.server.tcp_nodelay)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    events.emit(AppEvent::Shutdown);
    Ok(())
}

async fn initialize_storage(config: &Config) -> Result<Arc<dyn StorageBackend>> {
    match config.storage.backend {
        StorageBackendType::Local => {
            let base_path =
                blobfinder_filesystem::FileSystem::ensure_directory(&config.storage.local_path, "object store")
                    .await?;
            tracing::info!("Initialized local storage backend at {}", base_path.display());
            Ok(Arc::new(LocalBackend::new(base_path)) as Arc<dyn StorageBackend>)
        }
        StorageBackendType::Memory => {
            tracing::warn!("Using in-memory storage: contents are lost on shutdown");
            Ok(Arc::new(MemoryBackend::new()) as Arc<dyn StorageBackend>)
        }
        #[cfg(feature = "s3")]
        StorageBackendType::S3 => {
            if !config.storage.s3.enabled {
                anyhow::bail!("S3 backend selected but not enabled in configuration");
            }

            let backend = S3Backend::new(
                config.storage.s3.endpoint_url.to_string(),
                config.storage.s3.region.to_string(),
                config.storage.s3.access_key_id.clone(),
                config.storage.s3.secret_access_key.clone(),
                config.storage.s3.bucket_name.to_string(),
                config.storage.s3.bucket_prefix.to_string(),
            )
            .await?;

            tracing::info!(
                "Initialized S3 storage backend: bucket={}, endpoint={}",
                config.storage.s3.bucket_name,
                config.storage.s3.endpoint_url
            );

            Ok(Arc::new(backend) as Arc<dyn StorageBackend>)
        }
        #[cfg(not(feature = "s3"))]
        StorageBackendType::S3 => {
            anyhow::bail!(
                "S3 backend selected but not compiled. Rebuild with --features s3 to enable S3 support."
            )
        }
    }
}

async fn bind_server(addr: &str) -> Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::AddrInUse {
            let port = addr.split(':').last().unwrap_or("unknown");
            tracing::error!("Port {} is already in use", port);
            tracing::error!("Stop the other application or change the port in config.toml");
            #[cfg(target_os = "windows")]
            tracing::error!("Find process: netstat -ano | findstr :{}", port);
            #[cfg(not(target_os = "windows"))]
            tracing::error!("Find process: lsof -i :{}", port);
        } else {
            tracing::error!("Failed to bind server on {}: {}", addr, e);
        }
        anyhow::anyhow!("Failed to bind server: {}", e)
    })
}
