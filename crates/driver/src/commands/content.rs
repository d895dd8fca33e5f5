use crate::dispatcher::ensure_file;
use crate::errors::DriverError;
use crate::models::Dispatcher;
use blobfinder_models::{CommandResponse, FileContent, SizeResponse};
use blobfinder_volumes::FullPath;

type Result<T> = std::result::Result<T, DriverError>;

const DOWNLOAD_MIME: &str = "application/octet-stream";

impl Dispatcher {
    /// Totals over the targets. Each directory target counts itself once.
    pub async fn size(&self, paths: &[FullPath]) -> Result<SizeResponse> {
        let mut response = SizeResponse::default();

        for path in paths {
            if path.is_directory() {
                let stats = self.tree.size_and_count(&path.node.key).await?;
                response.directory_count += 1 + stats.directory_count;
                response.file_count += stats.file_count;
                response.size += stats.size;
            } else {
                let node = self.tree.file_node(&path.node.key).await?;
                response.file_count += 1;
                response.size += node.size.unwrap_or_default();
            }
        }

        Ok(response)
    }

    /// Raw bytes of a file; `download` forces a generic content type
    pub async fn file(&self, path: &FullPath, download: bool) -> Result<FileContent> {
        ensure_file(path)?;
        if !self.tree.file_exists(&path.node.key).await? {
            return Err(DriverError::NotFound(path.node.key.clone()));
        }

        let data = self.tree.backend().read_all(&path.node.key).await?;
        let mime_type = if download {
            DOWNLOAD_MIME.to_string()
        } else {
            path.node.mime_type()
        };

        Ok(FileContent {
            name: path.node.name().to_string(),
            mime_type,
            data: data.to_vec(),
        })
    }

    /// Not available over a flat object store
    pub async fn search(&self, _query: &str, _mimes: &[String]) -> Result<CommandResponse> {
        Err(DriverError::NotImplemented("search"))
    }

    pub async fn zip_download(&self, _paths: &[FullPath]) -> Result<CommandResponse> {
        Err(DriverError::NotImplemented("zipdl"))
    }
}
