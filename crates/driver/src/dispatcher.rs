use super::errors::DriverError;
use super::models::Dispatcher;
use blobfinder_cache::ThumbnailManager;
use blobfinder_imaging::PictureEditor;
use blobfinder_models::{FileEntry, Node};
use blobfinder_storage::DirectoryTree;
use blobfinder_volumes::{FullPath, RootRegistry, RootVolume};
use std::sync::Arc;

type Result<T> = std::result::Result<T, DriverError>;

impl Dispatcher {
    pub fn new(
        registry: Arc<RootRegistry>,
        tree: DirectoryTree,
        thumbnails: Arc<ThumbnailManager>,
        editor: Arc<dyn PictureEditor>,
    ) -> Self {
        Self {
            registry,
            tree,
            thumbnails,
            editor,
        }
    }

    pub fn registry(&self) -> &RootRegistry {
        &self.registry
    }

    pub fn directories(&self) -> &DirectoryTree {
        &self.tree
    }

    pub fn thumbnails(&self) -> &Arc<ThumbnailManager> {
        &self.thumbnails
    }

    /// Resolves a client token against the registered roots
    pub async fn parse_path(&self, token: &str) -> Result<FullPath> {
        Ok(self.registry.parse_path(&self.tree, token).await?)
    }

    /// Client view of a node. Files without metadata are looked up first.
    pub(super) async fn entry(&self, root: &RootVolume, node: &Node) -> Result<FileEntry> {
        let hash = root
            .encode_key(&node.key)
            .ok_or_else(|| DriverError::Forbidden(node.key.clone()))?;
        let is_root = root.is_root_key(&node.key);

        let node = if node.is_file() && node.size.is_none() {
            self.tree.file_node(&node.key).await?
        } else {
            node.clone()
        };

        let name = if is_root && !root.alias.is_empty() {
            root.alias.clone()
        } else {
            node.name().to_string()
        };

        let phash = if is_root {
            None
        } else {
            node.parent_key().and_then(|parent| root.encode_key(parent))
        };

        let dirs = if node.is_directory() {
            Some(self.tree.has_subdirectories(&node.key).await? as u8)
        } else {
            None
        };

        Ok(FileEntry {
            name,
            hash,
            phash,
            mime: node.mime_type(),
            ts: node.modified.map(|m| m.timestamp()).unwrap_or_default(),
            size: node.size.unwrap_or_default(),
            read: 1,
            write: (!root.read_only) as u8,
            locked: root.locked as u8,
            dirs,
            volumeid: is_root.then(|| root.id.clone()),
            isroot: is_root.then_some(1),
            tmb: ThumbnailManager::thumbnail_hash(&node),
            url: if node.is_file() { root.public_url(&node.key) } else { None },
        })
    }

    pub(super) async fn entry_for_key(&self, root: &RootVolume, key: &str) -> Result<FileEntry> {
        let node = self.tree.file_node(key).await?;
        self.entry(root, &node).await
    }

    pub(super) async fn directory_entry(&self, root: &RootVolume, key: &str) -> Result<FileEntry> {
        let node = self.tree.directory_node(key).await?;
        self.entry(root, &node).await
    }
}

/// Mutations are refused on read-only roots
pub(super) fn ensure_writable(path: &FullPath) -> Result<()> {
    if path.root.read_only {
        return Err(DriverError::Forbidden(format!("{} is read-only", path.root.alias)));
    }
    Ok(())
}

/// Removal, rename and move are refused on locked roots and on the root itself
pub(super) fn ensure_unlocked(path: &FullPath) -> Result<()> {
    ensure_writable(path)?;
    if path.root.locked {
        return Err(DriverError::Forbidden(format!("{} is locked", path.root.alias)));
    }
    if path.is_root() {
        return Err(DriverError::Forbidden(path.node.key.clone()));
    }
    Ok(())
}

pub(super) fn ensure_directory(path: &FullPath) -> Result<()> {
    if !path.is_directory() {
        return Err(DriverError::NotFound(path.node.key.clone()));
    }
    Ok(())
}

pub(super) fn ensure_file(path: &FullPath) -> Result<()> {
    if path.is_directory() {
        return Err(DriverError::Forbidden(path.node.key.clone()));
    }
    if path.node.size.is_none() {
        return Err(DriverError::NotFound(path.node.key.clone()));
    }
    Ok(())
}

/// A single path segment chosen by the client
pub(super) fn validate_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);

    if invalid {
        return Err(DriverError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// True when the file passes the mime filter: empty filter, or its mime type or category listed
pub(super) fn mime_allowed(node: &Node, mimes: &[String]) -> bool {
    if mimes.is_empty() {
        return true;
    }
    let mime = node.mime_type();
    let category = node.mime_category();
    mimes.iter().any(|allowed| *allowed == mime || *allowed == category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("report.pdf").is_ok());
        assert!(validate_name("a copy 1").is_ok());
        for bad in ["", ".", "..", "a/b", "a\\b", "nul\0"] {
            assert!(matches!(validate_name(bad), Err(DriverError::InvalidName(_))), "{bad:?}");
        }
    }

    #[test]
    fn test_mime_allowed() {
        let png = Node::file("Files/a.png");
        assert!(mime_allowed(&png, &[]));
        assert!(mime_allowed(&png, &["image".to_string()]));
        assert!(mime_allowed(&png, &["image/png".to_string()]));
        assert!(!mime_allowed(&png, &["text/plain".to_string(), "video".to_string()]));
    }
}
