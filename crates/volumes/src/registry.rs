use super::errors::VolumeError;
use super::models::{FullPath, RootRegistry, RootVolume, TOKEN_DELIMITER, VOLUME_PREFIX};
use blobfinder_models::Node;
use blobfinder_storage::DirectoryTree;
use blobfinder_utils::{decode_path, resolve_relative};
use std::sync::Arc;

type Result<T> = std::result::Result<T, VolumeError>;

impl RootRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a volume and assigns its id from the registration order
    pub fn add_root(&mut self, mut root: RootVolume) -> Arc<RootVolume> {
        root.id = format!("{}{}{}", VOLUME_PREFIX, self.roots.len() + 1, TOKEN_DELIMITER);
        let root = Arc::new(root);
        self.roots.push(Arc::clone(&root));
        root
    }

    pub fn roots(&self) -> &[Arc<RootVolume>] {
        &self.roots
    }

    /// First root with a start key, otherwise the first root
    pub fn default_root(&self) -> Result<Arc<RootVolume>> {
        self.roots
            .iter()
            .find(|root| root.start_key.is_some())
            .or_else(|| self.roots.first())
            .cloned()
            .ok_or(VolumeError::NoRoots)
    }

    pub fn find(&self, id: &str) -> Option<Arc<RootVolume>> {
        self.roots.iter().find(|root| root.id == id).cloned()
    }

    /// Root owning `key`, the most specific base key wins
    pub fn find_by_key(&self, key: &str) -> Option<Arc<RootVolume>> {
        self.roots
            .iter()
            .filter(|root| root.contains(key))
            .max_by_key(|root| root.base_key.len())
            .cloned()
    }

    /// Splits a token into its root and the storage key it designates
    pub fn resolve_key(&self, token: &str) -> Result<(Arc<RootVolume>, String)> {
        let delimiter = token
            .find(TOKEN_DELIMITER)
            .ok_or_else(|| VolumeError::InvalidToken(token.to_string()))?;
        let (id, encoded) = token.split_at(delimiter + 1);

        let root = self
            .find(id)
            .ok_or_else(|| VolumeError::InvalidToken(token.to_string()))?;
        let relative =
            decode_path(encoded).map_err(|_| VolumeError::InvalidToken(token.to_string()))?;
        let key = resolve_relative(&root.base_key, &relative).map_err(|e| {
            tracing::warn!("Rejected token {} for root {}: {}", token, root.id, e);
            VolumeError::InvalidToken(token.to_string())
        })?;

        Ok((root, key))
    }

    /// Resolves a token and probes storage for what it names.
    /// A key that is neither a directory nor a file resolves to a prospective file.
    pub async fn parse_path(&self, tree: &DirectoryTree, token: &str) -> Result<FullPath> {
        let (root, key) = self.resolve_key(token)?;

        let node = if tree.directory_exists(&key).await? {
            tree.directory_node(&key).await?
        } else if tree.file_exists(&key).await? {
            tree.file_node(&key).await?
        } else {
            Node::file(&key)
        };

        Ok(FullPath {
            root,
            node,
            token: token.to_string(),
        })
    }

    /// Resolves a token that must name a directory
    pub async fn parse_directory(&self, tree: &DirectoryTree, token: &str) -> Result<FullPath> {
        let (root, key) = self.resolve_key(token)?;
        let node = tree.directory_node(&key).await?;

        Ok(FullPath {
            root,
            node,
            token: token.to_string(),
        })
    }

    /// Path of the default root's start directory
    pub async fn default_path(&self, tree: &DirectoryTree) -> Result<FullPath> {
        let root = self.default_root()?;
        let key = root.start_key().to_string();
        let token = root
            .encode_key(&key)
            .ok_or_else(|| VolumeError::InvalidToken(key.clone()))?;
        let node = tree.directory_node(&key).await?;

        Ok(FullPath { root, node, token })
    }
}

impl FullPath {
    pub fn new(root: Arc<RootVolume>, node: Node) -> Option<Self> {
        let token = root.encode_key(&node.key)?;
        Some(Self { root, node, token })
    }

    pub fn is_directory(&self) -> bool {
        self.node.is_directory()
    }

    pub fn is_root(&self) -> bool {
        self.root.is_root_key(&self.node.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobfinder_storage::{MemoryBackend, StorageBackend};
    use bytes::Bytes;

    async fn setup() -> (RootRegistry, DirectoryTree) {
        let backend = Arc::new(MemoryBackend::new());
        backend.write("Files/", Bytes::new()).await.unwrap();
        backend.write("Files/docs/", Bytes::new()).await.unwrap();
        backend.write("Files/docs/a_b.txt", Bytes::from_static(b"hi")).await.unwrap();

        let mut registry = RootRegistry::new();
        registry.add_root(RootVolume::new("Files"));
        (registry, DirectoryTree::new(backend))
    }

    #[tokio::test]
    async fn test_token_round_trip() {
        let (registry, tree) = setup().await;
        let root = registry.default_root().unwrap();

        for key in ["Files", "Files/docs", "Files/docs/a_b.txt"] {
            let token = root.encode_key(key).unwrap();
            let path = registry.parse_path(&tree, &token).await.unwrap();
            assert_eq!(path.node.key, key);
            assert_eq!(root.encode_key(&path.node.key).unwrap(), token);
        }
    }

    #[tokio::test]
    async fn test_probe_kinds() {
        let (registry, tree) = setup().await;
        let root = registry.default_root().unwrap();

        let dir = registry
            .parse_path(&tree, &root.encode_key("Files/docs").unwrap())
            .await
            .unwrap();
        assert!(dir.is_directory());

        let file = registry
            .parse_path(&tree, &root.encode_key("Files/docs/a_b.txt").unwrap())
            .await
            .unwrap();
        assert!(file.node.is_file());
        assert_eq!(file.node.size, Some(2));

        let prospective = registry
            .parse_path(&tree, &root.encode_key("Files/new.txt").unwrap())
            .await
            .unwrap();
        assert!(prospective.node.is_file());
        assert_eq!(prospective.node.size, None);
    }

    #[tokio::test]
    async fn test_unknown_root_is_invalid_token() {
        let (registry, tree) = setup().await;
        let result = registry.parse_path(&tree, "a9_Lw").await;
        assert!(matches!(result, Err(VolumeError::InvalidToken(_))));

        let result = registry.parse_path(&tree, "nodelimiter").await;
        assert!(matches!(result, Err(VolumeError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_traversal_is_invalid_token() {
        let (registry, tree) = setup().await;
        let token = format!("a1_{}", blobfinder_utils::encode_path("/../secret"));
        let result = registry.parse_path(&tree, &token).await;
        assert!(matches!(result, Err(VolumeError::InvalidToken(_))));
    }

    #[test]
    fn test_default_root_prefers_start_key() {
        let mut registry = RootRegistry::new();
        registry.add_root(RootVolume::new("First"));
        let mut second = RootVolume::new("Second");
        second.start_key = Some("Second/inbox".to_string());
        registry.add_root(second);

        let root = registry.default_root().unwrap();
        assert_eq!(root.id, "a2_");
        assert_eq!(root.start_key(), "Second/inbox");
    }

    #[test]
    fn test_ids_follow_registration_order() {
        let mut registry = RootRegistry::new();
        let a = registry.add_root(RootVolume::new("A"));
        let b = registry.add_root(RootVolume::new("B"));
        assert_eq!(a.id, "a1_");
        assert_eq!(b.id, "a2_");
        assert!(registry.find("a2_").is_some());
        assert!(RootRegistry::new().default_root().is_err());
    }
}
