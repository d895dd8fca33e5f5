use crate::backend::{ObjectEntry, StorageBackend};
use crate::StorageError;
use blobfinder_models::Node;
use blobfinder_utils::{join_key, key_name, marker_key, normalize_key};
use bytes::Bytes;
use std::sync::Arc;

type Result<T> = std::result::Result<T, StorageError>;

/// One level of a directory, split by kind
#[derive(Debug, Clone, Default)]
pub struct Children {
    pub files: Vec<Node>,
    pub directories: Vec<Node>,
}

/// Recursive totals below a directory, the directory itself not included
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub file_count: u64,
    pub directory_count: u64,
    pub size: u64,
}

/// Hierarchical view over a flat [`StorageBackend`].
///
/// A directory exists when its marker object exists or when any key lives
/// beneath it. Recursive operations walk the tree depth-first with an
/// explicit stack and issue one storage call at a time; none of them is
/// atomic, a failure halfway leaves the keys processed so far in place.
#[derive(Clone)]
pub struct DirectoryTree {
    backend: Arc<dyn StorageBackend>,
}

impl DirectoryTree {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    pub async fn file_exists(&self, key: &str) -> Result<bool> {
        let key = normalize_key(key);
        if key.is_empty() {
            return Ok(false);
        }
        self.backend.exists(&key).await
    }

    pub async fn directory_exists(&self, dir_key: &str) -> Result<bool> {
        let marker = marker_key(dir_key);
        if marker.is_empty() {
            return Ok(true);
        }

        if self.backend.exists(&marker).await? {
            return Ok(true);
        }

        let entries = self.backend.list(&marker).await?;
        Ok(entries.iter().any(|entry| entry.key != marker))
    }

    pub async fn create_directory(&self, dir_key: &str) -> Result<Node> {
        let marker = marker_key(dir_key);
        if marker.is_empty() {
            return Err(StorageError::InvalidKey(dir_key.to_string()));
        }

        self.backend.write(&marker, Bytes::new()).await?;
        Ok(Node::directory(dir_key))
    }

    /// Zero-byte file, replaces an existing object
    pub async fn create_file(&self, key: &str) -> Result<Node> {
        let key = normalize_key(key);
        self.backend.write(&key, Bytes::new()).await?;
        self.file_node(&key).await
    }

    /// File node with size and modification time, `NotFound` when missing
    pub async fn file_node(&self, key: &str) -> Result<Node> {
        let key = normalize_key(key);
        match self.backend.metadata(&key).await? {
            Some(entry) => Ok(Node::file(&key).with_metadata(Some(entry.size), entry.last_modified)),
            None => Err(StorageError::NotFound(key)),
        }
    }

    /// Directory node, with the marker's modification time when there is one
    pub async fn directory_node(&self, dir_key: &str) -> Result<Node> {
        let marker = marker_key(dir_key);
        let modified = if marker.is_empty() {
            None
        } else {
            self.backend
                .metadata(&marker)
                .await?
                .and_then(|entry| entry.last_modified)
        };

        Ok(Node::directory(dir_key).with_metadata(None, modified))
    }

    /// Direct children of `dir_key`, the directory's own marker excluded
    pub async fn children(&self, dir_key: &str) -> Result<Children> {
        let marker = marker_key(dir_key);
        let entries = self.backend.list(&marker).await?;

        let mut children = Children::default();
        for entry in entries {
            if entry.key == marker {
                continue;
            }
            children.push(entry);
        }

        Ok(children)
    }

    pub async fn has_subdirectories(&self, dir_key: &str) -> Result<bool> {
        Ok(!self.children(dir_key).await?.directories.is_empty())
    }

    /// Copies `src_dir` to `dst_dir`; an empty source still yields a destination directory
    pub async fn copy_directory(&self, src_dir: &str, dst_dir: &str) -> Result<()> {
        let mut stack = vec![(normalize_key(src_dir), normalize_key(dst_dir))];

        while let Some((src, dst)) = stack.pop() {
            self.create_directory(&dst).await?;

            let children = self.children(&src).await?;
            for file in &children.files {
                let target = join_key(&dst, file.name());
                self.backend.copy(&file.key, &target).await?;
            }
            for dir in children.directories.iter().rev() {
                stack.push((dir.key.clone(), join_key(&dst, dir.name())));
            }
        }

        tracing::debug!("Copied directory {} -> {}", src_dir, dst_dir);
        Ok(())
    }

    /// Recursive copy followed by recursive delete of the source
    pub async fn move_directory(&self, src_dir: &str, dst_dir: &str) -> Result<()> {
        self.copy_directory(src_dir, dst_dir).await?;
        self.delete_directory(src_dir).await
    }

    /// Deletes every key below `dir_key`, then the markers deepest first
    pub async fn delete_directory(&self, dir_key: &str) -> Result<()> {
        let root = normalize_key(dir_key);
        if root.is_empty() {
            return Err(StorageError::InvalidKey(dir_key.to_string()));
        }

        let mut stack = vec![root.clone()];
        let mut visited = Vec::new();

        while let Some(dir) = stack.pop() {
            let children = self.children(&dir).await?;
            for file in &children.files {
                self.backend.delete_if_exists(&file.key).await?;
            }
            for sub in children.directories {
                stack.push(sub.key);
            }
            visited.push(dir);
        }

        for dir in visited.iter().rev() {
            self.backend.delete_if_exists(&marker_key(dir)).await?;
        }

        tracing::debug!("Deleted directory {} ({} level(s))", root, visited.len());
        Ok(())
    }

    /// Counts and sizes everything below `dir_key`
    pub async fn size_and_count(&self, dir_key: &str) -> Result<TreeStats> {
        let mut stats = TreeStats::default();
        let mut stack = vec![normalize_key(dir_key)];

        while let Some(dir) = stack.pop() {
            let children = self.children(&dir).await?;
            for file in &children.files {
                stats.file_count += 1;
                stats.size += file.size.unwrap_or_default();
            }
            for sub in children.directories {
                stats.directory_count += 1;
                stack.push(sub.key);
            }
        }

        Ok(stats)
    }

    pub async fn copy_file(&self, src_key: &str, dst_key: &str) -> Result<()> {
        self.backend.copy(&normalize_key(src_key), &normalize_key(dst_key)).await
    }

    pub async fn move_file(&self, src_key: &str, dst_key: &str) -> Result<()> {
        self.backend.rename(&normalize_key(src_key), &normalize_key(dst_key)).await
    }

    pub async fn delete_file(&self, key: &str) -> Result<()> {
        self.backend.delete(&normalize_key(key)).await
    }

    pub async fn delete_file_if_exists(&self, key: &str) -> Result<bool> {
        self.backend.delete_if_exists(&normalize_key(key)).await
    }
}

impl Children {
    fn push(&mut self, entry: ObjectEntry) {
        if entry.is_directory {
            let node = Node::directory(&entry.key).with_metadata(None, entry.last_modified);
            self.directories.push(node);
        } else if !key_name(&entry.key).is_empty() {
            let node = Node::file(&entry.key).with_metadata(Some(entry.size), entry.last_modified);
            self.files.push(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryBackend;

    async fn tree_with(keys: &[(&str, &[u8])]) -> (DirectoryTree, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        for (key, data) in keys {
            backend.write(key, Bytes::copy_from_slice(data)).await.unwrap();
        }
        (DirectoryTree::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn test_directory_exists_by_marker_or_descendant() {
        let (tree, _) = tree_with(&[("Files/marked/", b""), ("Files/implied/deep/a.txt", b"x")]).await;

        assert!(tree.directory_exists("Files/marked").await.unwrap());
        assert!(tree.directory_exists("Files/implied").await.unwrap());
        assert!(tree.directory_exists("Files/implied/deep").await.unwrap());
        assert!(!tree.directory_exists("Files/missing").await.unwrap());
        // a file is not a directory
        assert!(!tree.directory_exists("Files/implied/deep/a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_then_delete_directory() {
        let (tree, backend) = tree_with(&[]).await;

        tree.create_directory("Files/new").await.unwrap();
        assert!(tree.directory_exists("Files/new").await.unwrap());

        tree.delete_directory("Files/new").await.unwrap();
        assert!(!tree.directory_exists("Files/new").await.unwrap());
        assert!(backend.keys().is_empty());
    }

    #[tokio::test]
    async fn test_children_partition() {
        let (tree, _) = tree_with(&[
            ("Files/", b""),
            ("Files/a.txt", b"12"),
            ("Files/sub/", b""),
            ("Files/other/x.txt", b"1"),
        ])
        .await;

        let children = tree.children("Files").await.unwrap();
        let files: Vec<&str> = children.files.iter().map(|n| n.key.as_str()).collect();
        let dirs: Vec<&str> = children.directories.iter().map(|n| n.key.as_str()).collect();

        assert_eq!(files, vec!["Files/a.txt"]);
        assert_eq!(dirs, vec!["Files/other", "Files/sub"]);
        assert_eq!(children.files[0].size, Some(2));
    }

    #[tokio::test]
    async fn test_delete_directory_removes_every_descendant() {
        let (tree, backend) = tree_with(&[
            ("Files/d/", b""),
            ("Files/d/a.txt", b"a"),
            ("Files/d/e/", b""),
            ("Files/d/e/b.txt", b"b"),
            ("Files/d/f/g/c.txt", b"c"),
            ("Files/keep.txt", b"k"),
        ])
        .await;

        tree.delete_directory("Files/d").await.unwrap();

        assert!(backend.list("Files/d/").await.unwrap().is_empty());
        assert_eq!(backend.keys(), vec!["Files/keep.txt"]);
    }

    #[tokio::test]
    async fn test_copy_directory_preserves_structure() {
        let (tree, backend) = tree_with(&[
            ("Files/src/", b""),
            ("Files/src/a.txt", b"alpha"),
            ("Files/src/empty/", b""),
            ("Files/src/deep/b.bin", b"\x00\x01\x02"),
        ])
        .await;

        tree.copy_directory("Files/src", "Files/dst").await.unwrap();

        assert_eq!(backend.read_all("Files/dst/a.txt").await.unwrap(), Bytes::from_static(b"alpha"));
        assert_eq!(
            backend.read_all("Files/dst/deep/b.bin").await.unwrap(),
            Bytes::from_static(b"\x00\x01\x02")
        );
        assert!(tree.directory_exists("Files/dst/empty").await.unwrap());
        // source untouched
        assert!(backend.exists("Files/src/a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_copy_empty_directory_creates_destination() {
        let (tree, _) = tree_with(&[("Files/empty/", b"")]).await;

        tree.copy_directory("Files/empty", "Files/copy").await.unwrap();

        assert!(tree.directory_exists("Files/copy").await.unwrap());
    }

    #[tokio::test]
    async fn test_move_directory() {
        let (tree, backend) = tree_with(&[("Files/a/", b""), ("Files/a/x.txt", b"x")]).await;

        tree.move_directory("Files/a", "Files/b").await.unwrap();

        assert!(!tree.directory_exists("Files/a").await.unwrap());
        assert_eq!(backend.read_all("Files/b/x.txt").await.unwrap(), Bytes::from_static(b"x"));
    }

    #[tokio::test]
    async fn test_size_and_count_excludes_self() {
        let (tree, _) = tree_with(&[
            ("Files/d/", b""),
            ("Files/d/a", &[0u8; 10]),
            ("Files/d/b", &[0u8; 20]),
            ("Files/d/empty/", b""),
        ])
        .await;

        let stats = tree.size_and_count("Files/d").await.unwrap();

        assert_eq!(
            stats,
            TreeStats {
                file_count: 2,
                directory_count: 1,
                size: 30
            }
        );
    }
}
