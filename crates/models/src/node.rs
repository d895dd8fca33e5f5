use blobfinder_utils::{is_within, key_name, marker_key, normalize_key, parent_key, split_extension};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DIRECTORY_MIME: &str = "directory";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

/// A file or directory addressed by its storage key.
///
/// Keys are normalized (`/` separated, no leading or trailing separator) for both
/// kinds; the trailing `/` only appears on the marker object of a directory, see
/// [`Node::marker_key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub key: String,
    pub kind: NodeKind,
    /// Byte length, files only, filled once the backing store reported it
    pub size: Option<u64>,
    pub modified: Option<DateTime<Utc>>,
}

impl Node {
    pub fn file(key: &str) -> Self {
        Self {
            key: normalize_key(key),
            kind: NodeKind::File,
            size: None,
            modified: None,
        }
    }

    pub fn directory(key: &str) -> Self {
        Self {
            key: normalize_key(key),
            kind: NodeKind::Directory,
            size: None,
            modified: None,
        }
    }

    pub fn with_metadata(mut self, size: Option<u64>, modified: Option<DateTime<Utc>>) -> Self {
        self.size = size;
        self.modified = modified;
        self
    }

    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    pub fn name(&self) -> &str {
        key_name(&self.key)
    }

    pub fn parent_key(&self) -> Option<&str> {
        parent_key(&self.key)
    }

    pub fn parent(&self) -> Option<Node> {
        self.parent_key().map(Node::directory)
    }

    /// File name without its last extension
    pub fn stem(&self) -> &str {
        split_extension(self.name()).0
    }

    /// Last extension including the dot, empty when there is none
    pub fn extension(&self) -> &str {
        split_extension(self.name()).1
    }

    pub fn is_hidden(&self) -> bool {
        self.name().starts_with('.')
    }

    pub fn marker_key(&self) -> String {
        marker_key(&self.key)
    }

    pub fn is_within(&self, base_key: &str) -> bool {
        is_within(base_key, &self.key)
    }

    pub fn mime_type(&self) -> String {
        match self.kind {
            NodeKind::Directory => DIRECTORY_MIME.to_string(),
            NodeKind::File => mime_guess::from_path(self.name())
                .first_or_octet_stream()
                .to_string(),
        }
    }

    /// `image/png` -> `image`
    pub fn mime_category(&self) -> String {
        let mime = self.mime_type();
        mime.split('/').next().unwrap_or_default().to_string()
    }

    pub fn is_image(&self) -> bool {
        self.is_file() && self.mime_category() == "image"
    }

    /// Modification tag used to version derived artifacts such as thumbnails
    pub fn modified_ticks(&self) -> i64 {
        self.modified.map(|m| m.timestamp_millis()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_accessors() {
        let node = Node::file("/Files/docs/report.final.pdf");
        assert_eq!(node.key, "Files/docs/report.final.pdf");
        assert_eq!(node.name(), "report.final.pdf");
        assert_eq!(node.stem(), "report.final");
        assert_eq!(node.extension(), ".pdf");
        assert_eq!(node.parent_key(), Some("Files/docs"));
        assert_eq!(node.mime_type(), "application/pdf");
        assert!(!node.is_hidden());
    }

    #[test]
    fn test_directory_marker() {
        let node = Node::directory("Files/docs/");
        assert_eq!(node.key, "Files/docs");
        assert_eq!(node.marker_key(), "Files/docs/");
        assert_eq!(node.mime_type(), DIRECTORY_MIME);
        assert!(node.is_within("Files"));
    }

    #[test]
    fn test_hidden_and_images() {
        assert!(Node::file("Files/.secret").is_hidden());
        assert!(Node::file("Files/cat.png").is_image());
        assert!(!Node::directory("Files/cat.png").is_image());
    }
}
