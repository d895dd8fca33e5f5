use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const API_VERSION: &str = "2.1";

/// A file or directory as the client sees it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileEntry {
    pub name: String,
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phash: Option<String>,
    pub mime: String,
    /// Unix timestamp (seconds)
    pub ts: i64,
    pub size: u64,
    pub read: u8,
    pub write: u8,
    pub locked: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dirs: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volumeid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isroot: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Archivers {
    pub create: Vec<String>,
    pub extract: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorOptions {
    pub path: String,
    pub url: String,
    pub tmb_url: String,
    pub separator: String,
    pub disabled: Vec<String>,
    pub archivers: Archivers,
    pub copy_overwrite: u8,
    pub upload_overwrite: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_max_size: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenResponse {
    pub cwd: FileEntry,
    pub files: Vec<FileEntry>,
    pub options: ConnectorOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upl_max_size: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AddedResponse {
    pub added: Vec<FileEntry>,
    /// Client supplied relative dir -> token, only filled by `mkdir` with `dirs[]`
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub hashes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChangedResponse {
    pub changed: Vec<FileEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RemovedResponse {
    pub removed: Vec<String>,
}

/// Added and removed entries in one payload (rename, paste)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReplaceResponse {
    pub added: Vec<FileEntry>,
    pub removed: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TreeResponse {
    pub tree: Vec<FileEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListResponse {
    pub list: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SizeResponse {
    pub size: u64,
    #[serde(rename = "fileCnt")]
    pub file_count: u64,
    #[serde(rename = "dirCnt")]
    pub directory_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DimResponse {
    pub dim: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetResponse {
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ThumbsResponse {
    pub images: BTreeMap<String, String>,
}

/// Every JSON payload a connector command can produce
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum CommandResponse {
    Open(Box<OpenResponse>),
    Added(AddedResponse),
    Changed(ChangedResponse),
    Removed(RemovedResponse),
    Replace(ReplaceResponse),
    Tree(TreeResponse),
    List(ListResponse),
    Size(SizeResponse),
    Dim(DimResponse),
    Get(GetResponse),
    Thumbs(ThumbsResponse),
}

/// Raw file bytes returned by the `file` command
#[derive(Debug, Clone)]
pub struct FileContent {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Error payload in the shape the client expects: `{"error": ["errCode", "arg"]}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_response_field_names() {
        let json = serde_json::to_value(SizeResponse {
            size: 30,
            file_count: 2,
            directory_count: 2,
        })
        .unwrap();

        assert_eq!(json["size"], 30);
        assert_eq!(json["fileCnt"], 2);
        assert_eq!(json["dirCnt"], 2);
    }

    #[test]
    fn test_untagged_command_response() {
        let json = serde_json::to_value(CommandResponse::Removed(RemovedResponse {
            removed: vec!["a1_Lw".to_string()],
        }))
        .unwrap();

        assert_eq!(json, serde_json::json!({ "removed": ["a1_Lw"] }));
    }

    #[test]
    fn test_hashes_skipped_when_empty() {
        let json = serde_json::to_value(AddedResponse::default()).unwrap();
        assert!(json.get("hashes").is_none());
    }
}
