use crate::dispatcher::{ensure_directory, mime_allowed};
use crate::errors::DriverError;
use crate::models::{Dispatcher, ZIP_MIME};
use blobfinder_models::{
    Archivers, ConnectorOptions, FileEntry, ListResponse, OpenResponse, TreeResponse, API_VERSION,
};
use blobfinder_volumes::{FullPath, RootVolume};

type Result<T> = std::result::Result<T, DriverError>;

impl Dispatcher {
    /// First request of a session: the working directory, its children and every root.
    /// Without a target the default root's start directory is opened.
    pub async fn init(&self, path: Option<FullPath>, mimes: &[String]) -> Result<OpenResponse> {
        let path = match path {
            Some(path) => path,
            None => self.registry.default_path(&self.tree).await?,
        };
        ensure_directory(&path)?;
        tracing::debug!("init {}", path.node.key);

        let root = &path.root;
        let mut files = self.child_entries(root, &path.node.key, mimes).await?;

        for other in self.registry.roots() {
            files.push(self.directory_entry(other, &other.base_key).await?);
        }

        if !path.is_root() {
            let root_children = self.tree.children(&root.base_key).await?;
            for dir in root_children.directories.iter().filter(|d| !d.is_hidden()) {
                files.push(self.entry(root, dir).await?);
            }
        }

        Ok(OpenResponse {
            cwd: self.entry(root, &path.node).await?,
            files,
            options: self.options(&path),
            api: Some(API_VERSION.to_string()),
            upl_max_size: root.max_upload_size_kb.map(|kb| format!("{}K", kb)),
        })
    }

    /// Opens a directory; with `tree` the ancestors up to the root are prepended
    pub async fn open(&self, path: &FullPath, tree: bool, mimes: &[String]) -> Result<OpenResponse> {
        ensure_directory(path)?;
        tracing::debug!("open {} (tree: {})", path.node.key, tree);

        let root = &path.root;
        let mut files = self.child_entries(root, &path.node.key, mimes).await?;

        if tree {
            let mut ancestors = Vec::new();
            let mut current = path.node.clone();
            while !root.is_root_key(&current.key) {
                let Some(parent) = current.parent() else { break };
                if !root.contains(&parent.key) {
                    break;
                }
                ancestors.push(self.entry(root, &parent).await?);
                current = parent;
            }
            ancestors.reverse();
            ancestors.append(&mut files);
            files = ancestors;
        }

        Ok(OpenResponse {
            cwd: self.entry(root, &path.node).await?,
            files,
            options: self.options(path),
            api: None,
            upl_max_size: None,
        })
    }

    /// Visible subdirectories of a directory
    pub async fn tree(&self, path: &FullPath) -> Result<TreeResponse> {
        ensure_directory(path)?;
        tracing::debug!("tree {}", path.node.key);

        let children = self.tree.children(&path.node.key).await?;
        let mut tree = Vec::with_capacity(children.directories.len());
        for dir in children.directories.iter().filter(|d| !d.is_hidden()) {
            tree.push(self.entry(&path.root, dir).await?);
        }

        Ok(TreeResponse { tree })
    }

    /// Subdirectories of the path's parent, then every ancestor up to the root
    pub async fn parents(&self, path: &FullPath) -> Result<TreeResponse> {
        ensure_directory(path)?;
        tracing::debug!("parents {}", path.node.key);

        let root = &path.root;
        let mut tree = Vec::new();

        if path.is_root() {
            tree.push(self.entry(root, &path.node).await?);
            return Ok(TreeResponse { tree });
        }

        let mut current = path.node.clone();
        if let Some(parent) = current.parent() {
            let siblings = self.tree.children(&parent.key).await?;
            for dir in siblings.directories.iter().filter(|d| !d.is_hidden()) {
                tree.push(self.entry(root, dir).await?);
            }
        }

        while !root.is_root_key(&current.key) {
            let Some(parent) = current.parent() else { break };
            if !root.contains(&parent.key) {
                break;
            }
            let parent = self.tree.directory_node(&parent.key).await?;
            tree.push(self.entry(root, &parent).await?);
            current = parent;
        }

        Ok(TreeResponse { tree })
    }

    /// Names of the visible children, optionally restricted to `intersect`
    pub async fn list(
        &self,
        path: &FullPath,
        intersect: &[String],
        mimes: &[String],
    ) -> Result<ListResponse> {
        ensure_directory(path)?;
        tracing::debug!("ls {}", path.node.key);

        let children = self.tree.children(&path.node.key).await?;

        let files = children
            .files
            .iter()
            .filter(|f| !f.is_hidden() && mime_allowed(f, mimes));
        let dirs = children.directories.iter().filter(|d| !d.is_hidden());

        let list = files
            .chain(dirs)
            .map(|node| node.name().to_string())
            .filter(|name| intersect.is_empty() || intersect.contains(name))
            .collect();

        Ok(ListResponse { list })
    }

    pub(crate) async fn child_entries(
        &self,
        root: &RootVolume,
        dir_key: &str,
        mimes: &[String],
    ) -> Result<Vec<FileEntry>> {
        let children = self.tree.children(dir_key).await?;
        let mut entries = Vec::with_capacity(children.files.len() + children.directories.len());

        for file in children
            .files
            .iter()
            .filter(|f| !f.is_hidden() && mime_allowed(f, mimes))
        {
            entries.push(self.entry(root, file).await?);
        }
        for dir in children.directories.iter().filter(|d| !d.is_hidden()) {
            entries.push(self.entry(root, dir).await?);
        }

        Ok(entries)
    }

    pub(crate) fn options(&self, path: &FullPath) -> ConnectorOptions {
        let root = &path.root;
        let relative = root.relative_key(&path.node.key).unwrap_or_default();
        let display_path = format!("{}{}", root.alias, relative.trim_end_matches('/'));

        ConnectorOptions {
            path: display_path,
            url: root.url.clone(),
            tmb_url: root.thumbnail_url.clone(),
            separator: "/".to_string(),
            disabled: vec!["search".to_string(), "zipdl".to_string()],
            archivers: Archivers {
                create: vec![ZIP_MIME.to_string()],
                extract: vec![ZIP_MIME.to_string()],
            },
            copy_overwrite: 1,
            upload_overwrite: root.upload_overwrite as u8,
            upload_max_size: root.max_upload_size_kb.map(|kb| format!("{}K", kb)),
        }
    }
}
