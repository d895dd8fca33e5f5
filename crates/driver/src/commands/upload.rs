use crate::dispatcher::{ensure_directory, ensure_writable, mime_allowed, validate_name};
use crate::errors::DriverError;
use crate::models::{Dispatcher, UploadFile, UploadOptions};
use blobfinder_models::{AddedResponse, Node};
use blobfinder_utils::{join_key, key_name, normalize_key, split_extension};
use blobfinder_volumes::FullPath;

type Result<T> = std::result::Result<T, DriverError>;

/// Numbered names tried for a colliding upload before falling back to a uuid
const MAX_RENAME_ATTEMPTS: u32 = 9;

const DEFAULT_SUFFIX: &str = "-";

impl Dispatcher {
    /// Stores uploaded files in `path`, or in `upload_paths[i]` for the i-th file.
    ///
    /// The whole batch is rejected when any file exceeds the root's size limit.
    /// A name collision either replaces the existing object or stores the upload
    /// under `<stem><suffix><n><ext>`, depending on the overwrite policy.
    /// Files named in `renames` are moved aside before anything is written.
    pub async fn upload(
        &self,
        path: &FullPath,
        files: Vec<UploadFile>,
        upload_paths: &[FullPath],
        options: &UploadOptions,
    ) -> Result<AddedResponse> {
        ensure_writable(path)?;
        ensure_directory(path)?;

        let root = &path.root;

        if let Some(max) = root.max_upload_size() {
            if let Some(file) = files.iter().find(|f| f.data.len() as u64 > max) {
                tracing::warn!("Upload rejected: {} exceeds {} bytes", file.name, max);
                return Err(DriverError::UploadTooLarge(file.name.clone()));
            }
        }

        let mut names = Vec::with_capacity(files.len());
        for file in &files {
            let name = key_name(&normalize_key(&file.name)).to_string();
            validate_name(&name)?;
            if !mime_allowed(&Node::file(&name), &root.upload_allow) {
                return Err(DriverError::Forbidden(format!("upload of {} not allowed", name)));
            }
            names.push(name);
        }

        let mut response = AddedResponse::default();
        let suffix = options.suffix.as_deref().unwrap_or(DEFAULT_SUFFIX);

        for rename in &options.renames {
            validate_name(rename)?;
            let key = join_key(&path.node.key, rename);
            if !self.tree.file_exists(&key).await? {
                continue;
            }

            let (stem, ext) = split_extension(rename);
            let moved = join_key(&path.node.key, &format!("{}{}{}", stem, suffix, ext));

            self.thumbnails.invalidate(&self.tree.file_node(&key).await?).await?;
            self.tree.move_file(&key, &moved).await?;
            tracing::info!("Moved {} aside to {}", key, moved);

            response.added.push(self.entry_for_key(root, &moved).await?);
        }

        for upload_path in upload_paths {
            ensure_writable(upload_path)?;
            let dest_root = &upload_path.root;
            let mut current = upload_path.node.clone();
            while !dest_root.is_root_key(&current.key) && current.is_within(&dest_root.base_key) {
                if !self.tree.directory_exists(&current.key).await? {
                    self.tree.create_directory(&current.key).await?;
                }
                response.added.push(self.directory_entry(dest_root, &current.key).await?);
                let Some(parent) = current.parent() else { break };
                current = parent;
            }
        }

        let overwrite = options.overwrite.unwrap_or(root.upload_overwrite);

        for (i, (file, name)) in files.into_iter().zip(names).enumerate() {
            // Each upload_path carries its own root
            let (dest_root, dir) = match upload_paths.get(i) {
                Some(upload_path) => (&upload_path.root, upload_path.node.key.as_str()),
                None => (root, path.node.key.as_str()),
            };
            let mut key = join_key(dir, &name);

            if self.tree.file_exists(&key).await? {
                if overwrite {
                    self.thumbnails.invalidate(&self.tree.file_node(&key).await?).await?;
                    self.tree.delete_file(&key).await?;
                } else {
                    key = self.name_for_copy(&key, suffix).await?;
                }
            }

            let size = file.data.len();
            self.tree.backend().write(&key, file.data).await?;
            tracing::info!("Uploaded {} ({} bytes)", key, size);

            response.added.push(self.entry_for_key(dest_root, &key).await?);
        }

        Ok(response)
    }

    /// First free `<stem><suffix><n><ext>` for n in 1..=9, else a uuid in place of n
    async fn name_for_copy(&self, key: &str, suffix: &str) -> Result<String> {
        let node = Node::file(key);
        let parent = node.parent_key().unwrap_or_default();
        let (stem, ext) = split_extension(node.name());

        for i in 1..=MAX_RENAME_ATTEMPTS {
            let candidate = join_key(parent, &format!("{}{}{}{}", stem, suffix, i, ext));
            if !self.tree.file_exists(&candidate).await? {
                return Ok(candidate);
            }
        }

        Ok(join_key(
            parent,
            &format!("{}{}{}{}", stem, suffix, uuid::Uuid::new_v4(), ext),
        ))
    }
}
