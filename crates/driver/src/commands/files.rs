use crate::dispatcher::{ensure_directory, ensure_file, ensure_unlocked, ensure_writable, validate_name};
use crate::errors::DriverError;
use crate::models::Dispatcher;
use blobfinder_models::{
    AddedResponse, ChangedResponse, GetResponse, Node, RemovedResponse, ReplaceResponse,
};
use blobfinder_utils::{join_key, resolve_relative};
use blobfinder_volumes::FullPath;
use bytes::Bytes;

type Result<T> = std::result::Result<T, DriverError>;

/// Numbered copies probed after `"<name> copy"`
const MAX_COPY_NUMBER: u32 = 99;

/// `"<stem> copy<ext>"`, then `"<stem> copy 1<ext>"` up to `"<stem> copy 99<ext>"`
pub(crate) fn copy_names<'a>(stem: &'a str, ext: &'a str) -> impl Iterator<Item = String> + 'a {
    std::iter::once(format!("{} copy{}", stem, ext))
        .chain((1..=MAX_COPY_NUMBER).map(move |i| format!("{} copy {}{}", stem, i, ext)))
}

impl Dispatcher {
    /// Creates `name` and/or every relative path in `dirs` below the target
    pub async fn make_dir(
        &self,
        path: &FullPath,
        name: Option<&str>,
        dirs: &[String],
    ) -> Result<AddedResponse> {
        ensure_writable(path)?;
        ensure_directory(path)?;

        let root = &path.root;
        let mut response = AddedResponse::default();

        if let Some(name) = name.filter(|n| !n.is_empty()) {
            validate_name(name)?;
            let key = join_key(&path.node.key, name);
            let node = self.tree.create_directory(&key).await?;
            tracing::info!("Created directory {}", key);
            response.added.push(self.entry(root, &node).await?);
        }

        for dir in dirs {
            let relative = dir.trim_start_matches('/');
            let key = resolve_relative(&path.node.key, relative)
                .map_err(|_| DriverError::InvalidName(dir.clone()))?;
            if key == path.node.key {
                return Err(DriverError::InvalidName(dir.clone()));
            }

            let node = self.tree.create_directory(&key).await?;
            tracing::info!("Created directory {}", key);
            response.added.push(self.entry(root, &node).await?);

            if let Some(token) = root.encode_key(&key) {
                response.hashes.insert(format!("/{}", relative), token);
            }
        }

        Ok(response)
    }

    /// Creates an empty file, replacing any existing one
    pub async fn make_file(&self, path: &FullPath, name: &str) -> Result<AddedResponse> {
        ensure_writable(path)?;
        ensure_directory(path)?;
        validate_name(name)?;

        let key = join_key(&path.node.key, name);
        self.thumbnails.invalidate(&Node::file(&key)).await?;
        let node = self.tree.create_file(&key).await?;
        tracing::info!("Created file {}", key);

        Ok(AddedResponse {
            added: vec![self.entry(&path.root, &node).await?],
            ..Default::default()
        })
    }

    /// Deletes files and directories (recursively), thumbnails first
    pub async fn remove(&self, paths: &[FullPath]) -> Result<RemovedResponse> {
        for path in paths {
            ensure_unlocked(path)?;
        }

        let mut response = RemovedResponse::default();
        for path in paths {
            self.thumbnails.invalidate(&path.node).await?;

            if path.is_directory() {
                if self.tree.directory_exists(&path.node.key).await? {
                    self.tree.delete_directory(&path.node.key).await?;
                }
            } else if self.tree.file_exists(&path.node.key).await? {
                self.tree.delete_file(&path.node.key).await?;
            }

            tracing::info!("Removed {}", path.node.key);
            response.removed.push(path.token.clone());
        }

        Ok(response)
    }

    /// Renames in place: a move to a sibling key
    pub async fn rename(&self, path: &FullPath, name: &str) -> Result<ReplaceResponse> {
        ensure_unlocked(path)?;
        validate_name(name)?;

        let parent = path.node.parent_key().unwrap_or_default();
        let new_key = join_key(parent, name);
        if new_key == path.node.key {
            return Ok(ReplaceResponse {
                added: vec![self.entry(&path.root, &path.node).await?],
                removed: Vec::new(),
            });
        }

        let taken = self.tree.file_exists(&new_key).await?
            || self.tree.directory_exists(&new_key).await?;
        if taken {
            return Err(DriverError::AlreadyExists(name.to_string()));
        }

        self.thumbnails.invalidate(&path.node).await?;

        let added = if path.is_directory() {
            self.tree.move_directory(&path.node.key, &new_key).await?;
            self.directory_entry(&path.root, &new_key).await?
        } else {
            self.tree.move_file(&path.node.key, &new_key).await?;
            self.entry_for_key(&path.root, &new_key).await?
        };
        tracing::info!("Renamed {} -> {}", path.node.key, new_key);

        Ok(ReplaceResponse {
            added: vec![added],
            removed: vec![path.token.clone()],
        })
    }

    /// Copies each target next to itself under the first free `"<name> copy[ N]"` name
    pub async fn duplicate(&self, paths: &[FullPath]) -> Result<AddedResponse> {
        let mut response = AddedResponse::default();

        for path in paths {
            ensure_writable(path)?;
            if path.is_root() {
                return Err(DriverError::Forbidden(path.node.key.clone()));
            }

            let parent = path.node.parent_key().unwrap_or_default();
            let (stem, ext) = if path.is_directory() {
                (path.node.name(), "")
            } else {
                (path.node.stem(), path.node.extension())
            };

            let mut target = None;
            for candidate in copy_names(stem, ext) {
                let key = join_key(parent, &candidate);
                let taken = if path.is_directory() {
                    self.tree.directory_exists(&key).await?
                } else {
                    self.tree.file_exists(&key).await?
                };
                if !taken {
                    target = Some(key);
                    break;
                }
            }

            let target = target.ok_or_else(|| {
                DriverError::NameSelectionExhausted(join_key(parent, &format!("{} copy", stem)))
            })?;

            let added = if path.is_directory() {
                self.tree.copy_directory(&path.node.key, &target).await?;
                self.directory_entry(&path.root, &target).await?
            } else {
                self.tree.copy_file(&path.node.key, &target).await?;
                self.entry_for_key(&path.root, &target).await?
            };
            tracing::info!("Duplicated {} -> {}", path.node.key, target);
            response.added.push(added);
        }

        Ok(response)
    }

    /// Copies or moves targets into `dest`. Every source must exist; an existing
    /// node with the same name at the destination is then deleted first.
    pub async fn paste(
        &self,
        dest: &FullPath,
        paths: &[FullPath],
        is_cut: bool,
    ) -> Result<ReplaceResponse> {
        ensure_writable(dest)?;
        ensure_directory(dest)?;

        for src in paths {
            if is_cut {
                ensure_unlocked(src)?;
            }
            if src.is_directory() {
                if !self.tree.directory_exists(&src.node.key).await? {
                    return Err(DriverError::NotFound(src.node.key.clone()));
                }
            } else {
                ensure_file(src)?;
            }
        }

        let mut response = ReplaceResponse::default();

        for src in paths {
            let target = join_key(&dest.node.key, src.node.name());
            if target == src.node.key || (src.is_directory() && dest.node.is_within(&src.node.key)) {
                return Err(DriverError::Forbidden(format!(
                    "cannot paste {} into {}",
                    src.node.key, dest.node.key
                )));
            }

            if src.is_directory() {
                if self.tree.directory_exists(&target).await? {
                    self.thumbnails.invalidate(&Node::directory(&target)).await?;
                    self.tree.delete_directory(&target).await?;
                }

                if is_cut {
                    self.thumbnails.invalidate(&src.node).await?;
                    self.tree.move_directory(&src.node.key, &target).await?;
                    response.removed.push(src.token.clone());
                } else {
                    self.tree.copy_directory(&src.node.key, &target).await?;
                }

                response.added.push(self.directory_entry(&dest.root, &target).await?);
            } else {
                self.thumbnails.invalidate(&Node::file(&target)).await?;
                self.tree.delete_file_if_exists(&target).await?;

                if is_cut {
                    self.thumbnails.invalidate(&src.node).await?;
                    self.tree.move_file(&src.node.key, &target).await?;
                    response.removed.push(src.token.clone());
                } else {
                    self.tree.copy_file(&src.node.key, &target).await?;
                }

                response.added.push(self.entry_for_key(&dest.root, &target).await?);
            }

            tracing::info!(
                "{} {} -> {}",
                if is_cut { "Moved" } else { "Copied" },
                src.node.key,
                target
            );
        }

        Ok(response)
    }

    /// Text content of a file
    pub async fn get(&self, path: &FullPath) -> Result<GetResponse> {
        ensure_file(path)?;
        tracing::debug!("get {}", path.node.key);

        let data = self.tree.backend().read_all(&path.node.key).await?;
        Ok(GetResponse {
            content: String::from_utf8_lossy(&data).into_owned(),
        })
    }

    /// Replaces a file's content with text
    pub async fn put(&self, path: &FullPath, content: &str) -> Result<ChangedResponse> {
        ensure_writable(path)?;
        if path.is_directory() {
            return Err(DriverError::Forbidden(path.node.key.clone()));
        }

        self.thumbnails.invalidate(&path.node).await?;
        self.tree
            .backend()
            .write(&path.node.key, Bytes::copy_from_slice(content.as_bytes()))
            .await?;
        tracing::info!("Updated {}", path.node.key);

        Ok(ChangedResponse {
            changed: vec![self.entry_for_key(&path.root, &path.node.key).await?],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_names() {
        let names: Vec<String> = copy_names("a", ".txt").collect();
        assert_eq!(names.len(), 100);
        assert_eq!(names[0], "a copy.txt");
        assert_eq!(names[1], "a copy 1.txt");
        assert_eq!(names[99], "a copy 99.txt");
    }
}
