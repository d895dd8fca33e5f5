use crate::dispatcher::{ensure_directory, ensure_file, ensure_writable, validate_name};
use crate::errors::DriverError;
use crate::models::{Dispatcher, ZIP_MIME};
use blobfinder_filesystem::FileSystem;
use blobfinder_models::AddedResponse;
use blobfinder_utils::{join_key, resolve_relative, strip_all_extensions};
use blobfinder_volumes::FullPath;
use futures::StreamExt;
use std::fs::File;
use std::io::Write;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

type Result<T> = std::result::Result<T, DriverError>;

/// Name used when the client does not pick one
const DEFAULT_ARCHIVE_NAME: &str = "newfile";

fn zip_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

impl Dispatcher {
    /// Builds a zip of the targets in a local scratch file, then stores it as
    /// `<name>.zip` in `dest`, replacing an existing archive of that name
    pub async fn archive(
        &self,
        dest: &FullPath,
        paths: &[FullPath],
        name: Option<&str>,
        mime_type: &str,
    ) -> Result<AddedResponse> {
        if mime_type != ZIP_MIME {
            return Err(DriverError::NotSupportedFormat(mime_type.to_string()));
        }
        ensure_writable(dest)?;
        ensure_directory(dest)?;

        let name = name.filter(|n| !n.is_empty()).unwrap_or(DEFAULT_ARCHIVE_NAME);
        let file_name = format!("{}.zip", name.strip_suffix(".zip").unwrap_or(name));
        validate_name(&file_name)?;
        let key = join_key(&dest.node.key, &file_name);

        let scratch = FileSystem::scratch_file()?;
        let mut writer = ZipWriter::new(scratch.reopen()?);

        for path in paths {
            if path.is_directory() {
                self.add_directory_to_archive(&mut writer, path).await?;
            } else {
                ensure_file(path)?;
                self.add_file_to_archive(&mut writer, &path.node.key, path.node.name())
                    .await?;
            }
        }
        writer.finish()?;

        self.tree.delete_file_if_exists(&key).await?;
        self.tree.backend().write_file(&key, scratch.path()).await?;
        tracing::info!("Created archive {} ({} target(s))", key, paths.len());

        Ok(AddedResponse {
            added: vec![self.entry_for_key(&dest.root, &key).await?],
            ..Default::default()
        })
    }

    async fn add_file_to_archive(
        &self,
        writer: &mut ZipWriter<File>,
        key: &str,
        entry_name: &str,
    ) -> Result<()> {
        writer.start_file(entry_name, zip_options())?;

        let mut stream = self.tree.backend().read_stream(key).await?;
        while let Some(chunk) = stream.next().await {
            writer.write_all(&chunk?)?;
        }

        Ok(())
    }

    async fn add_directory_to_archive(
        &self,
        writer: &mut ZipWriter<File>,
        path: &FullPath,
    ) -> Result<()> {
        let mut stack = vec![(path.node.key.clone(), path.node.name().to_string())];

        while let Some((dir, prefix)) = stack.pop() {
            writer.add_directory(format!("{}/", prefix), zip_options())?;

            let children = self.tree.children(&dir).await?;
            for file in &children.files {
                let entry_name = format!("{}/{}", prefix, file.name());
                self.add_file_to_archive(writer, &file.key, &entry_name).await?;
            }
            for sub in children.directories {
                let sub_prefix = format!("{}/{}", prefix, sub.name());
                stack.push((sub.key, sub_prefix));
            }
        }

        Ok(())
    }

    /// Unpacks a zip next to itself, or into a new directory named after the
    /// archive with every extension stripped. A failing entry aborts the
    /// command with the entry's name; entries already written stay.
    pub async fn extract(&self, path: &FullPath, make_dir: bool) -> Result<AddedResponse> {
        ensure_writable(path)?;
        if path.is_directory() || !path.node.extension().eq_ignore_ascii_case(".zip") {
            return Err(DriverError::NotSupportedFormat(path.node.name().to_string()));
        }
        ensure_file(path)?;

        let root = &path.root;
        let mut response = AddedResponse::default();
        let parent = path.node.parent_key().unwrap_or_default().to_string();

        let target = if make_dir {
            let dir = join_key(&parent, strip_all_extensions(path.node.name()));
            if !self.tree.directory_exists(&dir).await? {
                self.tree.create_directory(&dir).await?;
            }
            response.added.push(self.directory_entry(root, &dir).await?);
            dir
        } else {
            parent
        };

        let mut scratch = FileSystem::scratch_file()?;
        let mut stream = self.tree.backend().read_stream(&path.node.key).await?;
        while let Some(chunk) = stream.next().await {
            scratch.as_file_mut().write_all(&chunk?)?;
        }
        scratch.as_file_mut().flush()?;

        let mut archive = ZipArchive::new(scratch.reopen()?)?;
        tracing::debug!("Extracting {} entries from {}", archive.len(), path.node.key);

        for index in 0..archive.len() {
            let entry_name = archive
                .name_for_index(index)
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{}", index));

            let (key, is_dir) = self
                .extract_entry(&mut archive, index, &target)
                .await
                .map_err(|e| {
                    tracing::warn!("Extraction of '{}' failed: {}", entry_name, e);
                    DriverError::ExtractEntry {
                        entry: entry_name.clone(),
                        source: Box::new(e),
                    }
                })?;

            if !make_dir {
                let entry = if is_dir {
                    self.directory_entry(root, &key).await?
                } else {
                    self.entry_for_key(root, &key).await?
                };
                response.added.push(entry);
            }
        }

        tracing::info!("Extracted {} into {}", path.node.key, target);
        Ok(response)
    }

    /// Writes one entry below `target`, returns its key and whether it is a directory
    async fn extract_entry(
        &self,
        archive: &mut ZipArchive<File>,
        index: usize,
        target: &str,
    ) -> Result<(String, bool)> {
        let (key, scratch) = {
            let mut entry = archive.by_index(index)?;
            let name = entry.name().to_string();
            let key = resolve_relative(target, &name)
                .map_err(|_| DriverError::InvalidName(name.clone()))?;

            if name.ends_with('/') || name.ends_with('\\') {
                (key, None)
            } else {
                let mut scratch = FileSystem::scratch_file()?;
                std::io::copy(&mut entry, scratch.as_file_mut())?;
                (key, Some(scratch))
            }
        };

        if key == target {
            return Err(DriverError::InvalidName(key));
        }

        match scratch {
            None => {
                if !self.tree.directory_exists(&key).await? {
                    self.tree.create_directory(&key).await?;
                }
                Ok((key, true))
            }
            Some(scratch) => {
                self.tree.backend().write_file(&key, scratch.path()).await?;
                Ok((key, false))
            }
        }
    }
}
