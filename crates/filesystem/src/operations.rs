use super::models::FileSystem;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::fs;

impl FileSystem {
    /// Creates `path` (and parents) if missing, returns its absolute form
    pub async fn ensure_directory(path: &str, description: &str) -> Result<PathBuf> {
        let abs_path = Self::get_absolute_path(Path::new(path))?;
        Self::create_directory(&abs_path, description).await?;
        Ok(abs_path)
    }

    async fn create_directory(path: &Path, description: &str) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
            tracing::debug!("    Created: {} ({})", path.display(), description);
        } else {
            tracing::debug!("    Exists:  {} ({})", path.display(), description);
        }
        Ok(())
    }

    fn get_absolute_path(path: &Path) -> Result<PathBuf> {
        let abs_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };
        Ok(abs_path)
    }

    pub fn get_absolute_path_string(path: &str) -> Result<String> {
        let path_buf = PathBuf::from(path);
        let abs = Self::get_absolute_path(&path_buf)?;
        Ok(abs.to_string_lossy().to_string())
    }

    /// Scratch file removed from disk when the handle is dropped, on every exit path
    pub fn scratch_file() -> std::io::Result<NamedTempFile> {
        tempfile::Builder::new().prefix("blobfinder-").tempfile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_file_is_removed_on_drop() {
        let scratch = FileSystem::scratch_file().unwrap();
        let path = scratch.path().to_path_buf();
        assert!(path.exists());

        drop(scratch);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_ensure_directory_creates_nested() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("a/b/c");

        let created = FileSystem::ensure_directory(target.to_str().unwrap(), "test")
            .await
            .unwrap();

        assert!(created.is_dir());
    }
}
