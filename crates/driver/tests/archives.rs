mod common;

use async_trait::async_trait;
use blobfinder_driver::{DriverError, ZIP_MIME};
use blobfinder_storage::{ByteStream, MemoryBackend, ObjectEntry, StorageBackend, StorageError};
use blobfinder_volumes::RootVolume;
use bytes::Bytes;
use common::Harness;
use std::io::{Cursor, Read, Write};
use std::sync::Arc;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

fn build_zip(entries: &[(&str, Option<&[u8]>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        match data {
            None => writer.add_directory(*name, SimpleFileOptions::default()).unwrap(),
            Some(data) => {
                writer.start_file(*name, SimpleFileOptions::default()).unwrap();
                writer.write_all(data).unwrap();
            }
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Memory store whose writes fail for keys containing `bad`
struct FailingBackend {
    inner: MemoryBackend,
}

#[async_trait]
impl StorageBackend for FailingBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        self.inner.exists(key).await
    }

    async fn metadata(&self, key: &str) -> Result<Option<ObjectEntry>, StorageError> {
        self.inner.metadata(key).await
    }

    async fn read_all(&self, key: &str) -> Result<Bytes, StorageError> {
        self.inner.read_all(key).await
    }

    async fn read_stream(&self, key: &str) -> Result<ByteStream, StorageError> {
        self.inner.read_stream(key).await
    }

    async fn write(&self, key: &str, data: Bytes) -> Result<(), StorageError> {
        if key.contains("bad") {
            return Err(StorageError::Transient {
                key: key.to_string(),
                message: "injected failure".to_string(),
            });
        }
        self.inner.write(key, data).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.inner.delete(key).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<ObjectEntry>, StorageError> {
        self.inner.list(prefix).await
    }

    async fn copy(&self, src_key: &str, dst_key: &str) -> Result<(), StorageError> {
        self.inner.copy(src_key, dst_key).await
    }

    fn is_remote(&self) -> bool {
        false
    }
}

#[tokio::test]
async fn test_extract_creates_directories_and_files() {
    let h = Harness::new().await;
    let zip = build_zip(&[("x/", None), ("x/y.txt", Some(b"why"))]);
    h.put("Files/in/bundle.zip", &zip).await;

    let response = h
        .dispatcher
        .extract(&h.path("Files/in/bundle.zip").await, false)
        .await
        .unwrap();

    assert_eq!(response.added.len(), 2);
    assert!(h.dispatcher.directories().directory_exists("Files/in/x").await.unwrap());
    assert_eq!(h.read("Files/in/x/y.txt").await, Bytes::from_static(b"why"));
}

#[tokio::test]
async fn test_extract_into_new_folder() {
    let h = Harness::new().await;
    let zip = build_zip(&[("y.txt", Some(b"why"))]);
    h.put("Files/site.backup.zip", &zip).await;

    let response = h
        .dispatcher
        .extract(&h.path("Files/site.backup.zip").await, true)
        .await
        .unwrap();

    assert_eq!(response.added.len(), 1);
    assert_eq!(response.added[0].name, "site");
    assert_eq!(h.read("Files/site/y.txt").await, Bytes::from_static(b"why"));
}

#[tokio::test]
async fn test_extract_failure_names_entry() {
    let backend = Arc::new(FailingBackend {
        inner: MemoryBackend::new(),
    });
    let h = Harness::with_backend(backend, RootVolume::new("Files")).await;
    let zip = build_zip(&[
        ("x/", None),
        ("x/good.txt", Some(b"ok")),
        ("x/bad.txt", Some(b"boom")),
    ]);
    h.put("Files/a.zip", &zip).await;

    let result = h.dispatcher.extract(&h.path("Files/a.zip").await, false).await;

    match result {
        Err(err @ DriverError::ExtractEntry { .. }) => {
            assert!(err.is_transient());
            let DriverError::ExtractEntry { entry, .. } = err else { unreachable!() };
            assert_eq!(entry, "x/bad.txt");
        }
        other => panic!("unexpected result: {:?}", other.map(|r| r.added.len())),
    }
    // entries before the failure stay
    assert!(h.exists("Files/x/good.txt").await);
}

#[tokio::test]
async fn test_extract_rejects_escaping_entries() {
    let h = Harness::new().await;
    let zip = build_zip(&[("../../evil.txt", Some(b"x"))]);
    h.put("Files/a.zip", &zip).await;

    let result = h.dispatcher.extract(&h.path("Files/a.zip").await, false).await;

    assert!(matches!(result, Err(DriverError::ExtractEntry { entry, .. }) if entry == "../../evil.txt"));
}

#[tokio::test]
async fn test_extract_requires_zip() {
    let h = Harness::new().await;
    h.put("Files/a.rar", b"rar").await;

    let result = h.dispatcher.extract(&h.path("Files/a.rar").await, false).await;
    assert!(matches!(result, Err(DriverError::NotSupportedFormat(_))));
}

#[tokio::test]
async fn test_archive_directory_and_file() {
    let h = Harness::new().await;
    h.put("Files/docs/a.txt", b"alpha").await;
    h.put("Files/docs/sub/b.txt", b"beta").await;
    h.put("Files/c.txt", b"gamma").await;

    let cwd = h.path("Files").await;
    let targets = vec![h.path("Files/docs").await, h.path("Files/c.txt").await];
    let response = h
        .dispatcher
        .archive(&cwd, &targets, Some("bundle.zip"), ZIP_MIME)
        .await
        .unwrap();
    assert_eq!(response.added[0].name, "bundle.zip");

    let data = h.read("Files/bundle.zip").await;
    let mut archive = ZipArchive::new(Cursor::new(data.to_vec())).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(
        names,
        vec!["c.txt", "docs/", "docs/a.txt", "docs/sub/", "docs/sub/b.txt"]
    );

    let mut content = String::new();
    archive
        .by_name("docs/sub/b.txt")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "beta");
}

#[tokio::test]
async fn test_archive_rejects_other_formats() {
    let h = Harness::new().await;
    let cwd = h.path("Files").await;

    let result = h.dispatcher.archive(&cwd, &[], None, "application/x-tar").await;
    assert!(matches!(result, Err(DriverError::NotSupportedFormat(_))));
}
