use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    routing::get,
    Router,
};
use blobfinder_api::{connector_get, connector_post, serve_thumbnail, AppState};
use blobfinder_cache::ThumbnailManager;
use blobfinder_driver::Dispatcher;
use blobfinder_imaging::DefaultPictureEditor;
use blobfinder_storage::{DirectoryTree, MemoryBackend, StorageBackend};
use blobfinder_volumes::{RootRegistry, RootVolume};
use bytes::Bytes;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    backend: Arc<dyn StorageBackend>,
    root: Arc<RootVolume>,
    _cache_dir: TempDir,
}

async fn app() -> TestApp {
    let backend: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
    let tree = DirectoryTree::new(Arc::clone(&backend));

    let mut volume = RootVolume::new("Files");
    volume.alias = "Files".to_string();
    volume.thumbnail_url = "http://localhost/thumb/".to_string();

    let mut registry = RootRegistry::new();
    let root = registry.add_root(volume);
    tree.create_directory(&root.base_key).await.unwrap();

    let cache_dir = tempfile::tempdir().unwrap();
    let editor = Arc::new(DefaultPictureEditor::new());
    let thumbnails = Arc::new(ThumbnailManager::new(
        tree.clone(),
        editor.clone(),
        cache_dir.path().to_path_buf(),
        64,
        1,
    ));

    let dispatcher = Arc::new(Dispatcher::new(Arc::new(registry), tree, thumbnails, editor));

    let router = Router::new()
        .route("/connector", get(connector_get).post(connector_post))
        .route("/thumb/:hash", get(serve_thumbnail))
        .with_state(AppState::new(dispatcher));

    TestApp {
        router,
        backend,
        root,
        _cache_dir: cache_dir,
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body)
}

async fn get_json(app: &TestApp, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn open_init_lists_root() {
    let app = app().await;
    app.backend
        .write("Files/readme.txt", Bytes::from_static(b"hi"))
        .await
        .unwrap();

    let (status, json) = get_json(&app, "/connector?cmd=open&init=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["api"], "2.1");
    assert_eq!(json["cwd"]["name"], "Files");
    assert_eq!(json["cwd"]["hash"], app.root.encode_key("Files").unwrap());

    let names: Vec<&str> = json["files"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["name"].as_str())
        .collect();
    assert!(names.contains(&"readme.txt"));
}

#[tokio::test]
async fn unknown_command_is_reported() {
    let app = app().await;

    let (status, json) = get_json(&app, "/connector?cmd=bogus").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"][0], "errUnknownCmd");
    assert_eq!(json["error"][1], "bogus");
}

#[tokio::test]
async fn missing_target_is_a_parameter_error() {
    let app = app().await;

    let (status, json) = get_json(&app, "/connector?cmd=ls").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"][0], "errCmdParams");
}

#[tokio::test]
async fn form_post_creates_directory() {
    let app = app().await;
    let target = app.root.encode_key("Files").unwrap();

    let request = Request::post("/connector")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("cmd=mkdir&target={}&name=docs", target)))
        .unwrap();
    let (status, body) = send(&app, request).await;
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["added"][0]["name"], "docs");
    assert!(app.backend.exists("Files/docs/").await.unwrap());
}

#[tokio::test]
async fn multipart_upload_stores_file() {
    let app = app().await;
    let target = app.root.encode_key("Files").unwrap();

    let boundary = "XBOUNDARYX";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"cmd\"\r\n\r\nupload\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"target\"\r\n\r\n{t}\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"upload[]\"; filename=\"notes.txt\"\r\n\
         Content-Type: text/plain\r\n\r\nhello\r\n--{b}--\r\n",
        b = boundary,
        t = target
    );

    let request = Request::post("/connector")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();
    let (status, body) = send(&app, request).await;
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["added"][0]["name"], "notes.txt");
    assert_eq!(
        app.backend.read_all("Files/notes.txt").await.unwrap(),
        Bytes::from_static(b"hello")
    );
}

#[tokio::test]
async fn file_command_returns_raw_bytes() {
    let app = app().await;
    app.backend
        .write("Files/a.txt", Bytes::from_static(b"content"))
        .await
        .unwrap();
    let target = app.root.encode_key("Files/a.txt").unwrap();

    let request = Request::get(format!("/connector?cmd=file&target={}&download=1", target))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert_eq!(disposition, "attachment; filename=\"a.txt\"");
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"content");
}

#[tokio::test]
async fn malformed_hash_is_rejected() {
    let app = app().await;

    let (status, json) = get_json(&app, "/connector?cmd=ls&target=a1_..%2F..").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"][0], "errCmdParams");
}

#[tokio::test]
async fn unknown_thumbnail_is_not_found() {
    let app = app().await;

    let request = Request::get("/thumb/L0ZpbGVzL21pc3NpbmdfMS5wbmc")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
