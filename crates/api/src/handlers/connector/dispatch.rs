use super::parser::ConnectorRequest;
use super::validator::validate_token;
use crate::errors::ApiError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use blobfinder_driver::{Dispatcher, UploadOptions, ZIP_MIME};
use blobfinder_models::{CommandResponse, FileContent};
use blobfinder_volumes::FullPath;

/// Runs the command named by `cmd` and renders its result
pub async fn execute(dispatcher: &Dispatcher, mut request: ConnectorRequest) -> Result<Response, ApiError> {
    let cmd = request.required("cmd")?.to_string();
    tracing::debug!("connector: cmd = '{}'", cmd);

    let mimes = request.values("mimes");

    let response = match cmd.as_str() {
        "open" => {
            let opened = if request.flag("init") {
                let path = match request.get("target") {
                    Some(token) => Some(parse(dispatcher, "target", token).await?),
                    None => None,
                };
                dispatcher.init(path, mimes).await?
            } else {
                let path = target(dispatcher, &request).await?;
                dispatcher.open(&path, request.flag("tree"), mimes).await?
            };
            CommandResponse::Open(Box::new(opened))
        }
        "tree" => CommandResponse::Tree(dispatcher.tree(&target(dispatcher, &request).await?).await?),
        "parents" => {
            CommandResponse::Tree(dispatcher.parents(&target(dispatcher, &request).await?).await?)
        }
        "ls" => {
            let path = target(dispatcher, &request).await?;
            CommandResponse::List(dispatcher.list(&path, request.values("intersect"), mimes).await?)
        }
        "mkdir" => {
            let path = target(dispatcher, &request).await?;
            let dirs = request.values("dirs");
            let name = request.get("name");
            if name.is_none() && dirs.is_empty() {
                return Err(ApiError::MissingParameter("name"));
            }
            CommandResponse::Added(dispatcher.make_dir(&path, name, dirs).await?)
        }
        "mkfile" => {
            let path = target(dispatcher, &request).await?;
            CommandResponse::Added(dispatcher.make_file(&path, request.required("name")?).await?)
        }
        "rm" => CommandResponse::Removed(dispatcher.remove(&targets(dispatcher, &request).await?).await?),
        "rename" => {
            let path = target(dispatcher, &request).await?;
            CommandResponse::Replace(dispatcher.rename(&path, request.required("name")?).await?)
        }
        "duplicate" => {
            CommandResponse::Added(dispatcher.duplicate(&targets(dispatcher, &request).await?).await?)
        }
        "paste" => {
            let dest = parse(dispatcher, "dst", request.required("dst")?).await?;
            let paths = targets(dispatcher, &request).await?;
            CommandResponse::Replace(dispatcher.paste(&dest, &paths, request.flag("cut")).await?)
        }
        "upload" => {
            let path = target(dispatcher, &request).await?;

            let mut upload_paths = Vec::new();
            for token in request.values("upload_path").iter().filter(|t| !t.is_empty()) {
                upload_paths.push(parse(dispatcher, "upload_path", token).await?);
            }

            let options = UploadOptions {
                overwrite: request.optional_flag("overwrite"),
                suffix: request.get("suffix").map(str::to_string),
                renames: request.values("renames").to_vec(),
            };

            let files = std::mem::take(&mut request.uploads);
            if files.is_empty() {
                return Err(ApiError::MissingParameter("upload"));
            }

            CommandResponse::Added(dispatcher.upload(&path, files, &upload_paths, &options).await?)
        }
        "archive" => {
            let dest = target(dispatcher, &request).await?;
            let paths = targets(dispatcher, &request).await?;
            let mime_type = request.get("type").unwrap_or(ZIP_MIME);
            CommandResponse::Added(
                dispatcher
                    .archive(&dest, &paths, request.get("name"), mime_type)
                    .await?,
            )
        }
        "extract" => {
            let path = target(dispatcher, &request).await?;
            CommandResponse::Added(dispatcher.extract(&path, request.flag("makedir")).await?)
        }
        "size" => CommandResponse::Size(dispatcher.size(&targets(dispatcher, &request).await?).await?),
        "dim" => CommandResponse::Dim(dispatcher.dim(&target(dispatcher, &request).await?).await?),
        "get" => CommandResponse::Get(dispatcher.get(&target(dispatcher, &request).await?).await?),
        "put" => {
            let path = target(dispatcher, &request).await?;
            let content = request.values("content").first().map(String::as_str).unwrap_or_default();
            CommandResponse::Changed(dispatcher.put(&path, content).await?)
        }
        "resize" => {
            let path = target(dispatcher, &request).await?;
            let changed = match request.get("mode").unwrap_or("resize") {
                "resize" => {
                    dispatcher
                        .resize(&path, request.number("width")?, request.number("height")?)
                        .await?
                }
                "crop" => {
                    dispatcher
                        .crop(
                            &path,
                            request.number("x")?,
                            request.number("y")?,
                            request.number("width")?,
                            request.number("height")?,
                        )
                        .await?
                }
                "rotate" => dispatcher.rotate(&path, request.number("degree")?).await?,
                other => {
                    return Err(ApiError::InvalidParameter {
                        name: "mode",
                        value: other.to_string(),
                    })
                }
            };
            CommandResponse::Changed(changed)
        }
        "thumbs" => CommandResponse::Thumbs(dispatcher.thumbs(&targets(dispatcher, &request).await?).await?),
        "file" => {
            let path = target(dispatcher, &request).await?;
            let content = dispatcher.file(&path, request.flag("download")).await?;
            return Ok(file_response(content, request.flag("download")));
        }
        "search" => dispatcher.search(request.get("q").unwrap_or_default(), mimes).await?,
        "zipdl" => dispatcher.zip_download(&targets(dispatcher, &request).await?).await?,
        other => return Err(ApiError::UnknownCommand(other.to_string())),
    };

    Ok(Json(response).into_response())
}

async fn parse(dispatcher: &Dispatcher, name: &'static str, token: &str) -> Result<FullPath, ApiError> {
    validate_token(name, token)?;
    Ok(dispatcher.parse_path(token).await?)
}

async fn target(dispatcher: &Dispatcher, request: &ConnectorRequest) -> Result<FullPath, ApiError> {
    parse(dispatcher, "target", request.required("target")?).await
}

async fn targets(dispatcher: &Dispatcher, request: &ConnectorRequest) -> Result<Vec<FullPath>, ApiError> {
    let tokens = request.values("targets");
    if tokens.is_empty() {
        return Err(ApiError::MissingParameter("targets"));
    }

    let mut paths = Vec::with_capacity(tokens.len());
    for token in tokens {
        paths.push(parse(dispatcher, "targets", token).await?);
    }
    Ok(paths)
}

fn file_response(content: FileContent, download: bool) -> Response {
    let disposition = if download { "attachment" } else { "inline" };
    let filename: String = content
        .name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content.mime_type),
            (
                header::CONTENT_DISPOSITION,
                format!("{}; filename=\"{}\"", disposition, filename),
            ),
        ],
        content.data,
    )
        .into_response()
}
