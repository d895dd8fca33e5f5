use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use blobfinder_cache::ThumbnailError;
use blobfinder_driver::DriverError;
use blobfinder_models::ErrorResponse;
use blobfinder_volumes::VolumeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error(transparent)]
    DriverError(#[from] DriverError),

    #[error(transparent)]
    VolumeError(#[from] VolumeError),

    #[error(transparent)]
    ThumbnailError(#[from] ThumbnailError),
}

impl ApiError {
    /// Status code and client error code (plus optional argument)
    fn classify(&self) -> (StatusCode, &'static str, Option<String>) {
        match self {
            ApiError::UnknownCommand(cmd) => (StatusCode::BAD_REQUEST, "errUnknownCmd", Some(cmd.clone())),
            ApiError::MissingParameter(name) => (StatusCode::BAD_REQUEST, "errCmdParams", Some(name.to_string())),
            ApiError::InvalidParameter { name, .. } => {
                (StatusCode::BAD_REQUEST, "errCmdParams", Some(name.to_string()))
            }
            ApiError::MalformedRequest(_) => (StatusCode::BAD_REQUEST, "errCmdParams", None),
            ApiError::VolumeError(VolumeError::InvalidToken(_)) => {
                (StatusCode::NOT_FOUND, "errFileNotFound", None)
            }
            ApiError::VolumeError(VolumeError::NoRoots) => (StatusCode::INTERNAL_SERVER_ERROR, "errConf", None),
            ApiError::VolumeError(VolumeError::StorageError(e)) => storage_status(e.is_transient()),
            ApiError::ThumbnailError(ThumbnailError::InvalidHash(_))
            | ApiError::ThumbnailError(ThumbnailError::SourceNotFound(_)) => {
                (StatusCode::NOT_FOUND, "errFileNotFound", None)
            }
            ApiError::ThumbnailError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "errUnknown", None),
            ApiError::DriverError(e) => classify_driver(e),
        }
    }
}

fn storage_status(transient: bool) -> (StatusCode, &'static str, Option<String>) {
    if transient {
        (StatusCode::SERVICE_UNAVAILABLE, "errUnknown", None)
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "errUnknown", None)
    }
}

fn classify_driver(error: &DriverError) -> (StatusCode, &'static str, Option<String>) {
    match error {
        DriverError::NotSupportedFormat(f) => (StatusCode::BAD_REQUEST, "errArcType", Some(f.clone())),
        DriverError::NameSelectionExhausted(n) => (StatusCode::CONFLICT, "errNewNameSelection", Some(n.clone())),
        DriverError::UploadTooLarge(n) => (StatusCode::PAYLOAD_TOO_LARGE, "errUploadFileSize", Some(n.clone())),
        DriverError::NotFound(_) => (StatusCode::NOT_FOUND, "errFileNotFound", None),
        DriverError::Forbidden(_) => (StatusCode::FORBIDDEN, "errPerm", None),
        DriverError::NotImplemented(cmd) => (StatusCode::NOT_IMPLEMENTED, "errCmdNoSupport", Some(cmd.to_string())),
        DriverError::InvalidName(n) => (StatusCode::BAD_REQUEST, "errInvName", Some(n.clone())),
        DriverError::AlreadyExists(n) => (StatusCode::CONFLICT, "errExists", Some(n.clone())),
        DriverError::ExtractEntry { entry, source } => {
            let (status, _, _) = classify_driver(source);
            (status, "errExtract", Some(entry.clone()))
        }
        DriverError::VolumeError(VolumeError::InvalidToken(_)) => (StatusCode::NOT_FOUND, "errFileNotFound", None),
        DriverError::ImageError(_) => (StatusCode::UNPROCESSABLE_ENTITY, "errResize", None),
        other => storage_status(other.is_transient()),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, argument) = self.classify();

        if status.is_server_error() {
            tracing::error!("Command failed: {}", self);
        } else {
            tracing::warn!("Command rejected: {}", self);
        }

        let mut error = vec![code.to_string()];
        error.extend(argument);

        (status, Json(ErrorResponse { error })).into_response()
    }
}
