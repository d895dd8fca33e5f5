use crate::errors::ApiError;
use crate::handlers::models::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

/// Serves a thumbnail by the hash published in the `tmb` field of a file entry
pub async fn serve_thumbnail(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Response, ApiError> {
    tracing::debug!("serve_thumbnail: hash = '{}'", hash);

    let thumbnail = state.dispatcher.thumbnails().get_or_generate(&hash).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, thumbnail.mime_type),
            (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
        ],
        thumbnail.data,
    )
        .into_response())
}
