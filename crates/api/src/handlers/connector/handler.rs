use super::dispatch::execute;
use super::parser::ConnectorRequest;
use crate::errors::ApiError;
use crate::handlers::models::AppState;
use axum::{
    extract::{FromRequest, Multipart, Query, Request, State},
    http::header,
    response::Response,
    Form,
};

pub async fn connector_get(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    execute(&state.dispatcher, ConnectorRequest::from_pairs(pairs)).await
}

/// Accepts url-encoded forms and multipart uploads; query parameters are merged in
pub async fn connector_post(
    State(state): State<AppState>,
    Query(pairs): Query<Vec<(String, String)>>,
    request: Request,
) -> Result<Response, ApiError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    let mut connector_request = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| ApiError::MalformedRequest(e.body_text()))?;
        ConnectorRequest::from_multipart(multipart).await?
    } else {
        let Form(body) = Form::<Vec<(String, String)>>::from_request(request, &state)
            .await
            .map_err(|e| ApiError::MalformedRequest(e.body_text()))?;
        ConnectorRequest::from_pairs(body)
    };

    connector_request.extend(pairs);
    tracing::debug!(
        "connector_post: multipart = {}, uploads = {}",
        is_multipart,
        connector_request.uploads().len()
    );

    execute(&state.dispatcher, connector_request).await
}
