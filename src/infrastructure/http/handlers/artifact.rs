//! Artifact Handler - 下载口味最新产物

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::domain::generation::ModelFlavor;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 流式下载该口味的固定产物文件
pub async fn download_artifact(
    State(state): State<Arc<AppState>>,
    Path(flavor): Path<String>,
) -> Result<Response, ApiError> {
    let flavor = ModelFlavor::from_str(&flavor)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown flavor: {}", flavor)))?;

    let artifact_path = state.artifact_store.artifact_path(flavor);
    if !artifact_path.exists() {
        return Err(ApiError::NotFound(format!(
            "No artifact generated yet for flavor: {}",
            flavor
        )));
    }

    let file = tokio::fs::File::open(&artifact_path)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to open artifact: {}", e)))?;

    let metadata = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to get file metadata: {}", e)))?;

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/wav")
        .header(header::CONTENT_LENGTH, metadata.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", flavor.artifact_file_name()),
        )
        .body(body)
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
