//! VC Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::{ApiResponse, GenerationDto, SubmitDto, VcGenerateRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 同步音色转换：排队并等待结果
pub async fn generate_vc(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VcGenerateRequest>,
) -> Result<Json<ApiResponse<GenerationDto>>, ApiError> {
    let ticket = state.vc_queue.submit(req.into_command())?;
    let job_id = ticket.job_id();

    let output = ticket.outcome().await?;

    Ok(Json(ApiResponse::success(GenerationDto::from_output(
        job_id, &output,
    ))))
}

/// 异步音色转换提交
pub async fn submit_vc(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VcGenerateRequest>,
) -> Result<Json<ApiResponse<SubmitDto>>, ApiError> {
    let ticket = state.vc_queue.submit(req.into_command())?;
    let job_id = ticket.job_id();

    drop(ticket);

    Ok(Json(ApiResponse::success(SubmitDto {
        job_id,
        state: "queued".to_string(),
    })))
}
