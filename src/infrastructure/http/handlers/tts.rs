//! TTS Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::{
    ApiResponse, GenerationDto, SubmitDto, TtsGenerateRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 同步生成：排队并等待结果
///
/// 生成在 worker 任务中执行，本 handler 只是挂起等待，
/// 不会阻塞接受/排队环节
pub async fn generate_tts(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TtsGenerateRequest>,
) -> Result<Json<ApiResponse<GenerationDto>>, ApiError> {
    let ticket = state.tts_queue.submit(req.into_command())?;
    let job_id = ticket.job_id();

    let output = ticket.outcome().await?;

    Ok(Json(ApiResponse::success(GenerationDto::from_output(
        job_id, &output,
    ))))
}

/// 异步提交：立即返回 job_id，结果通过 /api/job/status 查询
pub async fn submit_tts(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TtsGenerateRequest>,
) -> Result<Json<ApiResponse<SubmitDto>>, ApiError> {
    let ticket = state.tts_queue.submit(req.into_command())?;
    let job_id = ticket.job_id();

    // 结果由追踪器记录；这里放弃票据即可
    drop(ticket);

    Ok(Json(ApiResponse::success(SubmitDto {
        job_id,
        state: "queued".to_string(),
    })))
}
