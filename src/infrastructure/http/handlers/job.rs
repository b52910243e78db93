//! Job Handlers - 任务状态查询与撤回

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::{
    ApiResponse, JobStatusDto, JobStatusRequest, WithdrawDto, WithdrawRequest,
};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

#[derive(Debug, serde::Serialize)]
pub struct JobStatusListDto {
    pub jobs: Vec<JobStatusDto>,
}

/// 查询任务状态
pub async fn query_job_status(
    State(state): State<Arc<AppState>>,
    Json(req): Json<JobStatusRequest>,
) -> Result<Json<ApiResponse<JobStatusListDto>>, ApiError> {
    let jobs = req
        .job_ids
        .iter()
        .filter_map(|id| state.tracker.get(*id))
        .map(|record| JobStatusDto::from_record(&record))
        .collect();

    Ok(Json(ApiResponse::success(JobStatusListDto { jobs })))
}

/// 撤回排队中的任务
///
/// 已开始执行的任务不可撤回，返回 withdrawn = false
pub async fn withdraw_job(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WithdrawRequest>,
) -> Result<Json<ApiResponse<WithdrawDto>>, ApiError> {
    if state.tracker.get(req.job_id).is_none() {
        return Err(ApiError::NotFound(format!("Job not found: {}", req.job_id)));
    }

    let withdrawn = state.tracker.withdraw(req.job_id);

    Ok(Json(ApiResponse::success(WithdrawDto {
        job_id: req.job_id,
        withdrawn,
    })))
}
