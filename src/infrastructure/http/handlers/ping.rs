//! Ping Handler - 健康检查
//!
//! 上报模型生命周期状态与每口味队列统计

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::domain::generation::ModelFlavor;
use crate::infrastructure::http::dto::ApiResponse;
use crate::infrastructure::http::state::AppState;
use crate::infrastructure::queue::QueueStats;

#[derive(Debug, Serialize)]
pub struct ModelStatusDto {
    pub tts: &'static str,
    pub vc: &'static str,
}

#[derive(Debug, Serialize)]
pub struct QueueStatusDto {
    pub tts: QueueStats,
    pub vc: QueueStats,
}

#[derive(Debug, Serialize)]
pub struct PingDto {
    pub status: &'static str,
    pub version: &'static str,
    pub models: ModelStatusDto,
    pub queues: QueueStatusDto,
}

/// Ping endpoint - 健康检查
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<ApiResponse<PingDto>> {
    let tts_state = state.tts_provider.state().await;
    let vc_state = state.vc_provider.state().await;

    Json(ApiResponse::success(PingDto {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        models: ModelStatusDto {
            tts: tts_state.as_str(),
            vc: vc_state.as_str(),
        },
        queues: QueueStatusDto {
            tts: state.tracker.stats(ModelFlavor::Tts),
            vc: state.tracker.stats(ModelFlavor::Vc),
        },
    }))
}
