//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping              GET   健康检查（模型状态 + 队列统计）
//! - /api/tts/generate      POST  同步 TTS 生成（排队等待结果）
//! - /api/tts/submit        POST  异步 TTS 提交（立即返回 job_id）
//! - /api/vc/generate       POST  同步音色转换
//! - /api/vc/submit         POST  异步音色转换提交
//! - /api/job/status        POST  查询任务状态
//! - /api/job/withdraw      POST  撤回排队中的任务
//! - /api/artifact/{flavor} GET   下载该口味最新产物（WAV）

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/tts", tts_routes())
        .nest("/vc", vc_routes())
        .nest("/job", job_routes())
        .route("/artifact/:flavor", get(handlers::download_artifact))
}

/// TTS 路由
fn tts_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(handlers::generate_tts))
        .route("/submit", post(handlers::submit_tts))
}

/// VC 路由
fn vc_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate", post(handlers::generate_vc))
        .route("/submit", post(handlers::submit_vc))
}

/// Job 路由
fn job_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/status", post(handlers::query_job_status))
        .route("/withdraw", post(handlers::withdraw_job))
}
