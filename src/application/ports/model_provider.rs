//! Model Provider Port - 模型生命周期抽象
//!
//! 每个口味一个提供者，负责懒加载/预热与单飞合并，
//! 向编排层出借进程级单例句柄

use async_trait::async_trait;
use serde::Serialize;

use super::speech_engine::ModelLoadError;
use crate::domain::generation::ModelFlavor;

/// 模型生命周期状态
///
/// 状态机: Unloaded -> Loading -> Ready | Failed，Failed 可由后续调用重试
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelState {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

impl ModelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelState::Unloaded => "unloaded",
            ModelState::Loading => "loading",
            ModelState::Ready => "ready",
            ModelState::Failed => "failed",
        }
    }
}

/// Model Provider Port
#[async_trait]
pub trait ModelProviderPort<H>: Send + Sync {
    /// 返回就绪句柄；未加载时触发加载，并发调用合并为一次底层加载
    async fn resolve(&self) -> Result<H, ModelLoadError>;

    /// 当前生命周期状态快照
    async fn state(&self) -> ModelState;

    /// 提供者负责的口味
    fn flavor(&self) -> ModelFlavor;
}
