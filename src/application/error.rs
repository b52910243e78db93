//! 应用层错误定义
//!
//! 生成流水线的统一错误类型；模型契约错误原样向上传播

use thiserror::Error;

use crate::application::ports::{ArtifactError, AudioIoError, EngineError, ModelLoadError};
use crate::domain::generation::GenerationRuleError;

/// 应用层错误
///
/// 结果是全有或全无的：任何一步失败都在落盘之前中止，
/// 不会留下部分产物
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 参数校验失败（拒绝而非钳制）
    #[error("Validation error: {0}")]
    Validation(#[from] GenerationRuleError),

    /// 模型加载失败（下一次请求会重新尝试加载）
    #[error("Model load failed: {0}")]
    ModelLoad(#[from] ModelLoadError),

    /// 输入音频不可读
    #[error("Audio IO error: {0}")]
    AudioIo(#[from] AudioIoError),

    /// 模型契约调用失败
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// 产物写入失败
    #[error("Artifact store error: {0}")]
    Artifact(#[from] ArtifactError),
}
