//! Speech Engine Ports - 生成模型契约抽象
//!
//! 定义两种模型口味的外部协作者接口（TTS / VC），具体实现在
//! infrastructure/engines 层。契约签名是固定的：不包含 seed ——
//! 确定性播种通过进程级共享采样器在调用前完成。

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// 模型加载错误
///
/// 加载失败不会永久拒绝该口味：下一次请求会重新尝试加载
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("Pretrained weights unreachable: {0}")]
    WeightsUnreachable(String),

    #[error("Unsupported compute device: {0}")]
    UnsupportedDevice(String),

    #[error("Engine initialization failed: {0}")]
    InitFailed(String),
}

/// 引擎错误（模型契约调用失败，原样向上传播，不自动重试）
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// TTS 生成调用参数
///
/// 与模型契约一一对应；数值范围由上游校验
#[derive(Debug, Clone)]
pub struct TtsGeneration {
    pub text: String,
    pub reference_audio: Option<PathBuf>,
    pub exaggeration: f32,
    pub temperature: f32,
    pub cfg_weight: f32,
    pub min_p: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
}

/// TTS Engine Port
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    /// 模型原生采样率
    fn sample_rate(&self) -> u32;

    /// 执行生成，返回模型原生采样率下的单声道波形
    async fn generate(&self, request: TtsGeneration) -> Result<Vec<f32>, EngineError>;
}

/// VC Engine Port
#[async_trait]
pub trait VcEnginePort: Send + Sync {
    /// 模型原生采样率
    fn sample_rate(&self) -> u32;

    /// 把 source_audio 的语音内容转换为 target_voice 的音色
    async fn generate(
        &self,
        source_audio: &Path,
        target_voice: &Path,
    ) -> Result<Vec<f32>, EngineError>;
}

/// 已加载的 TTS 模型句柄（进程生命周期内的单例）
pub type TtsHandle = Arc<dyn TtsEnginePort>;

/// 已加载的 VC 模型句柄
pub type VcHandle = Arc<dyn VcEnginePort>;
