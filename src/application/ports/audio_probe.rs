//! Audio Probe Port - 输入音频可读性探测
//!
//! 编排层在调用模型契约之前用它验证参考/源音频可读，
//! 不可读即以 AudioIoError 失败，避免引擎侧半途而废。

use std::path::Path;
use thiserror::Error;

/// 输入音频错误
#[derive(Debug, Error)]
pub enum AudioIoError {
    #[error("Audio file not found: {0}")]
    NotFound(String),

    #[error("Audio file unreadable: {0}")]
    Unreadable(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),
}

/// 音频文件基本信息
#[derive(Debug, Clone)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub channels: u8,
    pub duration_ms: u64,
}

/// Audio Probe Port
pub trait AudioProbePort: Send + Sync {
    /// 探测音频文件，返回基本信息；文件缺失或无法解析时报错
    fn probe(&self, path: &Path) -> Result<AudioInfo, AudioIoError>;
}
