//! Data Transfer Objects
//!
//! 请求字段与 GenerationRequest 一一对应；数值默认值与原 UI 默认一致

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

use crate::application::services::GenerationOutput;
use crate::domain::generation::{ConvertCommand, SynthesizeCommand, TtsParams};
use crate::infrastructure::queue::JobRecord;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// TTS DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TtsGenerateRequest {
    /// 要合成的文本
    pub text: String,
    /// 参考音频路径（可选）
    pub reference_audio: Option<String>,
    #[serde(default = "default_exaggeration")]
    pub exaggeration: f32,
    #[serde(default = "default_cfg_weight")]
    pub cfg_weight: f32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_min_p")]
    pub min_p: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_repetition_penalty")]
    pub repetition_penalty: f32,
    /// 随机种子（0 表示随机）
    #[serde(default)]
    pub seed: u64,
}

fn default_exaggeration() -> f32 {
    0.5
}

fn default_cfg_weight() -> f32 {
    0.5
}

fn default_temperature() -> f32 {
    0.8
}

fn default_min_p() -> f32 {
    0.05
}

fn default_top_p() -> f32 {
    1.0
}

fn default_repetition_penalty() -> f32 {
    1.2
}

impl TtsGenerateRequest {
    pub fn into_command(self) -> SynthesizeCommand {
        SynthesizeCommand {
            text: self.text,
            reference_audio: self.reference_audio.map(PathBuf::from),
            params: TtsParams {
                exaggeration: self.exaggeration,
                cfg_weight: self.cfg_weight,
                temperature: self.temperature,
                min_p: self.min_p,
                top_p: self.top_p,
                repetition_penalty: self.repetition_penalty,
                seed: self.seed,
            },
        }
    }
}

// ============================================================================
// VC DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct VcGenerateRequest {
    /// 源语音路径
    pub source_audio: String,
    /// 目标音色参考音频路径
    pub target_voice: String,
}

impl VcGenerateRequest {
    pub fn into_command(self) -> ConvertCommand {
        ConvertCommand {
            source_audio: PathBuf::from(self.source_audio),
            target_voice: PathBuf::from(self.target_voice),
        }
    }
}

// ============================================================================
// 结果 DTOs
// ============================================================================

/// 同步生成结果
#[derive(Debug, Serialize)]
pub struct GenerationDto {
    pub job_id: Uuid,
    pub sample_rate: u32,
    pub num_samples: usize,
    pub duration_ms: u64,
    /// 固定产物路径（每次生成取代前一次）
    pub artifact_path: String,
}

impl GenerationDto {
    pub fn from_output(job_id: Uuid, output: &GenerationOutput) -> Self {
        Self {
            job_id,
            sample_rate: output.sample_rate,
            num_samples: output.samples.len(),
            duration_ms: output.duration_ms(),
            artifact_path: output.artifact_path.display().to_string(),
        }
    }
}

/// 异步提交结果
#[derive(Debug, Serialize)]
pub struct SubmitDto {
    pub job_id: Uuid,
    pub state: String,
}

// ============================================================================
// Job DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct JobStatusRequest {
    pub job_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct JobStatusDto {
    pub job_id: Uuid,
    pub flavor: String,
    pub state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl JobStatusDto {
    pub fn from_record(record: &JobRecord) -> Self {
        Self {
            job_id: record.job_id,
            flavor: record.flavor.as_str().to_string(),
            state: record.state.as_str().to_string(),
            error: record.error.clone(),
            artifact_path: record
                .artifact_path
                .as_ref()
                .map(|p| p.display().to_string()),
            duration_ms: record.duration_ms,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub job_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct WithdrawDto {
    pub job_id: Uuid,
    /// 是否成功撤回（已开始执行的任务不可撤回）
    pub withdrawn: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tts_request_defaults_mirror_ui() {
        let req: TtsGenerateRequest = serde_json::from_str(r#"{"text": "hello"}"#).unwrap();
        assert_eq!(req.exaggeration, 0.5);
        assert_eq!(req.cfg_weight, 0.5);
        assert_eq!(req.temperature, 0.8);
        assert_eq!(req.min_p, 0.05);
        assert_eq!(req.top_p, 1.0);
        assert_eq!(req.repetition_penalty, 1.2);
        assert_eq!(req.seed, 0);

        let cmd = req.into_command();
        assert_eq!(cmd.text, "hello");
        assert!(cmd.reference_audio.is_none());
        assert!(cmd.params.validate().is_ok());
    }

    #[test]
    fn test_tts_request_explicit_fields() {
        let req: TtsGenerateRequest = serde_json::from_str(
            r#"{"text": "hi", "reference_audio": "/audio/ref.wav", "seed": 42, "temperature": 1.5}"#,
        )
        .unwrap();
        let cmd = req.into_command();
        assert_eq!(cmd.params.seed, 42);
        assert_eq!(cmd.params.temperature, 1.5);
        assert_eq!(
            cmd.reference_audio,
            Some(PathBuf::from("/audio/ref.wav"))
        );
    }
}
