//! Generation Context - Value Objects

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::errors::GenerationRuleError;

/// 模型口味
///
/// 每个进程每种口味最多持有一个已加载的模型实例
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFlavor {
    /// 文本转语音
    Tts,
    /// 音色转换
    Vc,
}

impl ModelFlavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelFlavor::Tts => "tts",
            ModelFlavor::Vc => "vc",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "tts" => Some(ModelFlavor::Tts),
            "vc" => Some(ModelFlavor::Vc),
            _ => None,
        }
    }

    /// 该口味的固定产物文件名（覆盖写语义，每次生成取代前一次）
    pub fn artifact_file_name(&self) -> &'static str {
        match self {
            ModelFlavor::Tts => "generated_tts.wav",
            ModelFlavor::Vc => "generated_vc.wav",
        }
    }
}

impl std::fmt::Display for ModelFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 文本长度软上限（字符数）
///
/// 超出仅告警，不拒绝
pub const TEXT_SOFT_LIMIT: usize = 300;

/// TTS 采样控制参数
///
/// 不变量:
/// - seed = 0 表示使用环境熵；seed != 0 表示调用前对共享采样器做确定性重播种
/// - 所有数值越界即拒绝，绝不悄悄钳制
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsParams {
    /// 夸张度 (0.25 - 2.0)
    pub exaggeration: f32,
    /// 语速/CFG 权重 (0.0 - 1.0)
    pub cfg_weight: f32,
    /// 采样温度 (0.05 - 5.0)
    pub temperature: f32,
    /// Min P (0.0 - 1.0)
    pub min_p: f32,
    /// Top P (0.0 - 1.0)
    pub top_p: f32,
    /// 重复惩罚 (1.0 - 2.0)
    pub repetition_penalty: f32,
    /// 随机种子（0 表示随机）
    pub seed: u64,
}

impl Default for TtsParams {
    fn default() -> Self {
        Self {
            exaggeration: 0.5,
            cfg_weight: 0.5,
            temperature: 0.8,
            min_p: 0.05,
            top_p: 1.0,
            repetition_penalty: 1.2,
            seed: 0,
        }
    }
}

impl TtsParams {
    pub fn validate(&self) -> Result<(), GenerationRuleError> {
        check_range("exaggeration", self.exaggeration, 0.25, 2.0)?;
        check_range("cfg_weight", self.cfg_weight, 0.0, 1.0)?;
        check_range("temperature", self.temperature, 0.05, 5.0)?;
        check_range("min_p", self.min_p, 0.0, 1.0)?;
        check_range("top_p", self.top_p, 0.0, 1.0)?;
        check_range("repetition_penalty", self.repetition_penalty, 1.0, 2.0)?;
        Ok(())
    }
}

fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<(), GenerationRuleError> {
    if !value.is_finite() || !(min..=max).contains(&value) {
        return Err(GenerationRuleError::ParamOutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// TTS 生成请求
#[derive(Debug, Clone)]
pub struct SynthesizeCommand {
    /// 要合成的文本
    pub text: String,
    /// 参考音频路径（音色/风格条件，可选）
    pub reference_audio: Option<PathBuf>,
    /// 采样控制参数
    pub params: TtsParams,
}

impl SynthesizeCommand {
    pub fn validate(&self) -> Result<(), GenerationRuleError> {
        if self.text.trim().is_empty() {
            return Err(GenerationRuleError::EmptyText);
        }
        self.params.validate()
    }

    /// 文本是否超过软上限（仅用于告警）
    pub fn exceeds_soft_limit(&self) -> bool {
        self.text.chars().count() > TEXT_SOFT_LIMIT
    }
}

/// VC 生成请求
#[derive(Debug, Clone)]
pub struct ConvertCommand {
    /// 源语音路径
    pub source_audio: PathBuf,
    /// 目标音色参考音频路径
    pub target_voice: PathBuf,
}

/// 生成波形
///
/// 单声道 f32 采样，范围 [-1.0, 1.0]，采样率由模型句柄给出
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 波形时长（毫秒）
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.samples.len() as u64 * 1000) / self.sample_rate as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(TtsParams::default().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_is_rejected_not_clamped() {
        let mut params = TtsParams::default();
        params.exaggeration = 2.5;
        let err = params.validate().unwrap_err();
        match err {
            GenerationRuleError::ParamOutOfRange { name, .. } => {
                assert_eq!(name, "exaggeration");
            }
            other => panic!("unexpected error: {other}"),
        }

        let mut params = TtsParams::default();
        params.repetition_penalty = 0.9;
        assert!(params.validate().is_err());

        let mut params = TtsParams::default();
        params.temperature = f32::NAN;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_empty_text_is_rejected() {
        let cmd = SynthesizeCommand {
            text: "   ".to_string(),
            reference_audio: None,
            params: TtsParams::default(),
        };
        assert!(matches!(
            cmd.validate(),
            Err(GenerationRuleError::EmptyText)
        ));
    }

    #[test]
    fn test_soft_limit_is_advisory() {
        let cmd = SynthesizeCommand {
            text: "a".repeat(TEXT_SOFT_LIMIT + 1),
            reference_audio: None,
            params: TtsParams::default(),
        };
        // 超长文本不是硬错误
        assert!(cmd.validate().is_ok());
        assert!(cmd.exceeds_soft_limit());
    }

    #[test]
    fn test_flavor_artifact_names() {
        assert_eq!(ModelFlavor::Tts.artifact_file_name(), "generated_tts.wav");
        assert_eq!(ModelFlavor::Vc.artifact_file_name(), "generated_vc.wav");
        assert_eq!(ModelFlavor::from_str("tts"), Some(ModelFlavor::Tts));
        assert_eq!(ModelFlavor::from_str("flac"), None);
    }

    #[test]
    fn test_waveform_duration() {
        let wave = Waveform::new(vec![0.0; 24000], 24000);
        assert_eq!(wave.duration_ms(), 1000);
        assert_eq!(Waveform::new(vec![], 24000).duration_ms(), 0);
    }
}
