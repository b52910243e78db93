//! Fake Engines - 进程内确定性引擎
//!
//! 不加载真实权重，用共享采样器合成确定性波形。
//! 用于测试与无推理侧车的本地运行（engine.kind = "fake"）。

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::application::ports::{EngineError, TtsEnginePort, TtsGeneration, VcEnginePort};
use crate::application::sampling::SharedSampler;

/// Fake 引擎配置
#[derive(Debug, Clone)]
pub struct FakeEngineConfig {
    /// 模型原生采样率
    pub sample_rate: u32,
    /// 模拟推理延迟（毫秒）
    pub latency_ms: u64,
}

impl Default for FakeEngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 24000,
            latency_ms: 20,
        }
    }
}

/// Fake TTS 引擎
///
/// 波形 = 由文本和参数决定的基频音 + 共享采样器抽取的噪声。
/// 重播种后输出逐比特可复现；seed = 0 时噪声来自环境熵。
pub struct FakeTtsEngine {
    config: FakeEngineConfig,
    sampler: Arc<SharedSampler>,
}

impl FakeTtsEngine {
    pub fn new(config: FakeEngineConfig, sampler: Arc<SharedSampler>) -> Self {
        tracing::info!(
            sample_rate = config.sample_rate,
            latency_ms = config.latency_ms,
            "FakeTtsEngine initialized"
        );
        Self { config, sampler }
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsEngine {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    async fn generate(&self, request: TtsGeneration) -> Result<Vec<f32>, EngineError> {
        tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;

        // 基频与相位由文本（和可选参考音频内容）决定
        let text_digest = md5::compute(request.text.as_bytes());
        let mut tone_key = u32::from_le_bytes([
            text_digest[0],
            text_digest[1],
            text_digest[2],
            text_digest[3],
        ]);

        if let Some(reference) = request.reference_audio.as_deref() {
            let bytes = std::fs::read(reference).map_err(|e| {
                EngineError::GenerationFailed(format!(
                    "reference audio {}: {}",
                    reference.display(),
                    e
                ))
            })?;
            let ref_digest = md5::compute(&bytes);
            tone_key ^= u32::from_le_bytes([ref_digest[0], ref_digest[1], ref_digest[2], ref_digest[3]]);
        }

        let frequency = 80.0 + (tone_key % 400) as f32;
        let phase = request.min_p + request.top_p + request.repetition_penalty;

        // cfg_weight 越大语速越快（时长越短）
        let ms_per_char = 60.0 / (0.5 + request.cfg_weight);
        let duration_ms = (request.text.chars().count() as f32 * ms_per_char).max(100.0);
        let num_samples = (duration_ms / 1000.0 * self.config.sample_rate as f32) as usize;

        let mut noise = vec![0.0f32; num_samples];
        self.sampler.fill_f32(&mut noise).await;

        let amplitude = (0.3 * request.exaggeration).min(0.9);
        let noise_gain = 0.05 * request.temperature;

        let samples = noise
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let t = i as f32 / self.config.sample_rate as f32;
                let tone = (2.0 * std::f32::consts::PI * frequency * t + phase).sin();
                (amplitude * tone + noise_gain * (n * 2.0 - 1.0)).clamp(-1.0, 1.0)
            })
            .collect();

        Ok(samples)
    }
}

/// Fake VC 引擎
///
/// 输出完全由两个输入文件的内容决定（VC 不接受随机性旋钮）
pub struct FakeVcEngine {
    config: FakeEngineConfig,
}

impl FakeVcEngine {
    pub fn new(config: FakeEngineConfig) -> Self {
        tracing::info!(
            sample_rate = config.sample_rate,
            latency_ms = config.latency_ms,
            "FakeVcEngine initialized"
        );
        Self { config }
    }
}

#[async_trait]
impl VcEnginePort for FakeVcEngine {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    async fn generate(
        &self,
        source_audio: &Path,
        target_voice: &Path,
    ) -> Result<Vec<f32>, EngineError> {
        tokio::time::sleep(tokio::time::Duration::from_millis(self.config.latency_ms)).await;

        let source = std::fs::read(source_audio).map_err(|e| {
            EngineError::GenerationFailed(format!("{}: {}", source_audio.display(), e))
        })?;
        let target = std::fs::read(target_voice).map_err(|e| {
            EngineError::GenerationFailed(format!("{}: {}", target_voice.display(), e))
        })?;

        let source_digest = md5::compute(&source);
        let target_digest = md5::compute(&target);
        let frequency = 80.0
            + (u32::from_le_bytes([
                target_digest[0],
                target_digest[1],
                target_digest[2],
                target_digest[3],
            ]) % 400) as f32;
        let phase = (source_digest[0] as f32 / 255.0) * std::f32::consts::PI;

        // 时长跟随源音频数据量
        let num_samples = (source.len() / 4).clamp(1000, self.config.sample_rate as usize * 30);

        let samples = (0..num_samples)
            .map(|i| {
                let t = i as f32 / self.config.sample_rate as f32;
                0.3 * (2.0 * std::f32::consts::PI * frequency * t + phase).sin()
            })
            .collect();

        Ok(samples)
    }
}
