//! HTTP Engines - 调用外部推理侧车的引擎适配器
//!
//! `connect` 握手对应 from_pretrained：解析模型原生采样率并确认
//! 服务可达，失败报 ModelLoadError。生成调用不做自动重试。
//!
//! 侧车 API:
//! GET  {base}/api/model/info?flavor=tts|vc       -> {"sample_rate": u32, "device": "..."}
//! POST {base}/api/tts/generate                   -> audio/wav binary
//! POST {base}/api/vc/generate                    -> audio/wav binary

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{
    EngineError, ModelLoadError, TtsEnginePort, TtsGeneration, VcEnginePort,
};
use crate::application::sampling::SharedSampler;
use crate::domain::generation::ModelFlavor;
use crate::infrastructure::audio::decode_wav;
use crate::infrastructure::runtime::Device;

/// HTTP 引擎配置
#[derive(Debug, Clone)]
pub struct HttpEngineConfig {
    /// 推理侧车基础 URL
    pub base_url: String,
    /// 生成请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpEngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 300,
        }
    }
}

impl HttpEngineConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    fn info_url(&self, flavor: ModelFlavor) -> String {
        format!("{}/api/model/info?flavor={}", self.base_url, flavor)
    }

    fn generate_url(&self, flavor: ModelFlavor) -> String {
        format!("{}/api/{}/generate", self.base_url, flavor)
    }
}

/// 握手响应
#[derive(Debug, Deserialize)]
struct ModelInfoDto {
    sample_rate: u32,
}

/// 创建带超时的客户端并执行握手
async fn handshake(
    config: &HttpEngineConfig,
    flavor: ModelFlavor,
    device: Device,
) -> Result<(Client, u32), ModelLoadError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| ModelLoadError::InitFailed(e.to_string()))?;

    let response = client
        .get(config.info_url(flavor))
        .timeout(Duration::from_secs(10))
        .send()
        .await
        .map_err(|e| {
            ModelLoadError::WeightsUnreachable(format!(
                "inference sidecar unreachable at {}: {}",
                config.base_url, e
            ))
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ModelLoadError::WeightsUnreachable(format!(
            "HTTP {}: {}",
            status, body
        )));
    }

    let info: ModelInfoDto = response
        .json()
        .await
        .map_err(|e| ModelLoadError::InitFailed(format!("invalid model info: {}", e)))?;

    tracing::info!(
        flavor = %flavor,
        device = %device,
        sample_rate = info.sample_rate,
        "HTTP engine connected"
    );

    Ok((client, info.sample_rate))
}

fn map_send_error(e: reqwest::Error) -> EngineError {
    if e.is_timeout() {
        EngineError::Timeout
    } else if e.is_connect() {
        EngineError::NetworkError(format!("Cannot connect to inference sidecar: {}", e))
    } else {
        EngineError::NetworkError(e.to_string())
    }
}

async fn read_waveform(response: reqwest::Response) -> Result<Vec<f32>, EngineError> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(EngineError::ServiceError(format!(
            "HTTP {}: {}",
            status, error_text
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| EngineError::InvalidResponse(format!("Failed to read audio: {}", e)))?;

    let decoded = decode_wav(&bytes)
        .map_err(|e| EngineError::InvalidResponse(format!("Bad WAV payload: {}", e)))?;

    // 多声道响应平均为单声道
    let samples = if decoded.channels > 1 {
        let ch = decoded.channels as usize;
        decoded
            .samples
            .chunks(ch)
            .map(|frame| frame.iter().sum::<f32>() / ch as f32)
            .collect()
    } else {
        decoded.samples
    };

    Ok(samples)
}

// ============================================================================
// TTS
// ============================================================================

/// TTS 生成请求体 (JSON)
#[derive(Debug, Serialize)]
struct TtsHttpRequest {
    text: String,
    reference_audio: Option<String>,
    exaggeration: f32,
    temperature: f32,
    cfg_weight: f32,
    min_p: f32,
    top_p: f32,
    repetition_penalty: f32,
    /// 侧车采样种子，取自进程级共享采样器：
    /// 重播种由此穿过契约边界到达侧车
    nonce: u64,
}

/// HTTP TTS 引擎
pub struct HttpTtsEngine {
    client: Client,
    config: HttpEngineConfig,
    sample_rate: u32,
    sampler: Arc<SharedSampler>,
}

impl HttpTtsEngine {
    /// 连接侧车并解析模型信息
    pub async fn connect(
        config: HttpEngineConfig,
        device: Device,
        sampler: Arc<SharedSampler>,
    ) -> Result<Self, ModelLoadError> {
        let (client, sample_rate) = handshake(&config, ModelFlavor::Tts, device).await?;
        Ok(Self {
            client,
            config,
            sample_rate,
            sampler,
        })
    }
}

#[async_trait]
impl TtsEnginePort for HttpTtsEngine {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    async fn generate(&self, request: TtsGeneration) -> Result<Vec<f32>, EngineError> {
        let nonce = self.sampler.next_u64().await;
        let body = TtsHttpRequest {
            text: request.text,
            reference_audio: request
                .reference_audio
                .map(|p| p.to_string_lossy().into_owned()),
            exaggeration: request.exaggeration,
            temperature: request.temperature,
            cfg_weight: request.cfg_weight,
            min_p: request.min_p,
            top_p: request.top_p,
            repetition_penalty: request.repetition_penalty,
            nonce,
        };

        tracing::debug!(
            url = %self.config.generate_url(ModelFlavor::Tts),
            text_len = body.text.len(),
            "Sending TTS generate request"
        );

        let response = self
            .client
            .post(self.config.generate_url(ModelFlavor::Tts))
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        read_waveform(response).await
    }
}

// ============================================================================
// VC
// ============================================================================

/// VC 生成请求体 (JSON)
#[derive(Debug, Serialize)]
struct VcHttpRequest {
    source_audio: String,
    target_voice: String,
}

/// HTTP VC 引擎
#[derive(Debug)]
pub struct HttpVcEngine {
    client: Client,
    config: HttpEngineConfig,
    sample_rate: u32,
}

impl HttpVcEngine {
    pub async fn connect(config: HttpEngineConfig, device: Device) -> Result<Self, ModelLoadError> {
        let (client, sample_rate) = handshake(&config, ModelFlavor::Vc, device).await?;
        Ok(Self {
            client,
            config,
            sample_rate,
        })
    }
}

#[async_trait]
impl VcEnginePort for HttpVcEngine {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    async fn generate(
        &self,
        source_audio: &Path,
        target_voice: &Path,
    ) -> Result<Vec<f32>, EngineError> {
        let body = VcHttpRequest {
            source_audio: source_audio.to_string_lossy().into_owned(),
            target_voice: target_voice.to_string_lossy().into_owned(),
        };

        let response = self
            .client
            .post(self.config.generate_url(ModelFlavor::Vc))
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        read_waveform(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpEngineConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 300);
    }

    #[test]
    fn test_config_builder() {
        let config = HttpEngineConfig::new("http://engine:9000").with_timeout(60);
        assert_eq!(config.base_url, "http://engine:9000");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_urls_are_per_flavor() {
        let config = HttpEngineConfig::default();
        assert_eq!(
            config.info_url(ModelFlavor::Tts),
            "http://localhost:8000/api/model/info?flavor=tts"
        );
        assert_eq!(
            config.generate_url(ModelFlavor::Vc),
            "http://localhost:8000/api/vc/generate"
        );
    }

    #[tokio::test]
    async fn test_connect_fails_when_sidecar_unreachable() {
        // 端口未监听，握手应报 WeightsUnreachable
        let config = HttpEngineConfig::new("http://127.0.0.1:1").with_timeout(1);
        let err = HttpVcEngine::connect(config, Device::Cpu).await.unwrap_err();
        assert!(matches!(err, ModelLoadError::WeightsUnreachable(_)));
    }
}
