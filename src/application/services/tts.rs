//! Synthesis Service - TTS 请求编排

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    ArtifactStorePort, AudioProbePort, ModelProviderPort, TtsGeneration, TtsHandle,
};
use crate::application::sampling::SharedSampler;
use crate::application::services::GenerationOutput;
use crate::domain::generation::{ModelFlavor, SynthesizeCommand, TEXT_SOFT_LIMIT};

/// TTS 编排服务
///
/// 假定数值范围已由调用方预校验；收到越界值时拒绝而非钳制
pub struct SynthesisService {
    provider: Arc<dyn ModelProviderPort<TtsHandle>>,
    artifact_store: Arc<dyn ArtifactStorePort>,
    audio_probe: Arc<dyn AudioProbePort>,
    sampler: Arc<SharedSampler>,
}

impl SynthesisService {
    pub fn new(
        provider: Arc<dyn ModelProviderPort<TtsHandle>>,
        artifact_store: Arc<dyn ArtifactStorePort>,
        audio_probe: Arc<dyn AudioProbePort>,
        sampler: Arc<SharedSampler>,
    ) -> Self {
        Self {
            provider,
            artifact_store,
            audio_probe,
            sampler,
        }
    }

    pub async fn handle(
        &self,
        cmd: SynthesizeCommand,
    ) -> Result<GenerationOutput, ApplicationError> {
        cmd.validate()?;

        if cmd.exceeds_soft_limit() {
            tracing::warn!(
                chars = cmd.text.chars().count(),
                soft_limit = TEXT_SOFT_LIMIT,
                "Text exceeds soft length guideline"
            );
        }

        // 参考音频在任何引擎工作之前验证可读性
        if let Some(reference) = cmd.reference_audio.as_deref() {
            let info = self.audio_probe.probe(reference)?;
            tracing::debug!(
                path = %reference.display(),
                sample_rate = info.sample_rate,
                duration_ms = info.duration_ms,
                "Reference audio probed"
            );
        }

        // seed != 0: 对进程级共享采样器做确定性重播种。
        // 全局突变，依赖同口味并发 = 1（见 sampling 模块）
        if cmd.params.seed != 0 {
            self.sampler.reseed(cmd.params.seed).await;
        }

        let handle = self.provider.resolve().await?;

        let request = TtsGeneration {
            text: cmd.text,
            reference_audio: cmd.reference_audio,
            exaggeration: cmd.params.exaggeration,
            temperature: cmd.params.temperature,
            cfg_weight: cmd.params.cfg_weight,
            min_p: cmd.params.min_p,
            top_p: cmd.params.top_p,
            repetition_penalty: cmd.params.repetition_penalty,
        };

        let samples = handle.generate(request).await?;
        let sample_rate = handle.sample_rate();

        let artifact_path = self
            .artifact_store
            .write(ModelFlavor::Tts, sample_rate, &samples)
            .await?;

        let output = GenerationOutput {
            sample_rate,
            samples,
            artifact_path,
        };

        tracing::info!(
            sample_rate = sample_rate,
            duration_ms = output.duration_ms(),
            artifact = %output.artifact_path.display(),
            "TTS generation completed"
        );

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        ArtifactError, AudioInfo, AudioIoError, EngineError, ModelLoadError, ModelState,
        TtsEnginePort,
    };
    use crate::domain::generation::TtsParams;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct StubEngine {
        fail: bool,
    }

    #[async_trait]
    impl TtsEnginePort for StubEngine {
        fn sample_rate(&self) -> u32 {
            24000
        }

        async fn generate(&self, _request: TtsGeneration) -> Result<Vec<f32>, EngineError> {
            if self.fail {
                Err(EngineError::GenerationFailed("stub failure".to_string()))
            } else {
                Ok(vec![0.25; 2400])
            }
        }
    }

    struct StubProvider {
        handle: TtsHandle,
    }

    #[async_trait]
    impl ModelProviderPort<TtsHandle> for StubProvider {
        async fn resolve(&self) -> Result<TtsHandle, ModelLoadError> {
            Ok(self.handle.clone())
        }

        async fn state(&self) -> ModelState {
            ModelState::Ready
        }

        fn flavor(&self) -> ModelFlavor {
            ModelFlavor::Tts
        }
    }

    struct StubStore {
        writes: AtomicUsize,
    }

    #[async_trait]
    impl ArtifactStorePort for StubStore {
        fn artifact_path(&self, flavor: ModelFlavor) -> PathBuf {
            PathBuf::from(flavor.artifact_file_name())
        }

        async fn write(
            &self,
            flavor: ModelFlavor,
            _sample_rate: u32,
            _samples: &[f32],
        ) -> Result<PathBuf, ArtifactError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(self.artifact_path(flavor))
        }
    }

    struct StubProbe {
        reject: AtomicBool,
    }

    impl AudioProbePort for StubProbe {
        fn probe(&self, path: &Path) -> Result<AudioInfo, AudioIoError> {
            if self.reject.load(Ordering::SeqCst) {
                Err(AudioIoError::NotFound(path.display().to_string()))
            } else {
                Ok(AudioInfo {
                    sample_rate: 22050,
                    channels: 1,
                    duration_ms: 1000,
                })
            }
        }
    }

    fn service(fail_engine: bool, reject_probe: bool) -> (SynthesisService, Arc<StubStore>) {
        let store = Arc::new(StubStore {
            writes: AtomicUsize::new(0),
        });
        let service = SynthesisService::new(
            Arc::new(StubProvider {
                handle: Arc::new(StubEngine { fail: fail_engine }),
            }),
            store.clone(),
            Arc::new(StubProbe {
                reject: AtomicBool::new(reject_probe),
            }),
            Arc::new(SharedSampler::new()),
        );
        (service, store)
    }

    fn command(text: &str, reference: Option<&str>) -> SynthesizeCommand {
        SynthesizeCommand {
            text: text.to_string(),
            reference_audio: reference.map(PathBuf::from),
            params: TtsParams::default(),
        }
    }

    #[tokio::test]
    async fn test_successful_generation_writes_artifact() {
        let (service, store) = service(false, false);
        let output = service.handle(command("hello world", None)).await.unwrap();

        assert_eq!(output.sample_rate, 24000);
        assert_eq!(output.samples.len(), 2400);
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalid_params_rejected_before_any_work() {
        let (service, store) = service(false, false);
        let mut cmd = command("hello", None);
        cmd.params.top_p = 1.5;

        let err = service.handle(cmd).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Validation(_)));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unreadable_reference_audio_fails_without_artifact() {
        let (service, store) = service(false, true);
        let err = service
            .handle(command("hello", Some("/missing/ref.wav")))
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::AudioIo(_)));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_engine_failure_leaves_artifact_untouched() {
        let (service, store) = service(true, false);
        let err = service.handle(command("hello", None)).await.unwrap_err();

        assert!(matches!(err, ApplicationError::Engine(_)));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }
}
