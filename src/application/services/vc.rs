//! Conversion Service - VC 请求编排
//!
//! 与 TTS 同构但更简单：无采样参数、无播种行为

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{ArtifactStorePort, AudioProbePort, ModelProviderPort, VcHandle};
use crate::application::services::GenerationOutput;
use crate::domain::generation::{ConvertCommand, ModelFlavor};

/// VC 编排服务
pub struct ConversionService {
    provider: Arc<dyn ModelProviderPort<VcHandle>>,
    artifact_store: Arc<dyn ArtifactStorePort>,
    audio_probe: Arc<dyn AudioProbePort>,
}

impl ConversionService {
    pub fn new(
        provider: Arc<dyn ModelProviderPort<VcHandle>>,
        artifact_store: Arc<dyn ArtifactStorePort>,
        audio_probe: Arc<dyn AudioProbePort>,
    ) -> Self {
        Self {
            provider,
            artifact_store,
            audio_probe,
        }
    }

    pub async fn handle(&self, cmd: ConvertCommand) -> Result<GenerationOutput, ApplicationError> {
        // 两个输入都要在引擎工作之前验证可读
        self.audio_probe.probe(&cmd.source_audio)?;
        self.audio_probe.probe(&cmd.target_voice)?;

        let handle = self.provider.resolve().await?;

        let samples = handle
            .generate(&cmd.source_audio, &cmd.target_voice)
            .await?;
        let sample_rate = handle.sample_rate();

        let artifact_path = self
            .artifact_store
            .write(ModelFlavor::Vc, sample_rate, &samples)
            .await?;

        let output = GenerationOutput {
            sample_rate,
            samples,
            artifact_path,
        };

        tracing::info!(
            source = %cmd.source_audio.display(),
            target = %cmd.target_voice.display(),
            sample_rate = sample_rate,
            duration_ms = output.duration_ms(),
            "Voice conversion completed"
        );

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        ArtifactError, AudioInfo, AudioIoError, EngineError, ModelLoadError, ModelState,
        VcEnginePort,
    };
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubVcEngine;

    #[async_trait]
    impl VcEnginePort for StubVcEngine {
        fn sample_rate(&self) -> u32 {
            22050
        }

        async fn generate(
            &self,
            _source_audio: &Path,
            _target_voice: &Path,
        ) -> Result<Vec<f32>, EngineError> {
            Ok(vec![0.1; 4410])
        }
    }

    struct StubProvider;

    #[async_trait]
    impl ModelProviderPort<VcHandle> for StubProvider {
        async fn resolve(&self) -> Result<VcHandle, ModelLoadError> {
            Ok(Arc::new(StubVcEngine))
        }

        async fn state(&self) -> ModelState {
            ModelState::Ready
        }

        fn flavor(&self) -> ModelFlavor {
            ModelFlavor::Vc
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

    struct MissingSourceProbe;

    impl AudioProbePort for MissingSourceProbe {
        fn probe(&self, path: &Path) -> Result<AudioInfo, AudioIoError> {
            if path.to_string_lossy().contains("missing") {
                Err(AudioIoError::NotFound(path.display().to_string()))
            } else {
                Ok(AudioInfo {
                    sample_rate: 22050,
                    channels: 1,
                    duration_ms: 500,
                })
            }
        }
    }

    #[tokio::test]
    async fn test_conversion_writes_vc_artifact() {
        let store = Arc::new(StubStore {
            writes: AtomicUsize::new(0),
        });
        let service = ConversionService::new(
            Arc::new(StubProvider),
            store.clone(),
            Arc::new(MissingSourceProbe),
        );

        let output = service
            .handle(ConvertCommand {
                source_audio: PathBuf::from("/audio/source.wav"),
                target_voice: PathBuf::from("/audio/target.wav"),
            })
            .await
            .unwrap();

        assert_eq!(output.sample_rate, 22050);
        assert_eq!(output.artifact_path, PathBuf::from("generated_vc.wav"));
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_input_fails_before_engine() {
        let store = Arc::new(StubStore {
            writes: AtomicUsize::new(0),
        });
        let service = ConversionService::new(
            Arc::new(StubProvider),
            store.clone(),
            Arc::new(MissingSourceProbe),
        );

        let err = service
            .handle(ConvertCommand {
                source_audio: PathBuf::from("/audio/missing.wav"),
                target_voice: PathBuf::from("/audio/target.wav"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::AudioIo(_)));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }
}
