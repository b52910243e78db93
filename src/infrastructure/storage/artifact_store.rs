//! File Artifact Store - 文件系统产物存储实现
//!
//! 每个口味一个固定输出路径，覆盖写；先写临时文件再原子换名，
//! 失败的请求不会留下半成品产物

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{ArtifactError, ArtifactStorePort};
use crate::domain::generation::ModelFlavor;
use crate::infrastructure::audio::encode_wav;

/// 文件系统产物存储
pub struct FileArtifactStore {
    /// 产物根目录
    base_dir: PathBuf,
}

impl FileArtifactStore {
    /// 创建产物存储并确保目录存在
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| ArtifactError::IoError(e.to_string()))?;

        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn temp_path(&self, flavor: ModelFlavor) -> PathBuf {
        self.base_dir
            .join(format!(".{}.tmp", flavor.artifact_file_name()))
    }
}

#[async_trait]
impl ArtifactStorePort for FileArtifactStore {
    fn artifact_path(&self, flavor: ModelFlavor) -> PathBuf {
        self.base_dir.join(flavor.artifact_file_name())
    }

    async fn write(
        &self,
        flavor: ModelFlavor,
        sample_rate: u32,
        samples: &[f32],
    ) -> Result<PathBuf, ArtifactError> {
        if sample_rate == 0 {
            return Err(ArtifactError::EncodingError(
                "sample rate must be non-zero".to_string(),
            ));
        }

        let wav = encode_wav(samples, sample_rate);
        let temp_path = self.temp_path(flavor);
        let final_path = self.artifact_path(flavor);

        fs::write(&temp_path, &wav)
            .await
            .map_err(|e| ArtifactError::IoError(e.to_string()))?;

        // 换名是原子的：读者要么看到旧产物要么看到新产物
        fs::rename(&temp_path, &final_path)
            .await
            .map_err(|e| ArtifactError::IoError(e.to_string()))?;

        tracing::debug!(
            flavor = %flavor,
            path = %final_path.display(),
            bytes = wav.len(),
            "Artifact written"
        );

        Ok(final_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::audio::decode_file;

    #[tokio::test]
    async fn test_write_then_decode_matches_input() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileArtifactStore::new(dir.path()).await.unwrap();

        let samples = vec![0.1f32, -0.2, 0.3, -0.4];
        let path = store
            .write(ModelFlavor::Tts, 24000, &samples)
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("generated_tts.wav"));

        let decoded = decode_file(&path).unwrap();
        assert_eq!(decoded.sample_rate, 24000);
        assert_eq!(decoded.samples.len(), samples.len());
        for (a, b) in samples.iter().zip(decoded.samples.iter()) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[tokio::test]
    async fn test_overwrite_leaves_only_latest() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileArtifactStore::new(dir.path()).await.unwrap();

        let wave_a = vec![0.5f32; 100];
        let wave_b = vec![-0.5f32; 200];

        store.write(ModelFlavor::Tts, 16000, &wave_a).await.unwrap();
        let path = store.write(ModelFlavor::Tts, 16000, &wave_b).await.unwrap();

        let decoded = decode_file(&path).unwrap();
        assert_eq!(decoded.samples.len(), wave_b.len());
        assert!((decoded.samples[0] + 0.5).abs() < 1e-3);

        // 没有残留的临时文件或版本副本
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_flavors_have_distinct_fixed_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileArtifactStore::new(dir.path()).await.unwrap();

        let tts = store.write(ModelFlavor::Tts, 24000, &[0.1]).await.unwrap();
        let vc = store.write(ModelFlavor::Vc, 22050, &[0.2]).await.unwrap();

        assert_ne!(tts, vc);
        assert!(tts.ends_with("generated_tts.wav"));
        assert!(vc.ends_with("generated_vc.wav"));
        assert!(tts.exists() && vc.exists());
    }

    #[tokio::test]
    async fn test_zero_sample_rate_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileArtifactStore::new(dir.path()).await.unwrap();

        let err = store.write(ModelFlavor::Tts, 0, &[0.1]).await.unwrap_err();
        assert!(matches!(err, ArtifactError::EncodingError(_)));
        assert!(!store.artifact_path(ModelFlavor::Tts).exists());
    }
}
