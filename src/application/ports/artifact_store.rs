//! Artifact Store Port - 生成产物存储抽象
//!
//! 每个模型口味对应一个固定输出路径，覆盖写语义：
//! 每次成功的生成取代前一次的产物，失败的请求不改变任何产物。

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::generation::ModelFlavor;

/// 产物存储错误
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Artifact Store Port
#[async_trait]
pub trait ArtifactStorePort: Send + Sync {
    /// 该口味的固定产物路径
    fn artifact_path(&self, flavor: ModelFlavor) -> PathBuf;

    /// 把波形编码为无损容器并写入固定路径，返回写入的路径
    ///
    /// 写入是原子的：读者不会观察到半成品文件
    async fn write(
        &self,
        flavor: ModelFlavor,
        sample_rate: u32,
        samples: &[f32],
    ) -> Result<PathBuf, ArtifactError>;
}
