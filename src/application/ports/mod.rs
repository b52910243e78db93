//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod artifact_store;
mod audio_probe;
mod model_provider;
mod speech_engine;

pub use artifact_store::{ArtifactError, ArtifactStorePort};
pub use audio_probe::{AudioInfo, AudioIoError, AudioProbePort};
pub use model_provider::{ModelProviderPort, ModelState};
pub use speech_engine::{
    EngineError, ModelLoadError, TtsEnginePort, TtsGeneration, TtsHandle, VcEnginePort, VcHandle,
};
