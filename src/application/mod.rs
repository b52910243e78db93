//! Application Layer - 应用层
//!
//! - Ports: 出站端口（SpeechEngine, ModelProvider, ArtifactStore, AudioProbe）
//! - Services: TTS / VC 编排服务
//! - Sampling: 进程级共享随机源
//! - Error: 统一应用层错误

pub mod error;
pub mod ports;
pub mod sampling;
pub mod services;

pub use error::ApplicationError;
pub use sampling::SharedSampler;
pub use services::{ConversionService, GenerationOutput, SynthesisService};
