//! Domain Layer - 领域层
//!
//! Generation Context: 音频生成上下文（TTS / VC）

pub mod generation;
