//! Generation Context - 音频生成限界上下文
//!
//! 职责:
//! - 生成请求与采样参数的值对象和校验规则
//! - 模型口味与固定产物命名
//! - 波形值对象

mod errors;
mod value_objects;

pub use errors::GenerationRuleError;
pub use value_objects::{
    ConvertCommand, ModelFlavor, SynthesizeCommand, TtsParams, Waveform, TEXT_SOFT_LIMIT,
};
