//! Generation Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationRuleError {
    #[error("合成文本不能为空")]
    EmptyText,

    #[error("参数越界: {name} = {value}（允许范围 {min} - {max}）")]
    ParamOutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
}
