//! Infrastructure Layer - 基础设施层
//!
//! - Runtime: 设备探测与模型生命周期
//! - Queue: 有界 FIFO 准入控制
//! - Engines: 模型契约适配器（HTTP 侧车 / Fake）
//! - Audio: WAV 编解码与输入探测
//! - Storage: 固定路径产物存储
//! - HTTP: 调用方接口

pub mod audio;
pub mod engines;
pub mod http;
pub mod queue;
pub mod runtime;
pub mod storage;
