//! Parrot - TTS / 音色转换生成服务
//!
//! 两个预训练生成式语音模型（TTS / VC）背后的编排层：
//! 懒加载/预热的模型生命周期、确定性播种、有界 FIFO 准入控制、
//! 固定路径产物输出。模型本体是外部协作者（推理侧车或 Fake 引擎），
//! 本服务只负责编排。
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Generation Context: 生成请求、采样参数、波形值对象
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SpeechEngine, ModelProvider, ArtifactStore, AudioProbe）
//! - Services: SynthesisService / ConversionService 编排服务
//! - Sampling: 进程级共享随机源
//!
//! 基础设施层 (infrastructure/):
//! - Runtime: 设备探测、单飞模型注册表
//! - Queue: 每口味有界队列 + 串行 worker
//! - Engines: HTTP 侧车 / Fake 引擎适配器
//! - Audio / Storage: WAV 编解码与固定路径产物
//! - HTTP: RESTful API

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
