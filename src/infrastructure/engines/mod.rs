//! Engines - 模型契约适配器
//!
//! - HTTP: 外部推理侧车
//! - Fake: 进程内确定性引擎（测试/本地运行）

mod fake_engine;
mod http_engine;

pub use fake_engine::{FakeEngineConfig, FakeTtsEngine, FakeVcEngine};
pub use http_engine::{HttpEngineConfig, HttpTtsEngine, HttpVcEngine};
