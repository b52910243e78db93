//! Configuration - 配置管理
//!
//! 多源配置：默认值 < config.toml < 环境变量（PARROT_ 前缀）

mod loader;
mod types;

pub use loader::{load_config, load_config_from_path, print_config, ConfigError};
pub use types::{AppConfig, ArtifactConfig, DeviceConfig, EngineConfig, EngineKind, LogConfig, ServerConfig};
