//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `PARROT_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `PARROT_SERVER__PORT=8080`
/// - `PARROT_DEVICE__PREFERENCE=cpu`
/// - `PARROT_ENGINE__KIND=fake`
/// - `PARROT_ENGINE__URL=http://inference:8000`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 7860)?
        .set_default("device.preference", "auto")?
        .set_default("engine.kind", "http")?
        .set_default("engine.url", "http://localhost:8000")?
        .set_default("engine.timeout_secs", 300)?
        .set_default("engine.fake_sample_rate", 24000)?
        .set_default("artifact.dir", "data/artifacts")?
        .set_default("log.level", "info")?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 前缀: PARROT_，层级分隔符: __ (双下划线)
    builder = builder.add_source(
        Environment::with_prefix("PARROT")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::ParseError(format!("Failed to deserialize config: {}", e)))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.engine.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Engine URL cannot be empty".to_string(),
        ));
    }

    if config.engine.fake_sample_rate == 0 {
        return Err(ConfigError::ValidationError(
            "Fake engine sample rate cannot be 0".to_string(),
        ));
    }

    if config.artifact.dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Artifact directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Device Preference: {}", config.device.preference);
    tracing::info!("Engine: {:?}", config.engine.kind);
    tracing::info!("Engine URL: {}", config.engine.url);
    tracing::info!("Engine Timeout: {}s", config.engine.timeout_secs);
    tracing::info!("Artifact Directory: {:?}", config.artifact.dir);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
