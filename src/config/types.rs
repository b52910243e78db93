//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 计算设备配置
    #[serde(default)]
    pub device: DeviceConfig,

    /// 生成引擎配置
    #[serde(default)]
    pub engine: EngineConfig,

    /// 产物存储配置
    #[serde(default)]
    pub artifact: ArtifactConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            device: DeviceConfig::default(),
            engine: EngineConfig::default(),
            artifact: ArtifactConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7860
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 计算设备配置
///
/// 设备在启动时探测一次，之后固定不变；不支持按请求调整
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// 设备偏好
    /// 可选: auto, cuda, cpu
    #[serde(default = "default_device_preference")]
    pub preference: String,
}

fn default_device_preference() -> String {
    "auto".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            preference: default_device_preference(),
        }
    }
}

/// 引擎种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// 外部推理侧车
    Http,
    /// 进程内确定性引擎（测试/本地运行）
    Fake,
}

/// 生成引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// 引擎种类
    #[serde(default = "default_engine_kind")]
    pub kind: EngineKind,

    /// 推理侧车基础 URL（kind = http 时使用）
    #[serde(default = "default_engine_url")]
    pub url: String,

    /// 生成请求超时时间（秒）
    #[serde(default = "default_engine_timeout")]
    pub timeout_secs: u64,

    /// Fake 引擎采样率（kind = fake 时使用）
    #[serde(default = "default_fake_sample_rate")]
    pub fake_sample_rate: u32,
}

fn default_engine_kind() -> EngineKind {
    EngineKind::Http
}

fn default_engine_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_engine_timeout() -> u64 {
    300
}

fn default_fake_sample_rate() -> u32 {
    24000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: default_engine_kind(),
            url: default_engine_url(),
            timeout_secs: default_engine_timeout(),
            fake_sample_rate: default_fake_sample_rate(),
        }
    }
}

/// 产物存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactConfig {
    /// 产物目录（每口味一个固定文件）
    #[serde(default = "default_artifact_dir")]
    pub dir: PathBuf,
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from("data/artifacts")
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: default_artifact_dir(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 7860);
        assert_eq!(config.device.preference, "auto");
        assert_eq!(config.engine.kind, EngineKind::Http);
        assert_eq!(config.engine.url, "http://localhost:8000");
        assert_eq!(config.artifact.dir, PathBuf::from("data/artifacts"));
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:7860");
    }
}
