//! Device Probe - 计算设备探测
//!
//! 设备在进程启动时解析一次，作为不可变配置值传入各组件构造函数，
//! 之后不再按调用重新推导，也不支持按请求调整。

use serde::Serialize;

use crate::application::ports::ModelLoadError;

/// 计算设备
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    Cuda,
    Cpu,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cuda => "cuda",
            Device::Cpu => "cpu",
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 按配置偏好解析设备
///
/// - `auto`: 优先加速设备，否则回退 CPU
/// - `cuda`: 强制 CUDA，不可用即报 UnsupportedDevice
/// - `cpu`: 强制 CPU
pub fn probe_device(preference: &str) -> Result<Device, ModelLoadError> {
    let device = match preference {
        "auto" => {
            if cuda_available() {
                Device::Cuda
            } else {
                Device::Cpu
            }
        }
        "cuda" => {
            if !cuda_available() {
                return Err(ModelLoadError::UnsupportedDevice(
                    "cuda requested but no CUDA device present".to_string(),
                ));
            }
            Device::Cuda
        }
        "cpu" => Device::Cpu,
        other => {
            return Err(ModelLoadError::UnsupportedDevice(format!(
                "unknown device preference: {other}"
            )));
        }
    };

    tracing::info!(preference = preference, device = %device, "Compute device resolved");
    Ok(device)
}

/// CUDA 可用性探测
fn cuda_available() -> bool {
    if let Ok(visible) = std::env::var("CUDA_VISIBLE_DEVICES") {
        if visible.trim().is_empty() || visible.trim() == "-1" {
            return false;
        }
    }

    std::path::Path::new("/proc/driver/nvidia/version").exists()
        || std::path::Path::new("/dev/nvidia0").exists()
}
