//! Runtime - 设备探测与模型生命周期

mod device;
mod model_registry;

pub use device::{probe_device, Device};
pub use model_registry::{LoaderFuture, ModelLoader, ModelRegistry};
