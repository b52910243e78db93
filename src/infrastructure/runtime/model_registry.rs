//! Model Registry - 模型生命周期管理
//!
//! 每个口味一个注册表，最多持有一个已加载实例：
//! - 状态机 {Unloaded -> Loading -> Ready | Failed}，Failed 可重试
//! - 单飞：加载完成前的并发调用合并为一次底层加载
//! - 启动时异步预热，预热失败由下一次调用懒加载兜底
//!
//! 加载器以异步工厂注入，注册表与具体引擎解耦

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::application::ports::{ModelLoadError, ModelProviderPort, ModelState};
use crate::domain::generation::ModelFlavor;

/// 加载器返回的未决加载
pub type LoaderFuture<H> = BoxFuture<'static, Result<H, ModelLoadError>>;

/// 模型加载工厂
pub type ModelLoader<H> = Box<dyn Fn() -> LoaderFuture<H> + Send + Sync>;

/// 模型注册表
pub struct ModelRegistry<H: Clone + Send + Sync + 'static> {
    flavor: ModelFlavor,
    loader: ModelLoader<H>,
    state: RwLock<ModelState>,
    handle: RwLock<Option<H>>,
    /// 单飞锁：同一时刻至多一次底层加载
    flight: Mutex<()>,
}

impl<H: Clone + Send + Sync + 'static> ModelRegistry<H> {
    pub fn new(flavor: ModelFlavor, loader: ModelLoader<H>) -> Self {
        Self {
            flavor,
            loader,
            state: RwLock::new(ModelState::Unloaded),
            handle: RwLock::new(None),
            flight: Mutex::new(()),
        }
    }

    /// 获取就绪句柄，必要时加载
    ///
    /// 幂等：句柄创建后进程生命周期内复用；加载失败不缓存，
    /// 后续调用重新尝试
    pub async fn get_or_load(&self) -> Result<H, ModelLoadError> {
        if let Some(handle) = self.handle.read().await.clone() {
            return Ok(handle);
        }

        let _flight = self.flight.lock().await;

        // 等锁期间可能已有人完成加载
        if let Some(handle) = self.handle.read().await.clone() {
            return Ok(handle);
        }

        *self.state.write().await = ModelState::Loading;
        tracing::info!(flavor = %self.flavor, "Loading model");

        match (self.loader)().await {
            Ok(handle) => {
                *self.handle.write().await = Some(handle.clone());
                *self.state.write().await = ModelState::Ready;
                tracing::info!(flavor = %self.flavor, "Model ready");
                Ok(handle)
            }
            Err(e) => {
                *self.state.write().await = ModelState::Failed;
                tracing::error!(flavor = %self.flavor, error = %e, "Model load failed");
                Err(e)
            }
        }
    }

    /// 启动时的异步预热
    ///
    /// 让首个真实请求避开冷启动延迟；失败仅告警，
    /// 下一次调用会重新懒加载
    pub fn spawn_warm_up(self: &Arc<Self>) {
        let registry = self.clone();
        tokio::spawn(async move {
            if let Err(e) = registry.get_or_load().await {
                tracing::warn!(
                    flavor = %registry.flavor,
                    error = %e,
                    "Eager model load failed, will retry lazily"
                );
            }
        });
    }
}

#[async_trait]
impl<H: Clone + Send + Sync + 'static> ModelProviderPort<H> for ModelRegistry<H> {
    async fn resolve(&self) -> Result<H, ModelLoadError> {
        self.get_or_load().await
    }

    async fn state(&self) -> ModelState {
        *self.state.read().await
    }

    fn flavor(&self) -> ModelFlavor {
        self.flavor
    }
}
