//! Application State
//!
//! HTTP 层共享状态：每口味一条准入队列、任务追踪器、
//! 产物存储与模型提供者（健康上报用）

use std::sync::Arc;

use crate::application::ports::{ArtifactStorePort, ModelProviderPort, TtsHandle, VcHandle};
use crate::domain::generation::{ConvertCommand, SynthesizeCommand};
use crate::infrastructure::queue::{AdmissionQueue, JobTracker};

/// 应用状态
pub struct AppState {
    /// TTS 准入队列
    pub tts_queue: AdmissionQueue<SynthesizeCommand>,
    /// VC 准入队列
    pub vc_queue: AdmissionQueue<ConvertCommand>,
    /// 任务追踪器
    pub tracker: Arc<JobTracker>,
    /// 产物存储
    pub artifact_store: Arc<dyn ArtifactStorePort>,
    /// TTS 模型提供者（状态上报）
    pub tts_provider: Arc<dyn ModelProviderPort<TtsHandle>>,
    /// VC 模型提供者（状态上报）
    pub vc_provider: Arc<dyn ModelProviderPort<VcHandle>>,
}

impl AppState {
    pub fn new(
        tts_queue: AdmissionQueue<SynthesizeCommand>,
        vc_queue: AdmissionQueue<ConvertCommand>,
        tracker: Arc<JobTracker>,
        artifact_store: Arc<dyn ArtifactStorePort>,
        tts_provider: Arc<dyn ModelProviderPort<TtsHandle>>,
        vc_provider: Arc<dyn ModelProviderPort<VcHandle>>,
    ) -> Self {
        Self {
            tts_queue,
            vc_queue,
            tracker,
            artifact_store,
            tts_provider,
            vc_provider,
        }
    }
}
