//! Parrot - TTS / 音色转换生成服务
//!
//! 装配顺序:
//! 配置 -> 日志 -> 设备（启动解析一次）-> 共享采样器 -> 引擎加载工厂 ->
//! 模型注册表（异步预热）-> 产物存储 -> 编排服务 -> 准入队列/worker ->
//! HTTP 服务器（优雅关闭）

use std::sync::Arc;

use parrot::application::ports::{ArtifactStorePort, TtsHandle, VcHandle};
use parrot::application::{ConversionService, SharedSampler, SynthesisService};
use parrot::config::{load_config, print_config, EngineKind};
use parrot::domain::generation::{ConvertCommand, ModelFlavor, SynthesizeCommand};
use parrot::infrastructure::audio::SymphoniaProbe;
use parrot::infrastructure::engines::{
    FakeEngineConfig, FakeTtsEngine, FakeVcEngine, HttpEngineConfig, HttpTtsEngine, HttpVcEngine,
};
use parrot::infrastructure::http::{AppState, HttpServer, ServerConfig};
use parrot::infrastructure::queue::{admission_queue, JobTracker};
use parrot::infrastructure::runtime::{probe_device, ModelLoader, ModelRegistry};
use parrot::infrastructure::storage::FileArtifactStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志
    let log_filter = format!(
        "{},parrot={},tower_http=debug",
        config.log.level, config.log.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();

    tracing::info!("Parrot - TTS / 音色转换生成服务");
    print_config(&config);

    // 设备在启动时探测一次，作为不可变值传入各组件
    let device = probe_device(&config.device.preference)
        .map_err(|e| anyhow::anyhow!("Device probe failed: {}", e))?;

    // 进程级共享采样器：seed != 0 的请求对它做全局重播种
    let sampler = Arc::new(SharedSampler::new());

    // 按配置构造每口味的模型加载工厂
    let tts_loader: ModelLoader<TtsHandle>;
    let vc_loader: ModelLoader<VcHandle>;
    match config.engine.kind {
        EngineKind::Http => {
            let engine_config = HttpEngineConfig::new(config.engine.url.clone())
                .with_timeout(config.engine.timeout_secs);
            let vc_config = engine_config.clone();
            let tts_sampler = sampler.clone();

            tts_loader = Box::new(move || {
                let config = engine_config.clone();
                let sampler = tts_sampler.clone();
                Box::pin(async move {
                    let engine = HttpTtsEngine::connect(config, device, sampler).await?;
                    Ok(Arc::new(engine) as TtsHandle)
                })
            });
            vc_loader = Box::new(move || {
                let config = vc_config.clone();
                Box::pin(async move {
                    let engine = HttpVcEngine::connect(config, device).await?;
                    Ok(Arc::new(engine) as VcHandle)
                })
            });
        }
        EngineKind::Fake => {
            let engine_config = FakeEngineConfig {
                sample_rate: config.engine.fake_sample_rate,
                ..Default::default()
            };
            let vc_config = engine_config.clone();
            let tts_sampler = sampler.clone();

            tts_loader = Box::new(move || {
                let config = engine_config.clone();
                let sampler = tts_sampler.clone();
                Box::pin(async move { Ok(Arc::new(FakeTtsEngine::new(config, sampler)) as TtsHandle) })
            });
            vc_loader = Box::new(move || {
                let config = vc_config.clone();
                Box::pin(async move { Ok(Arc::new(FakeVcEngine::new(config)) as VcHandle) })
            });
        }
    }

    // 每口味一个注册表；启动即异步预热，预热失败由懒加载兜底
    let tts_registry = Arc::new(ModelRegistry::new(ModelFlavor::Tts, tts_loader));
    let vc_registry = Arc::new(ModelRegistry::new(ModelFlavor::Vc, vc_loader));
    tts_registry.spawn_warm_up();
    vc_registry.spawn_warm_up();

    // 产物存储：每口味一个固定文件，覆盖写
    let artifact_store: Arc<dyn ArtifactStorePort> = Arc::new(
        FileArtifactStore::new(&config.artifact.dir)
            .await
            .map_err(|e| anyhow::anyhow!("Artifact store init failed: {}", e))?,
    );
    let audio_probe = Arc::new(SymphoniaProbe);

    // 编排服务
    let synthesis = Arc::new(SynthesisService::new(
        tts_registry.clone(),
        artifact_store.clone(),
        audio_probe.clone(),
        sampler.clone(),
    ));
    let conversion = Arc::new(ConversionService::new(
        vc_registry.clone(),
        artifact_store.clone(),
        audio_probe,
    ));

    // 准入队列：每口味 50 等待 + 1 执行，两口味相互独立
    let tracker = Arc::new(JobTracker::new());
    let (tts_queue, tts_worker) =
        admission_queue::<SynthesizeCommand>(ModelFlavor::Tts, synthesis, tracker.clone());
    let (vc_queue, vc_worker) =
        admission_queue::<ConvertCommand>(ModelFlavor::Vc, conversion, tracker.clone());
    tokio::spawn(tts_worker.run());
    tokio::spawn(vc_worker.run());

    // HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(
        tts_queue,
        vc_queue,
        tracker,
        artifact_store,
        tts_registry,
        vc_registry,
    );

    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for ctrl-c");
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
