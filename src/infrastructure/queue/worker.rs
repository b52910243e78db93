//! Admission Queue & Worker - 有界 FIFO 准入控制
//!
//! 每个口味一条队列 + 一个 worker：最多 50 个等待 + 1 个执行中。
//! 超出容量的提交立即得到显式的 QueueFull 拒绝。
//! 两个口味相互独立，可以并行；口味内部严格串行。

use async_trait::async_trait;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::job::{JobTicket, QueuedJob, SubmitError};
use super::tracker::JobTracker;
use crate::application::error::ApplicationError;
use crate::application::services::{ConversionService, GenerationOutput, SynthesisService};
use crate::domain::generation::{ConvertCommand, ModelFlavor, SynthesizeCommand};

/// 等待队列容量（不含执行中的那一个）
pub const QUEUE_CAPACITY: usize = 50;

/// 任务处理器：编排服务实现它接入队列
#[async_trait]
pub trait JobHandler<C>: Send + Sync {
    async fn run(&self, command: C) -> Result<GenerationOutput, ApplicationError>;
}

/// 准入队列（提交端）
pub struct AdmissionQueue<C> {
    flavor: ModelFlavor,
    sender: mpsc::Sender<QueuedJob<C>>,
    tracker: Arc<JobTracker>,
    capacity: usize,
}

/// 队列 worker（消费端）
pub struct AdmissionWorker<C> {
    flavor: ModelFlavor,
    receiver: mpsc::Receiver<QueuedJob<C>>,
    handler: Arc<dyn JobHandler<C>>,
    tracker: Arc<JobTracker>,
}

/// 创建一条口味队列及其 worker
pub fn admission_queue<C: Send + 'static>(
    flavor: ModelFlavor,
    handler: Arc<dyn JobHandler<C>>,
    tracker: Arc<JobTracker>,
) -> (AdmissionQueue<C>, AdmissionWorker<C>) {
    admission_queue_with_capacity(flavor, handler, tracker, QUEUE_CAPACITY)
}

/// 指定容量的队列（测试用）
pub fn admission_queue_with_capacity<C: Send + 'static>(
    flavor: ModelFlavor,
    handler: Arc<dyn JobHandler<C>>,
    tracker: Arc<JobTracker>,
    capacity: usize,
) -> (AdmissionQueue<C>, AdmissionWorker<C>) {
    let (sender, receiver) = mpsc::channel(capacity);

    let queue = AdmissionQueue {
        flavor,
        sender,
        tracker: tracker.clone(),
        capacity,
    };
    let worker = AdmissionWorker {
        flavor,
        receiver,
        handler,
        tracker,
    };

    (queue, worker)
}

impl<C: Send + 'static> AdmissionQueue<C> {
    pub fn flavor(&self) -> ModelFlavor {
        self.flavor
    }

    /// 提交任务
    ///
    /// FIFO 排队；队列满时立即返回 QueueFull，不等待不丢弃
    pub fn submit(&self, command: C) -> Result<JobTicket, SubmitError> {
        let job_id = Uuid::new_v4();
        let cancelled = self.tracker.register(job_id, self.flavor);
        let (reply_tx, reply_rx) = oneshot::channel();

        let job = QueuedJob {
            job_id,
            command,
            cancelled: cancelled.clone(),
            reply: reply_tx,
        };

        match self.sender.try_send(job) {
            Ok(()) => {
                tracing::debug!(flavor = %self.flavor, job_id = %job_id, "Job enqueued");
                Ok(JobTicket::new(job_id, cancelled, reply_rx))
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.tracker.unregister(job_id);
                tracing::warn!(
                    flavor = %self.flavor,
                    capacity = self.capacity,
                    "Generation queue full, request rejected"
                );
                Err(SubmitError::QueueFull {
                    flavor: self.flavor,
                    capacity: self.capacity,
                })
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.tracker.unregister(job_id);
                Err(SubmitError::WorkerClosed)
            }
        }
    }
}

impl<C: Send + 'static> AdmissionWorker<C> {
    /// 启动 worker
    ///
    /// 顺序消费：同一口味同一时刻只有一个执行中的任务。共享采样器的
    /// 全局重播种依赖这一约束 —— 在未按请求隔离随机性之前，
    /// 口味内并发必须保持为 1。任务一旦开始不再取消，跑到完成或失败。
    pub async fn run(mut self) {
        tracing::info!(flavor = %self.flavor, "Generation worker started");

        while let Some(job) = self.receiver.recv().await {
            // 开始前检查撤回标志
            if job.cancelled.load(Ordering::SeqCst) {
                tracing::debug!(job_id = %job.job_id, "Job withdrawn, skipping");
                self.tracker.mark_withdrawn(job.job_id);
                continue;
            }

            self.tracker.mark_running(job.job_id);
            tracing::debug!(flavor = %self.flavor, job_id = %job.job_id, "Job started");

            let result = self.handler.run(job.command).await;

            match &result {
                Ok(output) => {
                    self.tracker.mark_completed(job.job_id, output);
                    tracing::info!(
                        flavor = %self.flavor,
                        job_id = %job.job_id,
                        duration_ms = output.duration_ms(),
                        "Job completed"
                    );
                }
                Err(e) => {
                    self.tracker.mark_failed(job.job_id, e.to_string());
                    tracing::error!(
                        flavor = %self.flavor,
                        job_id = %job.job_id,
                        error = %e,
                        "Job failed"
                    );
                }
            }

            // 接收端可能已放弃等待（异步提交），忽略发送失败
            let _ = job.reply.send(result);
        }

        tracing::info!(flavor = %self.flavor, "Generation worker stopped");
    }
}

#[async_trait]
impl JobHandler<SynthesizeCommand> for SynthesisService {
    async fn run(&self, command: SynthesizeCommand) -> Result<GenerationOutput, ApplicationError> {
        self.handle(command).await
    }
}

#[async_trait]
impl JobHandler<ConvertCommand> for ConversionService {
    async fn run(&self, command: ConvertCommand) -> Result<GenerationOutput, ApplicationError> {
        self.handle(command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::queue::job::{JobError, JobState};
    use std::path::PathBuf;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// 可阻塞的测试处理器：记录执行顺序，按 Notify 放行
    struct BlockingHandler {
        order: std::sync::Mutex<Vec<usize>>,
        gate: Notify,
        block: std::sync::atomic::AtomicBool,
        started: Notify,
    }

    impl BlockingHandler {
        fn new(block: bool) -> Self {
            Self {
                order: std::sync::Mutex::new(Vec::new()),
                gate: Notify::new(),
                block: std::sync::atomic::AtomicBool::new(block),
                started: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl JobHandler<usize> for BlockingHandler {
        async fn run(&self, command: usize) -> Result<GenerationOutput, ApplicationError> {
            self.order.lock().unwrap().push(command);
            self.started.notify_one();
            if self.block.load(Ordering::SeqCst) {
                self.gate.notified().await;
            }
            Ok(GenerationOutput {
                sample_rate: 24000,
                samples: vec![0.0; 240],
                artifact_path: PathBuf::from("generated_tts.wav"),
            })
        }
    }

    fn setup(
        block: bool,
        capacity: usize,
    ) -> (
        AdmissionQueue<usize>,
        Arc<BlockingHandler>,
        Arc<JobTracker>,
    ) {
        let handler = Arc::new(BlockingHandler::new(block));
        let tracker = Arc::new(JobTracker::new());
        let (queue, worker) = admission_queue_with_capacity::<usize>(
            ModelFlavor::Tts,
            handler.clone(),
            tracker.clone(),
            capacity,
        );
        tokio::spawn(worker.run());
        (queue, handler, tracker)
    }

    #[tokio::test]
    async fn test_jobs_run_in_fifo_order() {
        let (queue, handler, _tracker) = setup(false, 10);

        let tickets: Vec<_> = (0..5).map(|i| queue.submit(i).unwrap()).collect();
        for ticket in tickets {
            ticket.outcome().await.unwrap();
        }

        assert_eq!(*handler.order.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_full_queue_rejects_explicitly() {
        let (queue, handler, _tracker) = setup(true, 2);

        // 第一个任务被 worker 取走并开始执行
        let _executing = queue.submit(0).unwrap();
        handler.started.notified().await;

        // 填满等待队列
        let _waiting: Vec<_> = (1..=2).map(|i| queue.submit(i).unwrap()).collect();

        // 1 执行中 + 2 等待，下一个提交必须被显式拒绝
        let err = queue.submit(3).unwrap_err();
        match err {
            SubmitError::QueueFull { flavor, capacity } => {
                assert_eq!(flavor, ModelFlavor::Tts);
                assert_eq!(capacity, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_default_capacity_is_fifty_waiting_plus_one_executing() {
        let handler = Arc::new(BlockingHandler::new(true));
        let tracker = Arc::new(JobTracker::new());
        let (queue, worker) =
            admission_queue::<usize>(ModelFlavor::Tts, handler.clone(), tracker.clone());
        tokio::spawn(worker.run());

        // 1 个执行中
        let _executing = queue.submit(0).unwrap();
        handler.started.notified().await;

        // 50 个等待
        let _waiting: Vec<_> = (1..=QUEUE_CAPACITY).map(|i| queue.submit(i).unwrap()).collect();

        // 1 执行中 + 50 等待已满：再来一个必须被拒绝，而不是得到新的等待槽
        let err = queue.submit(QUEUE_CAPACITY + 1).unwrap_err();
        assert!(matches!(
            err,
            SubmitError::QueueFull { capacity: 50, .. }
        ));
    }

    #[tokio::test]
    async fn test_withdrawn_job_never_executes() {
        let (queue, handler, tracker) = setup(true, 10);

        let first = queue.submit(0).unwrap();
        handler.started.notified().await;

        let second = queue.submit(1).unwrap();
        let second_id = second.job_id();
        assert!(tracker.withdraw(second_id));

        // 放行执行中的任务
        handler.block.store(false, Ordering::SeqCst);
        handler.gate.notify_one();

        first.outcome().await.unwrap();
        let err = second.outcome().await.unwrap_err();
        assert!(matches!(err, JobError::Withdrawn));

        // 被撤回的任务从未进入处理器
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(*handler.order.lock().unwrap(), vec![0]);
        assert_eq!(tracker.get(second_id).unwrap().state, JobState::Withdrawn);
    }

    #[tokio::test]
    async fn test_running_job_survives_withdraw_attempt() {
        let (queue, handler, tracker) = setup(true, 10);

        let ticket = queue.submit(0).unwrap();
        let job_id = ticket.job_id();
        handler.started.notified().await;

        // 已开始执行：撤回无效，任务跑到完成
        assert!(!tracker.withdraw(job_id));

        handler.block.store(false, Ordering::SeqCst);
        handler.gate.notify_one();

        ticket.outcome().await.unwrap();
        assert_eq!(tracker.get(job_id).unwrap().state, JobState::Completed);
    }

    #[tokio::test]
    async fn test_ticket_withdraw_before_start() {
        let (queue, handler, _tracker) = setup(true, 10);

        let first = queue.submit(0).unwrap();
        handler.started.notified().await;

        let second = queue.submit(1).unwrap();
        second.withdraw();

        handler.block.store(false, Ordering::SeqCst);
        handler.gate.notify_one();

        first.outcome().await.unwrap();
        assert!(matches!(
            second.outcome().await.unwrap_err(),
            JobError::Withdrawn
        ));
    }
}
