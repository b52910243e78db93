//! Job Types - 准入票据与任务记录

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::services::GenerationOutput;
use crate::domain::generation::ModelFlavor;

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// 排队等待
    Queued,
    /// 正在执行（开始后不可取消，跑到完成或失败）
    Running,
    /// 成功完成
    Completed,
    /// 执行失败
    Failed,
    /// 开始前被撤回
    Withdrawn,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Withdrawn => "withdrawn",
        }
    }

    /// 终态不再变化
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Failed | JobState::Withdrawn
        )
    }
}

/// 任务记录
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub job_id: Uuid,
    pub flavor: ModelFlavor,
    pub state: JobState,
    pub enqueued_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub artifact_path: Option<PathBuf>,
    pub sample_rate: Option<u32>,
    pub duration_ms: Option<u64>,
}

impl JobRecord {
    pub(crate) fn new(job_id: Uuid, flavor: ModelFlavor) -> Self {
        Self {
            job_id,
            flavor,
            state: JobState::Queued,
            enqueued_at: Utc::now(),
            started_at: None,
            finished_at: None,
            error: None,
            artifact_path: None,
            sample_rate: None,
            duration_ms: None,
        }
    }
}

/// 提交错误
#[derive(Debug, Error)]
pub enum SubmitError {
    /// 队列已满：显式拒绝，绝不静默丢弃，也不给出第 51 个等待槽
    #[error("Generation queue full for {flavor}: {capacity} pending requests")]
    QueueFull {
        flavor: ModelFlavor,
        capacity: usize,
    },

    #[error("Generation worker unavailable")]
    WorkerClosed,
}

/// 票据等待错误
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job withdrawn before execution")]
    Withdrawn,

    #[error("Generation worker unavailable")]
    WorkerUnavailable,

    #[error(transparent)]
    Generation(#[from] ApplicationError),
}

/// 排队中的任务（worker 侧）
pub(crate) struct QueuedJob<C> {
    pub job_id: Uuid,
    pub command: C,
    pub cancelled: Arc<AtomicBool>,
    pub reply: oneshot::Sender<Result<GenerationOutput, ApplicationError>>,
}

/// 准入票据（调用方侧）
///
/// FIFO 顺序由队列保证；排队中的任务可撤回，开始执行后撤回无效
#[derive(Debug)]
pub struct JobTicket {
    job_id: Uuid,
    cancelled: Arc<AtomicBool>,
    reply: oneshot::Receiver<Result<GenerationOutput, ApplicationError>>,
}

impl JobTicket {
    pub(crate) fn new(
        job_id: Uuid,
        cancelled: Arc<AtomicBool>,
        reply: oneshot::Receiver<Result<GenerationOutput, ApplicationError>>,
    ) -> Self {
        Self {
            job_id,
            cancelled,
            reply,
        }
    }

    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// 撤回请求
    ///
    /// 仅对尚未开始执行的任务生效；执行中的任务会跑到完成或失败
    pub fn withdraw(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// 等待任务结束并取回结果
    pub async fn outcome(self) -> Result<GenerationOutput, JobError> {
        let JobTicket {
            cancelled, reply, ..
        } = self;

        match reply.await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(JobError::Generation(e)),
            Err(_) => {
                if cancelled.load(Ordering::SeqCst) {
                    Err(JobError::Withdrawn)
                } else {
                    Err(JobError::WorkerUnavailable)
                }
            }
        }
    }
}
