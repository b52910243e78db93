//! Queue - 有界 FIFO 准入控制
//!
//! 生成是长时间阻塞的计算密集操作，接受/排队环节绝不直接阻塞在
//! 生成上：提交立即返回票据，执行发生在每口味的 worker 任务里

mod job;
mod tracker;
mod worker;

pub use job::{JobError, JobRecord, JobState, JobTicket, SubmitError};
pub use tracker::{JobTracker, QueueStats};
pub use worker::{
    admission_queue, admission_queue_with_capacity, AdmissionQueue, AdmissionWorker, JobHandler,
    QUEUE_CAPACITY,
};
