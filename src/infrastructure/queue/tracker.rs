//! In-Memory Job Tracker - 任务记录与撤回标志
//!
//! 全部状态驻留内存，供状态查询接口与 worker 共用

use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use super::job::{JobRecord, JobState};
use crate::application::services::GenerationOutput;
use crate::domain::generation::ModelFlavor;

/// 每口味队列统计
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct QueueStats {
    pub queued: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub withdrawn: usize,
}

/// 内存任务追踪器
pub struct JobTracker {
    /// job_id -> JobRecord
    records: DashMap<Uuid, JobRecord>,
    /// job_id -> 撤回标志（与票据共享）
    flags: DashMap<Uuid, Arc<AtomicBool>>,
}

impl JobTracker {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            flags: DashMap::new(),
        }
    }

    /// 登记新排队任务，返回与票据共享的撤回标志
    pub(crate) fn register(&self, job_id: Uuid, flavor: ModelFlavor) -> Arc<AtomicBool> {
        let flag = Arc::new(AtomicBool::new(false));
        self.records.insert(job_id, JobRecord::new(job_id, flavor));
        self.flags.insert(job_id, flag.clone());
        flag
    }

    /// 提交被拒绝时回滚登记
    pub(crate) fn unregister(&self, job_id: Uuid) {
        self.records.remove(&job_id);
        self.flags.remove(&job_id);
    }

    pub fn get(&self, job_id: Uuid) -> Option<JobRecord> {
        self.records.get(&job_id).map(|r| r.clone())
    }

    /// 撤回排队中的任务
    ///
    /// 已开始执行（或已结束）的任务返回 false
    pub fn withdraw(&self, job_id: Uuid) -> bool {
        let Some(mut record) = self.records.get_mut(&job_id) else {
            return false;
        };

        if record.state != JobState::Queued {
            return false;
        }

        if let Some(flag) = self.flags.get(&job_id) {
            flag.store(true, Ordering::SeqCst);
        }
        record.state = JobState::Withdrawn;
        record.finished_at = Some(chrono::Utc::now());

        tracing::debug!(job_id = %job_id, "Job withdrawn");
        true
    }

    pub(crate) fn mark_running(&self, job_id: Uuid) {
        if let Some(mut record) = self.records.get_mut(&job_id) {
            record.state = JobState::Running;
            record.started_at = Some(chrono::Utc::now());
        }
    }

    pub(crate) fn mark_completed(&self, job_id: Uuid, output: &GenerationOutput) {
        if let Some(mut record) = self.records.get_mut(&job_id) {
            record.state = JobState::Completed;
            record.finished_at = Some(chrono::Utc::now());
            record.artifact_path = Some(output.artifact_path.clone());
            record.sample_rate = Some(output.sample_rate);
            record.duration_ms = Some(output.duration_ms());
        }
        self.flags.remove(&job_id);
    }

    pub(crate) fn mark_failed(&self, job_id: Uuid, error: String) {
        if let Some(mut record) = self.records.get_mut(&job_id) {
            record.state = JobState::Failed;
            record.finished_at = Some(chrono::Utc::now());
            record.error = Some(error);
        }
        self.flags.remove(&job_id);
    }

    pub(crate) fn mark_withdrawn(&self, job_id: Uuid) {
        if let Some(mut record) = self.records.get_mut(&job_id) {
            if record.state != JobState::Withdrawn {
                record.state = JobState::Withdrawn;
                record.finished_at = Some(chrono::Utc::now());
            }
        }
        self.flags.remove(&job_id);
    }

    /// 口味级统计快照
    pub fn stats(&self, flavor: ModelFlavor) -> QueueStats {
        let mut stats = QueueStats::default();
        for record in self.records.iter().filter(|r| r.flavor == flavor) {
            match record.state {
                JobState::Queued => stats.queued += 1,
                JobState::Running => stats.running += 1,
                JobState::Completed => stats.completed += 1,
                JobState::Failed => stats.failed += 1,
                JobState::Withdrawn => stats.withdrawn += 1,
            }
        }
        stats
    }
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn output() -> GenerationOutput {
        GenerationOutput {
            sample_rate: 24000,
            samples: vec![0.0; 2400],
            artifact_path: PathBuf::from("generated_tts.wav"),
        }
    }

    #[test]
    fn test_lifecycle_transitions() {
        let tracker = JobTracker::new();
        let job_id = Uuid::new_v4();
        tracker.register(job_id, ModelFlavor::Tts);

        assert_eq!(tracker.get(job_id).unwrap().state, JobState::Queued);

        tracker.mark_running(job_id);
        assert_eq!(tracker.get(job_id).unwrap().state, JobState::Running);

        tracker.mark_completed(job_id, &output());
        let record = tracker.get(job_id).unwrap();
        assert_eq!(record.state, JobState::Completed);
        assert_eq!(record.sample_rate, Some(24000));
        assert_eq!(record.duration_ms, Some(100));
        assert!(record.finished_at.is_some());
    }

    #[test]
    fn test_withdraw_only_affects_queued_jobs() {
        let tracker = JobTracker::new();
        let job_id = Uuid::new_v4();
        let flag = tracker.register(job_id, ModelFlavor::Tts);

        assert!(tracker.withdraw(job_id));
        assert!(flag.load(Ordering::SeqCst));
        assert_eq!(tracker.get(job_id).unwrap().state, JobState::Withdrawn);

        // 运行中的任务不可撤回
        let running_id = Uuid::new_v4();
        tracker.register(running_id, ModelFlavor::Tts);
        tracker.mark_running(running_id);
        assert!(!tracker.withdraw(running_id));
        assert_eq!(tracker.get(running_id).unwrap().state, JobState::Running);
    }

    #[test]
    fn test_stats_are_per_flavor() {
        let tracker = JobTracker::new();
        let tts_id = Uuid::new_v4();
        let vc_id = Uuid::new_v4();
        tracker.register(tts_id, ModelFlavor::Tts);
        tracker.register(vc_id, ModelFlavor::Vc);
        tracker.mark_running(vc_id);

        let tts_stats = tracker.stats(ModelFlavor::Tts);
        assert_eq!(tts_stats.queued, 1);
        assert_eq!(tts_stats.running, 0);

        let vc_stats = tracker.stats(ModelFlavor::Vc);
        assert_eq!(vc_stats.queued, 0);
        assert_eq!(vc_stats.running, 1);
    }
}
