//! Shared Sampler - 进程级共享随机源
//!
//! 模型契约咨询的所有伪随机都出自这一个采样器。seed != 0 的请求在
//! 调用前对它做确定性重播种 —— 这是**全局**突变而非请求级作用域，
//! 因此同一口味内的执行并发必须保持为 1（见 queue 模块）；在未按
//! 请求隔离随机性之前提高并发会无声破坏可复现性保证。

use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

/// 采样器内部状态
///
/// 播种模式下为 PCG XSH RR 64/32；未播种模式退化为
/// 系统时钟 + 计数器的混合熵
struct SamplerState {
    state: u64,
    seeded: bool,
    counter: u64,
}

impl SamplerState {
    fn reseed(&mut self, seed: u64) {
        // 种子与增量混合，避免退化初始状态
        self.state = seed
            .wrapping_mul(2685821657736338717)
            .wrapping_add(1442695040888963407);
        self.seeded = true;
    }

    fn next_u32(&mut self) -> u32 {
        if !self.seeded {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .subsec_nanos() as u64;
            let count = self.counter;
            self.counter += 1;

            let mixed = nanos
                .wrapping_add(count)
                .wrapping_mul(1103515245)
                .wrapping_add(12345);
            return (mixed >> 16) as u32;
        }

        // PCG XSH RR 64/32
        let old_state = self.state;
        self.state = old_state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);

        let xorshifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    fn next_f32(&mut self) -> f32 {
        (self.next_u32() as f32) / (u32::MAX as f32)
    }
}

/// 进程级共享采样器
pub struct SharedSampler {
    inner: Mutex<SamplerState>,
}

impl SharedSampler {
    /// 创建未播种（环境熵）的采样器
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SamplerState {
                state: 0,
                seeded: false,
                counter: 0,
            }),
        }
    }

    /// 确定性重播种
    ///
    /// 全局突变：影响之后所有咨询该采样器的调用
    pub async fn reseed(&self, seed: u64) {
        let mut guard = self.inner.lock().await;
        guard.reseed(seed);
        tracing::debug!(seed = seed, "Shared sampler reseeded");
    }

    /// 取一个 u64
    pub async fn next_u64(&self) -> u64 {
        let mut guard = self.inner.lock().await;
        ((guard.next_u32() as u64) << 32) | guard.next_u32() as u64
    }

    /// 批量取 [0, 1) 区间的 f32，一次锁定
    pub async fn fill_f32(&self, out: &mut [f32]) {
        let mut guard = self.inner.lock().await;
        for slot in out.iter_mut() {
            *slot = guard.next_f32();
        }
    }
}

impl Default for SharedSampler {
    fn default() -> Self {
        Self::new()
    }
}
