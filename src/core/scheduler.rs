//! 步进调度：时钟注入与进度脚本执行
//!
//! 所有模拟「工作」都是离散的挂起点：进度推进一格、等待固定时长、命中检查点时产生副作用。
//! 等待统一经由 Clock trait，生产环境用 TokioClock，测试注入 ManualClock 即可零等待跑完整个脚本。

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::core::state::{LogEntry, LogLevel, Store};

/// 时钟抽象：调度器的唯一挂起来源
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// 生产时钟：真实等待
#[derive(Debug, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// 测试时钟：不等待，只记录每次请求的时长
#[derive(Debug, Default)]
pub struct ManualClock {
    slept: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Clock for ManualClock {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

impl ManualClock {
    /// 已请求的等待次数
    pub fn ticks(&self) -> usize {
        self.slept.lock().unwrap().len()
    }

    /// 已请求的等待总时长
    pub fn total_slept(&self) -> Duration {
        self.slept.lock().unwrap().iter().sum()
    }
}

/// 进度脚本检查点：到达 percent 时更新布线行和/或前插一条日志
pub struct Checkpoint {
    pub percent: u8,
    pub wiring_line: Option<String>,
    pub log: Option<(LogLevel, &'static str, String)>,
}

impl Checkpoint {
    pub fn wiring(percent: u8, line: impl Into<String>) -> Self {
        Self {
            percent,
            wiring_line: Some(line.into()),
            log: None,
        }
    }

    pub fn log(percent: u8, level: LogLevel, source: &'static str, message: impl Into<String>) -> Self {
        Self {
            percent,
            wiring_line: None,
            log: Some((level, source, message.into())),
        }
    }
}

/// 步进调度器：持有注入的时钟，按固定步长执行进度脚本
pub struct StepScheduler {
    clock: Arc<dyn Clock>,
}

impl StepScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub async fn sleep(&self, duration: Duration) {
        self.clock.sleep(duration).await;
    }

    /// 以 step 为步长将 progress 从 0 推到 100。
    /// 每格顺序为：写进度 -> 等待 step_delay -> 应用命中的检查点副作用。
    /// 单次调用内进度单调不减。
    pub async fn run_progress(
        &self,
        store: &Store,
        step: u8,
        step_delay: Duration,
        checkpoints: &[Checkpoint],
    ) {
        let step = step.max(1);
        let mut percent: u8 = 0;
        loop {
            store.set_progress(percent);
            self.clock.sleep(step_delay).await;
            for cp in checkpoints.iter().filter(|cp| cp.percent == percent) {
                if let Some(ref line) = cp.wiring_line {
                    store.set_wiring_line(line.clone());
                }
                if let Some((level, source, ref message)) = cp.log {
                    store.prepend_log(LogEntry::new(level, source, message.clone()));
                }
            }
            if percent >= 100 {
                break;
            }
            percent = percent.saturating_add(step).min(100);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::DashboardState;

    #[tokio::test]
    async fn test_progress_monotonic_and_complete() {
        let (store, rx) = Store::new(DashboardState::default());
        let clock = Arc::new(ManualClock::default());
        let scheduler = StepScheduler::new(clock.clone());

        scheduler
            .run_progress(&store, 5, Duration::from_millis(150), &[])
            .await;

        assert_eq!(rx.borrow().progress, 100);
        // 0..=100 步长 5 共 21 格，每格一次等待
        assert_eq!(clock.ticks(), 21);
        assert_eq!(clock.total_slept(), Duration::from_millis(150 * 21));
    }

    #[tokio::test]
    async fn test_checkpoints_fire_once() {
        let (store, rx) = Store::new(DashboardState::default());
        let initial_logs = rx.borrow().logs.len();
        let scheduler = StepScheduler::new(Arc::new(ManualClock::default()));

        let checkpoints = vec![
            Checkpoint::wiring(10, "step one"),
            Checkpoint::log(20, LogLevel::Info, "TEST", "checkpoint log"),
            Checkpoint::wiring(90, "step two"),
        ];
        scheduler
            .run_progress(&store, 5, Duration::from_millis(1), &checkpoints)
            .await;

        let state = rx.borrow();
        assert_eq!(state.wiring_line, "step two");
        assert_eq!(state.logs.len(), initial_logs + 1);
        assert_eq!(state.logs[0].message, "checkpoint log");
    }

    #[tokio::test]
    async fn test_checkpoint_off_grid_is_skipped() {
        // 步长 5 的格点不含 13，对应检查点不触发
        let (store, rx) = Store::new(DashboardState::default());
        let initial_logs = rx.borrow().logs.len();
        let scheduler = StepScheduler::new(Arc::new(ManualClock::default()));

        let checkpoints = vec![Checkpoint::log(13, LogLevel::Info, "TEST", "never")];
        scheduler
            .run_progress(&store, 5, Duration::from_millis(1), &checkpoints)
            .await;

        assert_eq!(rx.borrow().logs.len(), initial_logs);
    }
}
