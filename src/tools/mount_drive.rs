//! mount_drive 工具
//!
//! 模拟挂载一个云盘路径：布线进度 0→100（步长 5），固定检查点更新布线行与 DRIVE 日志；
//! 完成时一次性提交配置变更、按序追加四个模拟文件并改写 Storage Used 指标。

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::fixtures;
use crate::core::scheduler::Checkpoint;
use crate::core::state::{LogEntry, LogLevel, Trend};
use crate::tools::{ToolContext, ToolHandler, ToolOutcome};

const PROGRESS_STEP: u8 = 5;

pub struct MountDriveTool;

#[async_trait]
impl ToolHandler for MountDriveTool {
    fn name(&self) -> &str {
        "mount_drive"
    }

    fn description(&self) -> &str {
        "Mounts a Google Drive path to the local file system for monitoring."
    }

    fn declaration(&self) -> Value {
        json!({
            "name": "mount_drive",
            "description": self.description(),
            "parameters": {
                "type": "OBJECT",
                "properties": {
                    "path": {
                        "type": "STRING",
                        "description": "The folder path in Google Drive (e.g., /My Drive/SPARTAN-WORKFORCE/)."
                    }
                },
                "required": ["path"]
            }
        })
    }

    async fn execute(&self, args: &Value, ctx: &ToolContext) -> Result<ToolOutcome, String> {
        let path = args
            .get("path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| "mount_drive: missing required arg 'path'".to_string())?
            .to_string();

        let checkpoints = [
            Checkpoint::wiring(10, format!("Resolving storage path: {path}...")),
            Checkpoint::log(20, LogLevel::Info, "DRIVE", format!("Mounting volume: {path}")),
            Checkpoint::wiring(40, "Mounting volume (Type: High-IO)..."),
            Checkpoint::log(60, LogLevel::Info, "DRIVE", "Indexing 4,203 files..."),
            Checkpoint::wiring(70, "Indexing 4,203 files..."),
            Checkpoint::wiring(95, "Sync complete."),
        ];
        ctx.scheduler
            .run_progress(&ctx.store, PROGRESS_STEP, ctx.step_delay, &checkpoints)
            .await;

        // 最终提交：配置 + 追加文件 + 改写单个指标 + 成功日志，一次 update 原子完成
        ctx.store.update(|s| {
            s.integration.drive_path = path.clone();
            s.integration.drive_connected = true;
            s.files.extend(fixtures::mounted_drive_files());
            for m in s.metrics.iter_mut().filter(|m| m.label == "Storage Used") {
                m.value = "7.1 TB".to_string();
                m.trend = Trend::Up;
                m.change = 100;
            }
            s.prepend_log(LogEntry::new(LogLevel::Success, "AGENT", "Mounted Volume: 7TB"));
        });

        Ok(ToolOutcome::success(format!(
            "Volume {path} mounted. Capacity: 7TB. IOPS: High."
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheduler::{ManualClock, StepScheduler};
    use crate::core::state::{DashboardState, FileStatus, Store};
    use std::sync::Arc;
    use std::time::Duration;

    fn test_ctx() -> (ToolContext, tokio::sync::watch::Receiver<DashboardState>) {
        let (store, rx) = Store::new(DashboardState::default());
        let ctx = ToolContext {
            store: Arc::new(store),
            scheduler: Arc::new(StepScheduler::new(Arc::new(ManualClock::default()))),
            step_delay: Duration::from_millis(150),
        };
        (ctx, rx)
    }

    #[tokio::test]
    async fn test_mount_appends_files_in_order() {
        let (ctx, rx) = test_ctx();
        let before = rx.borrow().files.clone();

        MountDriveTool
            .execute(&json!({ "path": "/My Drive/X/" }), &ctx)
            .await
            .unwrap();

        let state = rx.borrow();
        // 原有文件保留在前，四个模拟条目按序追加在后
        assert_eq!(state.files.len(), before.len() + 4);
        for (i, f) in before.iter().enumerate() {
            assert_eq!(state.files[i].name, f.name);
        }
        assert_eq!(state.files[before.len()].name, "ENTERPRISE_DATASET_V1.parquet");
        assert_eq!(state.files[before.len() + 1].status, FileStatus::Pending);
        assert!(state.integration.drive_connected);
        assert_eq!(state.integration.drive_path, "/My Drive/X/");
    }

    #[tokio::test]
    async fn test_mount_rewrites_only_storage_metric() {
        let (ctx, rx) = test_ctx();
        let before = rx.borrow().metrics.clone();

        MountDriveTool
            .execute(&json!({ "path": "/My Drive/X/" }), &ctx)
            .await
            .unwrap();

        let state = rx.borrow();
        for (i, m) in state.metrics.iter().enumerate() {
            if m.label == "Storage Used" {
                assert_eq!(m.value, "7.1 TB");
                assert_eq!(m.trend, Trend::Up);
                assert_eq!(m.change, 100);
                // 单位字段不动
                assert_eq!(m.unit, before[i].unit);
            } else {
                assert_eq!(m.value, before[i].value);
                assert_eq!(m.change, before[i].change);
                assert_eq!(m.trend, before[i].trend);
            }
        }
    }

    #[tokio::test]
    async fn test_mount_requires_path() {
        let (ctx, _rx) = test_ctx();
        let err = MountDriveTool.execute(&json!({}), &ctx).await.unwrap_err();
        assert!(err.contains("path"));
    }
}
