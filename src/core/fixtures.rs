//! 模拟数据表
//!
//! 仪表盘的种子数据与两份「连接完成」注入数据集。全部为固定内容：
//! connect_repository 完成时整表替换提交列表，mount_drive 完成时追加四个文件条目。

use crate::core::state::{
    Commit, CommitStatus, DriveFile, FileStatus, LogEntry, LogLevel, Metric, Trend,
};

pub fn initial_logs() -> Vec<LogEntry> {
    vec![
        LogEntry::seeded("08:59:01", LogLevel::Info, "SYSTEM", "Orchestrator initialization complete."),
        LogEntry::seeded("08:59:05", LogLevel::Info, "WATCHER", "Monitoring SPARTAN-AI-WORKFORCE/ active."),
        LogEntry::seeded("09:00:00", LogLevel::Success, "CRON", "Daily pipeline check triggered."),
    ]
}

pub fn initial_files() -> Vec<DriveFile> {
    vec![
        DriveFile {
            name: "prospect_pipeline.csv".to_string(),
            path: "DATA/".to_string(),
            last_modified: "Today, 8:45 AM".to_string(),
            status: FileStatus::Synced,
        },
        DriveFile {
            name: "revenue_tracking.csv".to_string(),
            path: "DATA/".to_string(),
            last_modified: "Yesterday".to_string(),
            status: FileStatus::Synced,
        },
        DriveFile {
            name: "deployment-config.yaml".to_string(),
            path: "CONTROL-CENTER/".to_string(),
            last_modified: "2 days ago".to_string(),
            status: FileStatus::Synced,
        },
    ]
}

/// mount_drive 完成时按序追加的四个文件条目
pub fn mounted_drive_files() -> Vec<DriveFile> {
    vec![
        DriveFile {
            name: "ENTERPRISE_DATASET_V1.parquet".to_string(),
            path: "VOL_1/ARCHIVE/".to_string(),
            last_modified: "Just now".to_string(),
            status: FileStatus::Synced,
        },
        DriveFile {
            name: "training_data_large.json".to_string(),
            path: "VOL_1/ML_DATA/".to_string(),
            last_modified: "Just now".to_string(),
            status: FileStatus::Pending,
        },
        DriveFile {
            name: "model_weights_v4.bin".to_string(),
            path: "VOL_2/MODELS/".to_string(),
            last_modified: "1 min ago".to_string(),
            status: FileStatus::Synced,
        },
        DriveFile {
            name: "customer_records_2024.sql".to_string(),
            path: "VOL_1/BACKUPS/".to_string(),
            last_modified: "5 mins ago".to_string(),
            status: FileStatus::Synced,
        },
    ]
}

/// 未连接仓库时的占位提交
pub fn initial_commits() -> Vec<Commit> {
    vec![Commit {
        hash: "------".to_string(),
        message: "Waiting for connection...".to_string(),
        author: "-".to_string(),
        timestamp: "-".to_string(),
        branch: "-".to_string(),
        status: CommitStatus::Pending,
    }]
}

/// connect_repository 完成时整表替换的提交列表
pub fn connected_repo_commits() -> Vec<Commit> {
    vec![
        Commit {
            hash: "8f3a21b".to_string(),
            message: "feat: add agent retry logic".to_string(),
            author: "joe-dev".to_string(),
            timestamp: "2 mins ago".to_string(),
            branch: "main".to_string(),
            status: CommitStatus::Deployed,
        },
        Commit {
            hash: "9c4b32a".to_string(),
            message: "fix: sales pipeline threshold".to_string(),
            author: "spartan-bot".to_string(),
            timestamp: "1 hour ago".to_string(),
            branch: "main".to_string(),
            status: CommitStatus::Deployed,
        },
        Commit {
            hash: "2d1e54c".to_string(),
            message: "chore: update dependency graph".to_string(),
            author: "joe-dev".to_string(),
            timestamp: "5 hours ago".to_string(),
            branch: "dev".to_string(),
            status: CommitStatus::Pending,
        },
        Commit {
            hash: "1a2b3c4".to_string(),
            message: "docs: update readme".to_string(),
            author: "joe-dev".to_string(),
            timestamp: "Yesterday".to_string(),
            branch: "main".to_string(),
            status: CommitStatus::Deployed,
        },
    ]
}

pub fn initial_metrics() -> Vec<Metric> {
    vec![
        Metric {
            label: "Pipeline Value".to_string(),
            value: "$650,000".to_string(),
            change: 12,
            trend: Trend::Up,
            unit: None,
        },
        Metric {
            label: "Active Prospects".to_string(),
            value: "42".to_string(),
            change: 5,
            trend: Trend::Up,
            unit: None,
        },
        Metric {
            label: "Storage Used".to_string(),
            value: "0.4 TB".to_string(),
            change: 0,
            trend: Trend::Neutral,
            unit: Some("/ 10 TB".to_string()),
        },
        Metric {
            label: "Server Load".to_string(),
            value: "12%".to_string(),
            change: -2,
            trend: Trend::Down,
            unit: Some("CPU".to_string()),
        },
    ]
}
