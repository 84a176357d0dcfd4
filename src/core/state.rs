//! 状态定义：DashboardState 与 Store
//!
//! 整个应用只有一份可变状态 DashboardState，由 Store 独占持有并通过 watch 通道单向发布；
//! UI 只读快照，所有写入都经由编排器后台任务（同一时刻至多一个回合在写）。

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

use crate::core::fixtures;

/// 日志列表上限：前插超过此数量时丢弃最旧的条目
const MAX_LOG_ENTRIES: usize = 50;

/// 消息角色（与远端会话服务的角色一致，另加 Function 表示工具执行公告）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Role {
    User,
    Model,
    System,
    Function,
}

/// 终端中的单条消息；创建后不再修改，只追加
#[derive(Clone, Debug, Serialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Local>,
    pub is_error: bool,
}

impl Message {
    fn new(role: Role, text: impl Into<String>, is_error: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            timestamp: Local::now(),
            is_error,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text, false)
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text, false)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text, false)
    }

    pub fn system_error(text: impl Into<String>) -> Self {
        Self::new(Role::System, text, true)
    }

    pub fn function(text: impl Into<String>) -> Self {
        Self::new(Role::Function, text, false)
    }
}

/// 日志级别（页脚日志窗口按级别着色）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Success,
}

/// 页脚滚动日志的单条记录
#[derive(Clone, Debug, Serialize)]
pub struct LogEntry {
    pub id: Uuid,
    pub timestamp: String,
    pub level: LogLevel,
    pub source: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            level,
            source: source.into(),
            message: message.into(),
        }
    }

    /// 种子数据用：固定时间戳（来自初始模拟数据表）
    pub fn seeded(
        timestamp: &str,
        level: LogLevel,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: timestamp.to_string(),
            level,
            source: source.into(),
            message: message.into(),
        }
    }
}

/// 云盘文件同步状态
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FileStatus {
    Synced,
    Changed,
    Pending,
}

/// 资源面板中的云盘文件条目
#[derive(Clone, Debug, Serialize)]
pub struct DriveFile {
    pub name: String,
    pub path: String,
    pub last_modified: String,
    pub status: FileStatus,
}

/// 提交部署状态
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CommitStatus {
    Deployed,
    Pending,
    Failed,
}

/// 资源面板中的 Git 提交条目
#[derive(Clone, Debug, Serialize)]
pub struct Commit {
    pub hash: String,
    pub message: String,
    pub author: String,
    pub timestamp: String,
    pub branch: String,
    pub status: CommitStatus,
}

/// 指标趋势
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

/// 仪表盘指标卡片
#[derive(Clone, Debug, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
    /// 百分比变化
    pub change: i32,
    pub trend: Trend,
    pub unit: Option<String>,
}

/// 集成配置：连接标志与密钥；只由工具处理器或配置加载写入，
/// 回合协议读取其中的标志与密钥字段作为门禁条件，不校验格式
#[derive(Clone, Debug, Serialize)]
pub struct IntegrationConfig {
    pub github_repo: String,
    pub github_branch: String,
    pub drive_path: String,
    pub drive_connected: bool,
    pub repo_connected: bool,
    pub railway_token: String,
    pub gdrive_folder_id: String,
    pub service_account_base64: String,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            github_repo: String::new(),
            github_branch: "main".to_string(),
            drive_path: "/My Drive/SPARTAN-AI-WORKFORCE/".to_string(),
            drive_connected: false,
            repo_connected: false,
            railway_token: String::new(),
            gdrive_folder_id: String::new(),
            service_account_base64: String::new(),
        }
    }
}

/// 编排器状态机；同一时刻只有一个值生效
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum OrchestratorStatus {
    Idle,
    Analyzing,
    Executing,
    Wiring,
    StressTest,
    AwaitingDecision,
    Syncing,
}

impl OrchestratorStatus {
    /// 是否允许开始新回合（其余状态下的提交会在命令队列中排队）
    pub fn accepts_turn(&self) -> bool {
        matches!(self, Self::Idle | Self::AwaitingDecision)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Analyzing => "ANALYZING",
            Self::Executing => "EXECUTING",
            Self::Wiring => "WIRING",
            Self::StressTest => "STRESS_TEST",
            Self::AwaitingDecision => "AWAITING_DECISION",
            Self::Syncing => "SYNCING",
        }
    }
}

/// 应用完整状态：消息、日志、文件、提交、指标、进度与集成配置
#[derive(Clone, Debug)]
pub struct DashboardState {
    pub status: OrchestratorStatus,
    pub messages: Vec<Message>,
    pub logs: Vec<LogEntry>,
    pub files: Vec<DriveFile>,
    pub commits: Vec<Commit>,
    pub metrics: Vec<Metric>,
    /// 布线/执行可视化进度，0..=100
    pub progress: u8,
    /// 布线遮罩当前状态行
    pub wiring_line: String,
    pub integration: IntegrationConfig,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            status: OrchestratorStatus::Idle,
            messages: Vec::new(),
            logs: fixtures::initial_logs(),
            files: fixtures::initial_files(),
            commits: fixtures::initial_commits(),
            metrics: fixtures::initial_metrics(),
            progress: 0,
            wiring_line: "Initializing...".to_string(),
            integration: IntegrationConfig::default(),
        }
    }
}

impl DashboardState {
    pub fn push_message(&mut self, msg: Message) {
        self.messages.push(msg);
    }

    /// 日志最新在前；超出上限时丢弃最旧的
    pub fn prepend_log(&mut self, entry: LogEntry) {
        self.logs.insert(0, entry);
        self.logs.truncate(MAX_LOG_ENTRIES);
    }
}

/// 状态仓库：独占持有 watch 发送端，所有修改通过 update 一次性提交并广播
pub struct Store {
    tx: watch::Sender<DashboardState>,
}

impl Store {
    pub fn new(initial: DashboardState) -> (Self, watch::Receiver<DashboardState>) {
        let (tx, rx) = watch::channel(initial);
        (Self { tx }, rx)
    }

    /// 在一次广播内完成一组修改（工具处理器的「原子提交」即一次 update 调用）
    pub fn update(&self, f: impl FnOnce(&mut DashboardState)) {
        self.tx.send_modify(f);
    }

    pub fn snapshot(&self) -> DashboardState {
        self.tx.borrow().clone()
    }

    pub fn push_message(&self, msg: Message) {
        self.update(|s| s.push_message(msg));
    }

    pub fn prepend_log(&self, entry: LogEntry) {
        self.update(|s| s.prepend_log(entry));
    }

    pub fn set_status(&self, status: OrchestratorStatus) {
        self.update(|s| s.status = status);
    }

    pub fn set_progress(&self, progress: u8) {
        self.update(|s| s.progress = progress);
    }

    pub fn set_wiring_line(&self, line: impl Into<String>) {
        self.update(|s| s.wiring_line = line.into());
    }
}
