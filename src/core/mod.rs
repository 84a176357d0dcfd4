//! 核心模块：错误、状态、调度、管线、回合协议与编排器

pub mod error;
pub mod fixtures;
pub mod orchestrator;
pub mod pipeline;
pub mod scheduler;
pub mod state;
pub mod turn;

pub use error::OrchestratorError;
pub use orchestrator::{create_orchestrator, Command};
pub use scheduler::{Checkpoint, Clock, ManualClock, StepScheduler, TokioClock};
pub use state::{
    Commit, CommitStatus, DashboardState, DriveFile, FileStatus, IntegrationConfig, LogEntry,
    LogLevel, Message, Metric, OrchestratorStatus, Role, Store, Trend,
};
pub use turn::{SimDelays, TurnRuntime};
