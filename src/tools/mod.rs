//! 工具箱：注册表与两个本地处理器

pub mod connect_repo;
pub mod mount_drive;
pub mod registry;

pub use connect_repo::ConnectRepositoryTool;
pub use mount_drive::MountDriveTool;
pub use registry::{ToolContext, ToolHandler, ToolOutcome, ToolRegistry};
