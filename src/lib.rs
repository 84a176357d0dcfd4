//! Spartan - Rust AI 工作台编排器
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 编排器、状态仓库、回合协议、脚本化管线、步进调度
//! - **llm**: 会话传输抽象与实现（Gemini / Mock）
//! - **tools**: 工具注册表与本地处理器（connect_repository / mount_drive）
//! - **ui**: Ratatui TUI 仪表盘

pub mod config;
pub mod core;
pub mod llm;
pub mod tools;
pub mod ui;
