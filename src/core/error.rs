//! 编排器错误类型
//!
//! 所有错误对当前回合都是终结性的：回合协议捕获后追加一条系统错误消息并将状态复位为 Idle，
//! 不重试、不回滚已追加的消息，进程本身不退出。

use thiserror::Error;

/// 回合执行过程中可能出现的错误（凭证缺失、传输失败、密钥缺失、未知工具）
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// 进程环境中没有 API Key，远端会话无法建立（降级为本地模式）
    #[error("Missing credentials: GEMINI_API_KEY not set")]
    MissingCredentials,

    /// 传输层从未初始化成功，却被要求发起远端调用
    #[error("Transport not initialized")]
    Uninitialized,

    /// 与远端会话服务收发失败（网络、HTTP 状态、响应解析）
    #[error("Transport error: {0}")]
    Transport(String),

    /// 脚本化管线前置检查失败：指定的密钥字段为空
    #[error("Missing secrets: {0}")]
    MissingSecrets(String),

    /// 模型请求了注册表中不存在的工具
    #[error("Unrecognized tool: {0}")]
    UnrecognizedTool(String),

    /// 本地工具处理器执行失败（如参数缺失）
    #[error("Tool execution failed: {0}")]
    ToolFailed(String),
}
