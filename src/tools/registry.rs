//! 工具注册表
//!
//! 所有工具实现 ToolHandler trait（name / description / declaration / execute），
//! 由 ToolRegistry 按名注册与查找。declaration 为 Gemini functionDeclaration 格式，
//! 在会话创建时一次性交给传输层，运行期不变。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::core::scheduler::StepScheduler;
use crate::core::state::Store;

/// 工具执行上下文：状态仓库与步进调度器（供模拟布线循环推进进度/写日志）
pub struct ToolContext {
    pub store: Arc<Store>,
    pub scheduler: Arc<StepScheduler>,
    /// 布线循环每格的等待时长
    pub step_delay: Duration,
}

/// 工具执行结果：序列化后作为 functionResponse 回传给模型，随后丢弃
#[derive(Clone, Debug, Serialize)]
pub struct ToolOutcome {
    pub status: String,
    pub message: String,
}

impl ToolOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// 工具 trait：声明（供远端服务请求调用）与本地处理器（模拟布线 + 最终一次原子状态提交）
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// 工具名称（与 functionCall 中的 name 精确匹配）
    fn name(&self) -> &str;

    /// 工具描述（供模型理解功能）
    fn description(&self) -> &str;

    /// Gemini functionDeclaration（含参数 schema 与 required 列表）
    fn declaration(&self) -> Value;

    /// 执行工具：推进模拟进度并在结束时一次性提交状态变更
    async fn execute(&self, args: &Value, ctx: &ToolContext) -> Result<ToolOutcome, String>;
}

/// 工具注册表：按名称存储 Arc<dyn ToolHandler>，declarations 汇总给传输层
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl ToolHandler + 'static) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.tools.get(name).cloned()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// 全部工具的 functionDeclaration 列表（会话创建时注册，只读）
    pub fn declarations(&self) -> Vec<Value> {
        self.tools.values().map(|t| t.declaration()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopTool;

    #[async_trait]
    impl ToolHandler for NoopTool {
        fn name(&self) -> &str {
            "noop"
        }

        fn description(&self) -> &str {
            "does nothing"
        }

        fn declaration(&self) -> Value {
            serde_json::json!({ "name": "noop", "description": "does nothing" })
        }

        async fn execute(&self, _args: &Value, _ctx: &ToolContext) -> Result<ToolOutcome, String> {
            Ok(ToolOutcome::success("ok"))
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(NoopTool);
        assert!(registry.get("noop").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.declarations().len(), 1);
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = ToolOutcome::success("linked");
        let value = outcome.to_value();
        assert_eq!(value["status"], "success");
        assert_eq!(value["message"], "linked");
    }
}
