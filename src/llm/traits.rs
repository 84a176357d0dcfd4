//! 会话传输抽象
//!
//! 所有后端（Gemini / Mock）实现 ChatTransport：发送用户文本或工具结果，
//! 返回统一的响应信封（可选文本 + 有序的工具调用请求列表）。错误为字符串，由回合协议归类。

use async_trait::async_trait;
use serde_json::Value;

/// 远端服务在响应中发出的工具调用请求；不持久化，由回合协议立即消费
#[derive(Clone, Debug)]
pub struct ToolCallRequest {
    pub name: String,
    pub args: Value,
}

/// 响应信封：拼接后的文本与按出现顺序排列的工具调用。
/// 协议只对第一个工具调用采取行动，其余忽略（已知限制，刻意保留）。
#[derive(Clone, Debug, Default)]
pub struct ModelResponse {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ModelResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn first_tool_call(&self) -> Option<&ToolCallRequest> {
        self.tool_calls.first()
    }

    /// 文本为空时回退到固定文案
    pub fn text_or(&self, fallback: &str) -> String {
        match self.text.as_deref() {
            Some(t) if !t.trim().is_empty() => t.to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// 会话传输 trait：同一实例内部持有唯一的有状态会话（进程生存期，不显式销毁）
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// 发送一条用户文本，返回响应信封
    async fn send_user_message(&self, text: &str) -> Result<ModelResponse, String>;

    /// 将工具执行结果回传给模型，闭合一次工具调用循环
    async fn send_tool_result(&self, tool_name: &str, result: Value) -> Result<ModelResponse, String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_or_fallback() {
        let empty = ModelResponse::default();
        assert_eq!(empty.text_or("Command executed."), "Command executed.");

        let blank = ModelResponse::from_text("   ");
        assert_eq!(blank.text_or("Action complete."), "Action complete.");

        let real = ModelResponse::from_text("done");
        assert_eq!(real.text_or("x"), "done");
    }

    #[test]
    fn test_first_tool_call_order() {
        let resp = ModelResponse {
            text: None,
            tool_calls: vec![
                ToolCallRequest {
                    name: "connect_repository".to_string(),
                    args: serde_json::json!({"url": "a"}),
                },
                ToolCallRequest {
                    name: "mount_drive".to_string(),
                    args: serde_json::json!({"path": "b"}),
                },
            ],
        };
        assert_eq!(resp.first_tool_call().unwrap().name, "connect_repository");
    }
}
