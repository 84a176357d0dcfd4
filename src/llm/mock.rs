//! Mock 会话传输（离线运行与测试用，无需 API Key）
//!
//! 对用户输入做关键词匹配：提到仓库则请求 connect_repository，提到云盘则请求 mount_drive，
//! 其余回显文本，便于在无网络环境下跑通完整的回合/工具调用循环。

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::llm::{ChatTransport, ModelResponse, ToolCallRequest};

/// Mock 传输：无状态，关键词驱动
#[derive(Debug, Default)]
pub struct MockTransport;

#[async_trait]
impl ChatTransport for MockTransport {
    async fn send_user_message(&self, text: &str) -> Result<ModelResponse, String> {
        let lower = text.to_lowercase();

        if lower.contains("repo") || lower.contains("github") {
            return Ok(ModelResponse {
                text: None,
                tool_calls: vec![ToolCallRequest {
                    name: "connect_repository".to_string(),
                    args: json!({ "url": "https://github.com/spartan/workforce-core", "branch": "main" }),
                }],
            });
        }

        if lower.contains("drive") || lower.contains("mount") || lower.contains("storage") {
            return Ok(ModelResponse {
                text: None,
                tool_calls: vec![ToolCallRequest {
                    name: "mount_drive".to_string(),
                    args: json!({ "path": "/My Drive/SPARTAN-AI-WORKFORCE/" }),
                }],
            });
        }

        Ok(ModelResponse::from_text(format!(
            "🛡️ Spartan Core (offline mode). Received: {text}"
        )))
    }

    async fn send_tool_result(&self, tool_name: &str, result: Value) -> Result<ModelResponse, String> {
        let message = result
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Action complete.");
        Ok(ModelResponse::from_text(format!("✅ {tool_name}: {message}")))
    }
}
