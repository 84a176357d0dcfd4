//! Gemini 会话传输
//!
//! 通过 reqwest 调用 Generative Language API 的 generateContent。会话即请求历史：
//! systemInstruction、temperature 与工具声明在创建时固定，之后只追加 contents。
//! 不重试；任何失败以字符串错误上抛，由回合协议归类并复位状态。

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::debug;

use crate::llm::{ChatTransport, ModelResponse, ToolCallRequest};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini 传输：持有 HTTP 客户端、会话配置与受互斥锁保护的历史
pub struct GeminiTransport {
    http: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f64,
    system_instruction: String,
    /// 会话创建时注册的 functionDeclarations，运行期不变
    tool_declarations: Vec<Value>,
    /// 会话历史（含模型返回的 functionCall part），进程生存期内只增
    history: Mutex<Vec<Value>>,
}

impl GeminiTransport {
    /// 从进程环境读取 API Key；缺失返回 None（非致命，调用方降级为本地模式）
    pub fn from_env(
        model: Option<&str>,
        temperature: f64,
        system_instruction: impl Into<String>,
        tool_declarations: Vec<Value>,
    ) -> Option<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .ok()?;
        Some(Self {
            http: reqwest::Client::new(),
            api_key,
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
            temperature,
            system_instruction: system_instruction.into(),
            tool_declarations,
            history: Mutex::new(Vec::new()),
        })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            GEMINI_API_BASE, self.model, self.api_key
        )
    }

    fn build_request_body(&self, contents: &[Value]) -> Value {
        let mut body = json!({
            "contents": contents,
            "systemInstruction": {
                "parts": [{ "text": self.system_instruction }]
            },
            "generationConfig": {
                "temperature": self.temperature,
            }
        });
        if !self.tool_declarations.is_empty() {
            body["tools"] = json!([{ "functionDeclarations": self.tool_declarations }]);
        }
        body
    }

    /// 解析首个 candidate：文本 part 拼接，functionCall part 按序收集。
    /// 返回 (响应信封, 模型 content 原文)，后者写回历史以维持会话连续性。
    fn parse_response(json: &Value) -> Result<(ModelResponse, Value), String> {
        let first = json["candidates"]
            .as_array()
            .and_then(|c| c.first())
            .ok_or_else(|| "no candidates in response".to_string())?;

        let content = first["content"].clone();
        let parts = content["parts"].as_array().cloned().unwrap_or_default();

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        for part in &parts {
            if let Some(t) = part["text"].as_str() {
                text.push_str(t);
            }
            if let Some(fc) = part.get("functionCall") {
                tool_calls.push(ToolCallRequest {
                    name: fc["name"].as_str().unwrap_or("").to_string(),
                    args: fc["args"].clone(),
                });
            }
        }

        let response = ModelResponse {
            text: if text.is_empty() { None } else { Some(text) },
            tool_calls,
        };
        Ok((response, content))
    }

    /// 追加一条用户侧 content 并发起请求；失败时回滚追加，保持历史与远端一致
    async fn dispatch(&self, content: Value) -> Result<ModelResponse, String> {
        let mut history = self.history.lock().await;
        history.push(content);

        let body = self.build_request_body(&history);
        debug!(model = %self.model, turns = history.len(), "Gemini API request");

        let result = self.post(&body).await;
        match result {
            Ok((response, model_content)) => {
                history.push(model_content);
                Ok(response)
            }
            Err(e) => {
                history.pop();
                Err(e)
            }
        }
    }

    async fn post(&self, body: &Value) -> Result<(ModelResponse, Value), String> {
        let response = self
            .http
            .post(self.api_url())
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| format!("network error: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("HTTP {status}: {text}"));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| format!("parse error: {e}"))?;
        Self::parse_response(&json)
    }
}

#[async_trait]
impl ChatTransport for GeminiTransport {
    async fn send_user_message(&self, text: &str) -> Result<ModelResponse, String> {
        self.dispatch(json!({
            "role": "user",
            "parts": [{ "text": text }]
        }))
        .await
    }

    async fn send_tool_result(&self, tool_name: &str, result: Value) -> Result<ModelResponse, String> {
        self.dispatch(json!({
            "role": "user",
            "parts": [{
                "functionResponse": {
                    "name": tool_name,
                    "response": { "result": result }
                }
            }]
        }))
        .await
    }
}
