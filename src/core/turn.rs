//! 回合协议
//!
//! 一次 run_turn 即一个完整的「用户输入 → 状态安定」周期：
//! 追加用户消息 → 关键词命中则走本地管线；否则 Analyzing 并发往远端 →
//! 响应含工具调用（只取第一个）则 Wiring、执行本地处理器、回传结果、渲染后续响应 →
//! 任何错误追加一条系统错误消息并复位 Idle，不重试。

use std::sync::Arc;
use std::time::Duration;

use crate::core::error::OrchestratorError;
use crate::core::pipeline::{matches_pipeline_keyword, run_scripted_pipeline};
use crate::core::scheduler::StepScheduler;
use crate::core::state::{FileStatus, Message, OrchestratorStatus, Store};
use crate::llm::ChatTransport;
use crate::tools::{ToolContext, ToolRegistry};

/// 传输失败时的固定用户可见文案
const CONNECTION_ERROR_TEXT: &str = "❌ Connection Error.";
/// 凭证缺失横幅（一次性，启动时）
const MISSING_KEY_BANNER: &str =
    "⚠️ CRITICAL: API_KEY missing. Orchestrator functionality limited. Please check your environment configuration.";
/// 启动问候回合的提示
const INIT_PROMPT: &str = "Initialize Spartan Orchestrator. Report status and awaiting commands.";
/// 模拟外部事件的固定告警文本
const SIMULATED_EVENT_TEXT: &str =
    "System Alert: detected change in DATA/prospect_pipeline.csv. 3 new entries found.";

/// 模拟节奏：布线每格 / 管线每步 / 密钥门禁的等待时长
#[derive(Clone, Copy, Debug)]
pub struct SimDelays {
    pub wiring_step: Duration,
    pub pipeline_step: Duration,
    pub secret_gate: Duration,
}

impl Default for SimDelays {
    fn default() -> Self {
        Self {
            wiring_step: Duration::from_millis(150),
            pipeline_step: Duration::from_millis(800),
            secret_gate: Duration::from_millis(1000),
        }
    }
}

/// 回合运行时：回合协议所需的全部依赖。
/// transport 为 None 表示凭证缺失的本地降级模式，远端回合一律失败为连接错误。
pub struct TurnRuntime {
    pub store: Arc<Store>,
    pub scheduler: Arc<StepScheduler>,
    pub transport: Option<Arc<dyn ChatTransport>>,
    pub registry: Arc<ToolRegistry>,
    pub delays: SimDelays,
}

impl TurnRuntime {
    /// 执行一个回合。错误在内部安定：追加系统错误消息、状态复位 Idle，调用方无需处理。
    pub async fn run_turn(&self, input: &str) {
        self.store.push_message(Message::user(input));

        // 保留关键词拦截：完全绕过远端服务
        if matches_pipeline_keyword(input) {
            if let Err(e) = run_scripted_pipeline(
                &self.store,
                &self.scheduler,
                self.delays.pipeline_step,
                self.delays.secret_gate,
            )
            .await
            {
                tracing::warn!(error = %e, "scripted pipeline aborted");
            }
            return;
        }

        if let Err(e) = self.remote_turn(input).await {
            tracing::error!(error = %e, "turn failed");
            let text = match &e {
                OrchestratorError::UnrecognizedTool(name) => {
                    format!("❌ Unknown protocol requested: {name}.")
                }
                _ => CONNECTION_ERROR_TEXT.to_string(),
            };
            self.store.update(|s| {
                s.push_message(Message::system_error(text));
                s.status = OrchestratorStatus::Idle;
            });
        }
    }

    /// 远端分支：发送 → 检查首个工具调用 → 执行处理器 → 回传结果 → 渲染后续响应。
    /// 响应同时含文本与工具调用时，工具调用优先、伴随文本丢弃（与原行为一致的已知怪癖）。
    async fn remote_turn(&self, input: &str) -> Result<(), OrchestratorError> {
        let transport = self
            .transport
            .as_ref()
            .ok_or(OrchestratorError::Uninitialized)?;

        self.store.set_status(OrchestratorStatus::Analyzing);
        let response = transport
            .send_user_message(input)
            .await
            .map_err(OrchestratorError::Transport)?;

        let Some(call) = response.first_tool_call().cloned() else {
            self.store.update(|s| {
                s.push_message(Message::model(response.text_or("Command executed.")));
                s.status = OrchestratorStatus::Idle;
            });
            return Ok(());
        };

        self.store.update(|s| {
            s.status = OrchestratorStatus::Wiring;
            s.progress = 0;
            s.wiring_line = format!("Processing request: {}", call.name);
            s.push_message(Message::function(format!(
                "⚡ Executing Protocol: {}...",
                call.name
            )));
        });

        let handler = self
            .registry
            .get(&call.name)
            .ok_or_else(|| OrchestratorError::UnrecognizedTool(call.name.clone()))?;

        let ctx = ToolContext {
            store: self.store.clone(),
            scheduler: self.scheduler.clone(),
            step_delay: self.delays.wiring_step,
        };
        let outcome = handler
            .execute(&call.args, &ctx)
            .await
            .map_err(OrchestratorError::ToolFailed)?;

        let follow_up = transport
            .send_tool_result(&call.name, outcome.to_value())
            .await
            .map_err(OrchestratorError::Transport)?;

        self.store.update(|s| {
            s.progress = 100;
            s.push_message(Message::model(follow_up.text_or("Action complete.")));
            s.status = OrchestratorStatus::Idle;
        });
        Ok(())
    }

    /// 启动问候回合：传输可用时发一条初始化消息并渲染回复；凭证缺失时只挂横幅。
    pub async fn run_initial_contact(&self) {
        let Some(transport) = self.transport.as_ref() else {
            self.store.push_message(Message::system_error(MISSING_KEY_BANNER));
            return;
        };

        self.store.set_status(OrchestratorStatus::Analyzing);
        match transport.send_user_message(INIT_PROMPT).await {
            Ok(resp) => {
                self.store
                    .push_message(Message::model(resp.text_or("Spartan Core Online.")));
            }
            Err(e) => tracing::error!(error = %e, "initial contact failed"),
        }
        self.store.set_status(OrchestratorStatus::Idle);
    }

    /// 模拟外部事件：追加告警消息、把首个文件标记为变更，再把同一文本走正常回合路径
    pub async fn simulate_event(&self) {
        self.store.update(|s| {
            s.push_message(Message::system(SIMULATED_EVENT_TEXT));
            if let Some(f) = s.files.first_mut() {
                f.last_modified = "Just now".to_string();
                f.status = FileStatus::Changed;
            }
        });
        self.run_turn(SIMULATED_EVENT_TEXT).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheduler::ManualClock;
    use crate::core::state::{DashboardState, Role};
    use crate::llm::{ModelResponse, ToolCallRequest};
    use crate::tools::{ConnectRepositoryTool, MountDriveTool};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// 脚本化传输：按脚本回应 send_user_message，记录回传的工具结果
    struct ScriptedTransport {
        reply: Mutex<Option<Result<ModelResponse, String>>>,
        follow_up: ModelResponse,
        messages_sent: AtomicUsize,
        tool_results: Mutex<Vec<(String, Value)>>,
    }

    impl ScriptedTransport {
        fn replying(reply: Result<ModelResponse, String>) -> Self {
            Self {
                reply: Mutex::new(Some(reply)),
                follow_up: ModelResponse::from_text("Follow-up text."),
                messages_sent: AtomicUsize::new(0),
                tool_results: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn send_user_message(&self, _text: &str) -> Result<ModelResponse, String> {
            self.messages_sent.fetch_add(1, Ordering::SeqCst);
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok(ModelResponse::from_text("again")))
        }

        async fn send_tool_result(&self, tool_name: &str, result: Value) -> Result<ModelResponse, String> {
            self.tool_results
                .lock()
                .unwrap()
                .push((tool_name.to_string(), result));
            Ok(self.follow_up.clone())
        }
    }

    fn runtime_with(
        transport: Option<Arc<dyn ChatTransport>>,
    ) -> (TurnRuntime, tokio::sync::watch::Receiver<DashboardState>) {
        let (store, rx) = Store::new(DashboardState::default());
        let mut registry = ToolRegistry::new();
        registry.register(ConnectRepositoryTool);
        registry.register(MountDriveTool);
        let runtime = TurnRuntime {
            store: Arc::new(store),
            scheduler: Arc::new(StepScheduler::new(Arc::new(ManualClock::default()))),
            transport,
            registry: Arc::new(registry),
            delays: SimDelays::default(),
        };
        (runtime, rx)
    }

    #[tokio::test]
    async fn test_text_only_turn() {
        let transport = Arc::new(ScriptedTransport::replying(Ok(ModelResponse::from_text(
            "All systems nominal.",
        ))));
        let (runtime, rx) = runtime_with(Some(transport));

        runtime.run_turn("status?").await;

        let state = rx.borrow();
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0].role, Role::User);
        assert_eq!(state.messages[1].role, Role::Model);
        assert_eq!(state.messages[1].text, "All systems nominal.");
        assert_eq!(state.status, OrchestratorStatus::Idle);
    }

    #[tokio::test]
    async fn test_tool_call_turn_first_call_wins() {
        // 响应带文本 + 两个工具调用：只执行第一个，文本丢弃
        let transport = Arc::new(ScriptedTransport::replying(Ok(ModelResponse {
            text: Some("dropped text".to_string()),
            tool_calls: vec![
                ToolCallRequest {
                    name: "connect_repository".to_string(),
                    args: json!({ "url": "https://github.com/a/b" }),
                },
                ToolCallRequest {
                    name: "mount_drive".to_string(),
                    args: json!({ "path": "/x" }),
                },
            ],
        })));
        let (runtime, rx) = runtime_with(Some(transport.clone()));

        runtime.run_turn("connect my repo").await;

        let state = rx.borrow();
        // user + function 公告 + 后续响应，丢弃的文本不出现
        assert_eq!(state.messages.len(), 3);
        assert_eq!(state.messages[1].role, Role::Function);
        assert!(state.messages[1].text.contains("connect_repository"));
        assert_eq!(state.messages[2].text, "Follow-up text.");
        assert!(!state.messages.iter().any(|m| m.text == "dropped text"));
        // 第一个工具生效，第二个被忽略（未排队）
        assert!(state.integration.repo_connected);
        assert!(!state.integration.drive_connected);
        let results = transport.tool_results.lock().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "connect_repository");
        assert_eq!(results[0].1["status"], "success");
        assert_eq!(state.status, OrchestratorStatus::Idle);
        assert_eq!(state.progress, 100);
    }

    #[tokio::test]
    async fn test_unrecognized_tool_surfaces_error() {
        let transport = Arc::new(ScriptedTransport::replying(Ok(ModelResponse {
            text: None,
            tool_calls: vec![ToolCallRequest {
                name: "format_disk".to_string(),
                args: json!({}),
            }],
        })));
        let (runtime, rx) = runtime_with(Some(transport.clone()));

        runtime.run_turn("do something weird").await;

        let state = rx.borrow();
        let last = state.messages.last().unwrap();
        assert!(last.is_error);
        assert!(last.text.contains("format_disk"));
        assert_eq!(state.status, OrchestratorStatus::Idle);
        // 未知工具不回传结果
        assert!(transport.tool_results.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_resets_to_idle() {
        let transport = Arc::new(ScriptedTransport::replying(Err("HTTP 500".to_string())));
        let (runtime, rx) = runtime_with(Some(transport));

        runtime.run_turn("hello").await;

        let state = rx.borrow();
        let last = state.messages.last().unwrap();
        assert!(last.is_error);
        assert_eq!(last.text, "❌ Connection Error.");
        assert_eq!(state.status, OrchestratorStatus::Idle);
    }

    #[tokio::test]
    async fn test_keyword_turn_never_touches_transport() {
        let transport = Arc::new(ScriptedTransport::replying(Ok(ModelResponse::from_text("x"))));
        let (runtime, rx) = runtime_with(Some(transport.clone()));

        runtime.run_turn("Run deployment smoke test protocol.").await;

        // 密钥为空：管线走门禁失败路径，远端零调用
        assert_eq!(transport.messages_sent.load(Ordering::SeqCst), 0);
        let state = rx.borrow();
        assert!(state.messages.last().unwrap().is_error);
        assert_eq!(state.status, OrchestratorStatus::Idle);
    }

    #[tokio::test]
    async fn test_degraded_mode_without_transport() {
        let (runtime, rx) = runtime_with(None);

        runtime.run_initial_contact().await;
        runtime.run_turn("hello").await;

        let state = rx.borrow();
        // 横幅 + user + 连接错误
        assert!(state.messages[0].text.contains("API_KEY missing"));
        assert!(state.messages[0].is_error);
        assert_eq!(state.messages.last().unwrap().text, "❌ Connection Error.");
        assert_eq!(state.status, OrchestratorStatus::Idle);
    }

    #[tokio::test]
    async fn test_simulated_event_marks_file_and_runs_turn() {
        let transport = Arc::new(ScriptedTransport::replying(Ok(ModelResponse::from_text(
            "Reviewing new entries.",
        ))));
        let (runtime, rx) = runtime_with(Some(transport));

        runtime.simulate_event().await;

        let state = rx.borrow();
        assert_eq!(state.files[0].status, FileStatus::Changed);
        assert_eq!(state.files[0].last_modified, "Just now");
        assert_eq!(state.messages[0].role, Role::System);
        assert!(state.messages[0].text.contains("prospect_pipeline.csv"));
        assert_eq!(state.messages[1].role, Role::User);
        assert_eq!(state.messages[2].text, "Reviewing new entries.");
    }
}
