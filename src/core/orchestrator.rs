//! 编排器：装配与主控循环
//!
//! 负责：加载配置、选择传输后端、注册工具、建立 cmd/state 两通道，
//! 并在后台任务中串行消费用户命令（Submit/SimulateEvent/Clear/Quit）驱动回合协议。
//! 串行消费即「至多一个在途回合」的集中式保证：回合进行中到达的提交在通道里排队。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use crate::config::{load_config, AppConfig};
use crate::core::error::OrchestratorError;
use crate::core::scheduler::{StepScheduler, TokioClock};
use crate::core::state::{DashboardState, Store};
use crate::core::turn::{SimDelays, TurnRuntime};
use crate::llm::{prompt, ChatTransport, GeminiTransport, MockTransport};
use crate::tools::{ConnectRepositoryTool, MountDriveTool, ToolRegistry};

/// 从 UI 发往编排器的用户命令
#[derive(Debug, Clone)]
pub enum Command {
    /// 提交用户输入，触发一个回合
    Submit(String),
    /// 模拟一次外部事件（文件变更告警 + 自动回合）
    SimulateEvent,
    /// 清空终端消息（日志与资源面板保留）
    Clear,
    /// 退出应用
    Quit,
}

/// 根据配置与环境变量选择传输后端；None 表示凭证缺失的本地降级模式
fn create_transport_from_config(cfg: &AppConfig, declarations: Vec<serde_json::Value>) -> Option<Arc<dyn ChatTransport>> {
    let provider = cfg.llm.provider.to_lowercase();
    if provider == "mock" {
        tracing::info!("Using Mock transport (offline mode)");
        return Some(Arc::new(MockTransport));
    }

    match GeminiTransport::from_env(
        Some(&cfg.llm.model),
        cfg.llm.temperature,
        prompt::load_system_instruction(),
        declarations,
    ) {
        Some(t) => {
            tracing::info!("Using Gemini transport ({})", cfg.llm.model);
            Some(Arc::new(t))
        }
        None => {
            tracing::warn!(
                error = %OrchestratorError::MissingCredentials,
                "remote orchestrator disabled, running local-only"
            );
            None
        }
    }
}

/// 创建编排器运行时：返回命令发送端与状态接收端；后台任务串行消费命令并更新状态。
pub async fn create_orchestrator(
    config_path: Option<PathBuf>,
) -> anyhow::Result<(mpsc::UnboundedSender<Command>, watch::Receiver<DashboardState>)> {
    let cfg = load_config(config_path).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let mut registry = ToolRegistry::new();
    registry.register(ConnectRepositoryTool);
    registry.register(MountDriveTool);
    let transport = create_transport_from_config(&cfg, registry.declarations());

    // 集成初始值来自配置（密钥经 SPARTAN__INTEGRATION__* 注入，替代设置表单）
    let mut initial = DashboardState::default();
    initial.integration.github_branch = cfg.integration.github_branch.clone();
    initial.integration.drive_path = cfg.integration.drive_path.clone();
    initial.integration.railway_token = cfg.integration.railway_token.clone();
    initial.integration.gdrive_folder_id = cfg.integration.gdrive_folder_id.clone();
    initial.integration.service_account_base64 = cfg.integration.service_account_base64.clone();

    let (store, state_rx) = Store::new(initial);

    let runtime = TurnRuntime {
        store: Arc::new(store),
        scheduler: Arc::new(StepScheduler::new(Arc::new(TokioClock))),
        transport,
        registry: Arc::new(registry),
        delays: SimDelays {
            wiring_step: Duration::from_millis(cfg.sim.wiring_step_ms),
            pipeline_step: Duration::from_millis(cfg.sim.pipeline_step_ms),
            secret_gate: Duration::from_millis(cfg.sim.secret_gate_ms),
        },
    };

    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();

    tokio::spawn(async move {
        runtime.run_initial_contact().await;

        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                Command::Submit(input) => {
                    runtime.run_turn(&input).await;
                }
                Command::SimulateEvent => {
                    runtime.simulate_event().await;
                }
                Command::Clear => {
                    runtime.store.update(|s| s.messages.clear());
                }
                Command::Quit => break,
            }
        }
    });

    Ok((cmd_tx, state_rx))
}
