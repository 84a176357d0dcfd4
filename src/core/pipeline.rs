//! 本地脚本化管线（Deployment Smoke Test）
//!
//! 由保留关键词触发，完全绕过远端服务：先做密钥门禁（两个字段都非空才放行），
//! 然后按固定顺序执行六步，每步写进度、等待、前插一条 CI/CD 日志，末步 SUCCESS 并追加总结消息。

use std::time::Duration;

use crate::core::error::OrchestratorError;
use crate::core::scheduler::StepScheduler;
use crate::core::state::{LogEntry, LogLevel, Message, OrchestratorStatus, Store};

/// 保留关键词：大小写不敏感的子串匹配，命中即走本地管线
const PIPELINE_KEYWORDS: &[&str] = &["smoke test", "validate pipeline", "deploy infra"];

/// 管线步骤：目标进度、终端式日志行、人类可读状态行
struct PipelineStep {
    percent: u8,
    log: &'static str,
    status_line: &'static str,
}

const PIPELINE_STEPS: [PipelineStep; 6] = [
    PipelineStep { percent: 10, log: "git checkout main", status_line: "Checking out source..." },
    PipelineStep { percent: 30, log: "pnpm install", status_line: "Installing dependencies..." },
    PipelineStep { percent: 50, log: "pnpm build", status_line: "Building artifacts..." },
    PipelineStep { percent: 70, log: "railway up", status_line: "Pushing to Railway Edge..." },
    PipelineStep { percent: 90, log: "healthcheck /health", status_line: "Verifying endpoints..." },
    PipelineStep { percent: 100, log: "SUCCESS", status_line: "Pipeline Healthy." },
];

const ACK_TEXT: &str = "Initiating Deployment Smoke Test Protocol...";
const MISSING_SECRETS_TEXT: &str =
    "❌ FAILED: Missing CI/CD Secrets. Please configure RAILWAY_TOKEN and GDRIVE_FOLDER_ID in Settings.";
const SUCCESS_TEXT: &str = "✅ Smoke Test Passed.\n• Build: Success\n• Deploy: Active\n• Health: 200 OK\n\nReady for production traffic.";

/// 输入是否命中保留关键词（对原始输入判定，不裁剪不归一化）
pub fn matches_pipeline_keyword(input: &str) -> bool {
    let lower = input.to_lowercase();
    PIPELINE_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// 执行脚本化管线。密钥缺失时：等待 gate_delay、追加一条错误消息、零步执行，
/// 返回 MissingSecrets；正常路径六步跑完后追加总结消息。两条路径都把状态复位为 Idle。
pub async fn run_scripted_pipeline(
    store: &Store,
    scheduler: &StepScheduler,
    step_delay: Duration,
    gate_delay: Duration,
) -> Result<(), OrchestratorError> {
    store.set_status(OrchestratorStatus::Executing);
    store.push_message(Message::model(ACK_TEXT));

    let integration = store.snapshot().integration;
    if integration.railway_token.is_empty() || integration.gdrive_folder_id.is_empty() {
        scheduler.sleep(gate_delay).await;
        store.update(|s| {
            s.push_message(Message::system_error(MISSING_SECRETS_TEXT));
            s.status = OrchestratorStatus::Idle;
        });
        return Err(OrchestratorError::MissingSecrets(
            "RAILWAY_TOKEN, GDRIVE_FOLDER_ID".to_string(),
        ));
    }

    for step in &PIPELINE_STEPS {
        store.update(|s| {
            s.progress = step.percent;
            s.wiring_line = step.status_line.to_string();
        });
        scheduler.sleep(step_delay).await;
        let level = if step.percent == 100 {
            LogLevel::Success
        } else {
            LogLevel::Info
        };
        store.prepend_log(LogEntry::new(level, "CI/CD", step.log));
        if step.percent == 100 {
            store.push_message(Message::model(SUCCESS_TEXT));
        }
    }

    store.set_status(OrchestratorStatus::Idle);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheduler::ManualClock;
    use crate::core::state::DashboardState;
    use std::sync::Arc;

    const STEP: Duration = Duration::from_millis(800);
    const GATE: Duration = Duration::from_millis(1000);

    #[test]
    fn test_keyword_matching() {
        assert!(matches_pipeline_keyword("Run deployment smoke test protocol."));
        assert!(matches_pipeline_keyword("please VALIDATE PIPELINE now"));
        assert!(matches_pipeline_keyword("deploy infra"));
        assert!(!matches_pipeline_keyword("connect the github repo"));
        assert!(!matches_pipeline_keyword("smoke"));
    }

    #[tokio::test]
    async fn test_missing_secrets_aborts_before_any_step() {
        let (store, rx) = Store::new(DashboardState::default());
        let clock = Arc::new(ManualClock::default());
        let scheduler = StepScheduler::new(clock.clone());
        let logs_before = rx.borrow().logs.len();

        let result = run_scripted_pipeline(&store, &scheduler, STEP, GATE).await;

        assert!(matches!(result, Err(OrchestratorError::MissingSecrets(_))));
        let state = rx.borrow();
        // 确认消息 + 一条错误消息，零日志，状态 Idle
        assert_eq!(state.messages.len(), 2);
        assert!(state.messages[1].is_error);
        assert!(state.messages[1].text.contains("RAILWAY_TOKEN"));
        assert_eq!(state.logs.len(), logs_before);
        assert_eq!(state.status, OrchestratorStatus::Idle);
        // 只有门禁延迟这一次等待
        assert_eq!(clock.ticks(), 1);
        assert_eq!(clock.total_slept(), GATE);
    }

    #[tokio::test]
    async fn test_full_pipeline_six_steps() {
        let mut initial = DashboardState::default();
        initial.integration.railway_token = "token".to_string();
        initial.integration.gdrive_folder_id = "folder".to_string();
        initial.logs.clear();
        let (store, rx) = Store::new(initial);
        let clock = Arc::new(ManualClock::default());
        let scheduler = StepScheduler::new(clock.clone());

        run_scripted_pipeline(&store, &scheduler, STEP, GATE)
            .await
            .unwrap();

        let state = rx.borrow();
        // 六条日志，最新在前；末步 SUCCESS
        assert_eq!(state.logs.len(), 6);
        assert_eq!(state.logs[0].message, "SUCCESS");
        assert_eq!(state.logs[0].level, LogLevel::Success);
        assert_eq!(state.logs[5].message, "git checkout main");
        assert!(state.logs[1..].iter().all(|l| l.level == LogLevel::Info));
        // 确认消息 + 一条总结消息
        assert_eq!(state.messages.len(), 2);
        assert!(state.messages[1].text.starts_with("✅ Smoke Test Passed."));
        assert_eq!(state.status, OrchestratorStatus::Idle);
        assert_eq!(state.progress, 100);
        assert_eq!(clock.ticks(), 6);
    }
}
