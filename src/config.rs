//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `SPARTAN__*` 覆盖（双下划线表示嵌套，
//! 如 `SPARTAN__LLM__PROVIDER=mock`）。密钥字段也可经此注入，替代设置表单。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub sim: SimSection,
    #[serde(default)]
    pub integration: IntegrationSection,
}

/// [app] 段：应用名
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [llm] 段：后端选择与生成参数
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：gemini / mock；gemini 在无 API Key 时降级为本地模式
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

/// [sim] 段：模拟节奏（毫秒）
#[derive(Debug, Clone, Deserialize)]
pub struct SimSection {
    /// 布线循环每格等待
    #[serde(default = "default_wiring_step_ms")]
    pub wiring_step_ms: u64,
    /// 脚本化管线每步等待
    #[serde(default = "default_pipeline_step_ms")]
    pub pipeline_step_ms: u64,
    /// 密钥门禁失败前的等待
    #[serde(default = "default_secret_gate_ms")]
    pub secret_gate_ms: u64,
}

impl Default for SimSection {
    fn default() -> Self {
        Self {
            wiring_step_ms: default_wiring_step_ms(),
            pipeline_step_ms: default_pipeline_step_ms(),
            secret_gate_ms: default_secret_gate_ms(),
        }
    }
}

fn default_wiring_step_ms() -> u64 {
    150
}

fn default_pipeline_step_ms() -> u64 {
    800
}

fn default_secret_gate_ms() -> u64 {
    1000
}

/// [integration] 段：集成初始值与密钥（设置表单的替代入口；核心不校验格式）
#[derive(Debug, Clone, Deserialize)]
pub struct IntegrationSection {
    #[serde(default = "default_branch")]
    pub github_branch: String,
    #[serde(default = "default_drive_path")]
    pub drive_path: String,
    #[serde(default)]
    pub railway_token: String,
    #[serde(default)]
    pub gdrive_folder_id: String,
    #[serde(default)]
    pub service_account_base64: String,
}

impl Default for IntegrationSection {
    fn default() -> Self {
        Self {
            github_branch: default_branch(),
            drive_path: default_drive_path(),
            railway_token: String::new(),
            gdrive_folder_id: String::new(),
            service_account_base64: String::new(),
        }
    }
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_drive_path() -> String {
    "/My Drive/SPARTAN-AI-WORKFORCE/".to_string()
}

/// 从 config 目录加载配置，环境变量 SPARTAN__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 SPARTAN__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("SPARTAN")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
