use serde::Deserialize;

use rule_engine::RuleThresholds;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub rules: RuleThresholds,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,
    #[serde(default)]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuditConfig {
    /// Ring capacity for the in-memory audit log.
    #[serde(default = "default_audit_capacity")]
    pub capacity: usize,
    /// How many entries each cycle summary reads back.
    #[serde(default = "default_query_limit")]
    pub query_limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentMode {
    /// Staged analyze → apply with the deterministic rule policy.
    Rules,
    /// Immediate per-product application with the remote policy.
    Remote,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_mode")]
    pub mode: AgentMode,
    #[serde(default = "default_loop_interval_ms")]
    pub loop_interval_ms: u64,
    /// Stimulate stock/sales movement each cycle so signals keep moving.
    #[serde(default = "default_true")]
    pub simulate_sales: bool,
}

fn default_backend() -> StoreBackend {
    StoreBackend::Memory
}

fn default_api_base() -> String {
    "https://openrouter.ai/api/v1".into()
}

fn default_model() -> String {
    "deepseek/deepseek-chat".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_audit_capacity() -> usize {
    80
}

fn default_query_limit() -> usize {
    30
}

fn default_mode() -> AgentMode {
    AgentMode::Rules
}

fn default_loop_interval_ms() -> u64 {
    15_000
}

fn default_true() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            database_url: String::new(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            capacity: default_audit_capacity(),
            query_limit: default_query_limit(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            loop_interval_ms: default_loop_interval_ms(),
            simulate_sales: default_true(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path` if present, defaults otherwise — the demo runs with
    /// no configuration at all.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        if std::path::Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}
