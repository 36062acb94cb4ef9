//! 应用配置加载
//!
//! 优先级从低到高：内置默认值 → YAML 配置文件（可选）→ 环境变量（含 `.env`）。
//!
//! ```text
//! AGENT_MODEL=gemini-2.5-flash
//! AGENT_BASEURL=https://generativelanguage.googleapis.com/v1beta/openai/chat/completions
//! AGENT_APIKEY=...
//! RESEARCH_ENDPOINT=https://api.duckduckgo.com/
//! RESEARCH_TIMEOUT_SECS=30
//! SERVICE_NAME=research-agent
//! ENVIRONMENT=development
//! ```

use crate::error::{ConfigError, Result};
use dotenv::dotenv;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RESEARCH_ENDPOINT: &str = "https://api.duckduckgo.com/";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful research assistant. When users ask you to research topics, \
use the research_topic tool to gather information. Provide comprehensive, \
well-structured answers based on the research findings.";

/// 推理模型的连接配置
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    /// LLM 接口中使用的模型名（如 `gemini-2.5-flash`）
    pub model: String,
    /// Chat Completions 接口完整 URL
    pub baseurl: String,
    pub apikey: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            baseurl: "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions"
                .to_string(),
            apikey: String::new(),
        }
    }
}

/// 即时答案服务的查询配置
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ResearchConfig {
    pub endpoint: String,
    /// 单次查询超时（秒）
    pub timeout_secs: u64,
    /// 服务要求浏览器标识，否则会拦截请求
    pub user_agent: String,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_RESEARCH_ENDPOINT.to_string(),
            timeout_secs: 30,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub environment: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "research-agent".to_string(),
            environment: "development".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub research: ResearchConfig,
    pub telemetry: TelemetryConfig,
    pub system_prompt: String,
    /// 单轮对话内推理循环的最大迭代次数
    pub max_iterations: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            research: ResearchConfig::default(),
            telemetry: TelemetryConfig::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_iterations: 10,
        }
    }
}

impl AppConfig {
    /// 加载 `.env`、可选的 YAML 文件和环境变量，并校验必填项
    pub fn load(path: Option<&str>) -> Result<Self> {
        dotenv().ok();

        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|_| ConfigError::FileNotFound(path.to_string()))?;
        let config: AppConfig = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// 用环境变量覆盖当前值。`lookup` 抽象出来便于测试
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("AGENT_MODEL") {
            self.model.model = v;
        }
        if let Some(v) = lookup("AGENT_BASEURL") {
            self.model.baseurl = v;
        }
        if let Some(v) = lookup("AGENT_APIKEY") {
            self.model.apikey = v;
        }
        if let Some(v) = lookup("RESEARCH_ENDPOINT") {
            self.research.endpoint = v;
        }
        if let Some(v) = lookup("RESEARCH_TIMEOUT_SECS") {
            self.research.timeout_secs =
                v.trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::InvalidValue {
                        field: "RESEARCH_TIMEOUT_SECS".to_string(),
                        message: e.to_string(),
                    })?;
        }
        if let Some(v) = lookup("RESEARCH_USER_AGENT") {
            self.research.user_agent = v;
        }
        if let Some(v) = lookup("SERVICE_NAME") {
            self.telemetry.service_name = v;
        }
        if let Some(v) = lookup("ENVIRONMENT") {
            self.telemetry.environment = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.model.trim().is_empty() {
            return Err(ConfigError::MissingField("model.model".to_string()).into());
        }
        if self.model.baseurl.trim().is_empty() {
            return Err(ConfigError::MissingField("model.baseurl".to_string()).into());
        }
        if self.model.apikey.trim().is_empty() {
            return Err(ConfigError::MissingField("model.apikey".to_string()).into());
        }
        if self.research.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "research.timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
