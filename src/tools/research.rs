//! 主题研究工具
//!
//! 调用 DuckDuckGo Instant Answer API，把结构不一致的 JSON 响应整理成一段可读的研究摘要。
//! 任何失败（网络、超时、重定向、非 200、空结果）都以文本形式返回，
//! 调用方拿到的永远是一个字符串。
//!
//! 内部先得到 [`LookupOutcome`]，再在边界处渲染成文本，渲染逻辑不依赖网络即可测试。

use crate::config::ResearchConfig;
use crate::error::{ChatError, Result, ToolError};
use crate::tools::{Tool, ToolParameters, ToolResult};
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode};
use serde_json::{Map, Value, json};
use std::fmt::Write as _;
use std::time::Duration;
use tracing::{Instrument, error, info, info_span, warn};

pub const TOOL_NAME: &str = "research_topic";

/// `RelatedTopics` 最多取前几条
const MAX_RELATED_TOPICS: usize = 5;
/// 非 200 响应体在错误信息中保留的字符数
const ERROR_BODY_LIMIT: usize = 200;

/// 研究报告的一个小节
#[derive(Debug, Clone, PartialEq)]
pub enum ReportSection {
    Summary(String),
    Definition(String),
    Related(Vec<String>),
}

impl ReportSection {
    fn render(&self) -> String {
        match self {
            ReportSection::Summary(text) => format!("Summary: {}", text),
            ReportSection::Definition(text) => format!("Definition: {}", text),
            ReportSection::Related(items) => {
                let mut block = String::from("Related Information:\n");
                for item in items {
                    let _ = write!(block, "\n- {}", item);
                }
                block
            }
        }
    }
}

/// 一次成功查询得到的研究报告，至少包含一个小节
#[derive(Debug, Clone, PartialEq)]
pub struct FindingsReport {
    sections: Vec<ReportSection>,
}

impl FindingsReport {
    /// 按固定顺序提取 `AbstractText`、`Definition`、`RelatedTopics`。
    /// 没有任何可用字段时返回 `None`
    pub fn from_response(data: &Map<String, Value>) -> Option<Self> {
        let mut sections = Vec::new();

        if let Some(text) = non_empty_str(data.get("AbstractText")) {
            sections.push(ReportSection::Summary(text.to_string()));
        }

        if let Some(text) = non_empty_str(data.get("Definition")) {
            sections.push(ReportSection::Definition(text.to_string()));
        }

        // 非对象条目、缺少 Text 或 Text 为空的条目直接跳过
        let related: Vec<String> = data
            .get("RelatedTopics")
            .and_then(Value::as_array)
            .map(|topics| {
                topics
                    .iter()
                    .take(MAX_RELATED_TOPICS)
                    .filter_map(Value::as_object)
                    .filter_map(|entry| non_empty_str(entry.get("Text")))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        if !related.is_empty() {
            sections.push(ReportSection::Related(related));
        }

        if sections.is_empty() {
            None
        } else {
            Some(Self { sections })
        }
    }

    pub fn sections(&self) -> &[ReportSection] {
        &self.sections
    }

    pub fn render(&self, topic: &str) -> String {
        let body = self
            .sections
            .iter()
            .map(ReportSection::render)
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("Research findings for '{}':\n\n{}", topic, body)
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// 单次查询的结果分类
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Findings(FindingsReport),
    /// 服务可达，但没有相关内容
    NoData,
    /// 301/302，不跟随
    Redirected {
        status: u16,
        location: Option<String>,
    },
    /// 其他非 200 状态，`body` 已截断
    ServiceError { status: u16, body: String },
    /// 连接失败、超时或响应无法解析
    TransportError(String),
}

impl LookupOutcome {
    pub fn classify(status: StatusCode, location: Option<String>, body: &str) -> Self {
        match status {
            StatusCode::OK => match serde_json::from_str::<Map<String, Value>>(body) {
                Ok(data) => match FindingsReport::from_response(&data) {
                    Some(report) => LookupOutcome::Findings(report),
                    None => LookupOutcome::NoData,
                },
                Err(e) => LookupOutcome::TransportError(format!("invalid JSON response: {}", e)),
            },
            StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND => LookupOutcome::Redirected {
                status: status.as_u16(),
                location,
            },
            _ => LookupOutcome::ServiceError {
                status: status.as_u16(),
                body: truncate_chars(body, ERROR_BODY_LIMIT),
            },
        }
    }

    pub fn render(&self, topic: &str) -> String {
        match self {
            LookupOutcome::Findings(report) => report.render(topic),
            LookupOutcome::NoData => format!(
                "Limited information found for '{}' via DuckDuckGo Instant Answer API. \
                 The API may not have detailed information on this topic. \
                 Try rephrasing or searching for more general/specific terms.",
                topic
            ),
            LookupOutcome::Redirected { status, .. } => format!(
                "DuckDuckGo API returned redirect (status {}). \
                 This usually means no instant answer is available for '{}'. \
                 Try a more general query or a well-known topic.",
                status, topic
            ),
            LookupOutcome::ServiceError { status, body } => format!(
                "Research API returned status code: {}. Response: {}",
                status, body
            ),
            LookupOutcome::TransportError(description) => {
                format!("Error during research: {}", description)
            }
        }
    }
}

/// 按字符截断，避免切断多字节字符
fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    }
}

/// DuckDuckGo 即时答案查询工具
///
/// 不持有可变状态，可被并发调用；关闭空闲连接复用，每次查询使用独立的短连接。
pub struct ResearchTool {
    client: Client,
    endpoint: String,
}

impl ResearchTool {
    pub fn new(config: &ResearchConfig) -> Result<Self> {
        let client = Client::builder()
            .redirect(Policy::none())
            .pool_max_idle_per_host(0)
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ChatError::Other(format!("failed to build research client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// 查询并分类结果，不会返回错误
    pub async fn query(&self, topic: &str) -> LookupOutcome {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", topic),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
                ("no_redirect", "1"),
            ])
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => return LookupOutcome::TransportError(describe_transport_error(&e)),
        };

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        match response.text().await {
            Ok(body) => LookupOutcome::classify(status, location, &body),
            Err(e) => LookupOutcome::TransportError(describe_transport_error(&e)),
        }
    }

    /// 研究一个主题，总是返回文本（研究结果或错误说明）
    pub async fn lookup(&self, topic: &str) -> String {
        let span = info_span!("research_topic", topic = %topic);
        async {
            info!("Starting research");
            let outcome = self.query(topic).await;
            let output = outcome.render(topic);

            match &outcome {
                LookupOutcome::Findings(_) | LookupOutcome::NoData => {
                    info!(findings_length = output.len(), "Research completed");
                }
                LookupOutcome::Redirected { location, .. } => {
                    warn!(error = %output, redirect_location = ?location, "Research redirect");
                }
                LookupOutcome::ServiceError { .. } => {
                    error!(error = %output, "Research failed");
                }
                LookupOutcome::TransportError(_) => {
                    error!(error = %output, "Research exception");
                }
            }
            output
        }
        .instrument(span)
        .await
    }
}

#[async_trait::async_trait]
impl Tool for ResearchTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Research a topic using the DuckDuckGo Instant Answer API. \
         Returns a summary, definition and related information when available."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "topic": {
                    "type": "string",
                    "description": "The topic to research"
                }
            },
            "required": ["topic"]
        })
    }

    async fn execute(&self, parameters: ToolParameters) -> Result<ToolResult> {
        let topic = parameters
            .get("topic")
            .ok_or_else(|| ToolError::MissingParameter("topic".to_string()))?
            .as_str()
            .ok_or_else(|| ToolError::InvalidParameter {
                name: "topic".to_string(),
                message: "expected a string".to_string(),
            })?;

        Ok(ToolResult::success(self.lookup(topic).await))
    }
}
