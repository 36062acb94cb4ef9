mod client;
pub mod types;

use crate::config::ModelConfig;
use crate::error::{ChatError, LlmError, Result};
use crate::llm::client::post;
use crate::llm::types::{ChatCompletionRequest, Message, ToolDefinition};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;

pub fn assemble_req_header(model: &ModelConfig) -> Result<HeaderMap> {
    let mut header_map = HeaderMap::new();

    header_map.insert(
        "Authorization",
        format!("Bearer {}", model.apikey)
            .parse()
            .map_err(|e| ChatError::Other(format!("Invalid Authorization header: {}", e)))?,
    );
    header_map.insert(
        "Content-Type",
        "application/json"
            .parse()
            .map_err(|e| ChatError::Other(format!("Invalid Content-Type header: {}", e)))?,
    );
    Ok(header_map)
}

/// 推理循环使用的 LLM 调用接口
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 发送完整消息列表和工具声明，返回模型产出的 assistant 消息
    async fn complete(&self, messages: &[Message], tools: &[ToolDefinition]) -> Result<Message>;
}

/// 基于 OpenAI 兼容 `/chat/completions` 接口的默认实现
pub struct DefaultLlmClient {
    client: Client,
    model: ModelConfig,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl DefaultLlmClient {
    pub fn new(client: Client, model: ModelConfig) -> Self {
        Self {
            client,
            model,
            temperature: Some(0.7),
            max_tokens: Some(8192),
        }
    }
}

#[async_trait]
impl LlmClient for DefaultLlmClient {
    async fn complete(&self, messages: &[Message], tools: &[ToolDefinition]) -> Result<Message> {
        let (tools, tool_choice) = if tools.is_empty() {
            (None, None)
        } else {
            (Some(tools.to_vec()), Some("auto".to_string()))
        };
        let request_body = ChatCompletionRequest {
            model: self.model.model.clone(),
            messages: messages.to_vec(),
            tools,
            tool_choice,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let header_map = assemble_req_header(&self.model)?;
        let response = post(&self.client, &request_body, header_map, &self.model.baseurl).await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| LlmError::EmptyResponse.into())
    }
}
