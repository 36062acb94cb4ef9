use crate::agent::{ReasoningCapability, TurnOutput};
use crate::error::{AgentError, ParseError, Result};
use crate::llm::LlmClient;
use crate::llm::types::{Message, ToolCall};
use crate::session::ConversationHistory;
use crate::tools::{ToolManager, ToolParameters, ToolResult};
use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ReactConfig {
    /// agent 名称
    agent_name: String,
    /// 系统提示词，仅在历史为空时插入
    system_prompt: String,
    /// 单轮内最大迭代次数
    max_iterations: usize,
}

impl ReactConfig {
    pub fn new(agent_name: &str, system_prompt: &str) -> Self {
        Self {
            agent_name: agent_name.to_string(),
            system_prompt: system_prompt.to_string(),
            max_iterations: 10,
        }
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }
}

/// 基于原生 tool calling 的 ReAct 推理循环
///
/// 同一条 assistant 消息里的多个工具调用并发执行，结果按调用顺序写回历史。
pub struct ReactAgent {
    config: ReactConfig,
    llm: Arc<dyn LlmClient>,
}

impl ReactAgent {
    pub fn new(config: ReactConfig, llm: Arc<dyn LlmClient>) -> Self {
        Self { config, llm }
    }

    /// 执行单个工具调用，返回回传给模型的文本。
    ///
    /// 参数解析失败或工具自身报错都不会中断本轮，错误描述作为观察结果交还模型。
    async fn run_tool_call(&self, call: &ToolCall, tools: &ToolManager) -> String {
        let name = call.function.name.as_str();
        match self.invoke(call, tools).await {
            Ok(result) => result.into_observation(),
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool call failed");
                format!("Tool error: {}", e)
            }
        }
    }

    async fn invoke(&self, call: &ToolCall, tools: &ToolManager) -> Result<ToolResult> {
        let name = call.function.name.as_str();
        let raw = call.function.arguments.trim();
        let arguments: Value = if raw.is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(raw).map_err(|e| ParseError::InvalidToolArguments {
                tool: name.to_string(),
                message: e.to_string(),
            })?
        };

        let params: ToolParameters = match arguments {
            Value::Object(map) => map.into_iter().collect(),
            _ => ToolParameters::new(),
        };

        info!(agent = %self.config.agent_name, tool = %name, "Calling tool");
        tools.execute_tool(name, params).await
    }
}

#[async_trait]
impl ReasoningCapability for ReactAgent {
    async fn respond(
        &self,
        utterance: &str,
        history: &ConversationHistory,
        tools: &ToolManager,
    ) -> Result<TurnOutput> {
        let mut messages: Vec<Message> = history.messages().to_vec();
        if messages.is_empty() {
            messages.push(Message::system(self.config.system_prompt.clone()));
        }
        messages.push(Message::user(utterance.to_string()));

        let definitions = tools.get_tool_definitions();

        for iteration in 0..self.config.max_iterations {
            debug!(iteration = iteration + 1, "Reasoning iteration");

            let message = self.llm.complete(&messages, &definitions).await?;

            if message.has_tool_calls() {
                let calls = message.tool_calls.clone().unwrap_or_default();
                // assistant 的工具调用消息必须先于 tool 结果写入历史
                messages.push(message);

                let results =
                    join_all(calls.iter().map(|call| self.run_tool_call(call, tools))).await;
                for (call, result) in calls.iter().zip(results) {
                    messages.push(Message::tool_result(
                        call.id.clone(),
                        call.function.name.clone(),
                        result,
                    ));
                }
                continue;
            }

            let reply = message
                .content
                .as_deref()
                .map(str::trim)
                .filter(|content| !content.is_empty())
                .map(str::to_string)
                .ok_or(AgentError::NoResponse)?;
            messages.push(message);

            return Ok(TurnOutput {
                reply,
                history: ConversationHistory::from(messages),
            });
        }

        Err(AgentError::MaxIterationsExceeded(self.config.max_iterations).into())
    }
}
