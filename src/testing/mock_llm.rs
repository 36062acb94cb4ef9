//! Mock LLM 客户端，用于在不发起真实 HTTP 请求的情况下测试 [`ReactAgent`](crate::agent::ReactAgent)。
//!
//! # 示例
//!
//! ```rust
//! use research_agent::testing::MockLlmClient;
//! use research_agent::llm::LlmClient;
//! use research_agent::llm::types::Message;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mock = MockLlmClient::new()
//!     .with_text("第一次响应")
//!     .with_text("第二次响应");
//!
//! let r1 = mock.complete(&[Message::user("hi".to_string())], &[]).await.unwrap();
//! assert_eq!(r1.content.as_deref(), Some("第一次响应"));
//! assert_eq!(mock.call_count(), 1);
//! # }
//! ```

use crate::error::{ChatError, LlmError, Result};
use crate::llm::LlmClient;
use crate::llm::types::{Message, ToolCall, ToolDefinition};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// 预设响应（assistant 消息或错误）
enum MockLlmResponse {
    Message(Message),
    Err(ChatError),
}

/// 可脚本化的 Mock LLM 客户端。
///
/// 按顺序返回预设的响应；队列耗尽后返回 `EmptyResponse` 错误。
pub struct MockLlmClient {
    responses: Mutex<VecDeque<MockLlmResponse>>,
    /// 每次调用时收到的 messages 列表，按顺序记录
    calls: Mutex<Vec<Vec<Message>>>,
}

impl Default for MockLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 追加一条任意 assistant 消息
    pub fn with_message(self, message: Message) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockLlmResponse::Message(message));
        self
    }

    /// 追加一条纯文本回复
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_message(Message::assistant(text.into()))
    }

    /// 追加一条携带工具调用的回复
    pub fn with_tool_calls(self, calls: Vec<ToolCall>) -> Self {
        self.with_message(Message::assistant_with_tools(calls))
    }

    /// 追加一条单工具调用回复，调用 ID 自动生成
    pub fn with_tool_call(self, name: &str, arguments: Value) -> Self {
        let id = format!("call_{}", self.remaining());
        self.with_tool_calls(vec![ToolCall::function(id, name, arguments.to_string())])
    }

    /// 追加一条错误响应
    pub fn with_error(self, err: ChatError) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(MockLlmResponse::Err(err));
        self
    }

    pub fn with_network_error(self, msg: impl Into<String>) -> Self {
        self.with_error(ChatError::Llm(LlmError::NetworkError(msg.into())))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_messages(&self) -> Option<Vec<Message>> {
        self.calls.lock().unwrap().last().cloned()
    }

    pub fn all_calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }

    /// 剩余未消费的预设响应数量
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message], _tools: &[ToolDefinition]) -> Result<Message> {
        self.calls.lock().unwrap().push(messages.to_vec());

        match self.responses.lock().unwrap().pop_front() {
            Some(MockLlmResponse::Message(message)) => Ok(message),
            Some(MockLlmResponse::Err(e)) => Err(e),
            None => Err(ChatError::Llm(LlmError::EmptyResponse)),
        }
    }
}
