//! 多轮对话会话
//!
//! [`ConversationSession`] 持有一次会话的历史。每轮把用户输入和当前历史交给
//! [`ReasoningCapability`]，用它返回的历史整体替换旧历史，不在原地修改。
//! 推理能力的错误原样向上传递，会话本身不重试、不包装。

use crate::agent::ReasoningCapability;
use crate::error::Result;
use crate::llm::types::Message;
use crate::tools::ToolManager;
use std::sync::Arc;
use tracing::{Instrument, info, info_span};

/// 不可变的对话历史，克隆只增加引用计数
#[derive(Debug, Clone)]
pub struct ConversationHistory(Arc<[Message]>);

impl ConversationHistory {
    pub fn new() -> Self {
        Self(Arc::from(Vec::new()))
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 是否与另一份历史共享同一块存储
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ConversationHistory {
    fn eq(&self, other: &Self) -> bool {
        self.messages() == other.messages()
    }
}

impl From<Vec<Message>> for ConversationHistory {
    fn from(messages: Vec<Message>) -> Self {
        Self(Arc::from(messages))
    }
}

/// 一轮对话：用户输入与助手回复
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub utterance: String,
    pub reply: String,
}

pub struct ConversationSession {
    id: String,
    reasoner: Arc<dyn ReasoningCapability>,
    tools: Arc<ToolManager>,
    history: ConversationHistory,
    turns: Vec<Turn>,
}

impl ConversationSession {
    pub fn new(reasoner: Arc<dyn ReasoningCapability>, tools: Arc<ToolManager>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            reasoner,
            tools,
            history: ConversationHistory::new(),
            turns: Vec::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.id
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// 处理一轮对话，不修改会话状态：返回回复和新的历史
    pub async fn handle_turn(
        &self,
        utterance: &str,
        history: &ConversationHistory,
    ) -> Result<(String, ConversationHistory)> {
        let span = info_span!("agent_interaction", session_id = %self.id);
        async {
            info!(user_input = %utterance, "User input received");
            let output = self.reasoner.respond(utterance, history, &self.tools).await?;
            info!(agent_output = %output.reply, "Agent output generated");
            Ok((output.reply, output.history))
        }
        .instrument(span)
        .await
    }

    /// 处理一轮对话并保留历史。失败时会话状态保持不变
    pub async fn send(&mut self, utterance: &str) -> Result<String> {
        let (reply, history) = self.handle_turn(utterance, &self.history).await?;
        self.history = history;
        self.turns.push(Turn {
            utterance: utterance.to_string(),
            reply: reply.clone(),
        });
        Ok(reply)
    }
}
