use crate::error::Result;
use crate::session::ConversationHistory;
use crate::tools::ToolManager;
use async_trait::async_trait;

pub mod react_agent;

pub use react_agent::{ReactAgent, ReactConfig};

/// 单轮推理的产出：回复文本和更新后的完整历史
#[derive(Debug, Clone)]
pub struct TurnOutput {
    pub reply: String,
    pub history: ConversationHistory,
}

/// 推理能力：接收历史、用户输入和可用工具，自行决定调用工具的次数与方式，给出回复。
///
/// 会话层只负责保存并原样回传返回的历史，不理解其中的结构。
#[async_trait]
pub trait ReasoningCapability: Send + Sync {
    async fn respond(
        &self,
        utterance: &str,
        history: &ConversationHistory,
        tools: &ToolManager,
    ) -> Result<TurnOutput>;
}
