//! 脚本化的推理能力，替代真实模型测试会话层和研究工具的集成。
//!
//! 每一轮按脚本并发调用 `research_topic`，再给出预设回复（或预设错误）。
//!
//! ```rust
//! use research_agent::testing::{ScriptedReasoner, ScriptedTurn};
//!
//! let reasoner = ScriptedReasoner::new()
//!     .with_turn(ScriptedTurn::reply("Rust is a systems language.").research("Rust"))
//!     .with_turn(ScriptedTurn::reply("You're welcome."));
//! assert_eq!(reasoner.remaining(), 2);
//! ```

use crate::agent::{ReasoningCapability, TurnOutput};
use crate::error::{ChatError, Result};
use crate::llm::types::{Message, ToolCall};
use crate::session::ConversationHistory;
use crate::tools::research::TOOL_NAME;
use crate::tools::{ToolManager, ToolParameters};
use async_trait::async_trait;
use futures::future::join_all;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;

/// 一轮脚本：要研究的主题和最终结果
pub struct ScriptedTurn {
    topics: Vec<String>,
    outcome: Result<String>,
}

impl ScriptedTurn {
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            topics: Vec::new(),
            outcome: Ok(text.into()),
        }
    }

    /// 本轮直接失败，模拟模型后端不可用
    pub fn error(err: impl Into<ChatError>) -> Self {
        Self {
            topics: Vec::new(),
            outcome: Err(err.into()),
        }
    }

    /// 本轮回复前研究一个主题，可多次调用
    pub fn research(mut self, topic: impl Into<String>) -> Self {
        self.topics.push(topic.into());
        self
    }
}

pub struct ScriptedReasoner {
    turns: Mutex<VecDeque<ScriptedTurn>>,
    histories: Mutex<Vec<ConversationHistory>>,
    observations: Mutex<Vec<String>>,
}

impl Default for ScriptedReasoner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedReasoner {
    pub fn new() -> Self {
        Self {
            turns: Mutex::new(VecDeque::new()),
            histories: Mutex::new(Vec::new()),
            observations: Mutex::new(Vec::new()),
        }
    }

    pub fn with_turn(self, turn: ScriptedTurn) -> Self {
        self.turns.lock().unwrap().push_back(turn);
        self
    }

    pub fn remaining(&self) -> usize {
        self.turns.lock().unwrap().len()
    }

    /// 每轮收到的历史，按调用顺序
    pub fn received_histories(&self) -> Vec<ConversationHistory> {
        self.histories.lock().unwrap().clone()
    }

    /// 所有工具调用返回的文本，按调用顺序
    pub fn observations(&self) -> Vec<String> {
        self.observations.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReasoningCapability for ScriptedReasoner {
    async fn respond(
        &self,
        utterance: &str,
        history: &ConversationHistory,
        tools: &ToolManager,
    ) -> Result<TurnOutput> {
        self.histories.lock().unwrap().push(history.clone());

        let turn = self
            .turns
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ScriptedTurn::reply("scripted reply"));
        let reply = turn.outcome?;

        let mut messages = history.messages().to_vec();
        messages.push(Message::user(utterance.to_string()));

        if !turn.topics.is_empty() {
            let calls: Vec<ToolCall> = turn
                .topics
                .iter()
                .enumerate()
                .map(|(i, topic)| {
                    ToolCall::function(
                        format!("call_{}", i),
                        TOOL_NAME,
                        json!({ "topic": topic }).to_string(),
                    )
                })
                .collect();
            messages.push(Message::assistant_with_tools(calls.clone()));

            let results = join_all(turn.topics.iter().map(|topic| {
                let mut params = ToolParameters::new();
                params.insert("topic".to_string(), json!(topic));
                tools.execute_tool(TOOL_NAME, params)
            }))
            .await;

            for (call, result) in calls.into_iter().zip(results) {
                let observation = result?.into_observation();
                self.observations.lock().unwrap().push(observation.clone());
                messages.push(Message::tool_result(call.id, call.function.name, observation));
            }
        }

        messages.push(Message::assistant(reply.clone()));
        Ok(TurnOutput {
            reply,
            history: ConversationHistory::from(messages),
        })
    }
}
