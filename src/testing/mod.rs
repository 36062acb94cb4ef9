//! 测试基础设施
//!
//! 在不依赖真实 LLM / 外部服务的情况下测试各组件。
//!
//! | 类型 | 用途 |
//! |------|------|
//! | [`MockLlmClient`] | 替代真实 LLM，脚本化返回文本或工具调用，测试 `ReactAgent` |
//! | [`MockTool`] | 替代真实工具，测试推理循环的工具调用 / 错误回传 |
//! | [`ScriptedReasoner`] | 替代整个推理能力，按脚本调用 `research_topic`，测试会话层 |
//!
//! 所有 Mock 都完全在内存中运行，并记录收到的调用，供断言使用。

mod mock_llm;
mod mock_reasoner;
mod mock_tool;

pub use mock_llm::MockLlmClient;
pub use mock_reasoner::{ScriptedReasoner, ScriptedTurn};
pub use mock_tool::MockTool;
