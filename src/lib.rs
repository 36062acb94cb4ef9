pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod repl;
pub mod session;
pub mod telemetry;
pub mod testing;
pub mod tools;

pub mod prelude {
    pub use crate::agent::{ReactAgent, ReactConfig, ReasoningCapability, TurnOutput};
    pub use crate::config::AppConfig;
    pub use crate::error::Result;
    pub use crate::session::{ConversationHistory, ConversationSession, Turn};
    pub use crate::tools::research::{LookupOutcome, ResearchTool};
    pub use crate::tools::{Tool, ToolManager, ToolParameters, ToolResult};
}
