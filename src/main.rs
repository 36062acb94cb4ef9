use clap::Parser;
use research_agent::config::AppConfig;
use research_agent::llm::DefaultLlmClient;
use research_agent::prelude::*;
use research_agent::{repl, telemetry};
use std::sync::Arc;
use tracing::Instrument;

#[derive(Parser, Debug)]
#[command(name = "research-agent", version)]
#[command(about = "Interactive research assistant backed by DuckDuckGo Instant Answers")]
struct Cli {
    /// YAML 配置文件路径
    #[arg(short, long, env = "RESEARCH_AGENT_CONFIG")]
    config: Option<String>,

    /// 覆盖配置中的模型名
    #[arg(short, long)]
    model: Option<String>,

    /// 单轮最大推理迭代次数
    #[arg(long)]
    max_iterations: Option<usize>,

    /// 输出 debug 日志
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(model) = cli.model {
        config.model.model = model;
    }
    if let Some(max_iterations) = cli.max_iterations {
        config.max_iterations = max_iterations;
    }

    let mut tools = ToolManager::new();
    tools.register(Box::new(ResearchTool::new(&config.research)?));

    let llm = DefaultLlmClient::new(reqwest::Client::new(), config.model.clone());
    let agent = ReactAgent::new(
        ReactConfig::new("research_assistant", &config.system_prompt)
            .max_iterations(config.max_iterations),
        Arc::new(llm),
    );

    let mut session = ConversationSession::new(Arc::new(agent), Arc::new(tools));
    let span = telemetry::session_span(&config.telemetry, session.session_id());

    repl::run(&mut session).instrument(span).await
}
