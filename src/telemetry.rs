//! tracing 初始化与会话级 span

use crate::config::TelemetryConfig;
use tracing::{Span, info_span};
use tracing_subscriber::EnvFilter;

/// 安装全局 subscriber。`RUST_LOG` 优先，否则按 `verbose` 选择默认级别。
/// 重复调用时静默忽略
pub fn init(verbose: bool) {
    let default_filter = if verbose {
        "research_agent=debug"
    } else {
        "research_agent=warn"
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn session_span(config: &TelemetryConfig, session_id: &str) -> Span {
    info_span!(
        "session",
        service = %config.service_name,
        environment = %config.environment,
        session_id = %session_id,
    )
}
