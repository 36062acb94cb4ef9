use std::fmt;

/// research-agent 的统一错误类型
#[derive(Debug)]
pub enum ChatError {
    /// LLM 相关错误
    Llm(LlmError),
    /// 工具调用错误（参数不合法、工具不存在）
    Tool(ToolError),
    /// 解析错误
    Parse(ParseError),
    /// 推理循环错误
    Agent(AgentError),
    /// 配置错误
    Config(ConfigError),
    /// IO 错误
    Io(std::io::Error),
    /// 其他错误
    Other(String),
}

/// LLM 相关错误
#[derive(Debug)]
pub enum LlmError {
    /// 网络请求失败
    NetworkError(String),
    /// API 返回错误状态码
    ApiError { status: u16, message: String },
    /// 响应格式无效
    InvalidResponse(String),
    /// 没有返回内容
    EmptyResponse,
}

/// 工具调用错误
///
/// 注意：外部查询服务的失败不属于这里，研究工具会把它们渲染成普通文本返回。
#[derive(Debug)]
pub enum ToolError {
    /// 工具未找到
    NotFound(String),
    /// 参数缺失
    MissingParameter(String),
    /// 参数类型错误
    InvalidParameter { name: String, message: String },
}

/// 解析错误
#[derive(Debug)]
pub enum ParseError {
    /// 工具调用参数不是合法 JSON
    InvalidToolArguments { tool: String, message: String },
    /// JSON 解析错误
    JsonError(String),
}

/// 推理循环错误
#[derive(Debug)]
pub enum AgentError {
    /// 超过最大迭代次数
    MaxIterationsExceeded(usize),
    /// 模型既没有内容也没有工具调用
    NoResponse,
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件未找到
    FileNotFound(String),
    /// 配置解析失败
    ParseFailed(String),
    /// 缺少必需的配置项
    MissingField(String),
    /// 配置值无效
    InvalidValue { field: String, message: String },
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatError::Llm(e) => write!(f, "LLM Error: {}", e),
            ChatError::Tool(e) => write!(f, "Tool Error: {}", e),
            ChatError::Parse(e) => write!(f, "Parse Error: {}", e),
            ChatError::Agent(e) => write!(f, "Agent Error: {}", e),
            ChatError::Config(e) => write!(f, "Config Error: {}", e),
            ChatError::Io(e) => write!(f, "IO Error: {}", e),
            ChatError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            LlmError::ApiError { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            LlmError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            LlmError::EmptyResponse => write!(f, "Empty response from LLM"),
        }
    }
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolError::NotFound(name) => write!(f, "Tool '{}' not found", name),
            ToolError::MissingParameter(name) => write!(f, "Missing parameter: {}", name),
            ToolError::InvalidParameter { name, message } => {
                write!(f, "Invalid parameter '{}': {}", name, message)
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidToolArguments { tool, message } => {
                write!(f, "Invalid arguments for tool '{}': {}", tool, message)
            }
            ParseError::JsonError(msg) => write!(f, "JSON parse error: {}", msg),
        }
    }
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::MaxIterationsExceeded(n) => {
                write!(f, "Max iterations exceeded: {}", n)
            }
            AgentError::NoResponse => write!(f, "No response from LLM"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::ParseFailed(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::MissingField(field) => write!(f, "Missing config field: {}", field),
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid config value for '{}': {}", field, message)
            }
        }
    }
}

impl std::error::Error for ChatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChatError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for LlmError {}
impl std::error::Error for ToolError {}
impl std::error::Error for ParseError {}
impl std::error::Error for AgentError {}
impl std::error::Error for ConfigError {}

// From 转换实现
impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        ChatError::Io(err)
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatError::Llm(LlmError::NetworkError("Request timeout".to_string()))
        } else if err.is_connect() {
            ChatError::Llm(LlmError::NetworkError(format!(
                "Connection failed: {}",
                err
            )))
        } else {
            ChatError::Llm(LlmError::NetworkError(err.to_string()))
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::Parse(ParseError::JsonError(err.to_string()))
    }
}

impl From<serde_yaml::Error> for ChatError {
    fn from(err: serde_yaml::Error) -> Self {
        ChatError::Config(ConfigError::ParseFailed(err.to_string()))
    }
}

impl From<LlmError> for ChatError {
    fn from(err: LlmError) -> Self {
        ChatError::Llm(err)
    }
}

impl From<ToolError> for ChatError {
    fn from(err: ToolError) -> Self {
        ChatError::Tool(err)
    }
}

impl From<ParseError> for ChatError {
    fn from(err: ParseError) -> Self {
        ChatError::Parse(err)
    }
}

impl From<AgentError> for ChatError {
    fn from(err: AgentError) -> Self {
        ChatError::Agent(err)
    }
}

impl From<ConfigError> for ChatError {
    fn from(err: ConfigError) -> Self {
        ChatError::Config(err)
    }
}

// 便捷的 Result 类型别名
pub type Result<T> = std::result::Result<T, ChatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_error_display() {
        let err: ChatError = LlmError::ApiError {
            status: 503,
            message: "overloaded".to_string(),
        }
        .into();
        let text = err.to_string();
        assert!(text.starts_with("LLM Error"));
        assert!(text.contains("503"));
        assert!(text.contains("overloaded"));
    }

    #[test]
    fn test_config_error_display() {
        let err: ChatError = ConfigError::InvalidValue {
            field: "RESEARCH_TIMEOUT_SECS".to_string(),
            message: "not a number".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Config Error: Invalid config value for 'RESEARCH_TIMEOUT_SECS': not a number"
        );
    }

    #[test]
    fn test_json_error_converts_to_parse() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ChatError = json_err.into();
        assert!(matches!(err, ChatError::Parse(ParseError::JsonError(_))));
    }
}
