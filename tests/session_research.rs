mod common;

use common::{StubResponse, research_config, serve};
use research_agent::error::{ChatError, LlmError};
use research_agent::session::{ConversationHistory, ConversationSession};
use research_agent::testing::{MockLlmClient, ScriptedReasoner, ScriptedTurn};
use research_agent::agent::{ReactAgent, ReactConfig};
use research_agent::tools::ToolManager;
use research_agent::tools::research::ResearchTool;
use serde_json::json;
use std::sync::Arc;

fn research_tools(endpoint: &str) -> Arc<ToolManager> {
    let mut tools = ToolManager::new();
    tools.register(Box::new(ResearchTool::new(&research_config(endpoint)).unwrap()));
    Arc::new(tools)
}

#[tokio::test]
async fn concurrent_lookups_within_one_turn() {
    let (endpoint, server) = serve(2, |request| {
        if request.contains("q=Rust") {
            StubResponse::json(json!({"AbstractText": "Rust summary"}))
        } else {
            StubResponse::new("503 Service Unavailable", "try later")
        }
    })
    .await;

    let reasoner = Arc::new(
        ScriptedReasoner::new()
            .with_turn(ScriptedTurn::reply("Here is what I found.").research("Rust").research("Go")),
    );
    let mut session = ConversationSession::new(reasoner.clone(), research_tools(&endpoint));

    let reply = session.send("Tell me about Rust and Go").await.unwrap();
    assert_eq!(reply, "Here is what I found.");

    let observations = reasoner.observations();
    assert_eq!(observations.len(), 2);
    assert_eq!(observations[0], "Research findings for 'Rust':\n\nSummary: Rust summary");
    assert_eq!(
        observations[1],
        "Research API returned status code: 503. Response: try later"
    );

    // 历史包含工具调用和工具结果记录
    let roles: Vec<&str> = session.history().iter().map(|m| m.role.as_str()).collect();
    assert_eq!(roles, vec!["user", "assistant", "tool", "tool", "assistant"]);
    assert_eq!(server.await.unwrap().len(), 2);
}

#[tokio::test]
async fn lookup_failure_does_not_end_conversation() {
    let (endpoint, server) = serve(1, |_| StubResponse::new("500 Internal Server Error", "oops")).await;

    let reasoner = Arc::new(
        ScriptedReasoner::new()
            .with_turn(ScriptedTurn::reply("Research was inconclusive.").research("anything"))
            .with_turn(ScriptedTurn::reply("Anything else?")),
    );
    let mut session = ConversationSession::new(reasoner.clone(), research_tools(&endpoint));

    assert_eq!(session.send("research anything").await.unwrap(), "Research was inconclusive.");
    let after_first = session.history().clone();
    assert_eq!(session.send("thanks").await.unwrap(), "Anything else?");

    let received = reasoner.received_histories();
    assert!(received[0].is_empty());
    assert!(received[1].ptr_eq(&after_first));
    assert_eq!(session.turns().len(), 2);
    server.await.unwrap();
}

#[tokio::test]
async fn react_agent_drives_research_tool() {
    let (endpoint, server) = serve(1, |_| {
        StubResponse::json(json!({
            "AbstractText": "The borrow checker enforces ownership.",
            "RelatedTopics": [{"Text": "Lifetimes"}]
        }))
    })
    .await;

    let llm = Arc::new(
        MockLlmClient::new()
            .with_tool_call("research_topic", json!({"topic": "borrow checker"}))
            .with_text("The borrow checker enforces ownership rules."),
    );
    let agent = ReactAgent::new(ReactConfig::new("research_assistant", "be helpful"), llm.clone());
    let session = ConversationSession::new(Arc::new(agent), research_tools(&endpoint));

    let (reply, history) = session
        .handle_turn("What is the borrow checker?", &ConversationHistory::new())
        .await
        .unwrap();
    assert_eq!(reply, "The borrow checker enforces ownership rules.");

    let tool_message = history.iter().find(|m| m.role == "tool").unwrap();
    assert_eq!(
        tool_message.content.as_deref(),
        Some(
            "Research findings for 'borrow checker':\n\n\
             Summary: The borrow checker enforces ownership.\n\n\
             Related Information:\n\n- Lifetimes"
        )
    );
    assert_eq!(llm.call_count(), 2);
    server.await.unwrap();
}

#[tokio::test]
async fn reasoning_failure_propagates_verbatim() {
    let reasoner = Arc::new(ScriptedReasoner::new().with_turn(ScriptedTurn::error(
        LlmError::ApiError {
            status: 401,
            message: "invalid api key".to_string(),
        },
    )));
    let mut session = ConversationSession::new(reasoner, Arc::new(ToolManager::new()));

    let err = session.send("hello").await.unwrap_err();
    match err {
        ChatError::Llm(LlmError::ApiError { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "invalid api key");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(session.history().is_empty());
    assert!(session.turns().is_empty());
}
