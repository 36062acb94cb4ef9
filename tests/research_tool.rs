mod common;

use common::{StubResponse, research_config, serve_once};
use research_agent::config::ResearchConfig;
use research_agent::tools::research::{LookupOutcome, ResearchTool};
use research_agent::tools::{Tool, ToolParameters};
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpListener;

#[tokio::test]
async fn sends_fixed_query_parameters_and_browser_agent() {
    let (endpoint, server) =
        serve_once(StubResponse::json(json!({"AbstractText": "A language."}))).await;
    let tool = ResearchTool::new(&research_config(&endpoint)).unwrap();

    let output = tool.lookup("Rust language").await;
    assert_eq!(
        output,
        "Research findings for 'Rust language':\n\nSummary: A language."
    );

    let requests = server.await.unwrap();
    let request = requests[0].to_lowercase();
    assert!(request.starts_with("get /?"));
    assert!(request.contains("q=rust+language"));
    assert!(request.contains("format=json"));
    assert!(request.contains("no_html=1"));
    assert!(request.contains("skip_disambig=1"));
    assert!(request.contains("no_redirect=1"));
    assert!(request.contains("user-agent: mozilla/5.0"));
}

#[tokio::test]
async fn full_report_through_tool_interface() {
    let (endpoint, server) = serve_once(StubResponse::json(json!({
        "AbstractText": "",
        "Definition": "A definition.",
        "RelatedTopics": [
            {"Text": "First related", "FirstURL": "https://duckduckgo.com/a"},
            {"Name": "Category", "Topics": [{"Text": "nested"}]},
            {"Text": "Second related"}
        ]
    })))
    .await;
    let tool = ResearchTool::new(&research_config(&endpoint)).unwrap();

    let mut params = ToolParameters::new();
    params.insert("topic".to_string(), json!("ownership"));
    let result = tool.execute(params).await.unwrap();

    assert!(result.success);
    assert_eq!(
        result.output,
        "Research findings for 'ownership':\n\nDefinition: A definition.\n\n\
         Related Information:\n\n- First related\n- Second related"
    );
    server.await.unwrap();
}

#[tokio::test]
async fn empty_answer_reports_limited_information() {
    let (endpoint, server) = serve_once(StubResponse::json(json!({
        "AbstractText": "",
        "Definition": "",
        "RelatedTopics": []
    })))
    .await;
    let tool = ResearchTool::new(&research_config(&endpoint)).unwrap();

    let output = tool.lookup("zzqx").await;
    assert_eq!(
        output,
        "Limited information found for 'zzqx' via DuckDuckGo Instant Answer API. \
         The API may not have detailed information on this topic. \
         Try rephrasing or searching for more general/specific terms."
    );
    server.await.unwrap();
}

#[tokio::test]
async fn redirect_is_not_followed() {
    let (endpoint, server) = serve_once(
        StubResponse::new("302 Found", "").with_header("Location", "https://duckduckgo.com/?q=x"),
    )
    .await;
    let tool = ResearchTool::new(&research_config(&endpoint)).unwrap();

    let outcome = tool.query("x").await;
    assert_eq!(
        outcome,
        LookupOutcome::Redirected {
            status: 302,
            location: Some("https://duckduckgo.com/?q=x".to_string()),
        }
    );
    let text = outcome.render("x");
    assert!(text.contains("status 302"));
    assert!(!text.contains("Limited information"));

    // 只收到一个请求，说明没有跟随重定向
    assert_eq!(server.await.unwrap().len(), 1);
}

#[tokio::test]
async fn service_error_embeds_first_200_characters() {
    let body: String = (0..500).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
    let (endpoint, server) = serve_once(StubResponse::new("404 Not Found", body.clone())).await;
    let tool = ResearchTool::new(&research_config(&endpoint)).unwrap();

    let output = tool.lookup("missing").await;
    let prefix = "Research API returned status code: 404. Response: ";
    assert!(output.starts_with(prefix));
    assert_eq!(&output[prefix.len()..], &body[..200]);
    server.await.unwrap();
}

#[tokio::test]
async fn connection_failure_is_reported_as_text() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let tool = ResearchTool::new(&research_config(&format!("http://{}/", addr))).unwrap();
    let output = tool.lookup("anything").await;
    assert!(output.starts_with("Error during research: "));
    assert!(output.len() > "Error during research: ".len());
}

#[tokio::test]
async fn unresolvable_host_is_reported_as_text() {
    let tool = ResearchTool::new(&research_config("http://lookup.invalid/")).unwrap();
    let output = tool.lookup("anything").await;
    assert!(output.starts_with("Error during research: "));
}

#[tokio::test]
async fn timeout_is_reported_as_text() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // 接受连接但从不响应
    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        drop(socket);
    });

    let config = ResearchConfig {
        timeout_secs: 1,
        ..research_config(&format!("http://{}/", addr))
    };
    let tool = ResearchTool::new(&config).unwrap();
    let output = tool.lookup("slow").await;
    assert!(output.starts_with("Error during research: request timed out"));
    server.abort();
}

#[tokio::test]
async fn blocked_html_page_is_reported_as_text() {
    let (endpoint, server) = serve_once(
        StubResponse::new("200 OK", "<html>blocked</html>").with_header("Content-Type", "text/html"),
    )
    .await;
    let tool = ResearchTool::new(&research_config(&endpoint)).unwrap();

    let output = tool.lookup("x").await;
    assert!(output.starts_with("Error during research: invalid JSON response"));
    server.await.unwrap();
}

#[tokio::test]
async fn whitespace_topic_is_still_looked_up() {
    let (endpoint, server) = serve_once(StubResponse::json(json!({"AbstractText": ""}))).await;
    let tool = ResearchTool::new(&research_config(&endpoint)).unwrap();

    let mut params = ToolParameters::new();
    params.insert("topic".to_string(), json!("   "));
    let result = tool.execute(params).await.unwrap();

    assert!(result.success);
    assert!(result.output.starts_with("Limited information found for '   '"));
    let requests = server.await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].contains("q=+++"));
}
