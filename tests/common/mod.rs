//! 本地 HTTP 桩服务，替代即时答案服务
#![allow(dead_code)]

use research_agent::config::ResearchConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub struct StubResponse {
    pub status_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl StubResponse {
    pub fn new(status_line: &str, body: impl Into<String>) -> Self {
        Self {
            status_line: status_line.to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn json(body: serde_json::Value) -> Self {
        Self::new("200 OK", body.to_string()).with_header("Content-Type", "application/json")
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    fn to_http(&self) -> String {
        let mut head = format!("HTTP/1.1 {}\r\n", self.status_line);
        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        format!(
            "{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
            head,
            self.body.len(),
            self.body
        )
    }
}

pub fn research_config(endpoint: &str) -> ResearchConfig {
    ResearchConfig {
        endpoint: endpoint.to_string(),
        ..ResearchConfig::default()
    }
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = socket.read(&mut buf).await.expect("read request");
        if n == 0 {
            break;
        }
        request.extend_from_slice(&buf[..n]);
        if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
            // 读完请求体，避免关闭时残留未读数据
            let head = String::from_utf8_lossy(&request[..end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if request.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&request).into_owned()
}

/// 依次处理 `count` 个连接，按请求内容选择响应；返回收到的原始请求
pub async fn serve<F>(count: usize, responder: F) -> (String, JoinHandle<Vec<String>>)
where
    F: Fn(&str) -> StubResponse + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind local test server");
    let addr = listener.local_addr().expect("local addr");

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for _ in 0..count {
            let (mut socket, _) = listener.accept().await.expect("accept connection");
            let request = read_request(&mut socket).await;
            let response = responder(&request);
            socket
                .write_all(response.to_http().as_bytes())
                .await
                .expect("write response");
            let _ = socket.shutdown().await;
            requests.push(request);
        }
        requests
    });

    (format!("http://{}/", addr), handle)
}

pub async fn serve_once(response: StubResponse) -> (String, JoinHandle<Vec<String>>) {
    let response = std::sync::Mutex::new(Some(response));
    serve(1, move |_| {
        response
            .lock()
            .unwrap()
            .take()
            .expect("single response already used")
    })
    .await
}
