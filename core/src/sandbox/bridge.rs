//! Minimal HTTP bridge exposing the tool set to the sandboxed subprocess.
//!
//! Single endpoint at `/`, POST only, plaintext HTTP/1.1 framing with
//! `Content-Length` as the only honored header. Connections are accepted
//! and serviced one at a time: sandboxed code calling sequentially sees one
//! request in flight, which keeps tool-call ordering deterministic.

use crate::agent::{ExecContext, ToolRegistry};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// One sandboxed tool invocation, as sent by the subprocess.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolRequest {
    pub tool_name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    pub result: String,
    pub success: bool,
    pub error: Option<String>,
}

impl ToolResponse {
    fn ok(result: String) -> Self {
        Self {
            result,
            success: true,
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            result: String::new(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Upper bound on a request body. The declared `Content-Length` is clamped
/// before any buffer is sized from it, so a bogus header from sandboxed
/// code cannot make the host allocate arbitrarily.
const MAX_BODY_BYTES: usize = 1 << 20;

pub struct BridgeServer {
    port: u16,
    handle: JoinHandle<()>,
}

impl BridgeServer {
    /// Binds an OS-assigned port on localhost and starts serving the named
    /// subset of `tools` on a background task.
    pub async fn start(
        tools: Arc<ToolRegistry>,
        exposed: Vec<String>,
        ctx: ExecContext,
    ) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0))
            .await
            .context("failed to bind bridge listener")?;
        let port = listener.local_addr()?.port();

        let handle = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _)) => {
                        if let Err(e) = handle_connection(stream, &tools, &exposed, &ctx).await {
                            tracing::warn!("bridge connection error: {e:#}");
                        }
                    }
                    Err(e) => {
                        tracing::warn!("bridge accept error: {e}");
                    }
                }
            }
        });

        tracing::debug!(port, "bridge server listening");
        Ok(Self { port, handle })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for BridgeServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_connection(
    stream: TcpStream,
    tools: &ToolRegistry,
    exposed: &[String],
    ctx: &ExecContext,
) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let method = request_line.split_whitespace().next().unwrap_or("");

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 || line.trim_end().is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':')
            && name.trim().eq_ignore_ascii_case("content-length")
        {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }

    if method != "POST" {
        return write_response(&mut write_half, "404 Not Found", "not found").await;
    }

    if content_length > MAX_BODY_BYTES {
        let response = ToolResponse::failed(format!(
            "request body too large: {content_length} bytes (limit {MAX_BODY_BYTES})"
        ));
        let payload = serde_json::to_string(&response)?;
        return write_response(&mut write_half, "200 OK", &payload).await;
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await?;

    let response = match serde_json::from_slice::<ToolRequest>(&body) {
        Ok(request) => dispatch(request, tools, exposed, ctx).await,
        Err(e) => ToolResponse::failed(format!("malformed request body: {e}")),
    };
    let payload = serde_json::to_string(&response)?;
    write_response(&mut write_half, "200 OK", &payload).await
}

async fn dispatch(
    request: ToolRequest,
    tools: &ToolRegistry,
    exposed: &[String],
    ctx: &ExecContext,
) -> ToolResponse {
    if !exposed.iter().any(|name| name == &request.tool_name) {
        return ToolResponse::failed(format!(
            "tool '{}' not available in sandbox",
            request.tool_name
        ));
    }
    match tools.get(&request.tool_name) {
        Some(tool) => match tool.execute_json(&request.arguments, ctx).await {
            Ok(result) => ToolResponse::ok(result),
            Err(e) => ToolResponse::failed(format!("{e:#}")),
        },
        None => ToolResponse::failed(format!("tool '{}' not found", request.tool_name)),
    }
}

async fn write_response<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    status: &str,
    body: &str,
) -> Result<()> {
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len(),
    );
    writer.write_all(response.as_bytes()).await?;
    writer.shutdown().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldType, ObjectSchema};
    use crate::traits::TypedTool;
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};

    struct AddTool;

    #[derive(Deserialize)]
    struct AddArgs {
        a: i64,
        b: i64,
    }

    #[derive(Serialize)]
    struct AddOutput {
        sum: i64,
    }

    #[async_trait]
    impl TypedTool for AddTool {
        type Input = AddArgs;
        type Output = AddOutput;

        fn name(&self) -> &str {
            "add"
        }

        fn description(&self) -> &str {
            "Adds two integers"
        }

        fn input_schema(&self) -> ObjectSchema {
            ObjectSchema::new()
                .field("a", FieldType::Integer, "Left operand")
                .field("b", FieldType::Integer, "Right operand")
        }

        async fn invoke(&self, input: AddArgs, _ctx: &ExecContext) -> anyhow::Result<AddOutput> {
            Ok(AddOutput {
                sum: input.a + input.b,
            })
        }
    }

    async fn start_bridge() -> BridgeServer {
        let registry = Arc::new(ToolRegistry::new());
        registry.register(Arc::new(AddTool));
        BridgeServer::start(registry, vec!["add".to_string()], ExecContext::default())
            .await
            .unwrap()
    }

    async fn send_raw(port: u16, request: &str) -> String {
        let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    async fn post(port: u16, body: &str) -> ToolResponse {
        let request = format!(
            "POST / HTTP/1.1\r\nHost: 127.0.0.1\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );
        let raw = send_raw(port, &request).await;
        let json = raw.split("\r\n\r\n").nth(1).unwrap();
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn post_executes_exposed_tool() {
        let bridge = start_bridge().await;
        let body = serde_json::json!({"toolName": "add", "arguments": r#"{"a":2,"b":3}"#});
        let response = post(bridge.port(), &body.to_string()).await;
        assert!(response.success);
        assert_eq!(response.result, r#"{"sum":5}"#);
        bridge.stop();
    }

    #[tokio::test]
    async fn unknown_tool_is_a_payload_failure() {
        let bridge = start_bridge().await;
        let body = serde_json::json!({"toolName": "nope", "arguments": "{}"});
        let response = post(bridge.port(), &body.to_string()).await;
        assert!(!response.success);
        assert!(response.error.unwrap().contains("nope"));
        bridge.stop();
    }

    #[tokio::test]
    async fn malformed_body_is_a_payload_failure() {
        let bridge = start_bridge().await;
        let response = post(bridge.port(), "{not json").await;
        assert!(!response.success);
        assert!(response.error.unwrap().contains("malformed"));
        bridge.stop();
    }

    #[tokio::test]
    async fn non_post_gets_fixed_not_found() {
        let bridge = start_bridge().await;
        let raw = send_raw(
            bridge.port(),
            "GET / HTTP/1.1\r\nHost: 127.0.0.1\r\n\r\n",
        )
        .await;
        assert!(raw.starts_with("HTTP/1.1 404"));
        assert!(raw.ends_with("not found"));
        bridge.stop();
    }

    #[tokio::test]
    async fn oversized_content_length_is_a_payload_failure() {
        let bridge = start_bridge().await;
        // Claims a huge body; the server must answer without reading one.
        let request = format!(
            "POST / HTTP/1.1\r\nHost: 127.0.0.1\r\nContent-Length: {}\r\n\r\n",
            usize::MAX
        );
        let raw = send_raw(bridge.port(), &request).await;
        let json = raw.split("\r\n\r\n").nth(1).unwrap();
        let response: ToolResponse = serde_json::from_str(json).unwrap();
        assert!(!response.success);
        assert!(response.error.unwrap().contains("too large"));
        bridge.stop();
    }

    #[tokio::test]
    async fn sequential_requests_are_each_served() {
        let bridge = start_bridge().await;
        for i in 0..3 {
            let body =
                serde_json::json!({"toolName": "add", "arguments": format!(r#"{{"a":{i},"b":1}}"#)});
            let response = post(bridge.port(), &body.to_string()).await;
            assert!(response.success);
            assert_eq!(response.result, format!(r#"{{"sum":{}}}"#, i + 1));
        }
        bridge.stop();
    }
}
