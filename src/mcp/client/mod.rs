//! Tool-call dispatch over the dual-channel SSE transport.
//!
//! Each call opens its own streaming connection, learns the callback
//! endpoint from the stream, POSTs a JSON-RPC envelope to it, and then
//! waits for the correlated reply to arrive back on the stream. The POST
//! acknowledgement is never the result.

use crate::core::config::data::Registry;
use crate::mcp::error::{McpError, RemoteToolError};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

mod connection;

use connection::SseConnection;

const HTTP_CONNECT_TIMEOUT_SECONDS: u64 = 10;
const HTTP_POOL_IDLE_TIMEOUT_SECONDS: u64 = 90;
const HTTP_POOL_MAX_IDLE_PER_HOST: usize = 8;

/// How long to wait for the endpoint event before giving up on a
/// connection, unless overridden.
const DEFAULT_ENDPOINT_WAIT: Duration = Duration::from_secs(5);

const JSONRPC_VERSION: &str = "2.0";
const TOOLS_CALL_METHOD: &str = "tools/call";
/// Servers acknowledge the POST with 200 or 202; anything else is a
/// transport failure.
const POST_ACK_STATUSES: [u16; 2] = [200, 202];

fn build_http_client() -> Result<reqwest::Client, McpError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECONDS))
        .pool_idle_timeout(Duration::from_secs(HTTP_POOL_IDLE_TIMEOUT_SECONDS))
        .pool_max_idle_per_host(HTTP_POOL_MAX_IDLE_PER_HOST)
        .build()
        .map_err(|err| McpError::Transport(format!("failed to build HTTP client: {err}")))
}

/// Dispatches tool calls against servers from an immutable registry.
pub struct ToolDispatcher {
    registry: Registry,
    http: reqwest::Client,
    endpoint_wait: Duration,
}

impl ToolDispatcher {
    pub fn new(registry: Registry) -> Result<Self, McpError> {
        Ok(Self {
            registry,
            http: build_http_client()?,
            endpoint_wait: DEFAULT_ENDPOINT_WAIT,
        })
    }

    /// Overrides the endpoint-resolution sub-timeout.
    pub fn with_endpoint_wait(mut self, wait: Duration) -> Self {
        self.endpoint_wait = wait;
        self
    }

    /// Invokes `tool` on `server`, passing `arguments` through unmodified,
    /// and returns the reply's result payload. Fails deterministically
    /// within `timeout`; a failed call is terminal, no retries happen
    /// here.
    pub async fn call(
        &self,
        server: &str,
        tool: &str,
        arguments: Value,
        timeout: Duration,
    ) -> Result<Value, McpError> {
        let config = self
            .registry
            .server(server)
            .ok_or_else(|| McpError::UnknownServer {
                name: server.to_string(),
                available: self.registry.sse_servers(),
            })?;
        if !config.is_sse() {
            return Err(McpError::UnsupportedTransport {
                name: server.to_string(),
                transport: config.transport_label().to_string(),
            });
        }

        let deadline = tokio::time::Instant::now() + timeout;
        // One connection serves one call; dropping it on any exit path
        // below aborts the listener and closes the stream.
        let mut connection = SseConnection::open(&self.http, &config.url, &config.headers).await?;

        let request_id = Uuid::new_v4().to_string();
        let reply = connection.register(&request_id).await;

        let endpoint = connection.endpoint(self.endpoint_wait.min(timeout)).await?;
        debug!(server, tool, %endpoint, id = %request_id, "dispatching tool call");

        let envelope = serde_json::json!({
            "jsonrpc": JSONRPC_VERSION,
            "id": request_id,
            "method": TOOLS_CALL_METHOD,
            "params": { "name": tool, "arguments": arguments },
        });

        let mut request = self
            .http
            .post(endpoint)
            .timeout(deadline.saturating_duration_since(tokio::time::Instant::now()));
        for (name, value) in &config.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request
            .json(&envelope)
            .send()
            .await
            .map_err(|err| McpError::Transport(err.to_string()))?;
        if !POST_ACK_STATUSES.contains(&response.status().as_u16()) {
            return Err(McpError::Transport(format!(
                "call rejected with HTTP {}",
                response.status()
            )));
        }

        match tokio::time::timeout_at(deadline, reply).await {
            Err(_) => {
                connection.unregister(&request_id).await;
                Err(McpError::RequestTimeout(timeout))
            }
            Ok(Err(_)) => Err(McpError::Transport(
                "listener stopped before delivering a reply".to_string(),
            )),
            Ok(Ok(Err(err))) => Err(err),
            Ok(Ok(Ok(message))) => reply_outcome(message),
        }
    }
}

fn reply_outcome(message: Value) -> Result<Value, McpError> {
    if let Some(error) = message.get("error").filter(|value| !value.is_null()) {
        return Err(McpError::RemoteTool(RemoteToolError::from_payload(
            error.clone(),
        )));
    }
    match message.get("result").filter(|value| !value.is_null()) {
        Some(result) => Ok(result.clone()),
        None => Err(McpError::Protocol(
            "reply carried neither result nor error".to_string(),
        )),
    }
}
