use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// A failure reported by the remote tool itself, carried in the `error`
/// field of the correlated reply.
#[derive(Debug)]
pub struct RemoteToolError {
    pub code: Option<i64>,
    pub message: Option<String>,
    /// The raw error payload, preserved for callers that inspect
    /// server-specific fields.
    pub payload: Value,
}

impl RemoteToolError {
    pub(crate) fn from_payload(payload: Value) -> Self {
        let code = payload.get("code").and_then(Value::as_i64);
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            code,
            message,
            payload,
        }
    }
}

impl fmt::Display for RemoteToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.message.as_deref()) {
            (Some(code), Some(message)) => write!(f, "MCP error {}: {}", code, message),
            (None, Some(message)) => write!(f, "MCP error: {}", message),
            _ => write!(f, "MCP error: {}", self.payload),
        }
    }
}

/// Errors that can occur while dispatching a tool call. Every call yields
/// either a result or exactly one of these.
#[derive(Debug)]
pub enum McpError {
    /// The requested server is not present in the registry.
    UnknownServer {
        name: String,
        /// SSE servers that are configured, for the error message.
        available: Vec<String>,
    },
    /// The server exists but is not reachable over the SSE transport.
    UnsupportedTransport { name: String, transport: String },
    /// No endpoint event arrived on the stream before the sub-timeout.
    EndpointTimeout(Duration),
    /// No correlated reply arrived before the call deadline.
    RequestTimeout(Duration),
    /// Network or stream-level failure.
    Transport(String),
    /// The server reported a failure for this call.
    RemoteTool(RemoteToolError),
    /// The peer violated the wire protocol (bad endpoint payload, reply
    /// with neither result nor error, non-stream response).
    Protocol(String),
}

impl fmt::Display for McpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            McpError::UnknownServer { name, available } => {
                if available.is_empty() {
                    write!(f, "Unknown MCP server '{}'; no SSE servers are configured", name)
                } else {
                    write!(
                        f,
                        "Unknown MCP server '{}'. Available SSE servers: {}",
                        name,
                        available.join(", ")
                    )
                }
            }
            McpError::UnsupportedTransport { name, transport } => {
                write!(
                    f,
                    "MCP server '{}' uses the '{}' transport; only SSE servers can be called",
                    name, transport
                )
            }
            McpError::EndpointTimeout(wait) => {
                write!(f, "No endpoint event arrived within {:?}", wait)
            }
            McpError::RequestTimeout(timeout) => {
                write!(f, "No reply arrived within {:?}", timeout)
            }
            McpError::Transport(message) => write!(f, "Transport failure: {}", message),
            McpError::RemoteTool(error) => write!(f, "{}", error),
            McpError::Protocol(message) => write!(f, "Protocol violation: {}", message),
        }
    }
}

impl std::error::Error for McpError {}
