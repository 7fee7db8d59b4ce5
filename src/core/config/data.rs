use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Transport value that marks a server as callable over the SSE channel.
pub const SSE_TRANSPORT: &str = "sse";

/// One entry in the mcp.json registry. Immutable once parsed; the URL and
/// static headers are passed through to every request on the session.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,
}

impl ServerConfig {
    pub fn is_sse(&self) -> bool {
        self.transport
            .as_deref()
            .is_some_and(|transport| transport.eq_ignore_ascii_case(SSE_TRANSPORT))
    }

    /// Entries without an explicit transport are spawned processes in the
    /// wider MCP ecosystem, so label them as such in diagnostics.
    pub fn transport_label(&self) -> &str {
        self.transport.as_deref().unwrap_or("stdio")
    }
}

/// The parsed server registry (`{"mcpServers": {name: {...}}}`).
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Registry {
    #[serde(rename = "mcpServers", default)]
    pub servers: HashMap<String, ServerConfig>,
}

impl Registry {
    pub fn server(&self, name: &str) -> Option<&ServerConfig> {
        self.servers.get(name)
    }

    /// Names of servers reachable over the SSE transport, sorted for
    /// stable display.
    pub fn sse_servers(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .servers
            .iter()
            .filter(|(_, config)| config.is_sse())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}
