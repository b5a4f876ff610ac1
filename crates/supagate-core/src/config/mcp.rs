//! MCP server configuration.
//!
//! Transport and result-shaping settings for the gateway's MCP surface.
//! The tool set itself is fixed; only how it is served varies.

use serde::{Deserialize, Serialize};

/// Configuration for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// Whether the MCP server is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Transport type: "stdio" or "http".
    #[serde(default)]
    pub transport: Transport,

    /// HTTP host (only used when transport is HTTP).
    #[serde(default = "default_http_host")]
    pub host: String,

    /// HTTP port (only used when transport is HTTP).
    #[serde(default = "default_http_port")]
    pub port: u16,

    /// Return the raw Management API payload instead of wrapping it in a
    /// `{success, data}` envelope.
    #[serde(default)]
    pub compact_results: bool,
}

/// MCP transport type.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Standard input/output transport (for desktop MCP clients).
    #[default]
    Stdio,
    /// HTTP transport (for n8n and other automation callers).
    Http,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            transport: Transport::default(),
            host: default_http_host(),
            port: default_http_port(),
            compact_results: false,
        }
    }
}

impl McpConfig {
    /// Check if using HTTP transport.
    pub fn is_http(&self) -> bool {
        self.transport == Transport::Http
    }

    /// Check if using stdio transport.
    pub fn is_stdio(&self) -> bool {
        self.transport == Transport::Stdio
    }

    /// The socket address string the HTTP transport binds.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_enabled() -> bool {
    true
}

fn default_http_host() -> String {
    "127.0.0.1".to_string()
}

fn default_http_port() -> u16 {
    3000
}
