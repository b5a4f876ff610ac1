//! Configuration types for the Supagate gateway.
//!
//! A single YAML file configures the whole gateway: where the Supabase
//! Management API lives, how credentials are sourced, which transport the
//! MCP server speaks, and the access policy every tool invocation is
//! checked against.
//!
//! # Example
//!
//! ```yaml
//! project: staging-gateway
//!
//! supabase:
//!   api_url: https://api.supabase.com
//!   access_token_env: SUPABASE_ACCESS_TOKEN
//!   default_project_ref: abcdefghijklmnop
//!
//! credentials:
//!   source: env
//!
//! mcp:
//!   transport: http
//!   host: 127.0.0.1
//!   port: 3000
//!   compact_results: true
//!
//! policy:
//!   read_only: true
//!   allowed_schemas: [public]
//!   blocked_operations: [deploy_edge_function]
//!
//! forwarder: live
//! guard: pattern
//! ```

pub mod mcp;
pub mod policy;
pub mod supabase;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use mcp::{McpConfig, Transport};
pub use policy::{AccessPolicyConfig, AllowList};
pub use supabase::{CredentialSource, CredentialsConfig, SupabaseConfig};

/// Complete gateway configuration loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatewayConfig {
    /// Deployment name, used only in logs and `serverInfo`.
    #[serde(default)]
    pub project: Option<String>,

    /// Configuration version string.
    #[serde(default)]
    pub version: Option<String>,

    /// Supabase Management API endpoint and credentials.
    #[serde(default)]
    pub supabase: SupabaseConfig,

    /// Where per-request credentials come from.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// MCP server transport settings.
    #[serde(default)]
    pub mcp: McpConfig,

    /// Access policy applied to every tool invocation.
    #[serde(default)]
    pub policy: AccessPolicyConfig,

    /// Which forwarding collaborator executes allowed operations.
    #[serde(default)]
    pub forwarder: ForwarderKind,

    /// Which SQL guard classifies query text.
    #[serde(default)]
    pub guard: GuardKind,
}

/// Forwarding collaborator selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ForwarderKind {
    /// Call the Supabase Management API.
    #[default]
    Live,
    /// Return canned responses without any network traffic.
    Mock,
}

/// SQL guard selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GuardKind {
    /// Substring/prefix matching (historical behavior).
    #[default]
    Pattern,
    /// sqlparser-backed statement classification (stricter).
    Ast,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GatewayConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from a file and check cross-field consistency.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Check constraints that span sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.credentials.source == CredentialSource::Header && self.mcp.is_stdio() {
            return Err(ConfigError::Config(
                "header credential source requires the http transport".to_string(),
            ));
        }
        Ok(())
    }

    /// Name used in logs and the MCP `serverInfo` block.
    pub fn display_name(&self) -> &str {
        self.project.as_deref().unwrap_or("supagate")
    }
}
