//! Supabase endpoint and credential configuration.
//!
//! The access token itself never appears in the config file; the file
//! names an environment variable and the token is resolved from it once,
//! at startup. In header mode the token arrives with each HTTP request
//! instead and the environment is not consulted.

use serde::{Deserialize, Serialize};

/// Supabase Management API endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    /// Base URL of the Management API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Environment variable holding the personal access token.
    #[serde(default = "default_access_token_env")]
    pub access_token_env: String,

    /// Project ref used when a request does not name one.
    #[serde(default)]
    pub default_project_ref: Option<String>,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            access_token_env: default_access_token_env(),
            default_project_ref: None,
        }
    }
}

impl SupabaseConfig {
    /// Resolve the access token from the configured environment variable.
    ///
    /// Returns `None` when the variable is unset or empty. Called once at
    /// startup; request handling never touches the environment.
    pub fn resolve_access_token(&self) -> Option<String> {
        std::env::var(&self.access_token_env)
            .ok()
            .filter(|token| !token.is_empty())
    }
}

/// Where per-request Supabase credentials come from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CredentialSource {
    /// Token resolved once from the environment at startup.
    #[default]
    Env,
    /// Token taken from a request header on every call (HTTP only).
    Header,
}

/// Credential sourcing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Credential source selection.
    #[serde(default)]
    pub source: CredentialSource,

    /// Header carrying the bearer token when `source` is `header`.
    #[serde(default = "default_token_header")]
    pub header: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            source: CredentialSource::default(),
            header: default_token_header(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.supabase.com".to_string()
}

fn default_access_token_env() -> String {
    "SUPABASE_ACCESS_TOKEN".to_string()
}

fn default_token_header() -> String {
    "authorization".to_string()
}
