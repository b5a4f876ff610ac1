//! # supagate-core
//!
//! Shared configuration types for the Supagate gateway.
//!
//! Every restriction the gateway enforces lives in one explicit
//! [`GatewayConfig`] value, loaded from YAML once at startup and handed to
//! the other crates by value or behind `Arc`. Business logic never reads
//! the environment on its own; the only environment access is the access
//! token lookup, performed here, by a variable name the config chooses.

// Configuration types shared across all Supagate crates
pub mod config;

// Re-export the types the other crates reach for most often
pub use config::{
    AccessPolicyConfig, AllowList, ConfigError, CredentialSource, CredentialsConfig,
    ForwarderKind, GatewayConfig, GuardKind, McpConfig, SupabaseConfig, Transport,
};
