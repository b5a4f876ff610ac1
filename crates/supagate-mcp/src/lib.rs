//! # supagate-mcp
//!
//! MCP (Model Context Protocol) server for the Supagate gateway.
//!
//! This crate exposes the Supabase Management API as a fixed catalog of
//! typed tools and routes every call through the gatekeeping pipeline
//! before anything leaves the process. It supports:
//!
//! - **Fixed Tool Catalog**: every Management API capability as a typed tool
//! - **Gatekeeping**: project, operation, schema/table and SQL checks on each call
//! - **Multiple Transports**: stdio and HTTP/SSE
//! - **Per-Request Credentials**: header-sourced tokens in HTTP mode
//!
//! ## Architecture
//!
//! ```text
//! AI Agent (Claude, n8n, etc.)
//!       │
//!       │ MCP protocol (list tools / call tool)
//!       ▼
//! ┌──────────────────────┐
//! │  Supagate Gateway    │
//! │  1. Validate args    │  ← catalog input schemas
//! │  2. Resolve project  │  ← argument / header / config default
//! │  3. Gatekeep         │  ← supagate-policy + supagate-guard
//! │  4. Forward          │  ← supagate-supabase
//! │  5. Return JSON      │
//! └──────────┬───────────┘
//!            │
//!            ▼
//!   Supabase Management API
//! ```
//!
//! A denial never reaches Supabase: the pipeline's reason string comes
//! back as the tool result with `isError` set, verbatim.
//!
//! ## Example Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use supagate_core::GatewayConfig;
//! use supagate_guard::PatternGuard;
//! use supagate_mcp::GatewayServer;
//! use supagate_supabase::MockForwarder;
//!
//! let config = Arc::new(GatewayConfig::load("supagate.yaml")?);
//! let server = GatewayServer::new(
//!     config,
//!     Arc::new(PatternGuard::new()),
//!     Arc::new(MockForwarder::new()),
//! );
//! server.run().await?;
//! ```

pub mod catalog;
pub mod error;
pub mod executor;
pub mod http_transport;
pub mod protocol;
pub mod server;
pub mod tools;

// Re-export main types
pub use catalog::supabase_tools;
pub use error::GatewayError;
pub use executor::{ExecutionResult, ToolExecutor};
pub use protocol::{
    CallToolParams, JsonRpcRequest, JsonRpcResponse, ListToolsResponse, RequestContext,
    ToolAnnotations, ToolContent, ToolDefinition,
};
pub use server::GatewayServer;
pub use tools::ToolRegistry;
