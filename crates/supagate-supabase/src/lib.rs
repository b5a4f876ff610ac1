//! # supagate-supabase
//!
//! The forwarding collaborator: executes tool invocations that the
//! gatekeeping pipeline has already allowed.
//!
//! Two implementations of [`Forwarder`] exist:
//!
//! - [`ManagementApiForwarder`] — calls Supabase's Management API over
//!   HTTPS. Database reads (table listings, column descriptions, raw SQL)
//!   go through the `/database/query` endpoint; project, branch, function
//!   and storage operations map to their own endpoints.
//! - [`MockForwarder`] — returns canned payloads without touching the
//!   network, for demos and tests.
//!
//! Which one runs is a configuration choice made at startup. Nothing in
//! here checks policy; by the time a request reaches a forwarder, the
//! pipeline has already said yes.

pub mod error;
pub mod management;
pub mod mock;
pub mod sql;

pub use error::ForwardError;
pub use management::ManagementApiForwarder;
pub use mock::MockForwarder;

use async_trait::async_trait;
use serde_json::{Map, Value};

/// One allowed operation, ready to execute.
///
/// Borrowed from the invocation the pipeline judged; the forwarder never
/// stores it.
#[derive(Debug, Clone, Copy)]
pub struct ForwardRequest<'a> {
    /// Operation identifier, e.g. `execute_sql`.
    pub operation: &'a str,
    /// Tool arguments as received (and already schema-validated).
    pub arguments: &'a Map<String, Value>,
    /// Target project ref for project-scoped operations.
    pub project_ref: Option<&'a str>,
    /// Per-request bearer token. `None` means use the token the forwarder
    /// was constructed with.
    pub access_token: Option<&'a str>,
}

/// Executes allowed operations against Supabase (or a stand-in).
#[async_trait]
pub trait Forwarder: Send + Sync {
    /// Execute one operation and return its JSON payload.
    async fn execute(&self, request: ForwardRequest<'_>) -> Result<Value, ForwardError>;

    /// Short name used in logs (`management-api`, `mock`).
    fn name(&self) -> &'static str;
}
