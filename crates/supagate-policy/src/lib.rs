//! # supagate-policy
//!
//! Access policy and the gatekeeping pipeline for the Supagate gateway.
//!
//! Every tool invocation passes through [`Gatekeeper::evaluate`] before
//! anything is forwarded to Supabase:
//!
//! 1. **Project access** — is the target project ref on the allow-list?
//! 2. **Operation access** — read-only mode blocks the write-operation
//!    set; the blocked-operations list blocks unconditionally.
//! 3. **Schema/table access** — for SQL-executing operations, any schema
//!    or table arguments are checked against their allow-lists.
//! 4. **SQL guarding** — the raw `query` argument of `execute_sql` is
//!    classified by the configured [`supagate_guard::QueryGuard`].
//!
//! The first failing check wins and later checks never run. A denial is a
//! per-invocation outcome, not a process failure: the reason string is
//! safe to hand verbatim to the caller.

pub mod error;
pub mod invocation;
pub mod pipeline;
pub mod policy;

pub use error::{DenialError, DenialKind};
pub use invocation::ToolInvocation;
pub use pipeline::{GatekeepResult, Gatekeeper, executes_sql, takes_raw_sql};
pub use policy::{AccessPolicy, is_write_operation};
