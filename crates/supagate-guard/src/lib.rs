//! # supagate-guard
//!
//! SQL classification guards for the Supagate gateway.
//!
//! A guard looks at the raw text of a SQL statement and decides whether the
//! gateway may forward it to Supabase. Two implementations are provided:
//!
//! - [`PatternGuard`] — the default. Substring and prefix matching over the
//!   uppercased query text. No parsing, no dependencies, and a documented
//!   false-positive/false-negative profile that downstream deployments
//!   depend on.
//! - [`AstGuard`] — opt-in. Parses the query with `sqlparser` and decides
//!   from the statement kind. Stricter: anything that is not a single
//!   supported statement is rejected.
//!
//! Guards never rewrite a query. An accepted query is forwarded exactly as
//! received, byte for byte.

pub mod ast;
pub mod pattern;

pub use ast::AstGuard;
pub use pattern::PatternGuard;

/// Outcome of classifying one SQL string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlClassification {
    /// The query may be forwarded. Carries the original, unmodified text.
    Allowed(String),
    /// The query must not be forwarded. Carries a caller-facing reason
    /// naming the offending pattern or rule.
    Rejected(String),
}

impl SqlClassification {
    /// Returns true if the query was accepted.
    pub fn is_allowed(&self) -> bool {
        matches!(self, SqlClassification::Allowed(_))
    }

    /// The rejection reason, if the query was rejected.
    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            SqlClassification::Allowed(_) => None,
            SqlClassification::Rejected(reason) => Some(reason),
        }
    }
}

/// Decides whether a SQL query may be forwarded.
///
/// Implementations must be pure: the same query under the same mode always
/// yields the same classification, with no I/O and no internal state. This
/// makes a guard safe to share across unbounded concurrent requests.
pub trait QueryGuard: Send + Sync {
    /// Classify `query` under the given read-only mode.
    fn classify(&self, query: &str, read_only: bool) -> SqlClassification;

    /// Short name used in logs and configuration (`pattern`, `ast`).
    fn name(&self) -> &'static str;
}
