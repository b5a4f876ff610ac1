//! Substring and prefix SQL guarding.
//!
//! This is the gateway's historical behavior: uppercase the query, scan for
//! a fixed set of destructive substrings, then require an allowed leading
//! keyword. It is string matching, not SQL parsing, and its blind spots are
//! part of the contract:
//!
//! - a `SELECT` whose string literal contains `update ` is rejected
//!   (false positive);
//! - a multi-statement payload whose first statement starts with an allowed
//!   prefix and whose tail avoids every denylist substring is accepted
//!   (false negative).
//!
//! Deployments that want real parsing opt into [`crate::AstGuard`] via
//! configuration; the surrounding pipeline behaves identically either way.

use crate::{QueryGuard, SqlClassification};

/// Substrings that reject a query outright, in any mode.
///
/// Matched against the uppercased, trimmed query text; the first hit is
/// reported to the caller. The trailing space on `UPDATE `, `GRANT ` and
/// `REVOKE ` keeps words like `UPDATED` or `GRANTED` from matching.
const BLOCKED_PATTERNS: [&str; 10] = [
    "DROP TABLE",
    "TRUNCATE TABLE",
    "DELETE FROM",
    "UPDATE ",
    "CREATE TABLE",
    "ALTER TABLE",
    "GRANT ",
    "REVOKE ",
    "DROP DATABASE",
    "DROP SCHEMA",
];

/// Leading keywords a query must start with to be forwarded.
const ALLOWED_PREFIXES: [&str; 5] = [
    "SELECT ",
    "INSERT INTO",
    "WITH ",
    "EXPLAIN ",
    "DESCRIBE ",
];

/// The default guard: a substring denylist plus a prefix allow-list,
/// evaluated over the uppercased, trimmed query text.
///
/// Evaluation order matters and is observable through the reason strings:
/// denylist first (first hit wins), then the read-only insert rule, then
/// the prefix allow-list.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternGuard;

impl PatternGuard {
    /// Create a new pattern guard.
    pub fn new() -> Self {
        Self
    }
}

impl QueryGuard for PatternGuard {
    fn classify(&self, query: &str, read_only: bool) -> SqlClassification {
        let normalized = query.trim().to_uppercase();

        for pattern in BLOCKED_PATTERNS {
            if normalized.contains(pattern) {
                tracing::debug!(pattern = %pattern, "query hit denylist");
                return SqlClassification::Rejected(format!(
                    "query contains blocked pattern: {pattern}"
                ));
            }
        }

        if read_only && normalized.contains("INSERT INTO") {
            return SqlClassification::Rejected("insert blocked in read-only mode".to_string());
        }

        let permitted = ALLOWED_PREFIXES
            .iter()
            .any(|prefix| normalized.starts_with(prefix));
        if !permitted {
            return SqlClassification::Rejected("operation not in allow-list".to_string());
        }

        SqlClassification::Allowed(query.to_string())
    }

    fn name(&self) -> &'static str {
        "pattern"
    }
}
