//! Denial types for the gatekeeping pipeline.
//!
//! A denial is the normal outcome of a policy check, not an exceptional
//! one, so this is a plain value with a category and a caller-facing
//! message rather than a panic or a transport error. Messages contain no
//! secrets and are surfaced verbatim to the client.

use std::fmt;

/// A refused tool invocation: why, and in which category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenialError {
    /// The kind of denial.
    pub kind: DenialKind,
    /// Human-readable reason, shown verbatim to the caller.
    pub message: String,
}

impl DenialError {
    /// Create a new denial.
    pub fn new(kind: DenialKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    // =========================================================================
    // PROJECT AND OPERATION DENIALS
    // =========================================================================

    /// The target project is absent from a non-empty allow-list.
    pub fn project_not_allowed(project_ref: &str) -> Self {
        Self::new(
            DenialKind::ProjectNotAllowed,
            format!("Project '{project_ref}' is not in the allowed projects list"),
        )
    }

    /// A write operation was attempted while read-only mode is active.
    pub fn read_only_violation(operation: &str) -> Self {
        Self::new(
            DenialKind::ReadOnlyViolation,
            format!("Operation '{operation}' is blocked in read-only mode"),
        )
    }

    /// The operation is in the blocked-operations set.
    pub fn explicitly_blocked(operation: &str) -> Self {
        Self::new(
            DenialKind::ExplicitlyBlocked,
            format!("Operation '{operation}' is explicitly blocked by policy"),
        )
    }

    // =========================================================================
    // SCHEMA AND TABLE DENIALS
    // =========================================================================

    /// One or more schemas are absent from a non-empty allow-list.
    /// Every offending name is listed.
    pub fn schema_not_allowed(schemas: &[String]) -> Self {
        Self::new(
            DenialKind::SchemaNotAllowed,
            format!("Access denied to schemas: {}", schemas.join(", ")),
        )
    }

    /// One or more tables are absent from a non-empty allow-list.
    /// Every offending name is listed.
    pub fn table_not_allowed(tables: &[String]) -> Self {
        Self::new(
            DenialKind::TableNotAllowed,
            format!("Access denied to tables: {}", tables.join(", ")),
        )
    }

    // =========================================================================
    // SQL DENIALS
    // =========================================================================

    /// The SQL guard rejected the query. The guard's reason is carried
    /// through unchanged.
    pub fn sql_rejected(reason: impl Into<String>) -> Self {
        Self::new(DenialKind::SqlRejected, reason)
    }
}

impl fmt::Display for DenialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for DenialError {}

/// Categories of denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialKind {
    /// Target project absent from a non-empty allow-list.
    ProjectNotAllowed,
    /// Write operation attempted while read-only is active.
    ReadOnlyViolation,
    /// Operation present in the blocked-operations set.
    ExplicitlyBlocked,
    /// Schema absent from a non-empty allow-list.
    SchemaNotAllowed,
    /// Table absent from a non-empty allow-list.
    TableNotAllowed,
    /// Query refused by the SQL guard.
    SqlRejected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_the_message() {
        let denial = DenialError::project_not_allowed("abc123");
        assert_eq!(denial.kind, DenialKind::ProjectNotAllowed);
        assert_eq!(
            denial.to_string(),
            "Project 'abc123' is not in the allowed projects list"
        );
    }

    #[test]
    fn test_offending_names_are_listed() {
        let denial =
            DenialError::schema_not_allowed(&["internal".to_string(), "secrets".to_string()]);
        assert_eq!(denial.message, "Access denied to schemas: internal, secrets");
    }

    #[test]
    fn test_sql_rejection_keeps_guard_reason_verbatim() {
        let denial = DenialError::sql_rejected("operation not in allow-list");
        assert_eq!(denial.kind, DenialKind::SqlRejected);
        assert_eq!(denial.message, "operation not in allow-list");
    }
}
