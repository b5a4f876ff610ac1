//! Parser-backed SQL guarding (opt-in).
//!
//! Selected with `guard.kind = ast` in the gateway configuration. Unlike
//! [`crate::PatternGuard`] this guard parses the query with `sqlparser`
//! under the Postgres dialect and decides from the statement kind, which
//! closes the multi-statement and comment blind spots at the cost of
//! rejecting anything the parser does not understand (including `EXPLAIN`
//! and `DESCRIBE`, which the pattern guard waves through).

use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

use crate::{QueryGuard, SqlClassification};

/// Strict guard: the query must parse as exactly one supported statement.
///
/// Supported statements are a single `SELECT`/`WITH` query, or a single
/// `INSERT` when not in read-only mode. Everything else is rejected with
/// the statement kind in the reason.
pub struct AstGuard {
    dialect: PostgreSqlDialect,
}

impl Default for AstGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl AstGuard {
    /// Create a new AST guard.
    pub fn new() -> Self {
        Self {
            dialect: PostgreSqlDialect {},
        }
    }

    fn statement_kind(stmt: &Statement) -> &'static str {
        match stmt {
            Statement::Query(_) => "SELECT",
            Statement::Insert { .. } => "INSERT",
            Statement::Update { .. } => "UPDATE",
            Statement::Delete { .. } => "DELETE",
            Statement::Drop { .. } => "DROP",
            Statement::Truncate { .. } => "TRUNCATE",
            Statement::CreateTable { .. } => "CREATE TABLE",
            Statement::AlterTable { .. } => "ALTER TABLE",
            Statement::CreateIndex { .. } => "CREATE INDEX",
            Statement::CreateView { .. } => "CREATE VIEW",
            _ => "unsupported",
        }
    }
}

impl QueryGuard for AstGuard {
    fn classify(&self, query: &str, read_only: bool) -> SqlClassification {
        let statements = match Parser::parse_sql(&self.dialect, query) {
            Ok(statements) => statements,
            Err(err) => {
                return SqlClassification::Rejected(format!("query failed to parse: {err}"));
            }
        };

        let statement = match statements.as_slice() {
            [] => {
                return SqlClassification::Rejected("query is empty".to_string());
            }
            [statement] => statement,
            _ => {
                return SqlClassification::Rejected(
                    "multi-statement queries are not allowed".to_string(),
                );
            }
        };

        match statement {
            Statement::Query(_) => SqlClassification::Allowed(query.to_string()),
            Statement::Insert { .. } => {
                if read_only {
                    SqlClassification::Rejected("insert blocked in read-only mode".to_string())
                } else {
                    SqlClassification::Allowed(query.to_string())
                }
            }
            other => SqlClassification::Rejected(format!(
                "statement type not allowed: {}",
                Self::statement_kind(other)
            )),
        }
    }

    fn name(&self) -> &'static str {
        "ast"
    }
}
