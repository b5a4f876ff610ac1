//! The gatekeeping pipeline: ordered checks, first failure wins.

use std::sync::Arc;

use supagate_guard::{QueryGuard, SqlClassification};

use crate::error::DenialError;
use crate::invocation::ToolInvocation;
use crate::policy::AccessPolicy;

/// Operations that execute SQL against the database and are therefore
/// subject to the schema and table allow-lists.
const SQL_EXECUTING_OPERATIONS: [&str; 5] = [
    "execute_sql",
    "execute_sql_insert",
    "execute_sql_update",
    "execute_sql_delete",
    "apply_migration",
];

/// True when the operation executes SQL in some form.
pub fn executes_sql(operation: &str) -> bool {
    SQL_EXECUTING_OPERATIONS.contains(&operation)
}

/// True when the operation carries raw caller SQL in its `query` argument.
///
/// Only `execute_sql` qualifies. `apply_migration` carries SQL too, but
/// migrations are DDL by nature and are gated by the write-operation check
/// instead; the specialized `execute_sql_*` tools build their SQL
/// server-side from structured arguments.
pub fn takes_raw_sql(operation: &str) -> bool {
    operation == "execute_sql"
}

/// Outcome of the full pipeline for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatekeepResult {
    /// Every check passed; the caller may forward the operation.
    Proceed,
    /// A check failed; the caller must not forward and should surface the
    /// denial reason verbatim.
    Denied(DenialError),
}

impl GatekeepResult {
    /// True when the invocation may be forwarded.
    pub fn is_proceed(&self) -> bool {
        matches!(self, GatekeepResult::Proceed)
    }

    /// The denial, if the invocation was refused.
    pub fn denial(&self) -> Option<&DenialError> {
        match self {
            GatekeepResult::Proceed => None,
            GatekeepResult::Denied(denial) => Some(denial),
        }
    }
}

/// Sequences the policy checks and the SQL guard for one invocation.
///
/// Purely a decision function: no I/O, no suspension, no shared mutable
/// state. One gatekeeper is shared across all concurrent requests.
pub struct Gatekeeper {
    policy: AccessPolicy,
    guard: Arc<dyn QueryGuard>,
}

impl Gatekeeper {
    /// Create a gatekeeper over a policy and a SQL guard.
    pub fn new(policy: AccessPolicy, guard: Arc<dyn QueryGuard>) -> Self {
        Self { policy, guard }
    }

    /// The active policy.
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Run the ordered checks, stopping at the first failure.
    pub fn evaluate(&self, invocation: &ToolInvocation) -> GatekeepResult {
        if let Some(denial) = self.evaluate_inner(invocation) {
            tracing::info!(
                tool = %invocation.name,
                kind = ?denial.kind,
                reason = %denial.message,
                "invocation denied"
            );
            return GatekeepResult::Denied(denial);
        }
        tracing::debug!(tool = %invocation.name, "invocation allowed");
        GatekeepResult::Proceed
    }

    fn evaluate_inner(&self, invocation: &ToolInvocation) -> Option<DenialError> {
        // 1. Project access. Operations without a project target (e.g.
        //    list_projects) cannot violate the project allow-list.
        if let Some(project_ref) = invocation.project_ref.as_deref() {
            if !self.policy.check_project_access(project_ref) {
                return Some(DenialError::project_not_allowed(project_ref));
            }
        }

        // 2. Operation name: read-only write set, then blocked list.
        if let Err(denial) = self.policy.check_operation_allowed(&invocation.name) {
            return Some(denial);
        }

        // 3 + 4. SQL-executing operations only.
        if executes_sql(&invocation.name) {
            if let Err(denial) = self.policy.check_schema_access(&invocation.schema_arguments()) {
                return Some(denial);
            }
            if let Err(denial) = self.policy.check_table_access(&invocation.table_arguments()) {
                return Some(denial);
            }

            if takes_raw_sql(&invocation.name) {
                let classification = self
                    .guard
                    .classify(invocation.query(), self.policy.read_only());
                if let SqlClassification::Rejected(reason) = classification {
                    return Some(DenialError::sql_rejected(reason));
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DenialKind;
    use serde_json::{Map, Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use supagate_core::{AccessPolicyConfig, AllowList};
    use supagate_guard::PatternGuard;

    /// Guard that records how often it was consulted.
    struct CountingGuard {
        calls: AtomicUsize,
    }

    impl CountingGuard {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl QueryGuard for CountingGuard {
        fn classify(&self, query: &str, _read_only: bool) -> SqlClassification {
            self.calls.fetch_add(1, Ordering::SeqCst);
            SqlClassification::Allowed(query.to_string())
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn arguments(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    fn gatekeeper(config: AccessPolicyConfig) -> Gatekeeper {
        Gatekeeper::new(AccessPolicy::new(config), Arc::new(PatternGuard::new()))
    }

    fn sql_invocation(query: &str) -> ToolInvocation {
        ToolInvocation::new("execute_sql", arguments(json!({"query": query})))
            .with_project_ref("proj_a")
    }

    #[test]
    fn test_open_policy_lets_a_select_through() {
        let result = gatekeeper(AccessPolicyConfig::default())
            .evaluate(&sql_invocation("SELECT * FROM users"));
        assert!(result.is_proceed());
    }

    #[test]
    fn test_denied_project_short_circuits_the_guard() {
        let counting = CountingGuard::new();
        let keeper = Gatekeeper::new(
            AccessPolicy::new(AccessPolicyConfig {
                allowed_projects: AllowList::from(vec!["proj_a"]),
                ..AccessPolicyConfig::default()
            }),
            counting.clone(),
        );

        let invocation = ToolInvocation::new(
            "execute_sql",
            arguments(json!({"query": "SELECT 1"})),
        )
        .with_project_ref("proj_b");

        let result = keeper.evaluate(&invocation);
        assert_eq!(
            result.denial().map(|d| d.kind),
            Some(DenialKind::ProjectNotAllowed)
        );
        assert_eq!(counting.calls(), 0, "guard must not run after a denial");

        // Same pipeline with the allowed project does reach the guard.
        let ok = keeper.evaluate(&invocation.clone().with_project_ref("proj_a"));
        assert!(ok.is_proceed());
        assert_eq!(counting.calls(), 1);
    }

    #[test]
    fn test_blocked_operation_short_circuits_the_guard() {
        let counting = CountingGuard::new();
        let keeper = Gatekeeper::new(
            AccessPolicy::new(AccessPolicyConfig {
                blocked_operations: vec!["execute_sql".to_string()],
                ..AccessPolicyConfig::default()
            }),
            counting.clone(),
        );

        let result = keeper.evaluate(&sql_invocation("SELECT 1"));
        assert_eq!(
            result.denial().map(|d| d.kind),
            Some(DenialKind::ExplicitlyBlocked)
        );
        assert_eq!(counting.calls(), 0);
    }

    #[test]
    fn test_read_only_denies_writes_before_any_sql_stage() {
        let keeper = gatekeeper(AccessPolicyConfig {
            read_only: true,
            ..AccessPolicyConfig::default()
        });

        let invocation = ToolInvocation::new(
            "apply_migration",
            arguments(json!({"name": "add_users", "query": "CREATE TABLE users (id INT)"})),
        )
        .with_project_ref("proj_a");

        let result = keeper.evaluate(&invocation);
        assert_eq!(
            result.denial().map(|d| d.kind),
            Some(DenialKind::ReadOnlyViolation)
        );
    }

    #[test]
    fn test_migration_sql_is_not_pattern_guarded() {
        // Migrations are DDL by nature; the write-set check is their gate.
        let keeper = gatekeeper(AccessPolicyConfig::default());
        let invocation = ToolInvocation::new(
            "apply_migration",
            arguments(json!({"name": "add_users", "query": "CREATE TABLE users (id INT)"})),
        )
        .with_project_ref("proj_a");

        assert!(keeper.evaluate(&invocation).is_proceed());
    }

    #[test]
    fn test_schema_arguments_checked_for_sql_operations() {
        let keeper = gatekeeper(AccessPolicyConfig {
            allowed_schemas: AllowList::from(vec!["public"]),
            ..AccessPolicyConfig::default()
        });

        let invocation = ToolInvocation::new(
            "execute_sql",
            arguments(json!({"query": "SELECT 1", "schemas": ["public", "internal"]})),
        )
        .with_project_ref("proj_a");

        let result = keeper.evaluate(&invocation);
        let denial = result.denial().cloned();
        assert_eq!(denial.as_ref().map(|d| d.kind), Some(DenialKind::SchemaNotAllowed));
        assert_eq!(
            denial.map(|d| d.message),
            Some("Access denied to schemas: internal".to_string())
        );
    }

    #[test]
    fn test_table_argument_checked_for_specialized_sql_tools() {
        let keeper = gatekeeper(AccessPolicyConfig {
            allowed_tables: AllowList::from(vec!["users"]),
            ..AccessPolicyConfig::default()
        });

        let denied = keeper.evaluate(
            &ToolInvocation::new(
                "execute_sql_insert",
                arguments(json!({"table": "payments", "values": {"id": 1}})),
            )
            .with_project_ref("proj_a"),
        );
        assert_eq!(
            denied.denial().map(|d| d.kind),
            Some(DenialKind::TableNotAllowed)
        );

        let allowed = keeper.evaluate(
            &ToolInvocation::new(
                "execute_sql_insert",
                arguments(json!({"table": "users", "values": {"id": 1}})),
            )
            .with_project_ref("proj_a"),
        );
        assert!(allowed.is_proceed());
    }

    #[test]
    fn test_schema_lists_ignored_for_non_sql_operations() {
        // list_tables reads metadata; the schema allow-list applies to SQL
        // execution, not catalog listings.
        let keeper = gatekeeper(AccessPolicyConfig {
            allowed_schemas: AllowList::from(vec!["public"]),
            ..AccessPolicyConfig::default()
        });
        let invocation = ToolInvocation::new(
            "list_tables",
            arguments(json!({"schemas": ["internal"]})),
        )
        .with_project_ref("proj_a");

        assert!(keeper.evaluate(&invocation).is_proceed());
    }

    #[test]
    fn test_sql_rejection_reason_flows_through_verbatim() {
        let keeper = gatekeeper(AccessPolicyConfig::default());

        let result = keeper.evaluate(&sql_invocation("DROP TABLE users"));
        let denial = result.denial().cloned();
        assert_eq!(denial.as_ref().map(|d| d.kind), Some(DenialKind::SqlRejected));
        assert_eq!(
            denial.map(|d| d.message),
            Some("query contains blocked pattern: DROP TABLE".to_string())
        );
    }

    #[test]
    fn test_missing_query_argument_is_denied_by_the_guard() {
        let keeper = gatekeeper(AccessPolicyConfig::default());
        let invocation =
            ToolInvocation::new("execute_sql", Map::new()).with_project_ref("proj_a");

        let result = keeper.evaluate(&invocation);
        assert_eq!(
            result.denial().map(|d| d.message.as_str()),
            Some("operation not in allow-list")
        );
    }

    #[test]
    fn test_read_only_mode_reaches_the_guard_for_reads() {
        let keeper = gatekeeper(AccessPolicyConfig {
            read_only: true,
            ..AccessPolicyConfig::default()
        });

        assert!(keeper.evaluate(&sql_invocation("SELECT 1")).is_proceed());

        let result = keeper.evaluate(&sql_invocation("INSERT INTO t VALUES (1)"));
        assert_eq!(
            result.denial().map(|d| d.message.as_str()),
            Some("insert blocked in read-only mode")
        );
    }

    #[test]
    fn test_unscoped_operation_skips_project_check() {
        let keeper = gatekeeper(AccessPolicyConfig {
            allowed_projects: AllowList::from(vec!["proj_a"]),
            ..AccessPolicyConfig::default()
        });

        // No project target at all: nothing to check against the list.
        let invocation = ToolInvocation::new("list_projects", Map::new());
        assert!(keeper.evaluate(&invocation).is_proceed());
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let keeper = gatekeeper(AccessPolicyConfig::default());
        let invocation = sql_invocation("SELECT * FROM t");
        assert_eq!(keeper.evaluate(&invocation), keeper.evaluate(&invocation));
    }
}
