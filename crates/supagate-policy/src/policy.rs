//! Access policy predicates.
//!
//! Pure functions over [`AccessPolicyConfig`] and per-request input. The
//! checks here never look at query text; SQL guarding is a separate stage.

use crate::error::DenialError;
use supagate_core::AccessPolicyConfig;

/// Operations that mutate state. Read-only mode denies exactly this set;
/// everything else is considered a read.
const WRITE_OPERATIONS: [&str; 14] = [
    "apply_migration",
    "execute_sql_insert",
    "execute_sql_update",
    "execute_sql_delete",
    "deploy_edge_function",
    "create_project",
    "pause_project",
    "restore_project",
    "create_branch",
    "delete_branch",
    "merge_branch",
    "reset_branch",
    "rebase_branch",
    "update_storage_config",
];

/// True when `operation` is in the fixed write-operation set.
pub fn is_write_operation(operation: &str) -> bool {
    WRITE_OPERATIONS.contains(&operation)
}

/// Predicate checks over the configured access restrictions.
///
/// Stateless and shareable: the config is read-only after construction,
/// so one policy serves unbounded concurrent requests.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    config: AccessPolicyConfig,
}

impl AccessPolicy {
    /// Create a policy over the given configuration.
    pub fn new(config: AccessPolicyConfig) -> Self {
        Self { config }
    }

    /// The underlying configuration.
    pub fn config(&self) -> &AccessPolicyConfig {
        &self.config
    }

    /// Whether read-only mode is active.
    pub fn read_only(&self) -> bool {
        self.config.read_only
    }

    /// True when the project may be targeted: always for an empty
    /// allow-list, otherwise only for exact, case-sensitive members.
    pub fn check_project_access(&self, project_ref: &str) -> bool {
        self.config.allowed_projects.permits(project_ref)
    }

    /// Check the operation name against read-only mode and the blocked
    /// set.
    ///
    /// Read-only is checked first, so a blocked write in read-only mode
    /// reports the read-only violation. The blocked-set check applies in
    /// every mode, to reads and writes alike.
    pub fn check_operation_allowed(&self, operation: &str) -> Result<(), DenialError> {
        if self.config.read_only && is_write_operation(operation) {
            return Err(DenialError::read_only_violation(operation));
        }
        if self.config.blocks_operation(operation) {
            return Err(DenialError::explicitly_blocked(operation));
        }
        Ok(())
    }

    /// Check every schema in `schemas` against the allow-list. The denial
    /// lists all offending names, not just the first.
    pub fn check_schema_access(&self, schemas: &[String]) -> Result<(), DenialError> {
        let violations = self.config.allowed_schemas.violations(schemas);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(DenialError::schema_not_allowed(&violations))
        }
    }

    /// Check every table in `tables` against the allow-list, symmetric to
    /// the schema check.
    pub fn check_table_access(&self, tables: &[String]) -> Result<(), DenialError> {
        let violations = self.config.allowed_tables.violations(tables);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(DenialError::table_not_allowed(&violations))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DenialKind;
    use supagate_core::AllowList;

    fn open_policy() -> AccessPolicy {
        AccessPolicy::new(AccessPolicyConfig::default())
    }

    #[test]
    fn test_default_policy_permits_everything() {
        let policy = open_policy();
        assert!(policy.check_project_access("any-ref"));
        assert!(policy.check_operation_allowed("create_project").is_ok());
        assert!(
            policy
                .check_schema_access(&["internal".to_string()])
                .is_ok()
        );
        assert!(policy.check_table_access(&["users".to_string()]).is_ok());
    }

    #[test]
    fn test_project_membership_is_exact_and_case_sensitive() {
        let policy = AccessPolicy::new(AccessPolicyConfig {
            allowed_projects: AllowList::from(vec!["AbCdEf123"]),
            ..AccessPolicyConfig::default()
        });
        assert!(policy.check_project_access("AbCdEf123"));
        assert!(!policy.check_project_access("abcdef123"));
        assert!(!policy.check_project_access("AbCdEf"));
        assert!(!policy.check_project_access("AbCdEf123x"));
    }

    #[test]
    fn test_read_only_denies_the_whole_write_set() {
        let policy = AccessPolicy::new(AccessPolicyConfig {
            read_only: true,
            ..AccessPolicyConfig::default()
        });
        for operation in WRITE_OPERATIONS {
            let err = policy.check_operation_allowed(operation).unwrap_err();
            assert_eq!(err.kind, DenialKind::ReadOnlyViolation, "op: {operation}");
        }
    }

    #[test]
    fn test_read_only_leaves_reads_alone() {
        let policy = AccessPolicy::new(AccessPolicyConfig {
            read_only: true,
            ..AccessPolicyConfig::default()
        });
        for operation in ["execute_sql", "list_tables", "list_projects", "get_logs"] {
            assert!(
                policy.check_operation_allowed(operation).is_ok(),
                "op: {operation}"
            );
        }
    }

    #[test]
    fn test_blocked_operations_fire_without_read_only() {
        let policy = AccessPolicy::new(AccessPolicyConfig {
            read_only: false,
            blocked_operations: vec!["list_tables".to_string(), "create_branch".to_string()],
            ..AccessPolicyConfig::default()
        });

        // A read can be blocked too.
        let err = policy.check_operation_allowed("list_tables").unwrap_err();
        assert_eq!(err.kind, DenialKind::ExplicitlyBlocked);

        let err = policy.check_operation_allowed("create_branch").unwrap_err();
        assert_eq!(err.kind, DenialKind::ExplicitlyBlocked);

        assert!(policy.check_operation_allowed("execute_sql").is_ok());
    }

    #[test]
    fn test_read_only_reported_before_blocked() {
        // Both rules apply to this operation; read-only wins the report.
        let policy = AccessPolicy::new(AccessPolicyConfig {
            read_only: true,
            blocked_operations: vec!["create_project".to_string()],
            ..AccessPolicyConfig::default()
        });
        let err = policy.check_operation_allowed("create_project").unwrap_err();
        assert_eq!(err.kind, DenialKind::ReadOnlyViolation);
    }

    #[test]
    fn test_schema_check_lists_every_offender() {
        let policy = AccessPolicy::new(AccessPolicyConfig {
            allowed_schemas: AllowList::from(vec!["public"]),
            ..AccessPolicyConfig::default()
        });

        let schemas = vec![
            "internal".to_string(),
            "public".to_string(),
            "secrets".to_string(),
        ];
        let err = policy.check_schema_access(&schemas).unwrap_err();
        assert_eq!(err.kind, DenialKind::SchemaNotAllowed);
        assert_eq!(err.message, "Access denied to schemas: internal, secrets");
    }

    #[test]
    fn test_table_check_mirrors_schema_check() {
        let policy = AccessPolicy::new(AccessPolicyConfig {
            allowed_tables: AllowList::from(vec!["users", "orders"]),
            ..AccessPolicyConfig::default()
        });
        assert!(
            policy
                .check_table_access(&["users".to_string(), "orders".to_string()])
                .is_ok()
        );
        let err = policy
            .check_table_access(&["payments".to_string()])
            .unwrap_err();
        assert_eq!(err.kind, DenialKind::TableNotAllowed);
        assert_eq!(err.message, "Access denied to tables: payments");
    }

    #[test]
    fn test_empty_input_never_violates() {
        let policy = AccessPolicy::new(AccessPolicyConfig {
            allowed_schemas: AllowList::from(vec!["public"]),
            allowed_tables: AllowList::from(vec!["users"]),
            ..AccessPolicyConfig::default()
        });
        assert!(policy.check_schema_access(&[]).is_ok());
        assert!(policy.check_table_access(&[]).is_ok());
    }
}
