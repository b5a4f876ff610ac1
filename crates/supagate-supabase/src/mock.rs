//! Canned forwarding for demos and tests.
//!
//! Selected with `forwarder: mock` in the configuration. Every catalog
//! operation answers with a fixed, plausible payload and nothing leaves
//! the process. Unknown operations fail loudly so catalog drift shows up
//! in tests instead of silently returning garbage.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::ForwardError;
use crate::{ForwardRequest, Forwarder};

/// Forwarder that fabricates responses instead of calling Supabase.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockForwarder;

impl MockForwarder {
    /// Create a mock forwarder.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Forwarder for MockForwarder {
    async fn execute(&self, request: ForwardRequest<'_>) -> Result<Value, ForwardError> {
        let project_ref = request.project_ref.unwrap_or("mock-project");

        let payload = match request.operation {
            "list_projects" => json!([{
                "id": "mock-project",
                "name": "Mock Project",
                "region": "us-east-1",
                "status": "ACTIVE_HEALTHY",
            }]),
            "get_project" => json!({
                "id": project_ref,
                "name": "Mock Project",
                "status": "ACTIVE_HEALTHY",
            }),
            "create_project" => json!({
                "id": "mock-project-new",
                "name": request.arguments.get("name").cloned().unwrap_or(json!("unnamed")),
                "status": "COMING_UP",
            }),
            "list_organizations" => json!([{"id": "org-mock", "name": "Mock Org"}]),
            "pause_project" | "restore_project" | "update_storage_config" => Value::Null,

            "list_tables" => json!([
                {"table_schema": "public", "table_name": "users", "table_type": "BASE TABLE"},
                {"table_schema": "public", "table_name": "orders", "table_type": "BASE TABLE"},
            ]),
            "describe_table" => json!([
                {"column_name": "id", "data_type": "bigint", "is_nullable": "NO", "column_default": null},
                {"column_name": "created_at", "data_type": "timestamptz", "is_nullable": "NO", "column_default": "now()"},
            ]),
            "list_extensions" => json!([
                {"name": "pgcrypto", "default_version": "1.3", "installed_version": null},
            ]),
            "list_migrations" => json!([
                {"version": "20240101000000", "name": "init"},
            ]),
            "execute_sql" | "execute_sql_insert" | "execute_sql_update" | "execute_sql_delete" => {
                json!([])
            }
            "apply_migration" => json!({
                "name": request.arguments.get("name").cloned().unwrap_or(json!("unnamed")),
            }),

            "get_project_url" => json!({"url": format!("https://{project_ref}.supabase.co")}),
            "get_anon_key" => json!({"anon_key": "mock-anon-key"}),
            "get_logs" => json!({"result": []}),

            "list_edge_functions" => json!([]),
            "deploy_edge_function" => json!({
                "slug": request.arguments.get("slug").cloned().unwrap_or(json!("fn")),
                "status": "ACTIVE",
            }),

            "list_branches" => json!([]),
            "create_branch" => json!({
                "id": "branch-mock",
                "name": request.arguments.get("branch_name").cloned().unwrap_or(json!("develop")),
            }),
            "delete_branch" | "merge_branch" | "reset_branch" | "rebase_branch" => {
                json!({"message": "ok"})
            }

            other => return Err(ForwardError::UnsupportedOperation(other.to_string())),
        };

        tracing::debug!(operation = %request.operation, "returning canned payload");
        Ok(payload)
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn request<'a>(operation: &'a str, arguments: &'a Map<String, Value>) -> ForwardRequest<'a> {
        ForwardRequest {
            operation,
            arguments,
            project_ref: Some("abc123"),
            access_token: None,
        }
    }

    #[tokio::test]
    async fn test_canned_listing_is_an_array() {
        let arguments = Map::new();
        let payload = MockForwarder::new()
            .execute(request("list_projects", &arguments))
            .await
            .unwrap();
        assert!(payload.is_array());
    }

    #[tokio::test]
    async fn test_project_url_uses_the_target_ref() {
        let arguments = Map::new();
        let payload = MockForwarder::new()
            .execute(request("get_project_url", &arguments))
            .await
            .unwrap();
        assert_eq!(payload, json!({"url": "https://abc123.supabase.co"}));
    }

    #[tokio::test]
    async fn test_unknown_operation_fails() {
        let arguments = Map::new();
        let err = MockForwarder::new()
            .execute(request("rotate_all_keys", &arguments))
            .await
            .unwrap_err();
        assert!(matches!(err, ForwardError::UnsupportedOperation(_)));
    }
}
