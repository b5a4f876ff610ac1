//! Tool execution engine.
//!
//! Every call runs the same funnel: schema validation of the arguments,
//! project-ref resolution, the gatekeeping pipeline, and only then the
//! forwarder. A denial or a forwarding failure is reported as tool
//! content with `isError` set, never as a transport-level error.

use crate::protocol::{RequestContext, ToolContent, ToolDefinition};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use supagate_core::GatewayConfig;
use supagate_policy::{GatekeepResult, Gatekeeper, ToolInvocation};
use supagate_supabase::{ForwardRequest, Forwarder};

/// Result of a tool execution.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    /// Whether the execution was successful.
    pub success: bool,
    /// The result content.
    pub content: Vec<ToolContent>,
    /// Error message if failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    /// Create a successful result with JSON content.
    pub fn success_json(value: Value) -> Self {
        Self {
            success: true,
            content: vec![ToolContent::Json { json: value }],
            error: None,
        }
    }

    /// Create an error result.
    pub fn error(message: impl Into<String>) -> Self {
        let msg = message.into();
        Self {
            success: false,
            content: vec![ToolContent::Text { text: msg.clone() }],
            error: Some(msg),
        }
    }
}

/// Runs catalog tools through the gatekeeper and the forwarder.
pub struct ToolExecutor {
    config: Arc<GatewayConfig>,
    gatekeeper: Gatekeeper,
    forwarder: Arc<dyn Forwarder>,
}

impl ToolExecutor {
    /// Create a new tool executor.
    pub fn new(
        config: Arc<GatewayConfig>,
        gatekeeper: Gatekeeper,
        forwarder: Arc<dyn Forwarder>,
    ) -> Self {
        Self {
            config,
            gatekeeper,
            forwarder,
        }
    }

    /// The gatekeeper this executor consults.
    pub fn gatekeeper(&self) -> &Gatekeeper {
        &self.gatekeeper
    }

    /// Execute a tool call.
    pub async fn execute(
        &self,
        tool: &ToolDefinition,
        arguments: Value,
        context: &RequestContext,
    ) -> ExecutionResult {
        // 1. Validate against the tool's input schema. Absent arguments
        //    count as an empty object.
        let arguments = match arguments {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        if let Err(reason) = validate_arguments(tool, &arguments) {
            return ExecutionResult::error(reason);
        }
        let mut arguments = match arguments {
            Value::Object(map) => map,
            other => {
                return ExecutionResult::error(format!(
                    "invalid arguments for tool {}: expected an object, got {}",
                    tool.name, other
                ));
            }
        };

        // 2. Resolve the target project and strip it from the arguments;
        //    it addresses the request rather than parameterizing it.
        let project_ref = arguments
            .remove("project_ref")
            .as_ref()
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| context.project_ref.clone())
            .or_else(|| self.config.supabase.default_project_ref.clone());

        // 3. Gatekeep.
        let mut invocation = ToolInvocation::new(&tool.name, arguments);
        if let Some(project_ref) = &project_ref {
            invocation = invocation.with_project_ref(project_ref.clone());
        }
        if let GatekeepResult::Denied(denial) = self.gatekeeper.evaluate(&invocation) {
            return ExecutionResult::error(denial.to_string());
        }

        // 4. Forward.
        let request = ForwardRequest {
            operation: &tool.name,
            arguments: &invocation.arguments,
            project_ref: invocation.project_ref.as_deref(),
            access_token: context.access_token.as_deref(),
        };
        match self.forwarder.execute(request).await {
            Ok(payload) => ExecutionResult::success_json(self.shape(payload)),
            Err(err) => {
                tracing::warn!(tool = %tool.name, error = %err, "forwarding failed");
                ExecutionResult::error(err.to_string())
            }
        }
    }

    /// Apply the configured result shaping.
    fn shape(&self, payload: Value) -> Value {
        if self.config.mcp.compact_results {
            payload
        } else {
            json!({ "success": true, "data": payload })
        }
    }
}

/// Validate arguments against the tool's input schema.
fn validate_arguments(tool: &ToolDefinition, arguments: &Value) -> Result<(), String> {
    let validator = jsonschema::validator_for(&tool.input_schema)
        .map_err(|e| format!("invalid input schema for tool {}: {}", tool.name, e))?;

    if let Some(error) = validator.iter_errors(arguments).next() {
        return Err(format!("invalid arguments for tool {}: {}", tool.name, error));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use supagate_core::AllowList;
    use supagate_guard::PatternGuard;
    use supagate_policy::AccessPolicy;
    use supagate_supabase::{ForwardError, MockForwarder};

    /// Forwarder that records the request it saw.
    #[derive(Default)]
    struct CapturingForwarder {
        seen: Mutex<Option<(String, Map<String, Value>, Option<String>)>>,
    }

    #[async_trait]
    impl Forwarder for CapturingForwarder {
        async fn execute(&self, request: ForwardRequest<'_>) -> Result<Value, ForwardError> {
            *self.seen.lock().unwrap() = Some((
                request.operation.to_string(),
                request.arguments.clone(),
                request.project_ref.map(str::to_string),
            ));
            Ok(json!({"captured": true}))
        }

        fn name(&self) -> &'static str {
            "capturing"
        }
    }

    fn catalog_tool(name: &str) -> ToolDefinition {
        catalog::supabase_tools()
            .into_iter()
            .find(|t| t.name == name)
            .unwrap_or_else(|| panic!("missing catalog tool {name}"))
    }

    fn executor_with(
        config: GatewayConfig,
        forwarder: Arc<dyn Forwarder>,
    ) -> ToolExecutor {
        let config = Arc::new(config);
        let gatekeeper = Gatekeeper::new(
            AccessPolicy::new(config.policy.clone()),
            Arc::new(PatternGuard::new()),
        );
        ToolExecutor::new(config, gatekeeper, forwarder)
    }

    fn mock_executor(config: GatewayConfig) -> ToolExecutor {
        executor_with(config, Arc::new(MockForwarder::new()))
    }

    #[tokio::test]
    async fn test_missing_required_argument_is_rejected() {
        let executor = mock_executor(GatewayConfig::default());
        let result = executor
            .execute(
                &catalog_tool("execute_sql"),
                json!({}),
                &RequestContext::default(),
            )
            .await;

        assert!(!result.success);
        let error = result.error.unwrap_or_default();
        assert!(error.contains("execute_sql"), "{error}");
        assert!(error.contains("query"), "{error}");
    }

    #[tokio::test]
    async fn test_denial_reason_is_surfaced_verbatim() {
        let mut config = GatewayConfig::default();
        config.policy.read_only = true;
        let executor = mock_executor(config);

        let result = executor
            .execute(
                &catalog_tool("execute_sql_insert"),
                json!({"table": "users", "values": {"name": "x"}}),
                &RequestContext::default(),
            )
            .await;

        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Operation 'execute_sql_insert' is blocked in read-only mode")
        );
    }

    #[tokio::test]
    async fn test_payload_is_wrapped_by_default() {
        let executor = mock_executor(GatewayConfig::default());
        let result = executor
            .execute(
                &catalog_tool("list_projects"),
                Value::Null,
                &RequestContext::default(),
            )
            .await;

        assert!(result.success);
        match &result.content[0] {
            ToolContent::Json { json } => {
                assert_eq!(json["success"], json!(true));
                assert!(json["data"].is_array());
            }
            other => panic!("expected json content, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_compact_results_return_the_raw_payload() {
        let mut config = GatewayConfig::default();
        config.mcp.compact_results = true;
        let executor = mock_executor(config);

        let result = executor
            .execute(
                &catalog_tool("list_projects"),
                json!({}),
                &RequestContext::default(),
            )
            .await;

        match &result.content[0] {
            ToolContent::Json { json } => assert!(json.is_array(), "{json}"),
            other => panic!("expected json content, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_project_ref_precedence_and_stripping() {
        let capturing = Arc::new(CapturingForwarder::default());
        let mut config = GatewayConfig::default();
        config.supabase.default_project_ref = Some("default-ref".to_string());
        let executor = executor_with(config, capturing.clone());

        // Argument beats both the request context and the default.
        let context = RequestContext {
            access_token: None,
            project_ref: Some("header-ref".to_string()),
        };
        executor
            .execute(
                &catalog_tool("get_project"),
                json!({"project_ref": "arg-ref"}),
                &context,
            )
            .await;
        let (operation, arguments, project_ref) =
            capturing.seen.lock().unwrap().clone().unwrap();
        assert_eq!(operation, "get_project");
        assert_eq!(project_ref.as_deref(), Some("arg-ref"));
        assert!(
            !arguments.contains_key("project_ref"),
            "project_ref must not leak into the forwarded body"
        );

        // Without an argument the request context wins over the default.
        executor
            .execute(&catalog_tool("get_project"), json!({}), &context)
            .await;
        let (_, _, project_ref) = capturing.seen.lock().unwrap().clone().unwrap();
        assert_eq!(project_ref.as_deref(), Some("header-ref"));

        // With neither, the configured default applies.
        executor
            .execute(
                &catalog_tool("get_project"),
                json!({}),
                &RequestContext::default(),
            )
            .await;
        let (_, _, project_ref) = capturing.seen.lock().unwrap().clone().unwrap();
        assert_eq!(project_ref.as_deref(), Some("default-ref"));
    }

    #[tokio::test]
    async fn test_project_allow_list_sees_the_resolved_ref() {
        let mut config = GatewayConfig::default();
        config.policy.allowed_projects = AllowList::from(vec!["allowed-ref"]);
        let executor = mock_executor(config);

        let denied = executor
            .execute(
                &catalog_tool("get_project"),
                json!({"project_ref": "other-ref"}),
                &RequestContext::default(),
            )
            .await;
        assert_eq!(
            denied.error.as_deref(),
            Some("Project 'other-ref' is not in the allowed projects list")
        );

        let allowed = executor
            .execute(
                &catalog_tool("get_project"),
                json!({"project_ref": "allowed-ref"}),
                &RequestContext::default(),
            )
            .await;
        assert!(allowed.success);
    }
}
