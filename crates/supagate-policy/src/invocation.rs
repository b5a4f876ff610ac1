//! The per-request invocation value the pipeline judges.

use serde_json::{Map, Value};

/// One inbound tool invocation: operation name, parsed arguments, and the
/// resolved target project. Built per request, never persisted.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    /// Operation identifier, e.g. `execute_sql` or `create_branch`.
    pub name: String,
    /// Tool arguments as parsed from the request.
    pub arguments: Map<String, Value>,
    /// Target project ref, when the operation is project-scoped. Already
    /// resolved by the caller (argument, then request context, then
    /// configured default).
    pub project_ref: Option<String>,
}

impl ToolInvocation {
    /// Create an invocation without a project target.
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
            project_ref: None,
        }
    }

    /// Attach the resolved project ref.
    pub fn with_project_ref(mut self, project_ref: impl Into<String>) -> Self {
        self.project_ref = Some(project_ref.into());
        self
    }

    /// The raw SQL text of the `query` argument, or the empty string when
    /// absent or not a string. The guard treats an empty query like any
    /// other unrecognized statement.
    pub fn query(&self) -> &str {
        self.arguments
            .get("query")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Schema names carried by the arguments: a `schemas` string array,
    /// plus a singular `schema` string if present.
    pub fn schema_arguments(&self) -> Vec<String> {
        Self::collect_names(&self.arguments, "schema", "schemas")
    }

    /// Table names carried by the arguments: a `tables` string array, plus
    /// a singular `table` string if present.
    pub fn table_arguments(&self) -> Vec<String> {
        Self::collect_names(&self.arguments, "table", "tables")
    }

    fn collect_names(arguments: &Map<String, Value>, singular: &str, plural: &str) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(name) = arguments.get(singular).and_then(Value::as_str) {
            names.push(name.to_string());
        }
        if let Some(list) = arguments.get(plural).and_then(Value::as_array) {
            names.extend(
                list.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string),
            );
        }
        names
    }
}
