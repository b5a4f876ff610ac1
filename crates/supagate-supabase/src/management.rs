//! Live forwarding to the Supabase Management API.
//!
//! Every operation maps to one Management API route. Database reads and
//! structured DML all funnel through `POST /v1/projects/{ref}/database/query`;
//! project, branch, function and storage operations have endpoints of
//! their own. Route planning is pure and separated from sending so the
//! mapping is testable without a network.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Map, Value, json};

use crate::error::ForwardError;
use crate::sql;
use crate::{ForwardRequest, Forwarder};

/// One planned Management API call.
#[derive(Debug, Clone, PartialEq)]
struct Route {
    method: Method,
    path: String,
    body: Option<Value>,
}

impl Route {
    fn get(path: String) -> Self {
        Self {
            method: Method::GET,
            path,
            body: None,
        }
    }

    fn post(path: String, body: Value) -> Self {
        Self {
            method: Method::POST,
            path,
            body: Some(body),
        }
    }

    fn post_empty(path: String) -> Self {
        Self {
            method: Method::POST,
            path,
            body: None,
        }
    }
}

/// Forwarder that calls the Supabase Management API over HTTPS.
///
/// Holds the startup-resolved access token, if any; a per-request token on
/// the [`ForwardRequest`] takes precedence (header credential mode).
pub struct ManagementApiForwarder {
    client: reqwest::Client,
    api_url: String,
    access_token: Option<String>,
}

impl ManagementApiForwarder {
    /// Create a forwarder against the given API base URL.
    pub fn new(
        api_url: impl Into<String>,
        access_token: Option<String>,
    ) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            access_token,
        })
    }

    async fn send(&self, route: &Route, token: &str) -> Result<Value, ForwardError> {
        let url = format!("{}{}", self.api_url.trim_end_matches('/'), route.path);
        let mut builder = self
            .client
            .request(route.method.clone(), &url)
            .bearer_auth(token);
        if let Some(body) = &route.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ForwardError::Api {
                status: status.as_u16(),
                message: clip(text),
            });
        }
        if text.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

#[async_trait]
impl Forwarder for ManagementApiForwarder {
    async fn execute(&self, request: ForwardRequest<'_>) -> Result<Value, ForwardError> {
        // The project URL is derived, not fetched.
        if request.operation == "get_project_url" {
            let project_ref = required_project_ref(request.operation, request.project_ref)?;
            return Ok(json!({ "url": format!("https://{project_ref}.supabase.co") }));
        }

        let route = plan(request.operation, request.arguments, request.project_ref)?;
        let token = request
            .access_token
            .or(self.access_token.as_deref())
            .ok_or(ForwardError::MissingCredentials)?;

        tracing::debug!(
            operation = %request.operation,
            method = %route.method,
            path = %route.path,
            "forwarding to the management api"
        );

        let payload = self.send(&route, token).await?;

        if request.operation == "get_anon_key" {
            return extract_anon_key(payload);
        }
        Ok(payload)
    }

    fn name(&self) -> &'static str {
        "management-api"
    }
}

/// Map one operation onto its Management API route.
fn plan(
    operation: &str,
    arguments: &Map<String, Value>,
    project_ref: Option<&str>,
) -> Result<Route, ForwardError> {
    let route = match operation {
        // ---- project scope ----------------------------------------------
        "list_projects" => Route::get("/v1/projects".to_string()),
        "list_organizations" => Route::get("/v1/organizations".to_string()),
        "create_project" => Route::post(
            "/v1/projects".to_string(),
            Value::Object(arguments.clone()),
        ),
        "get_project" => Route::get(project_path(operation, project_ref, "")?),
        "pause_project" => Route::post_empty(project_path(operation, project_ref, "/pause")?),
        "restore_project" => Route::post_empty(project_path(operation, project_ref, "/restore")?),
        // The anon key is one entry in the api-keys listing; `execute`
        // narrows the payload down after the call.
        "get_anon_key" => Route::get(project_path(operation, project_ref, "/api-keys")?),

        // ---- database ---------------------------------------------------
        "execute_sql" => query_route(
            operation,
            project_ref,
            required_str(arguments, operation, "query")?.to_string(),
        )?,
        "list_tables" => {
            let schemas = string_list(arguments, "schemas");
            query_route(operation, project_ref, sql::list_tables(&schemas))?
        }
        "describe_table" => {
            let table = required_str(arguments, operation, "table")?;
            let schema = arguments.get("schema").and_then(Value::as_str);
            query_route(operation, project_ref, sql::describe_table(table, schema))?
        }
        "list_extensions" => query_route(operation, project_ref, sql::list_extensions())?,
        "execute_sql_insert" => {
            let table = required_str(arguments, operation, "table")?;
            let values = required_object(arguments, operation, "values")?;
            query_route(operation, project_ref, sql::insert(table, values))?
        }
        "execute_sql_update" => {
            let table = required_str(arguments, operation, "table")?;
            let values = required_object(arguments, operation, "values")?;
            let filters = required_object(arguments, operation, "filters")?;
            query_route(operation, project_ref, sql::update(table, values, filters))?
        }
        "execute_sql_delete" => {
            let table = required_str(arguments, operation, "table")?;
            let filters = required_object(arguments, operation, "filters")?;
            query_route(operation, project_ref, sql::delete(table, filters))?
        }
        "list_migrations" => Route::get(project_path(
            operation,
            project_ref,
            "/database/migrations",
        )?),
        "apply_migration" => Route::post(
            project_path(operation, project_ref, "/database/migrations")?,
            json!({
                "name": required_str(arguments, operation, "name")?,
                "query": required_str(arguments, operation, "query")?,
            }),
        ),

        // ---- edge functions and storage ---------------------------------
        "list_edge_functions" => Route::get(project_path(operation, project_ref, "/functions")?),
        "deploy_edge_function" => Route::post(
            project_path(operation, project_ref, "/functions")?,
            Value::Object(arguments.clone()),
        ),
        "update_storage_config" => Route {
            method: Method::PATCH,
            path: project_path(operation, project_ref, "/config/storage")?,
            body: Some(Value::Object(arguments.clone())),
        },

        // ---- logs -------------------------------------------------------
        "get_logs" => Route::get(project_path(
            operation,
            project_ref,
            "/analytics/endpoints/logs.all",
        )?),

        // ---- branches ---------------------------------------------------
        "list_branches" => Route::get(project_path(operation, project_ref, "/branches")?),
        "create_branch" => Route::post(
            project_path(operation, project_ref, "/branches")?,
            Value::Object(arguments.clone()),
        ),
        "delete_branch" => Route {
            method: Method::DELETE,
            path: branch_path(arguments, operation, "")?,
            body: None,
        },
        "merge_branch" => Route::post_empty(branch_path(arguments, operation, "/merge")?),
        "reset_branch" => Route::post_empty(branch_path(arguments, operation, "/reset")?),
        // Rebase is the Management API's branch push.
        "rebase_branch" => Route::post_empty(branch_path(arguments, operation, "/push")?),

        other => return Err(ForwardError::UnsupportedOperation(other.to_string())),
    };
    Ok(route)
}

fn query_route(
    operation: &str,
    project_ref: Option<&str>,
    query: String,
) -> Result<Route, ForwardError> {
    Ok(Route::post(
        project_path(operation, project_ref, "/database/query")?,
        json!({ "query": query }),
    ))
}

fn project_path(
    operation: &str,
    project_ref: Option<&str>,
    suffix: &str,
) -> Result<String, ForwardError> {
    let project_ref = required_project_ref(operation, project_ref)?;
    Ok(format!("/v1/projects/{project_ref}{suffix}"))
}

fn branch_path(
    arguments: &Map<String, Value>,
    operation: &str,
    suffix: &str,
) -> Result<String, ForwardError> {
    let branch_id = required_str(arguments, operation, "branch_id")?;
    Ok(format!("/v1/branches/{branch_id}{suffix}"))
}

fn required_project_ref<'a>(
    operation: &str,
    project_ref: Option<&'a str>,
) -> Result<&'a str, ForwardError> {
    project_ref.ok_or_else(|| ForwardError::MissingProjectRef(operation.to_string()))
}

fn required_str<'a>(
    arguments: &'a Map<String, Value>,
    operation: &str,
    name: &str,
) -> Result<&'a str, ForwardError> {
    arguments
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| ForwardError::missing_argument(operation, name))
}

fn required_object<'a>(
    arguments: &'a Map<String, Value>,
    operation: &str,
    name: &str,
) -> Result<&'a Map<String, Value>, ForwardError> {
    arguments
        .get(name)
        .and_then(Value::as_object)
        .ok_or_else(|| ForwardError::missing_argument(operation, name))
}

fn string_list(arguments: &Map<String, Value>, name: &str) -> Vec<String> {
    arguments
        .get(name)
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn extract_anon_key(payload: Value) -> Result<Value, ForwardError> {
    let key = payload
        .as_array()
        .and_then(|keys| {
            keys.iter()
                .find(|key| key.get("name").and_then(Value::as_str) == Some("anon"))
        })
        .and_then(|key| key.get("api_key"))
        .cloned();

    match key {
        Some(key) => Ok(json!({ "anon_key": key })),
        None => Err(ForwardError::UnexpectedResponse(
            "no anon key in the api-keys listing".to_string(),
        )),
    }
}

fn clip(text: String) -> String {
    const MAX_CHARS: usize = 500;
    if text.chars().count() <= MAX_CHARS {
        text
    } else {
        text.chars().take(MAX_CHARS).collect()
    }
}
