//! The fixed Supabase tool catalog.
//!
//! The gateway's tool set never changes at runtime: every tool is one
//! Management API capability with a hand-written input schema. The
//! gatekeeping pipeline, not the catalog, decides which of them a given
//! deployment may actually call, so the catalog always lists all of them.
//!
//! Project-scoped tools share an optional `project_ref` property. The
//! executor resolves it (argument, then request header, then configured
//! default) and strips it from the arguments before forwarding.

use crate::protocol::{ToolAnnotations, ToolDefinition};
use serde_json::{Value, json};

/// Every tool the gateway serves, in catalog order.
pub fn supabase_tools() -> Vec<ToolDefinition> {
    let mut tools = Vec::new();
    tools.extend(project_tools());
    tools.extend(database_tools());
    tools.extend(function_and_storage_tools());
    tools.extend(branch_tools());
    tools
}

fn project_tools() -> Vec<ToolDefinition> {
    vec![
        read_tool(
            "list_projects",
            "List all Supabase projects the access token can see",
            json!({
                "type": "object",
                "properties": {}
            }),
        ),
        read_tool(
            "get_project",
            "Fetch details for a single project",
            json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property()
                }
            }),
        ),
        read_tool(
            "list_organizations",
            "List the organizations the access token belongs to",
            json!({
                "type": "object",
                "properties": {}
            }),
        ),
        read_tool(
            "get_project_url",
            "Derive the REST URL for a project",
            json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property()
                }
            }),
        ),
        read_tool(
            "get_anon_key",
            "Fetch the anonymous API key for a project",
            json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property()
                }
            }),
        ),
        read_tool(
            "get_logs",
            "Fetch recent logs for a project",
            json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property()
                }
            }),
        ),
        write_tool(
            "create_project",
            "Create a new Supabase project",
            json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Project name"
                    },
                    "organization_id": {
                        "type": "string",
                        "description": "Organization the project belongs to"
                    },
                    "region": {
                        "type": "string",
                        "description": "Deployment region, e.g. us-east-1"
                    },
                    "db_pass": {
                        "type": "string",
                        "description": "Initial database password"
                    }
                },
                "required": ["name", "organization_id"]
            }),
        ),
        write_tool(
            "pause_project",
            "Pause a project",
            json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property()
                }
            }),
        ),
        write_tool(
            "restore_project",
            "Restore a paused project",
            json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property()
                }
            }),
        ),
    ]
}

fn database_tools() -> Vec<ToolDefinition> {
    vec![
        // Raw SQL is classified per query by the guard, so the tool itself
        // carries no read-only hint.
        ToolDefinition {
            name: "execute_sql".to_string(),
            description: Some(
                "Run a SQL query against the project database".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property(),
                    "query": {
                        "type": "string",
                        "description": "SQL text to execute"
                    }
                },
                "required": ["query"]
            }),
            annotations: None,
        },
        read_tool(
            "list_tables",
            "List tables in the project database",
            json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property(),
                    "schemas": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Schemas to include; defaults to everything outside pg_catalog and information_schema"
                    }
                }
            }),
        ),
        read_tool(
            "describe_table",
            "List the columns of one table",
            json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property(),
                    "table": {
                        "type": "string",
                        "description": "Table name"
                    },
                    "schema": {
                        "type": "string",
                        "description": "Schema name; defaults to public"
                    }
                },
                "required": ["table"]
            }),
        ),
        read_tool(
            "list_extensions",
            "List available Postgres extensions",
            json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property()
                }
            }),
        ),
        read_tool(
            "list_migrations",
            "List applied database migrations",
            json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property()
                }
            }),
        ),
        write_tool(
            "apply_migration",
            "Apply a named DDL migration to the project database",
            json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property(),
                    "name": {
                        "type": "string",
                        "description": "Migration name in snake_case"
                    },
                    "query": {
                        "type": "string",
                        "description": "Migration SQL"
                    }
                },
                "required": ["name", "query"]
            }),
        ),
        write_tool(
            "execute_sql_insert",
            "Insert one row built from structured values",
            json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property(),
                    "table": {
                        "type": "string",
                        "description": "Target table"
                    },
                    "values": {
                        "type": "object",
                        "description": "Column/value pairs to insert"
                    }
                },
                "required": ["table", "values"]
            }),
        ),
        write_tool(
            "execute_sql_update",
            "Update rows matching structured filters",
            json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property(),
                    "table": {
                        "type": "string",
                        "description": "Target table"
                    },
                    "values": {
                        "type": "object",
                        "description": "Column/value pairs to set"
                    },
                    "filters": {
                        "type": "object",
                        "description": "Equality filters selecting the rows"
                    }
                },
                "required": ["table", "values", "filters"]
            }),
        ),
        destructive_tool(
            "execute_sql_delete",
            "Delete rows matching structured filters",
            json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property(),
                    "table": {
                        "type": "string",
                        "description": "Target table"
                    },
                    "filters": {
                        "type": "object",
                        "description": "Equality filters selecting the rows"
                    }
                },
                "required": ["table", "filters"]
            }),
        ),
    ]
}

fn function_and_storage_tools() -> Vec<ToolDefinition> {
    vec![
        read_tool(
            "list_edge_functions",
            "List deployed edge functions",
            json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property()
                }
            }),
        ),
        write_tool(
            "deploy_edge_function",
            "Deploy an edge function from source",
            json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property(),
                    "slug": {
                        "type": "string",
                        "description": "URL-safe function identifier"
                    },
                    "name": {
                        "type": "string",
                        "description": "Display name; defaults to the slug"
                    },
                    "body": {
                        "type": "string",
                        "description": "Function source code"
                    },
                    "verify_jwt": {
                        "type": "boolean",
                        "description": "Require a valid JWT on invocation"
                    }
                },
                "required": ["slug", "body"]
            }),
        ),
        write_tool(
            "update_storage_config",
            "Update project storage settings",
            json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property(),
                    "file_size_limit": {
                        "type": "integer",
                        "description": "Maximum upload size in bytes"
                    },
                    "features": {
                        "type": "object",
                        "description": "Storage feature toggles"
                    }
                }
            }),
        ),
    ]
}

fn branch_tools() -> Vec<ToolDefinition> {
    vec![
        read_tool(
            "list_branches",
            "List development branches of a project",
            json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property()
                }
            }),
        ),
        write_tool(
            "create_branch",
            "Create a development branch",
            json!({
                "type": "object",
                "properties": {
                    "project_ref": project_ref_property(),
                    "branch_name": {
                        "type": "string",
                        "description": "Name of the new branch"
                    }
                },
                "required": ["branch_name"]
            }),
        ),
        destructive_tool(
            "delete_branch",
            "Delete a development branch",
            json!({
                "type": "object",
                "properties": {
                    "branch_id": branch_id_property()
                },
                "required": ["branch_id"]
            }),
        ),
        write_tool(
            "merge_branch",
            "Merge a development branch into production",
            json!({
                "type": "object",
                "properties": {
                    "branch_id": branch_id_property()
                },
                "required": ["branch_id"]
            }),
        ),
        destructive_tool(
            "reset_branch",
            "Reset a development branch, discarding its changes",
            json!({
                "type": "object",
                "properties": {
                    "branch_id": branch_id_property()
                },
                "required": ["branch_id"]
            }),
        ),
        write_tool(
            "rebase_branch",
            "Rebase a development branch onto production",
            json!({
                "type": "object",
                "properties": {
                    "branch_id": branch_id_property()
                },
                "required": ["branch_id"]
            }),
        ),
    ]
}

fn project_ref_property() -> Value {
    json!({
        "type": "string",
        "description": "Target project ref; falls back to the request header, then the configured default"
    })
}

fn branch_id_property() -> Value {
    json!({
        "type": "string",
        "description": "Branch identifier from list_branches"
    })
}

fn read_tool(name: &str, description: &str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
        annotations: Some(ToolAnnotations {
            read_only: Some(true),
            ..Default::default()
        }),
    }
}

fn write_tool(name: &str, description: &str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
        annotations: Some(ToolAnnotations {
            read_only: Some(false),
            ..Default::default()
        }),
    }
}

fn destructive_tool(name: &str, description: &str, input_schema: Value) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
        annotations: Some(ToolAnnotations {
            read_only: Some(false),
            destructive: Some(true),
        }),
    }
}
