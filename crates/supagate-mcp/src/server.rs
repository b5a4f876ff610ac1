//! MCP server implementation.
//!
//! This module provides the gateway server that handles tool discovery
//! and execution over stdio or HTTP.

use crate::catalog;
use crate::error::GatewayError;
use crate::executor::{ExecutionResult, ToolExecutor};
use crate::http_transport::HttpServer;
use crate::protocol::*;
use serde_json::{Value, json};
use std::io::{BufRead, Write};
use std::sync::Arc;
use supagate_core::{GatewayConfig, Transport};
use supagate_guard::QueryGuard;
use supagate_policy::{AccessPolicy, Gatekeeper};
use supagate_supabase::Forwarder;
use tokio::sync::mpsc;

/// The MCP gateway server.
///
/// Cheap to clone: the registry is shared by value and everything else
/// lives behind an `Arc`.
#[derive(Clone)]
pub struct GatewayServer {
    config: Arc<GatewayConfig>,
    tools: crate::tools::ToolRegistry,
    executor: Arc<ToolExecutor>,
}

impl GatewayServer {
    /// Create a gateway server over a guard and a forwarder.
    ///
    /// The tool registry is filled from the fixed catalog; policy does not
    /// shrink it, so clients always discover the full surface and learn
    /// about restrictions from call-time denials.
    pub fn new(
        config: Arc<GatewayConfig>,
        guard: Arc<dyn QueryGuard>,
        forwarder: Arc<dyn Forwarder>,
    ) -> Self {
        let gatekeeper = Gatekeeper::new(AccessPolicy::new(config.policy.clone()), guard);
        let executor = Arc::new(ToolExecutor::new(config.clone(), gatekeeper, forwarder));

        let mut tools = crate::tools::ToolRegistry::new();
        for tool in catalog::supabase_tools() {
            tools.register(tool);
        }

        tracing::info!(
            gateway = %config.display_name(),
            tool_count = tools.len(),
            "registered tool catalog"
        );

        Self {
            config,
            tools,
            executor,
        }
    }

    /// The registered tools.
    pub fn tools(&self) -> &crate::tools::ToolRegistry {
        &self.tools
    }

    /// Start the gateway on the configured transport.
    pub async fn run(&self) -> Result<(), GatewayError> {
        match self.config.mcp.transport {
            Transport::Stdio => self.run_stdio().await,
            Transport::Http => self.run_http().await,
        }
    }

    /// Run the gateway with stdio transport.
    async fn run_stdio(&self) -> Result<(), GatewayError> {
        tracing::info!("Starting MCP gateway with stdio transport");

        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        let mut stdout_lock = stdout.lock();

        // Stdio callers authenticate once, at startup, via the
        // environment; there is no per-request context.
        let context = RequestContext::default();

        for line in stdin.lock().lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(request) => self.handle_request(request, &context).await,
                Err(e) => JsonRpcResponse::error(None, -32700, format!("Parse error: {}", e)),
            };
            let response_json = serde_json::to_string(&response)?;

            writeln!(stdout_lock, "{}", response_json)?;
            stdout_lock.flush()?;
        }

        Ok(())
    }

    /// Run the gateway with HTTP transport.
    pub async fn run_http(&self) -> Result<(), GatewayError> {
        tracing::info!(
            addr = %self.config.mcp.bind_addr(),
            "Starting MCP gateway with HTTP transport"
        );

        // Channel for request handling
        let (request_tx, mut request_rx) = mpsc::channel::<(
            JsonRpcRequest,
            RequestContext,
            mpsc::Sender<JsonRpcResponse>,
        )>(100);

        // Spawn request handler task
        let server = self.clone();
        tokio::spawn(async move {
            while let Some((request, context, response_tx)) = request_rx.recv().await {
                let response = server.handle_request(request, &context).await;
                let _ = response_tx.send(response).await;
            }
        });

        // Start HTTP server
        let http_server = HttpServer::new(
            self.config.mcp.bind_addr(),
            self.config.credentials.clone(),
            request_tx,
        );
        http_server.run().await
    }

    /// Handle a JSON-RPC request.
    pub async fn handle_request(
        &self,
        request: JsonRpcRequest,
        context: &RequestContext,
    ) -> JsonRpcResponse {
        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params, context).await,
            "shutdown" => self.handle_shutdown(id),
            _ => JsonRpcResponse::error(
                id,
                -32601,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": "2024-11-05",
            "serverInfo": {
                "name": self.config.display_name(),
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({ "tools": self.tools.list() });
        JsonRpcResponse::success(id, result)
    }

    async fn handle_call_tool(
        &self,
        id: Option<Value>,
        params: Option<Value>,
        context: &RequestContext,
    ) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, -32602, format!("Invalid params: {}", e));
                }
            },
            None => return JsonRpcResponse::error(id, -32602, "Missing params"),
        };

        let tool = match self.tools.get(&params.name) {
            Some(t) => t.clone(),
            None => {
                return JsonRpcResponse::error(
                    id,
                    -32602,
                    format!("Tool not found: {}", params.name),
                );
            }
        };

        let result = self.executor.execute(&tool, params.arguments, context).await;
        execution_result_to_response(id, result)
    }

    fn handle_shutdown(&self, id: Option<Value>) -> JsonRpcResponse {
        tracing::info!("MCP gateway shutdown requested");
        JsonRpcResponse::success(id, json!(null))
    }
}

/// Map an execution result onto the MCP `tools/call` response shape.
///
/// Denials and forwarding failures are tool results with `isError` set,
/// not JSON-RPC errors; the call itself succeeded.
fn execution_result_to_response(id: Option<Value>, result: ExecutionResult) -> JsonRpcResponse {
    let response = json!({
        "content": result.content,
        "isError": !result.success
    });
    JsonRpcResponse::success(id, response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use supagate_guard::PatternGuard;
    use supagate_supabase::MockForwarder;

    fn test_server() -> GatewayServer {
        GatewayServer::new(
            Arc::new(GatewayConfig::default()),
            Arc::new(PatternGuard::new()),
            Arc::new(MockForwarder::new()),
        )
    }

    fn request(method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(1)),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn test_initialize() {
        let server = test_server();
        let response = server
            .handle_request(request("initialize", None), &RequestContext::default())
            .await;

        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "supagate");
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_list_tools_serves_the_catalog() {
        let server = test_server();
        let response = server
            .handle_request(request("tools/list", None), &RequestContext::default())
            .await;

        let result = response.result.unwrap();
        let tools = result["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 27);
        assert!(
            tools
                .iter()
                .any(|t| t["name"] == "execute_sql" && t["inputSchema"]["type"] == "object")
        );
    }

    #[tokio::test]
    async fn test_call_nonexistent_tool() {
        let server = test_server();
        let response = server
            .handle_request(
                request("tools/call", Some(json!({"name": "nonexistent", "arguments": {}}))),
                &RequestContext::default(),
            )
            .await;

        let error = response.error.unwrap();
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("nonexistent"));
    }

    #[tokio::test]
    async fn test_denied_call_is_a_tool_error_not_a_protocol_error() {
        let server = test_server();
        let response = server
            .handle_request(
                request(
                    "tools/call",
                    Some(json!({
                        "name": "execute_sql",
                        "arguments": {"query": "DROP TABLE users", "project_ref": "p1"}
                    })),
                ),
                &RequestContext::default(),
            )
            .await;

        assert!(response.error.is_none(), "denials are not JSON-RPC errors");
        let result = response.result.unwrap();
        assert_eq!(result["isError"], json!(true));
        let text = result["content"][0]["text"].as_str().unwrap();
        assert_eq!(text, "query contains blocked pattern: DROP TABLE");
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let server = test_server();
        let response = server
            .handle_request(request("resources/list", None), &RequestContext::default())
            .await;

        let error = response.error.unwrap();
        assert_eq!(error.code, -32601);
    }
}
