//! HTTP transport for the MCP gateway.
//!
//! This module provides an HTTP/SSE transport, allowing remote AI agents
//! and automation platforms (n8n and the like) to connect. Each POST may
//! carry its own credentials: the configured token header and an optional
//! `x-supabase-project-ref` override are turned into a [`RequestContext`]
//! here, and the gateway never reads the environment per request.

use crate::error::GatewayError;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse, RequestContext};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Sse},
    routing::{get, post},
};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use supagate_core::{CredentialSource, CredentialsConfig};
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Channel endpoint the transport hands requests to.
pub type RequestSender =
    mpsc::Sender<(JsonRpcRequest, RequestContext, mpsc::Sender<JsonRpcResponse>)>;

/// HTTP transport handler state.
pub struct HttpTransportState {
    /// Channel for sending requests to the gateway server.
    request_tx: RequestSender,
    /// How per-request credentials are sourced.
    credentials: CredentialsConfig,
}

impl HttpTransportState {
    /// Create a new HTTP transport state.
    pub fn new(request_tx: RequestSender, credentials: CredentialsConfig) -> Self {
        Self {
            request_tx,
            credentials,
        }
    }
}

/// Query parameters for the MCP endpoint.
#[derive(Debug, Deserialize)]
pub struct McpQuery {
    /// Session ID for SSE connections.
    session_id: Option<String>,
}

/// Create the HTTP router for the gateway.
pub fn create_router(state: Arc<HttpTransportState>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp_post).get(handle_mcp_sse))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handle POST requests to /mcp (JSON-RPC over HTTP).
async fn handle_mcp_post(
    State(state): State<Arc<HttpTransportState>>,
    headers: HeaderMap,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    let context = extract_context(&state.credentials, &headers);
    let (response_tx, mut response_rx) = mpsc::channel(1);

    // Send request to the gateway server
    if state
        .request_tx
        .send((request, context, response_tx))
        .await
        .is_err()
    {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(JsonRpcResponse::error(None, -32603, "MCP gateway unavailable")),
        );
    }

    // Wait for response
    match response_rx.recv().await {
        Some(response) => (StatusCode::OK, Json(response)),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(JsonRpcResponse::error(
                None,
                -32603,
                "No response from MCP gateway",
            )),
        ),
    }
}

/// Handle GET requests to /mcp (SSE streaming).
///
/// The gateway never initiates messages, so the stream only announces the
/// session and is then held open by keep-alive pings.
async fn handle_mcp_sse(Query(query): Query<McpQuery>) -> impl IntoResponse {
    let session_id = query
        .session_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let stream = async_stream::stream! {
        yield Ok::<_, Infallible>(
            axum::response::sse::Event::default()
                .event("session")
                .data(session_id),
        );
        std::future::pending::<()>().await;
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(std::time::Duration::from_secs(30))
            .text("ping"),
    )
}

/// Handle health check requests.
async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "supagate-mcp",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Build the per-request context from the headers.
fn extract_context(credentials: &CredentialsConfig, headers: &HeaderMap) -> RequestContext {
    let access_token = match credentials.source {
        CredentialSource::Header => headers
            .get(credentials.header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(strip_bearer)
            .filter(|token| !token.is_empty())
            .map(str::to_string),
        // Env mode: the startup-resolved token applies; headers are ignored.
        CredentialSource::Env => None,
    };

    let project_ref = headers
        .get("x-supabase-project-ref")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    RequestContext {
        access_token,
        project_ref,
    }
}

fn strip_bearer(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim()
}

/// HTTP server for the gateway transport.
pub struct HttpServer {
    addr: String,
    state: Arc<HttpTransportState>,
}

impl HttpServer {
    /// Create a new HTTP server bound to `addr`.
    pub fn new(addr: String, credentials: CredentialsConfig, request_tx: RequestSender) -> Self {
        Self {
            addr,
            state: Arc::new(HttpTransportState::new(request_tx, credentials)),
        }
    }

    /// Run the HTTP server.
    pub async fn run(self) -> Result<(), GatewayError> {
        let app = create_router(self.state);

        let listener = tokio::net::TcpListener::bind(&self.addr).await.map_err(|e| {
            GatewayError::StartupFailed(format!("Failed to bind to {}: {}", self.addr, e))
        })?;

        tracing::info!(addr = %self.addr, "MCP gateway HTTP transport listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| GatewayError::Internal(e.into()))?;

        Ok(())
    }
}
