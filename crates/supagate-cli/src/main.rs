use clap::{Parser, Subcommand};
use serde_json::json;
use supagate_core::{CredentialSource, ForwarderKind, GatewayConfig, GuardKind, Transport};
use supagate_guard::{AstGuard, PatternGuard, QueryGuard};
use supagate_mcp::{GatewayServer, supabase_tools};
use supagate_policy::{AccessPolicy, is_write_operation};
use supagate_supabase::{Forwarder, ManagementApiForwarder, MockForwarder};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "supagate", version, about = "Supagate CLI")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the gateway.
    Serve {
        /// Path to the gateway configuration file
        #[arg(long, default_value = "supagate.yaml")]
        config: PathBuf,

        /// Override the transport named in the configuration (stdio or http)
        #[arg(long)]
        transport: Option<String>,
    },

    /// Validate a configuration file without starting the gateway.
    Check {
        /// Path to the gateway configuration file
        #[arg(long, default_value = "supagate.yaml")]
        config: PathBuf,
    },

    /// List the tool catalog and each tool's disposition under the policy.
    Tools {
        /// Path to the gateway configuration file
        #[arg(long, default_value = "supagate.yaml")]
        config: PathBuf,

        /// Emit the listing as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr: under the stdio transport, stdout carries the
    // JSON-RPC stream and must stay clean.
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Serve { config, transport } => run_serve(&config, transport.as_deref()).await?,
        Command::Check { config } => run_check(&config).await?,
        Command::Tools { config, json } => run_tools(&config, json).await?,
    }

    Ok(())
}

// -----------------------------
// serve
// -----------------------------

async fn run_serve(config_path: &Path, transport: Option<&str>) -> anyhow::Result<()> {
    let mut config = GatewayConfig::load(config_path)?;
    if let Some(transport) = transport {
        config.mcp.transport = parse_transport(transport)?;
        // The override can produce combinations the file never had, e.g.
        // header credentials over stdio.
        config.validate()?;
    }
    let config = Arc::new(config);

    if !config.mcp.enabled {
        return Err(anyhow::anyhow!(
            "MCP is disabled in {} (mcp.enabled: false). Enable it to serve.",
            config_path.display()
        ));
    }

    let guard = build_guard(&config);
    let forwarder = build_forwarder(&config)?;

    tracing::info!(
        gateway = %config.display_name(),
        guard = guard.name(),
        forwarder = forwarder.name(),
        read_only = config.policy.read_only,
        "starting gateway"
    );

    let server = GatewayServer::new(config, guard, forwarder);
    server.run().await?;
    Ok(())
}

fn parse_transport(value: &str) -> anyhow::Result<Transport> {
    match value {
        "stdio" => Ok(Transport::Stdio),
        "http" => Ok(Transport::Http),
        other => Err(anyhow::anyhow!(
            "unknown transport '{other}' (expected stdio or http)"
        )),
    }
}

fn build_guard(config: &GatewayConfig) -> Arc<dyn QueryGuard> {
    match config.guard {
        GuardKind::Pattern => Arc::new(PatternGuard::new()),
        GuardKind::Ast => Arc::new(AstGuard::new()),
    }
}

fn build_forwarder(config: &GatewayConfig) -> anyhow::Result<Arc<dyn Forwarder>> {
    match config.forwarder {
        ForwarderKind::Mock => Ok(Arc::new(MockForwarder::new())),
        ForwarderKind::Live => {
            let token = match config.credentials.source {
                CredentialSource::Env => {
                    let token = config.supabase.resolve_access_token();
                    if token.is_none() {
                        tracing::warn!(
                            variable = %config.supabase.access_token_env,
                            "access token variable is not set; live requests will be rejected"
                        );
                    }
                    token
                }
                // Header mode: each HTTP request carries its own token.
                CredentialSource::Header => None,
            };
            let forwarder =
                ManagementApiForwarder::new(config.supabase.api_url.clone(), token)?;
            Ok(Arc::new(forwarder))
        }
    }
}

// -----------------------------
// check
// -----------------------------

async fn run_check(config_path: &Path) -> anyhow::Result<()> {
    let config = GatewayConfig::from_file(config_path)?;

    let mut errors: Vec<String> = Vec::new();
    if let Err(e) = config.validate() {
        errors.push(e.to_string());
    }

    let warnings = config_warnings(&config);

    if !errors.is_empty() {
        println!("✖ Configuration is invalid ({} error(s)):", errors.len());
        for e in errors {
            println!("  - {}", e);
        }
        for w in &warnings {
            println!("  (warning) {}", w);
        }
        return Err(anyhow::anyhow!("Configuration check failed"));
    }

    println!("✔ Configuration is valid.");
    println!("  - file: {}", config_path.display());
    println!("  - gateway: {}", config.display_name());
    println!("  - transport: {}", transport_summary(&config));
    println!("  - guard: {}", guard_label(&config));
    println!("  - forwarder: {}", forwarder_label(&config));
    println!("  - read-only: {}", config.policy.read_only);
    println!(
        "  - blocked operations: {}",
        config.policy.blocked_operations.len()
    );
    for w in &warnings {
        println!("  (warning) {}", w);
    }
    Ok(())
}

/// Non-fatal findings: the configuration is servable but probably does not
/// do what its author meant.
fn config_warnings(config: &GatewayConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.mcp.enabled {
        warnings.push("mcp.enabled is false; `supagate serve` will refuse to start".to_string());
    }

    if config.forwarder == ForwarderKind::Mock {
        warnings.push("mock forwarder selected; no requests will reach Supabase".to_string());
    }

    if config.forwarder == ForwarderKind::Live
        && config.credentials.source == CredentialSource::Env
        && config.supabase.resolve_access_token().is_none()
    {
        warnings.push(format!(
            "access token variable '{}' is not set; live requests will be rejected",
            config.supabase.access_token_env
        ));
    }

    let catalog = supabase_tools();
    let known: BTreeSet<&str> = catalog.iter().map(|t| t.name.as_str()).collect();
    for operation in &config.policy.blocked_operations {
        if !known.contains(operation.as_str()) {
            warnings.push(format!(
                "blocked operation '{}' is not a known tool (run `supagate tools`)",
                operation
            ));
        } else if config.policy.read_only && is_write_operation(operation) {
            warnings.push(format!(
                "blocked operation '{}' is a write tool that read_only already denies",
                operation
            ));
        }
    }

    warnings
}

fn transport_summary(config: &GatewayConfig) -> String {
    match config.mcp.transport {
        Transport::Stdio => "stdio".to_string(),
        Transport::Http => format!("http on {}", config.mcp.bind_addr()),
    }
}

fn guard_label(config: &GatewayConfig) -> &'static str {
    match config.guard {
        GuardKind::Pattern => "pattern",
        GuardKind::Ast => "ast",
    }
}

fn forwarder_label(config: &GatewayConfig) -> &'static str {
    match config.forwarder {
        ForwarderKind::Live => "live",
        ForwarderKind::Mock => "mock",
    }
}

// -----------------------------
// tools
// -----------------------------

async fn run_tools(config_path: &Path, as_json: bool) -> anyhow::Result<()> {
    let config = GatewayConfig::load(config_path)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&tool_listing(&config))?);
        return Ok(());
    }

    let policy = AccessPolicy::new(config.policy.clone());
    let catalog = supabase_tools();

    println!("Tools ({}):", catalog.len());
    for tool in &catalog {
        let kind = if is_write_operation(&tool.name) {
            "write"
        } else {
            "read"
        };
        match policy.check_operation_allowed(&tool.name) {
            Ok(()) => println!("  - {:<24} kind={:<6} allowed", tool.name, kind),
            Err(denial) => println!("  - {:<24} kind={:<6} denied: {}", tool.name, kind, denial),
        }
    }
    println!(
        "  (note) execute_sql is classified per query by the '{}' guard.",
        guard_label(&config)
    );
    Ok(())
}

/// One JSON entry per catalog tool with its policy disposition. Raw SQL is
/// not inspected here; `execute_sql` only reports the operation-level view.
fn tool_listing(config: &GatewayConfig) -> Vec<serde_json::Value> {
    let policy = AccessPolicy::new(config.policy.clone());
    supabase_tools()
        .iter()
        .map(|tool| {
            let disposition = policy.check_operation_allowed(&tool.name);
            json!({
                "name": tool.name,
                "write": is_write_operation(&tool.name),
                "allowed": disposition.is_ok(),
                "reason": disposition.err().map(|e| e.to_string()),
            })
        })
        .collect()
}
