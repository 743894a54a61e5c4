//! Proteus - Dynamically Configurable MCP Tool Server
//!
//! Entry point: loads the YAML configuration, wires the registry, store,
//! metrics, and dispatcher together, serves the operator HTTP API, and
//! optionally speaks MCP over stdio.

use clap::Parser;
use proteus_core::{
    api::{ApiServer, ApiServerConfig, AppState},
    CapabilityRegistry, ConfigManager, Dispatcher, LexicalStore, McpServer, Metrics,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "proteus", version, about = "Dynamically configurable MCP tool server")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "config.yaml")]
    config: String,

    /// HTTP API port
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// Also serve MCP over stdio (for direct client attachment)
    #[arg(long)]
    stdio: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to stderr so stdout stays clean for the stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Arc::new(ConfigManager::load(&cli.config)?);
    let initial = config.current();
    info!("Starting {} v{}", initial.name, initial.version);

    let registry = Arc::new(CapabilityRegistry::from_config(&initial));
    let store = Arc::new(LexicalStore::new());
    let metrics = Arc::new(Metrics::new());
    let dispatcher = Arc::new(Dispatcher::new(registry.clone(), store, metrics));

    // Rebuild the registry whenever the configuration changes
    spawn_reload_task(config.clone(), registry.clone());

    let addr: SocketAddr = ([127, 0, 0, 1], cli.port).into();
    let api = ApiServer::new(
        ApiServerConfig { addr },
        AppState {
            config: config.clone(),
            registry,
            dispatcher: dispatcher.clone(),
        },
    );

    if cli.stdio {
        let mcp = McpServer::new(dispatcher, initial.name.clone(), initial.version.clone());
        tokio::spawn(async move {
            if let Err(e) = api.serve().await {
                error!("HTTP API failed: {}", e);
            }
        });
        mcp.run().await?;
    } else {
        api.serve().await?;
    }

    Ok(())
}

/// Subscribe to config changes and rebuild the registry on each one
fn spawn_reload_task(config: Arc<ConfigManager>, registry: Arc<CapabilityRegistry>) {
    let mut changes = config.subscribe();
    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let current = config.current();
            registry.rebuild(&current.tools, &current.resources);
            info!(
                "Registry reloaded: {} tools, {} resources",
                current.tools.len(),
                current.resources.len()
            );
        }
    });
}
