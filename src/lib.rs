//! Proteus - Dynamically Configurable MCP Tool Server
//!
//! Proteus exposes a set of named tools and resources over the Model
//! Context Protocol. Unlike a conventional server, the tool set is data:
//! definitions live in a YAML document, are rebuilt into an immutable
//! registry snapshot on every change, and tool bodies are interpreted at
//! call time by a small step language with an explicit capability set.
//!
//! # Architecture
//!
//! - **Types / Config**: the configuration document and its manager
//! - **Registry**: immutable tool/resource snapshots, swapped on reload
//! - **Engine**: tool-body interpretation with argument binding and
//!   fault capture
//! - **Storage**: the knowledge-base memory store behind a narrow trait
//! - **MCP**: JSON-RPC dispatcher and stdio transport
//! - **API**: operator HTTP surface (health, metrics, config)
//!
//! # Example
//!
//! ```ignore
//! use proteus_core::{CapabilityRegistry, Dispatcher, LexicalStore, Metrics};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = Arc::new(CapabilityRegistry::empty());
//!     let store = Arc::new(LexicalStore::new());
//!     let metrics = Arc::new(Metrics::new());
//!     let dispatcher = Dispatcher::new(registry, store, metrics);
//!
//!     let content = dispatcher
//!         .call_tool("kb_add", serde_json::Map::from_iter([(
//!             "content".to_string(),
//!             serde_json::json!("tools are data"),
//!         )]))
//!         .await?;
//!     println!("{}", content[0].text);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod mcp;
pub mod metrics;
pub mod registry;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use config::ConfigManager;
pub use engine::{Capabilities, ExecutionEngine, ExecutionResult};
pub use error::{ProteusError, Result};
pub use mcp::{Dispatcher, McpServer, TextContent};
pub use metrics::{Metrics, MetricsSnapshot};
pub use registry::{CapabilityRegistry, RegistrySnapshot};
pub use storage::{LexicalStore, MemoryStore};
pub use types::{ResourceDefinition, ServerConfig, ToolDefinition};
