//! Core data types for the Proteus server
//!
//! Defines the configuration-sourced definitions of tools and resources.
//! These are pure data: the registry snapshots them, the dispatcher reads
//! them, and the execution engine interprets tool bodies at call time.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A configured tool definition
///
/// `body` is opaque source text in the step language interpreted by
/// [`crate::engine::ExecutionEngine`]; it is never compiled into the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    /// Unique tool name (later duplicates in config win over earlier ones)
    pub name: String,

    /// Human-readable description shown to callers
    pub description: String,

    /// JSON Schema describing accepted arguments
    ///
    /// Documentation for callers; not enforced server-side.
    #[serde(default = "default_input_schema")]
    pub input_schema: Value,

    /// Tool body, interpreted at call time
    pub body: String,
}

fn default_input_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

/// A configured static resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceDefinition {
    /// Unique resource identifier
    pub uri: String,

    /// Display name
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// Static text returned verbatim on read
    pub content: String,
}

/// Top-level server configuration document
///
/// Deserialized from YAML; missing fields fall back to the defaults below so
/// an absent or empty config file still yields a runnable server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Server display name
    #[serde(default = "default_server_name")]
    pub name: String,

    /// Server version string
    #[serde(default = "default_server_version")]
    pub version: String,

    /// Configured tools
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,

    /// Configured resources
    #[serde(default)]
    pub resources: Vec<ResourceDefinition>,
}

fn default_server_name() -> String {
    "Proteus MCP Server".to_string()
}

fn default_server_version() -> String {
    "0.1.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            version: default_server_version(),
            tools: Vec::new(),
            resources: Vec::new(),
        }
    }
}
