//! Request dispatcher
//!
//! Answers the four protocol operations against the current registry
//! snapshot. The built-in knowledge-base tools are matched before the
//! snapshot is consulted, so they are always present and always shadow
//! same-named configured tools. Metric increments happen before the
//! response is produced, so a caller that gets a response and then reads
//! the metrics sees at least its own increment.

use crate::engine::{Capabilities, ExecutionEngine};
use crate::error::{ProteusError, Result};
use crate::metrics::Metrics;
use crate::registry::CapabilityRegistry;
use crate::storage::MemoryStore;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Knowledge-base hits returned per `kb_search` call
const KB_SEARCH_RESULTS: usize = 3;

/// A text block in a tool-call response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextContent {
    /// Always "text"
    #[serde(rename = "type")]
    pub content_type: String,

    /// The payload
    pub text: String,
}

impl TextContent {
    /// Wrap `text` as a text content block
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_string(),
            text: text.into(),
        }
    }
}

/// Tool descriptor as listed to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Tool name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON Schema for the arguments
    pub input_schema: Value,
}

/// Resource descriptor as listed to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    /// Resource identifier
    pub uri: String,
    /// Display name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Always "text/plain"
    pub mime_type: String,
}

/// Stateless request dispatcher over the registry, engine, and store
pub struct Dispatcher {
    registry: Arc<CapabilityRegistry>,
    store: Arc<dyn MemoryStore>,
    metrics: Arc<Metrics>,
    engine: ExecutionEngine,
}

impl Dispatcher {
    /// Create a dispatcher
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        store: Arc<dyn MemoryStore>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            registry,
            store,
            metrics,
            engine: ExecutionEngine::new(),
        }
    }

    /// The shared metrics recorder
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// The memory-store collaborator
    pub fn store(&self) -> &Arc<dyn MemoryStore> {
        &self.store
    }

    /// List the built-in tools plus every configured tool
    ///
    /// Snapshot-consistent: one snapshot serves the whole listing.
    /// Configured tools are sorted by name for stable output.
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        let snapshot = self.registry.current_snapshot();

        let mut configured: Vec<ToolDescriptor> = snapshot
            .tools()
            .map(|tool| ToolDescriptor {
                name: tool.name.clone(),
                description: tool.description.clone(),
                input_schema: tool.input_schema.clone(),
            })
            .collect();
        configured.sort_by(|a, b| a.name.cmp(&b.name));

        let mut tools = builtin_tools();
        tools.extend(configured);
        tools
    }

    /// List every configured resource, sorted by uri
    pub fn list_resources(&self) -> Vec<ResourceDescriptor> {
        let snapshot = self.registry.current_snapshot();

        let mut resources: Vec<ResourceDescriptor> = snapshot
            .resources()
            .map(|resource| ResourceDescriptor {
                uri: resource.uri.clone(),
                name: resource.name.clone(),
                description: resource.description.clone(),
                mime_type: "text/plain".to_string(),
            })
            .collect();
        resources.sort_by(|a, b| a.uri.cmp(&b.uri));
        resources
    }

    /// Invoke a tool by name
    ///
    /// Unknown names fail with [`ProteusError::ToolNotFound`] (a protocol
    /// error); a tool that exists but misbehaves is a content-level outcome
    /// and still returns `Ok` with the failure text.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<Vec<TextContent>> {
        self.metrics.record_tool_call();
        debug!("Calling tool: {}", name);

        match name {
            "kb_search" => {
                self.metrics.record_vector_query();
                let query = string_argument(&arguments, "query");
                let hits = self.store.search(&query, KB_SEARCH_RESULTS).await?;
                Ok(vec![TextContent::new(hits.join("\n"))])
            }
            "kb_add" => {
                let content = string_argument(&arguments, "content");
                let id = self.store.add(&content).await?;
                Ok(vec![TextContent::new(format!("Added to KB with ID: {id}"))])
            }
            _ => self.call_configured_tool(name, arguments).await,
        }
    }

    async fn call_configured_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<Vec<TextContent>> {
        let snapshot = self.registry.current_snapshot();
        let Some(tool) = snapshot.tool(name) else {
            warn!("Unknown tool: {}", name);
            self.metrics.record_error();
            return Err(ProteusError::ToolNotFound(name.to_string()));
        };

        let capabilities = Capabilities::new().with_memory_store(self.store.clone());
        let result = self.engine.execute(&tool.body, &arguments, &capabilities).await;

        if !result.is_success() {
            self.metrics.record_error();
        }
        // Execution failures are reported as content, not protocol errors
        Ok(vec![TextContent::new(result.text())])
    }

    /// Read a resource's static content by uri
    ///
    /// `resources_read` increments before the lookup, so it fires on misses
    /// too.
    pub async fn read_resource(&self, uri: &str) -> Result<String> {
        self.metrics.record_resource_read();
        debug!("Reading resource: {}", uri);

        let snapshot = self.registry.current_snapshot();
        match snapshot.resource(uri) {
            Some(resource) => Ok(resource.content.clone()),
            None => {
                warn!("Unknown resource: {}", uri);
                self.metrics.record_error();
                Err(ProteusError::ResourceNotFound(uri.to_string()))
            }
        }
    }
}

/// The always-present knowledge-base tools
fn builtin_tools() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "kb_search".to_string(),
            description: "Search the knowledge base for information".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Search query"}
                },
                "required": ["query"]
            }),
        },
        ToolDescriptor {
            name: "kb_add".to_string(),
            description: "Add information to the knowledge base".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "content": {"type": "string", "description": "Content to add"}
                },
                "required": ["content"]
            }),
        },
    ]
}

/// Fetch a string argument, defaulting to empty (mirrors the lenient
/// argument handling of the built-in tools)
fn string_argument(arguments: &Map<String, Value>, key: &str) -> String {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
