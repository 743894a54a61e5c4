//! Capability registry
//!
//! Holds the current set of tool and resource definitions as an immutable
//! snapshot. `rebuild` is the only mutator: it constructs a complete new
//! snapshot and swaps it in wholesale, so concurrent readers holding the
//! previous `Arc` never observe a partially-updated set.

use crate::types::{ResourceDefinition, ServerConfig, ToolDefinition};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Immutable view of the configured tools and resources
///
/// Built-in tools (`kb_search`, `kb_add`) are not part of the snapshot; the
/// dispatcher routes to them before consulting it, which is what gives them
/// precedence over same-named configured tools.
#[derive(Debug, Default)]
pub struct RegistrySnapshot {
    tools: HashMap<String, ToolDefinition>,
    resources: HashMap<String, ResourceDefinition>,
}

impl RegistrySnapshot {
    /// Build a snapshot from configured definitions
    ///
    /// Duplicate names/uris resolve last-defined-wins: entries are inserted
    /// in configuration order and later inserts overwrite earlier ones.
    pub fn build(tools: &[ToolDefinition], resources: &[ResourceDefinition]) -> Self {
        let mut tool_map = HashMap::with_capacity(tools.len());
        for tool in tools {
            tool_map.insert(tool.name.clone(), tool.clone());
        }

        let mut resource_map = HashMap::with_capacity(resources.len());
        for resource in resources {
            resource_map.insert(resource.uri.clone(), resource.clone());
        }

        Self {
            tools: tool_map,
            resources: resource_map,
        }
    }

    /// Look up a configured tool by name
    pub fn tool(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Look up a configured resource by uri
    pub fn resource(&self, uri: &str) -> Option<&ResourceDefinition> {
        self.resources.get(uri)
    }

    /// All configured tools, in arbitrary order
    pub fn tools(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values()
    }

    /// All configured resources, in arbitrary order
    pub fn resources(&self) -> impl Iterator<Item = &ResourceDefinition> {
        self.resources.values()
    }
}

/// Shared registry handle: shared-read, single-writer-replace
pub struct CapabilityRegistry {
    snapshot: RwLock<Arc<RegistrySnapshot>>,
}

impl CapabilityRegistry {
    /// Create a registry populated from `config`
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(RegistrySnapshot::build(
                &config.tools,
                &config.resources,
            ))),
        }
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(RegistrySnapshot::default())),
        }
    }

    /// The current snapshot
    ///
    /// Callers keep the returned `Arc` for the duration of one request so a
    /// concurrent rebuild cannot mix old and new definitions within it.
    pub fn current_snapshot(&self) -> Arc<RegistrySnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replace the snapshot with one built from the given definitions
    pub fn rebuild(&self, tools: &[ToolDefinition], resources: &[ResourceDefinition]) {
        let next = Arc::new(RegistrySnapshot::build(tools, resources));
        debug!(
            "Registry rebuilt: {} tools, {} resources",
            next.tools.len(),
            next.resources.len()
        );

        let mut guard = self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = next;
    }
}
