//! Request metrics
//!
//! Process-wide monotonic counters incremented by the dispatcher. The
//! recorder is an explicitly shared structure (`Arc<Metrics>`) updated with
//! atomic increments; there is no reset and no persistence. The snapshot
//! fetches the knowledge-base document count live from the memory store
//! rather than caching it.

use crate::error::Result;
use crate::storage::MemoryStore;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared counter state for the dispatcher
#[derive(Debug, Default)]
pub struct Metrics {
    tools_called: AtomicU64,
    resources_read: AtomicU64,
    vector_queries: AtomicU64,
    errors: AtomicU64,
}

/// Point-in-time metrics view exposed to operators
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsSnapshot {
    /// Total tool invocations, including failures and unknown names
    pub tools_called: u64,
    /// Total resource reads, including misses
    pub resources_read: u64,
    /// Knowledge-base similarity searches
    pub vector_queries: u64,
    /// Lookup misses plus execution failures
    pub errors: u64,
    /// Current knowledge-base document count (live, not cached)
    pub kb_count: u64,
}

impl Metrics {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tool invocation
    pub fn record_tool_call(&self) {
        self.tools_called.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a resource read
    pub fn record_resource_read(&self) {
        self.resources_read.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a knowledge-base similarity search
    pub fn record_vector_query(&self) {
        self.vector_queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lookup miss or execution failure
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Current counter values plus the live knowledge-base count
    pub async fn snapshot(&self, store: &dyn MemoryStore) -> Result<MetricsSnapshot> {
        let kb_count = store.count().await? as u64;
        Ok(MetricsSnapshot {
            tools_called: self.tools_called.load(Ordering::Relaxed),
            resources_read: self.resources_read.load(Ordering::Relaxed),
            vector_queries: self.vector_queries.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            kb_count,
        })
    }
}
