//! Knowledge-base storage
//!
//! The memory store is a narrow external collaborator: the dispatcher and
//! the execution engine only ever add text, run a similarity search, or ask
//! for the document count. Everything behind that interface is swappable.

pub mod lexical;

use crate::error::Result;
use async_trait::async_trait;

pub use lexical::LexicalStore;

/// Memory-store collaborator interface
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Store `content` and return its document id
    async fn add(&self, content: &str) -> Result<String>;

    /// Return up to `k` stored documents ranked by similarity to `query`
    async fn search(&self, query: &str, k: usize) -> Result<Vec<String>>;

    /// Number of stored documents
    async fn count(&self) -> Result<usize>;
}
