//! In-process lexical similarity store
//!
//! Embeds documents as hashed term-frequency vectors and ranks matches by
//! cosine similarity. This trades semantic quality for a dependency-free
//! store that behaves like the real collaborator: one suspend point per
//! call, safe under concurrent use, deterministic ids.

use super::MemoryStore;
use crate::error::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tokio::sync::RwLock;
use tracing::debug;

/// Dimensionality of the hashed term-frequency vectors
const EMBEDDING_DIM: usize = 256;

struct Document {
    id: String,
    content: String,
    embedding: Vec<f32>,
}

/// In-memory knowledge base with lexical similarity ranking
#[derive(Default)]
pub struct LexicalStore {
    documents: RwLock<Vec<Document>>,
}

impl LexicalStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemoryStore for LexicalStore {
    async fn add(&self, content: &str) -> Result<String> {
        let id = document_id(content);
        let mut documents = self.documents.write().await;

        // Content-hash ids make re-adding identical content idempotent
        if documents.iter().any(|d| d.id == id) {
            debug!("Document {} already stored, skipping", id);
            return Ok(id);
        }

        documents.push(Document {
            id: id.clone(),
            content: content.to_string(),
            embedding: embed(content),
        });
        debug!("Stored document {} ({} total)", id, documents.len());
        Ok(id)
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<String>> {
        let query_embedding = embed(query);
        let documents = self.documents.read().await;

        let mut scored: Vec<(f32, &Document)> = documents
            .iter()
            .map(|doc| (cosine_similarity(&query_embedding, &doc.embedding), doc))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, doc)| doc.content.clone())
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.documents.read().await.len())
    }
}

/// Deterministic document id: truncated SHA-256 of the content
fn document_id(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let mut id = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        id.push_str(&format!("{byte:02x}"));
    }
    id
}

/// Hashed term-frequency embedding
///
/// Tokens are lowercased alphanumeric runs hashed into a fixed number of
/// buckets; the vector counts bucket occupancy.
fn embed(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; EMBEDDING_DIM];
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        let mut hasher = DefaultHasher::new();
        token.to_lowercase().hash(&mut hasher);
        let bucket = (hasher.finish() as usize) % EMBEDDING_DIM;
        vector[bucket] += 1.0;
    }
    vector
}

/// Calculate cosine similarity between two vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let vec1 = vec![1.0, 0.0, 0.0];
        let vec2 = vec![1.0, 0.0, 0.0];
        let vec3 = vec![0.0, 1.0, 0.0];

        assert!((cosine_similarity(&vec1, &vec2) - 1.0).abs() < 0.01);
        assert!(cosine_similarity(&vec1, &vec3).abs() < 0.01);
        assert_eq!(cosine_similarity(&vec1, &[1.0]), 0.0);
    }

    #[test]
    fn test_document_id_is_deterministic() {
        assert_eq!(document_id("same text"), document_id("same text"));
        assert_ne!(document_id("one"), document_id("two"));
        assert_eq!(document_id("x").len(), 16);
    }

    #[tokio::test]
    async fn test_add_and_count() {
        let store = LexicalStore::new();
        assert_eq!(store.count().await.unwrap(), 0);

        let id = store.add("rust is a systems language").await.unwrap();
        assert!(!id.is_empty());
        assert_eq!(store.count().await.unwrap(), 1);

        // Idempotent re-add
        let again = store.add("rust is a systems language").await.unwrap();
        assert_eq!(id, again);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_search_ranks_overlapping_content_first() {
        let store = LexicalStore::new();
        store.add("the capital of France is Paris").await.unwrap();
        store.add("rust borrow checker rules").await.unwrap();
        store.add("Paris hosts the Louvre museum").await.unwrap();

        let hits = store.search("Paris France", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0], "the capital of France is Paris");
    }

    #[tokio::test]
    async fn test_search_on_empty_store_is_empty() {
        let store = LexicalStore::new();
        assert!(store.search("anything", 3).await.unwrap().is_empty());
    }
}
