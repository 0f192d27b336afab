//! Vector store trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Metadata, Result};

/// A chunk persisted with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    pub metadata: Metadata,
    pub text: String,
}

/// A record returned from a similarity search together with its score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub record: VectorRecord,
    pub score: f32,
}

/// Search result from vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub records: Vec<ScoredRecord>,
}

/// Configuration for vector search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

/// Trait for persistent vector stores
///
/// Stores assume a single writer. Concurrent ingestion into the same store
/// is not coordinated.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Open the store, loading persisted records if present
    async fn connect(&mut self) -> Result<()>;

    /// Whether persisted data exists for this store
    fn exists(&self) -> bool;

    /// Insert or replace records by id, persisting the result
    async fn upsert(&mut self, records: Vec<VectorRecord>) -> Result<usize>;

    /// Search using a vector embedding
    async fn search_by_vector(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult>;

    /// Get the total number of records
    async fn count(&self) -> Result<usize>;

    /// Check if the vector store is connected
    fn is_connected(&self) -> bool;
}
