//! Vector store persisted as a JSON index inside a directory

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use billguard_core::{
    Error, Result, ScoredRecord, SearchConfig, SearchResult, VectorRecord, VectorStore,
};

#[derive(Debug, Serialize, Deserialize)]
struct StoreData {
    embedding_dimension: usize,
    updated_at: DateTime<Utc>,
    records: Vec<VectorRecord>,
}

/// Brute-force cosine-similarity store kept in `<dir>/index.json`
pub struct LocalVectorStore {
    store_dir: PathBuf,
    records: Vec<VectorRecord>,
    embedding_dimension: Option<usize>,
    connected: bool,
}

impl LocalVectorStore {
    pub const INDEX_FILE: &'static str = "index.json";

    /// Create a store handle for `store_dir`. Nothing is read or written until
    /// `connect` or `upsert`.
    pub fn new(store_dir: impl Into<PathBuf>) -> Self {
        Self {
            store_dir: store_dir.into(),
            records: Vec::new(),
            embedding_dimension: None,
            connected: false,
        }
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    pub fn index_path(&self) -> PathBuf {
        self.store_dir.join(Self::INDEX_FILE)
    }

    /// All records in insertion order
    pub fn records(&self) -> &[VectorRecord] {
        &self.records
    }

    /// The last `n` records in insertion order
    pub fn tail(&self, n: usize) -> &[VectorRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    fn load_from_file(path: &Path) -> Result<StoreData> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| Error::VectorStore(format!("corrupt index {}: {}", path.display(), e)))
    }

    fn save_to_file(&self) -> Result<()> {
        let store_data = StoreData {
            embedding_dimension: self.embedding_dimension.unwrap_or(0),
            updated_at: Utc::now(),
            records: self.records.clone(),
        };

        fs::create_dir_all(&self.store_dir)?;
        let content = serde_json::to_string(&store_data)?;
        fs::write(self.index_path(), content)?;
        Ok(())
    }
}

#[async_trait]
impl VectorStore for LocalVectorStore {
    async fn connect(&mut self) -> Result<()> {
        let path = self.index_path();
        if path.is_file() {
            let data = Self::load_from_file(&path)?;
            self.embedding_dimension = (data.embedding_dimension > 0).then_some(data.embedding_dimension);
            self.records = data.records;
            debug!(records = self.records.len(), path = %path.display(), "loaded vector store");
        }
        self.connected = true;
        Ok(())
    }

    fn exists(&self) -> bool {
        self.index_path().is_file()
    }

    async fn upsert(&mut self, records: Vec<VectorRecord>) -> Result<usize> {
        if !self.connected {
            return Err(Error::VectorStore("Vector store not connected".to_string()));
        }
        if records.is_empty() {
            return Ok(0);
        }

        let dimension = self.embedding_dimension.unwrap_or(records[0].embedding.len());
        if let Some(bad) = records.iter().find(|r| r.embedding.len() != dimension) {
            return Err(Error::VectorStore(format!(
                "record {} has dimension {}, store uses {}",
                bad.id,
                bad.embedding.len(),
                dimension
            )));
        }

        let mut positions: HashMap<String, usize> = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();

        let written = records.len();
        for record in records {
            match positions.get(&record.id) {
                Some(&i) => self.records[i] = record,
                None => {
                    positions.insert(record.id.clone(), self.records.len());
                    self.records.push(record);
                }
            }
        }

        self.embedding_dimension = Some(dimension);
        self.save_to_file()?;
        info!(written, total = self.records.len(), path = %self.index_path().display(), "vector store saved");
        Ok(written)
    }

    async fn search_by_vector(&self, vector: &[f32], config: &SearchConfig) -> Result<SearchResult> {
        if !self.connected {
            return Err(Error::VectorStore("Vector store not connected".to_string()));
        }

        let mut scored: Vec<ScoredRecord> = self
            .records
            .iter()
            .map(|record| ScoredRecord {
                score: cosine_similarity(vector, &record.embedding),
                record: record.clone(),
            })
            .collect();

        // Sort by similarity (highest first)
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(config.top_k);

        Ok(SearchResult { records: scored })
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.len())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Calculate cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
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
