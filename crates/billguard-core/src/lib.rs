//! Core traits and types for billguard
//!
//! This crate defines the data model shared by every stage of the pipeline
//! (documents, chunks, detected PII spans, vector records) and the
//! capability-facing traits for entity detection, loading, splitting,
//! embedding, vector storage and language models. Concrete backends live in
//! sibling crates so orchestration can be tested with fakes.

pub mod config;
pub mod document;
pub mod document_loader;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod pii;
pub mod vector_store;


pub use config::PipelineConfig;
pub use document::{
    Chunk, Document, Metadata, CHUNK_INDEX_KEY, PAGE_KEY, PII_MASKED_KEY, SOURCE_KEY,
};
pub use document_loader::{DocumentLoader, LoadResult, TextSplitter};
pub use embedding::Embedder;
pub use error::{Error, Result};
pub use llm::{GenerationConfig, GenerationResult, LLMProvider};
pub use pii::{DetectedSpan, EntityDetector, PiiCategory};
pub use vector_store::{ScoredRecord, SearchConfig, SearchResult, VectorRecord, VectorStore};
