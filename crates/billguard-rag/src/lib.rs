//! Ingestion and retrieval pipeline for billguard
//!
//! This crate provides the PDF loader, the recursive text splitter, the
//! directory-backed vector store, and the two orchestrations built on them:
//! [`IngestionPipeline`] (load, mask, split, embed, upsert) and
//! [`QueryResponder`] (retrieve, prompt, answer with sources).

mod ingest;
mod loader;
mod prompt;
mod responder;
mod splitter;
mod vector_store;


pub use ingest::{IngestionPipeline, IngestionReport};
pub use loader::{PdfLoader, pdf_files};
pub use prompt::{PromptTemplate, DEFAULT_PROMPT_TEMPLATE};
pub use responder::{QueryResponder, QueryResponse, SourceRef, ANSWER_TEMPERATURE};
pub use splitter::RecursiveSplitter;
pub use vector_store::{LocalVectorStore, cosine_similarity};

// Re-export core types for convenience
pub use billguard_core::{
    Chunk, Document, DocumentLoader, Embedder, Error, LLMProvider, LoadResult, PipelineConfig,
    Result, SearchConfig, TextSplitter, VectorRecord, VectorStore,
};
