//! Write path: load, mask, split, embed, upsert

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use billguard_core::{
    DocumentLoader, Embedder, EntityDetector, Error, PipelineConfig, Result, TextSplitter,
    VectorRecord, VectorStore,
};
use billguard_pii::{DocumentTransformer, Redactor};

use crate::splitter::RecursiveSplitter;

/// Counts from one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestionReport {
    pub files_loaded: usize,
    pub files_failed: usize,
    pub documents: usize,
    pub chunks: usize,
    pub records_written: usize,
}

/// Ingests a directory of PDFs into a vector store with PII masked
pub struct IngestionPipeline<L, D, E, V>
where
    L: DocumentLoader,
    D: EntityDetector,
    E: Embedder,
    V: VectorStore,
{
    config: PipelineConfig,
    loader: L,
    transformer: DocumentTransformer<D>,
    splitter: RecursiveSplitter,
    embedder: E,
    store: V,
}

impl<L, D, E, V> IngestionPipeline<L, D, E, V>
where
    L: DocumentLoader,
    D: EntityDetector,
    E: Embedder,
    V: VectorStore,
{
    pub fn new(config: PipelineConfig, loader: L, detector: D, embedder: E, store: V) -> Result<Self> {
        config.validate()?;
        let splitter = RecursiveSplitter::from_config(&config)?;
        let redactor = Redactor::new(detector).with_language(config.language.clone());

        Ok(Self {
            config,
            loader,
            transformer: DocumentTransformer::new(redactor),
            splitter,
            embedder,
            store,
        })
    }

    pub fn store(&self) -> &V {
        &self.store
    }

    /// Run the pipeline once.
    ///
    /// No documents is a normal outcome and leaves the store untouched. Load
    /// failures of individual files are skipped; any other failure aborts.
    pub async fn run(&mut self) -> Result<IngestionReport> {
        info!("Loading PDFs from {}...", self.config.data_dir.display());
        let loaded = self.loader.load_directory(&self.config.data_dir).await?;

        let mut report = IngestionReport {
            files_loaded: loaded.files_loaded,
            files_failed: loaded.failed_files.len(),
            documents: loaded.documents.len(),
            ..Default::default()
        };

        if loaded.documents.is_empty() {
            info!("No documents to process. Exiting.");
            return Ok(report);
        }

        info!("Masking PII...");
        let masked = self.transformer.transform_documents(&loaded.documents)?;

        info!("Splitting text...");
        let chunks = self.splitter.split_documents(&masked);
        report.chunks = chunks.len();
        info!("Created {} chunks.", chunks.len());

        if chunks.is_empty() {
            warn!("Documents contained no extractable text; nothing to store.");
            return Ok(report);
        }

        info!("Initializing embeddings ({})...", self.embedder.model_id());
        self.embedder.initialize().await?;

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.embedder.embed(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(Error::Embedding(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let records: Vec<VectorRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| VectorRecord {
                id: chunk.id(),
                embedding,
                metadata: chunk.metadata,
                text: chunk.text,
            })
            .collect();

        info!("Creating/Updating vector store in {}...", self.config.store_dir.display());
        self.store.connect().await?;
        report.records_written = self.store.upsert(records).await?;

        info!("Ingestion complete. Vector store saved.");
        Ok(report)
    }
}
