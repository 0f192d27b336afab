//! Ollama embedding backend

use async_trait::async_trait;
use tracing::{debug, info};

use billguard_core::{Embedder, Error, Result};

use crate::api::{EmbedRequest, OllamaApi};
use crate::config::OllamaConfig;

/// Computes embeddings with a model served by Ollama
pub struct OllamaEmbedder {
    api: OllamaApi,
    model: String,
    batch_size: usize,
    initialized: bool,
}

impl OllamaEmbedder {
    /// Ollama's packaging of sentence-transformers/all-MiniLM-L6-v2
    pub const ALL_MINILM: &'static str = "all-minilm";
    pub const DEFAULT_BATCH_SIZE: usize = 32;

    pub fn new(config: OllamaConfig, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api: OllamaApi::new(config)?,
            model: model.into(),
            batch_size: Self::DEFAULT_BATCH_SIZE,
            initialized: false,
        })
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn initialize(&mut self) -> Result<()> {
        self.api
            .ensure_model(&self.model)
            .await
            .map_err(|e| Error::Embedding(format!("failed to initialize embeddings: {}", e)))?;

        info!(model = %self.model, "embedding model ready");
        self.initialized = true;
        Ok(())
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if !self.initialized {
            return Err(Error::Embedding(
                "Embedder not initialized. Call initialize() first.".to_string(),
            ));
        }

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let request = EmbedRequest {
                model: &self.model,
                input: batch,
            };
            let response = self.api.embed(&request).await?;
            if response.embeddings.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "expected {} embeddings, Ollama returned {}",
                    batch.len(),
                    response.embeddings.len()
                )));
            }
            debug!(batch = batch.len(), "embedded batch");
            vectors.extend(response.embeddings);
        }

        Ok(vectors)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
