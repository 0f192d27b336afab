//! Embedder trait

use async_trait::async_trait;

use crate::Result;

/// Trait for text embedding backends
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Prepare the backend (load or reach the model). Failure is fatal.
    async fn initialize(&mut self) -> Result<()>;

    /// Embed a batch of texts; output order matches input order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query string
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| crate::Error::Embedding("embedder returned no vector".to_string()))
    }

    /// Identifier of the embedding model
    fn model_id(&self) -> &str;
}
