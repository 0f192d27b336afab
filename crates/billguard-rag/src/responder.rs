//! Answers questions from retrieved chunks

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::info;

use billguard_core::{
    Embedder, Error, GenerationConfig, LLMProvider, PipelineConfig, Result, SearchConfig,
    VectorRecord, VectorStore, PAGE_KEY, SOURCE_KEY,
};

use crate::prompt::PromptTemplate;

/// Where a retrieved chunk came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub source: String,
    pub page: Option<u64>,
}

impl SourceRef {
    pub fn from_record(record: &VectorRecord) -> Self {
        let source = record
            .metadata
            .get(SOURCE_KEY)
            .and_then(|v| v.as_str())
            .and_then(|s| Path::new(s).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Unknown".to_string());

        Self {
            source,
            page: record.metadata.get(PAGE_KEY).and_then(|v| v.as_u64()),
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.page {
            Some(page) => write!(f, "{} (Page {})", self.source, page),
            None => write!(f, "{} (Page ?)", self.source),
        }
    }
}

/// An answer and the chunks it was grounded on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<SourceRef>,
}

/// Sampling temperature for answers
pub const ANSWER_TEMPERATURE: f32 = 0.0;

/// Retrieves the top-k chunks for a query and asks the language model to
/// answer from them alone
pub struct QueryResponder<E: Embedder, V: VectorStore, L: LLMProvider> {
    config: PipelineConfig,
    embedder: E,
    store: V,
    llm: L,
    initialized: bool,
}

impl<E: Embedder, V: VectorStore, L: LLMProvider> QueryResponder<E, V, L> {
    pub fn new(config: PipelineConfig, embedder: E, store: V, llm: L) -> Self {
        Self {
            config,
            embedder,
            store,
            llm,
            initialized: false,
        }
    }

    /// Open the store and bring up both models.
    ///
    /// A missing or empty store fails with [`Error::StoreNotFound`] before
    /// either model is contacted.
    pub async fn initialize(&mut self) -> Result<()> {
        if !self.store.exists() {
            return Err(Error::StoreNotFound(self.config.store_dir.clone()));
        }
        self.store.connect().await?;
        if self.store.count().await? == 0 {
            return Err(Error::StoreNotFound(self.config.store_dir.clone()));
        }

        self.embedder.initialize().await?;
        self.llm.connect().await.map_err(|e| match e {
            Error::LLMInit(_) => e,
            other => Error::LLMInit(other.to_string()),
        })?;

        self.initialized = true;
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.initialized && self.store.is_connected()
    }

    /// Answer `query`, optionally with a custom template containing
    /// `{context}` and `{input}`
    pub async fn answer(&self, query: &str, template: Option<&str>) -> Result<QueryResponse> {
        let template = match template {
            Some(custom) => PromptTemplate::parse(custom)?,
            None => PromptTemplate::default(),
        };
        self.answer_with_template(query, &template).await
    }

    pub async fn answer_with_template(
        &self,
        query: &str,
        template: &PromptTemplate,
    ) -> Result<QueryResponse> {
        if query.trim().is_empty() {
            return Err(Error::InvalidInput("query must not be empty".to_string()));
        }
        if !self.is_ready() {
            return Err(Error::Other("Query responder not initialized".to_string()));
        }

        info!("Querying: {}", query);
        let query_vector = self.embedder.embed_query(query).await?;
        let search_config = SearchConfig {
            top_k: self.config.top_k,
        };
        let result = self.store.search_by_vector(&query_vector, &search_config).await?;

        let context = result
            .records
            .iter()
            .map(|scored| scored.record.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let prompt = template.render(&context, query);

        let generation_config = GenerationConfig {
            model_id: self.llm.model_id().to_string(),
            temperature: Some(ANSWER_TEMPERATURE),
        };
        let generation = self.llm.generate_with_config(&prompt, &generation_config).await?;

        Ok(QueryResponse {
            answer: generation.text,
            sources: result
                .records
                .iter()
                .map(|scored| SourceRef::from_record(&scored.record))
                .collect(),
        })
    }
}
