//! Ollama language model client

use async_trait::async_trait;
use tracing::{debug, info};

use billguard_core::{Error, GenerationConfig, GenerationResult, LLMProvider, Result};

use crate::api::{GenerateOptions, GenerateRequest, OllamaApi};
use crate::config::OllamaConfig;

/// Generates text with a model served by Ollama
pub struct OllamaClient {
    api: OllamaApi,
    current_model: String,
    connected: bool,
}

impl OllamaClient {
    /// Model constants
    pub const PHI3: &'static str = "phi3";

    /// Create a new Ollama client from configuration
    pub fn new(config: OllamaConfig) -> Result<Self> {
        Ok(Self {
            api: OllamaApi::new(config)?,
            current_model: Self::PHI3.to_string(),
            connected: false,
        })
    }

    /// Create a new Ollama client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(OllamaConfig::from_env()?)
    }

    /// Set the model to use for generation
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.current_model = model_id.into();
        self
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

pub(crate) fn build_request<'a>(prompt: &'a str, config: &'a GenerationConfig) -> GenerateRequest<'a> {
    GenerateRequest {
        model: &config.model_id,
        prompt,
        stream: false,
        options: GenerateOptions {
            temperature: config.temperature,
        },
    }
}

#[async_trait]
impl LLMProvider for OllamaClient {
    async fn connect(&mut self) -> Result<()> {
        self.api
            .ensure_model(&self.current_model)
            .await
            .map_err(|e| Error::LLMInit(e.to_string()))?;

        info!(model = %self.current_model, url = %self.api.config().base_url, "connected to Ollama");
        self.connected = true;
        Ok(())
    }

    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        let config = GenerationConfig {
            model_id: self.current_model.clone(),
            ..Default::default()
        };
        self.generate_with_config(prompt, &config).await
    }

    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        if !self.connected {
            return Err(Error::LLMProvider(
                "Not connected. Call connect() first.".to_string(),
            ));
        }

        debug!(model = %config.model_id, prompt_chars = prompt.len(), "sending generate request");
        let response = self.api.generate(&build_request(prompt, config)).await?;

        let text = response.response.trim().to_string();
        if text.is_empty() {
            return Err(Error::LLMProvider("Empty response from Ollama".to_string()));
        }

        Ok(GenerationResult {
            text,
            model_id: config.model_id.clone(),
            tokens_used: response.eval_count,
        })
    }

    fn model_id(&self) -> &str {
        &self.current_model
    }
}
