//! Thin HTTP wrapper around the Ollama REST API

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use billguard_core::{Error, Result};

use crate::config::OllamaConfig;

#[derive(Debug, Deserialize)]
pub(crate) struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModelTag {
    pub name: String,
}

#[derive(Debug, Default, Serialize, PartialEq)]
pub(crate) struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    #[serde(skip_serializing_if = "is_default_options")]
    pub options: GenerateOptions,
}

fn is_default_options(options: &GenerateOptions) -> bool {
    *options == GenerateOptions::default()
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    pub response: String,
    #[serde(default)]
    pub eval_count: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EmbedRequest<'a> {
    pub model: &'a str,
    pub input: &'a [String],
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbedResponse {
    pub embeddings: Vec<Vec<f32>>,
}

/// Whether `model` is among the installed tags (`phi3` matches `phi3:latest`)
pub(crate) fn has_model(tags: &TagsResponse, model: &str) -> bool {
    tags.models.iter().any(|tag| {
        tag.name == model
            || tag
                .name
                .strip_prefix(model)
                .is_some_and(|rest| rest.starts_with(':'))
    })
}

/// HTTP access to an Ollama server
#[derive(Clone)]
pub struct OllamaApi {
    config: OllamaConfig,
    client: Client,
}

impl OllamaApi {
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Fetch the installed models
    pub(crate) async fn tags(&self) -> Result<TagsResponse> {
        let url = self.config.endpoint("api/tags");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Network(format!("could not reach Ollama at {}: {}", self.config.base_url, e)))?;

        if !response.status().is_success() {
            return Err(Error::Network(format!(
                "Ollama returned {} for {}",
                response.status(),
                url
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Check that the server is up and `model` is pulled
    pub async fn ensure_model(&self, model: &str) -> Result<()> {
        let tags = self.tags().await?;
        if has_model(&tags, model) {
            Ok(())
        } else {
            Err(Error::Configuration(format!(
                "model '{}' is not available on {}. Run `ollama pull {}`.",
                model, self.config.base_url, model
            )))
        }
    }

    pub(crate) async fn generate(&self, request: &GenerateRequest<'_>) -> Result<GenerateResponse> {
        let url = self.config.endpoint("api/generate");
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::LLMProvider(format!(
                "Ollama generate request failed with status {}: {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))
    }

    pub(crate) async fn embed(&self, request: &EmbedRequest<'_>) -> Result<EmbedResponse> {
        let url = self.config.endpoint("api/embed");
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Embedding(format!(
                "Ollama embed request failed with status {}: {}",
                status, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(names: &[&str]) -> TagsResponse {
        TagsResponse {
            models: names.iter().map(|n| ModelTag { name: n.to_string() }).collect(),
        }
    }

    #[test]
    fn test_has_model_matches_tag_suffix() {
        let installed = tags(&["phi3:latest", "all-minilm:l6-v2"]);
        assert!(has_model(&installed, "phi3"));
        assert!(has_model(&installed, "phi3:latest"));
        assert!(has_model(&installed, "all-minilm"));
        assert!(!has_model(&installed, "phi"));
        assert!(!has_model(&installed, "llama3"));
    }

    #[test]
    fn test_tags_tolerates_missing_models_field() {
        let parsed: TagsResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.models.is_empty());
    }
}
