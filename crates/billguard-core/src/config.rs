//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::{Error, Result};

/// Settings shared by ingestion and querying
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub store_dir: PathBuf,
    pub embedding_model: String,
    pub llm_model: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub language: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            store_dir: PathBuf::from("chroma_db"),
            embedding_model: "all-minilm".to_string(),
            llm_model: "phi3".to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 3,
            language: "en".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            data_dir: lookup("BILLGUARD_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            store_dir: lookup("BILLGUARD_STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_dir),
            embedding_model: lookup("BILLGUARD_EMBEDDING_MODEL")
                .unwrap_or(defaults.embedding_model),
            llm_model: lookup("BILLGUARD_LLM_MODEL").unwrap_or(defaults.llm_model),
            chunk_size: parse_var(&lookup, "BILLGUARD_CHUNK_SIZE", defaults.chunk_size)?,
            chunk_overlap: parse_var(&lookup, "BILLGUARD_CHUNK_OVERLAP", defaults.chunk_overlap)?,
            top_k: parse_var(&lookup, "BILLGUARD_TOP_K", defaults.top_k)?,
            language: lookup("BILLGUARD_LANGUAGE").unwrap_or(defaults.language),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the splitter and retriever cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Configuration("chunk_size must be greater than 0".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::Configuration(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(Error::Configuration("top_k must be greater than 0".to_string()));
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            Error::Configuration(format!("{} must be a non-negative integer, got '{}'", key, raw))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = PipelineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = PipelineConfig::from_lookup(lookup_from(&[
            ("BILLGUARD_STORE_DIR", "/tmp/store"),
            ("BILLGUARD_CHUNK_SIZE", "500"),
            ("BILLGUARD_CHUNK_OVERLAP", "50"),
            ("BILLGUARD_TOP_K", "5"),
        ]))
        .unwrap();

        assert_eq!(config.store_dir, PathBuf::from("/tmp/store"));
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 50);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.llm_model, "phi3");
    }

    #[test]
    fn test_rejects_bad_numbers() {
        let err = PipelineConfig::from_lookup(lookup_from(&[("BILLGUARD_TOP_K", "three")]))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_chunk() {
        let err = PipelineConfig::from_lookup(lookup_from(&[
            ("BILLGUARD_CHUNK_SIZE", "200"),
            ("BILLGUARD_CHUNK_OVERLAP", "200"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("chunk_overlap"));
    }

    #[test]
    fn test_rejects_zero_top_k() {
        let config = PipelineConfig {
            top_k: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
