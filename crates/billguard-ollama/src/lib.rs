//! Ollama integration for billguard
//!
//! This crate provides the Ollama implementations of the `LLMProvider` and
//! `Embedder` traits, talking to a locally reachable Ollama server.

mod api;
mod client;
mod config;
mod embedder;

#[cfg(test)]
mod tests;

pub use api::OllamaApi;
pub use client::OllamaClient;
pub use config::OllamaConfig;
pub use embedder::OllamaEmbedder;

// Re-export core types for convenience
pub use billguard_core::{Embedder, Error, GenerationConfig, GenerationResult, LLMProvider, Result};
