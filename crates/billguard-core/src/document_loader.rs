//! Document loading and splitting traits

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Chunk, Document, Result};

/// Outcome of loading a directory of source files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadResult {
    pub documents: Vec<Document>,
    pub files_loaded: usize,
    pub failed_files: Vec<PathBuf>,
}

/// Trait for loaders that turn a directory of files into documents
///
/// Per-file failures are recorded in [`LoadResult::failed_files`] and do not
/// fail the call; only errors affecting the whole directory do.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    async fn load_directory(&self, directory: &Path) -> Result<LoadResult>;
}

/// Trait for splitting documents into overlapping chunks
pub trait TextSplitter: Send + Sync {
    /// Split a single text into windows
    fn split_text(&self, text: &str) -> Vec<String>;

    /// Split documents, each chunk inheriting its parent's metadata
    fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|doc| {
                self.split_text(&doc.content)
                    .into_iter()
                    .enumerate()
                    .map(|(index, text)| {
                        let mut metadata = doc.metadata.clone();
                        metadata.insert(crate::CHUNK_INDEX_KEY.to_string(), index.into());
                        Chunk { text, metadata }
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}
