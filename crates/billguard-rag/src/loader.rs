//! PDF directory loader

use async_trait::async_trait;
use std::fs;
use std::panic;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use billguard_core::{Document, DocumentLoader, Error, LoadResult, Result, PAGE_KEY, SOURCE_KEY};

/// Metadata key for the number of pages in the source file
pub const TOTAL_PAGES_KEY: &str = "total_pages";

/// List `*.pdf` files (any case) directly inside `directory`, sorted by name.
/// A missing directory yields an empty list.
pub fn pdf_files(directory: &Path) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Loads PDFs as one [`Document`] per page
#[derive(Debug, Default, Clone)]
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a single PDF. Extraction failures, including extractor panics on
    /// malformed files, are reported as [`Error::Load`].
    pub fn load_file(&self, path: &Path) -> Result<Vec<Document>> {
        let extracted = panic::catch_unwind(|| pdf_extract::extract_text_by_pages(path));

        let pages = match extracted {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => {
                return Err(Error::Load {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(Error::Load {
                    path: path.to_path_buf(),
                    reason: "PDF extractor panicked on malformed input".to_string(),
                });
            }
        };

        let source = path.display().to_string();
        let total_pages = pages.len();
        Ok(pages
            .into_iter()
            .enumerate()
            .map(|(page, content)| {
                Document::new(content)
                    .with_metadata(SOURCE_KEY, source.clone())
                    .with_metadata(PAGE_KEY, page)
                    .with_metadata(TOTAL_PAGES_KEY, total_pages)
            })
            .collect())
    }
}

#[async_trait]
impl DocumentLoader for PdfLoader {
    async fn load_directory(&self, directory: &Path) -> Result<LoadResult> {
        let files = pdf_files(directory)?;
        let mut result = LoadResult::default();

        if files.is_empty() {
            warn!("No PDF files found in {}", directory.display());
            return Ok(result);
        }

        for file in files {
            match self.load_file(&file) {
                Ok(documents) => {
                    info!("Loaded {} pages from {}", documents.len(), file.display());
                    result.files_loaded += 1;
                    result.documents.extend(documents);
                }
                Err(e) if !e.is_fatal() => {
                    error!("Error loading {}: {}", file.display(), e);
                    result.failed_files.push(file);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(result)
    }
}
