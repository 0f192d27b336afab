//! Documents, chunks and their metadata

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered string-keyed metadata attached to documents and chunks
pub type Metadata = serde_json::Map<String, Value>;

/// Metadata key holding the path of the file a document came from
pub const SOURCE_KEY: &str = "source";
/// Metadata key holding the zero-based page index within the source file
pub const PAGE_KEY: &str = "page";
/// Metadata key set once a document's content has been through redaction
pub const PII_MASKED_KEY: &str = "pii_masked";
/// Metadata key holding a chunk's ordinal within its parent document
pub const CHUNK_INDEX_KEY: &str = "chunk_index";

/// A unit of loaded text, one per PDF page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Metadata::new(),
        }
    }

    /// Builder-style metadata insertion
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).and_then(Value::as_str)
    }

    pub fn page(&self) -> Option<u64> {
        self.metadata.get(PAGE_KEY).and_then(Value::as_u64)
    }

    pub fn is_pii_masked(&self) -> bool {
        self.metadata
            .get(PII_MASKED_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// A bounded window of a parent document's content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub metadata: Metadata,
}

impl Chunk {
    /// Stable identifier derived from origin and content, so re-ingesting a
    /// corpus replaces records instead of duplicating them.
    pub fn id(&self) -> String {
        let key = format!(
            "{}|{}|{}|{}",
            self.metadata.get(SOURCE_KEY).and_then(Value::as_str).unwrap_or_default(),
            self.metadata.get(PAGE_KEY).map(Value::to_string).unwrap_or_default(),
            self.metadata.get(CHUNK_INDEX_KEY).map(Value::to_string).unwrap_or_default(),
            self.text,
        );
        format!("{:x}", md5::compute(key.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_accessors() {
        let doc = Document::new("Total Amount Due: $42.10")
            .with_metadata(SOURCE_KEY, "data/bill_1.pdf")
            .with_metadata(PAGE_KEY, 0);

        assert_eq!(doc.source(), Some("data/bill_1.pdf"));
        assert_eq!(doc.page(), Some(0));
        assert!(!doc.is_pii_masked());
    }

    #[test]
    fn test_chunk_id_is_stable_and_content_sensitive() {
        let mut metadata = Metadata::new();
        metadata.insert(SOURCE_KEY.to_string(), "a.pdf".into());
        metadata.insert(PAGE_KEY.to_string(), 1.into());
        metadata.insert(CHUNK_INDEX_KEY.to_string(), 0.into());

        let a = Chunk { text: "hello".to_string(), metadata: metadata.clone() };
        let b = Chunk { text: "hello".to_string(), metadata: metadata.clone() };
        let c = Chunk { text: "world".to_string(), metadata };

        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        assert_eq!(a.id().len(), 32);
    }
}
