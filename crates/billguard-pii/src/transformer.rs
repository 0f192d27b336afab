//! Masks PII across a batch of documents

use serde_json::Value;
use tracing::{debug, info};

use billguard_core::{Document, EntityDetector, Result, PII_MASKED_KEY};

use crate::redactor::{RedactionReport, Redactor};

/// Applies a [`Redactor`] to documents, producing masked copies
pub struct DocumentTransformer<D: EntityDetector> {
    redactor: Redactor<D>,
}

impl<D: EntityDetector> DocumentTransformer<D> {
    pub fn new(redactor: Redactor<D>) -> Self {
        Self { redactor }
    }

    pub fn redactor(&self) -> &Redactor<D> {
        &self.redactor
    }

    /// Mask a single document. Metadata is copied and extended with
    /// `pii_masked: true`; existing keys are left as they were.
    pub fn transform(&self, document: &Document) -> Result<(Document, RedactionReport)> {
        let redaction = self.redactor.redact(&document.content)?;

        let mut metadata = document.metadata.clone();
        metadata.insert(PII_MASKED_KEY.to_string(), Value::Bool(true));

        Ok((
            Document {
                content: redaction.text,
                metadata,
            },
            redaction.report,
        ))
    }

    /// Mask every document, preserving count and order.
    /// The first detection failure aborts the batch.
    pub fn transform_documents(&self, documents: &[Document]) -> Result<Vec<Document>> {
        let mut masked = Vec::with_capacity(documents.len());
        let mut totals = RedactionReport::default();

        for document in documents {
            let (output, report) = self.transform(document)?;
            debug!(
                source = document.source().unwrap_or("unknown"),
                page = ?document.page(),
                replaced = report.total(),
                "masked document"
            );
            totals.merge(&report);
            masked.push(output);
        }

        info!(
            documents = masked.len(),
            replaced = totals.total(),
            "PII masking complete"
        );
        Ok(masked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PatternDetector;
    use billguard_core::{PAGE_KEY, SOURCE_KEY};

    #[test]
    fn test_transform_preserves_metadata() {
        let transformer = DocumentTransformer::new(Redactor::new(PatternDetector::new().unwrap()));
        let doc = Document::new("Bill for Mary Smith")
            .with_metadata(SOURCE_KEY, "bill.pdf")
            .with_metadata(PAGE_KEY, 3);

        let (masked, report) = transformer.transform(&doc).unwrap();

        assert_eq!(masked.content, "Bill for <PERSON>");
        assert_eq!(masked.metadata[SOURCE_KEY], "bill.pdf");
        assert_eq!(masked.metadata[PAGE_KEY], 3);
        assert!(masked.is_pii_masked());
        assert_eq!(masked.metadata.len(), 3);
        assert_eq!(report.total(), 1);
        // input is left untouched
        assert_eq!(doc.content, "Bill for Mary Smith");
    }
}
