//! Placeholder substitution for detected PII spans

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use billguard_core::{DetectedSpan, EntityDetector, Error, PiiCategory, Result};

/// Number of spans replaced per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionReport {
    pub replaced: BTreeMap<PiiCategory, usize>,
}

impl RedactionReport {
    pub fn total(&self) -> usize {
        self.replaced.values().sum()
    }

    pub fn count(&self, category: PiiCategory) -> usize {
        self.replaced.get(&category).copied().unwrap_or(0)
    }

    fn record(&mut self, category: PiiCategory) {
        *self.replaced.entry(category).or_insert(0) += 1;
    }

    pub fn merge(&mut self, other: &RedactionReport) {
        for (category, count) in &other.replaced {
            *self.replaced.entry(*category).or_insert(0) += count;
        }
    }
}

/// Masked text together with what was replaced
#[derive(Debug, Clone, PartialEq)]
pub struct Redaction {
    pub text: String,
    pub report: RedactionReport,
}

/// Order spans and merge overlaps.
///
/// Spans are taken by ascending start. On equal starts the longer span wins,
/// then the higher score, then the category declared first. A span that
/// overlaps an already accepted one is not emitted on its own; if it runs past
/// the accepted span, the accepted span is extended to cover it so none of
/// its text survives.
pub fn resolve_overlaps(mut spans: Vec<DetectedSpan>) -> Vec<DetectedSpan> {
    spans.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| b.end.cmp(&a.end))
            .then_with(|| b.score.total_cmp(&a.score))
            .then_with(|| a.category.cmp(&b.category))
    });

    let mut accepted: Vec<DetectedSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        if span.is_empty() {
            continue;
        }
        match accepted.last_mut() {
            Some(last) if last.overlaps(&span) => last.end = last.end.max(span.end),
            _ => accepted.push(span),
        }
    }
    accepted
}

/// Replace spans of the given categories with their placeholders.
///
/// Spans of other categories are ignored. Offsets outside the text or off a
/// char boundary are rejected.
pub fn apply_spans(
    text: &str,
    spans: Vec<DetectedSpan>,
    categories: &[PiiCategory],
) -> Result<Redaction> {
    let mut report = RedactionReport::default();

    for span in &spans {
        if span.start > span.end
            || span.end > text.len()
            || !text.is_char_boundary(span.start)
            || !text.is_char_boundary(span.end)
        {
            return Err(Error::Detection(format!(
                "span {}..{} ({}) is not a valid range of a {}-byte text",
                span.start,
                span.end,
                span.category,
                text.len()
            )));
        }
    }

    let requested: Vec<DetectedSpan> = spans
        .into_iter()
        .filter(|span| categories.contains(&span.category))
        .collect();

    let mut masked = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in resolve_overlaps(requested) {
        masked.push_str(&text[cursor..span.start]);
        masked.push_str(span.category.placeholder());
        report.record(span.category);
        cursor = span.end;
    }
    masked.push_str(&text[cursor..]);

    Ok(Redaction { text: masked, report })
}

/// Masks PII in text using an [`EntityDetector`]
pub struct Redactor<D: EntityDetector> {
    detector: D,
    categories: Vec<PiiCategory>,
    language: String,
}

impl<D: EntityDetector> Redactor<D> {
    /// Create a redactor requesting every supported category in English
    pub fn new(detector: D) -> Self {
        Self {
            detector,
            categories: PiiCategory::ALL.to_vec(),
            language: "en".to_string(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Detect and replace PII. Empty text is returned without calling the detector.
    pub fn redact(&self, text: &str) -> Result<Redaction> {
        if text.is_empty() {
            return Ok(Redaction {
                text: String::new(),
                report: RedactionReport::default(),
            });
        }

        let spans = self.detector.detect(text, &self.categories, &self.language)?;
        apply_spans(text, spans, &self.categories)
    }

    /// Convenience wrapper returning only the masked text
    pub fn mask_text(&self, text: &str) -> Result<String> {
        Ok(self.redact(text)?.text)
    }
}
