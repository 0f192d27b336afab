//! PII detection and redaction for billguard
//!
//! This crate provides the pattern-based [`PatternDetector`], the
//! placeholder-substituting [`Redactor`] and the [`DocumentTransformer`] that
//! masks loaded documents before they are chunked and embedded.

mod detector;
mod redactor;
mod transformer;

#[cfg(test)]
mod tests;

pub use detector::{PatternDetector, DEFAULT_GIVEN_NAMES};
pub use redactor::{apply_spans, resolve_overlaps, Redaction, RedactionReport, Redactor};
pub use transformer::DocumentTransformer;

// Re-export core types for convenience
pub use billguard_core::{
    DetectedSpan, Document, EntityDetector, Error, PiiCategory, Result,
};
