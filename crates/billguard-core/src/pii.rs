//! PII categories, detected spans and the entity detector trait

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// The closed set of PII categories the pipeline requests and redacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PiiCategory {
    PhoneNumber,
    EmailAddress,
    Person,
    UsSsn,
    CreditCard,
}

impl PiiCategory {
    /// Every category, in declaration order
    pub const ALL: [PiiCategory; 5] = [
        PiiCategory::PhoneNumber,
        PiiCategory::EmailAddress,
        PiiCategory::Person,
        PiiCategory::UsSsn,
        PiiCategory::CreditCard,
    ];

    /// Entity type name as reported by detectors
    pub fn name(self) -> &'static str {
        match self {
            PiiCategory::PhoneNumber => "PHONE_NUMBER",
            PiiCategory::EmailAddress => "EMAIL_ADDRESS",
            PiiCategory::Person => "PERSON",
            PiiCategory::UsSsn => "US_SSN",
            PiiCategory::CreditCard => "CREDIT_CARD",
        }
    }

    /// Literal substituted for a span of this category.
    /// US_SSN maps to `<SSN>`, not `<US_SSN>`.
    pub fn placeholder(self) -> &'static str {
        match self {
            PiiCategory::PhoneNumber => "<PHONE_NUMBER>",
            PiiCategory::EmailAddress => "<EMAIL_ADDRESS>",
            PiiCategory::Person => "<PERSON>",
            PiiCategory::UsSsn => "<SSN>",
            PiiCategory::CreditCard => "<CREDIT_CARD>",
        }
    }
}

impl fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PiiCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PiiCategory::ALL
            .into_iter()
            .find(|category| category.name() == s)
            .ok_or_else(|| Error::Detection(format!("unrecognized entity type '{}'", s)))
    }
}

/// A byte range of analysed text attributed to a PII category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedSpan {
    pub start: usize,
    pub end: usize,
    pub category: PiiCategory,
    pub score: f32,
}

impl DetectedSpan {
    pub fn new(start: usize, end: usize, category: PiiCategory, score: f32) -> Self {
        Self { start, end, category, score }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn overlaps(&self, other: &DetectedSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Trait for entity detectors (pattern matchers, NER services, etc.)
///
/// Implementations return spans for the requested categories only. Any error
/// is fatal for the document being processed.
pub trait EntityDetector: Send + Sync {
    /// Detect PII spans in `text`
    fn detect(
        &self,
        text: &str,
        categories: &[PiiCategory],
        language: &str,
    ) -> Result<Vec<DetectedSpan>>;
}

impl<T: EntityDetector + ?Sized> EntityDetector for std::sync::Arc<T> {
    fn detect(
        &self,
        text: &str,
        categories: &[PiiCategory],
        language: &str,
    ) -> Result<Vec<DetectedSpan>> {
        (**self).detect(text, categories, language)
    }
}
