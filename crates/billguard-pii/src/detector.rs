//! Regex and gazetteer based entity detector

use regex::Regex;

use billguard_core::{DetectedSpan, EntityDetector, Error, PiiCategory, Result};

/// Given names recognised as the start of a person's name
pub const DEFAULT_GIVEN_NAMES: &[&str] = &[
    "Alice", "Amanda", "Andrew", "Anna", "Anthony", "Barbara", "Betty", "Bob", "Brian",
    "Carol", "Charles", "Charlie", "Christopher", "Daniel", "David", "Diana", "Donald",
    "Dorothy", "Elizabeth", "Emily", "Emma", "George", "Helen", "James", "Jane", "Jennifer",
    "Jessica", "John", "Joseph", "Karen", "Kevin", "Laura", "Linda", "Lisa", "Margaret",
    "Maria", "Mark", "Mary", "Matthew", "Michael", "Michelle", "Nancy", "Olivia", "Patricia",
    "Paul", "Richard", "Robert", "Sandra", "Sarah", "Steven", "Susan", "Thomas", "William",
];

const PHONE_PATTERN: &str = r"(?:\+1[-.\s]?)?(?:\(\d{3}\)\s?|\b\d{3}[-.\s])\d{3}[-.\s]\d{4}\b";
const EMAIL_PATTERN: &str =
    r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}\b";
const SSN_PATTERN: &str = r"\b(\d{3})-(\d{2})-(\d{4})\b";
/// Contiguous digits, or 4-digit groups with one consistent separator, or the
/// 4-6-5 Amex layout
const CREDIT_CARD_PATTERN: &str =
    r"\b(?:\d{13,19}|\d{4}(?: \d{4}){2} \d{1,7}|\d{4}(?:-\d{4}){2}-\d{1,7}|\d{4}[ -]\d{6}[ -]\d{5})\b";
const LABELLED_NAME_PATTERN: &str =
    r"(?:Customer Name|Account Holder|Name)[ \t]*:[ \t]*([A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+){0,2})";

struct Recognizer {
    category: PiiCategory,
    regex: Regex,
    /// Capture group whose range becomes the span; 0 is the whole match
    group: usize,
    score: f32,
    validate: Option<fn(&str) -> bool>,
}

impl Recognizer {
    fn new(category: PiiCategory, pattern: &str, group: usize, score: f32) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            Error::Configuration(format!("invalid {} pattern: {}", category, e))
        })?;
        Ok(Self {
            category,
            regex,
            group,
            score,
            validate: None,
        })
    }

    fn with_validator(mut self, validate: fn(&str) -> bool) -> Self {
        self.validate = Some(validate);
        self
    }

    fn find_spans(&self, text: &str, spans: &mut Vec<DetectedSpan>) {
        for captures in self.regex.captures_iter(text) {
            let Some(m) = captures.get(self.group) else {
                continue;
            };
            if let Some(validate) = self.validate {
                if !validate(m.as_str()) {
                    continue;
                }
            }
            spans.push(DetectedSpan::new(m.start(), m.end(), self.category, self.score));
        }
    }
}

/// Detects the five supported PII categories in English text
///
/// Phone numbers, e-mail addresses, SSNs and card numbers are matched by
/// pattern (SSNs by area/group/serial rules, cards by Luhn checksum). Person
/// names are matched from a given-name gazetteer followed by an optional
/// capitalised surname, or from labelled fields such as `Customer Name:`.
pub struct PatternDetector {
    recognizers: Vec<Recognizer>,
}

impl PatternDetector {
    pub const SUPPORTED_LANGUAGE: &'static str = "en";

    /// Create a detector with the default given-name gazetteer
    pub fn new() -> Result<Self> {
        Self::with_given_names(DEFAULT_GIVEN_NAMES.iter().copied())
    }

    /// Create a detector recognising the supplied given names
    pub fn with_given_names<'a, I>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let alternation = names
            .into_iter()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");

        let mut recognizers = vec![
            Recognizer::new(PiiCategory::PhoneNumber, PHONE_PATTERN, 0, 0.75)?,
            Recognizer::new(PiiCategory::EmailAddress, EMAIL_PATTERN, 0, 1.0)?,
            Recognizer::new(PiiCategory::UsSsn, SSN_PATTERN, 0, 0.85)?.with_validator(valid_ssn),
            Recognizer::new(PiiCategory::CreditCard, CREDIT_CARD_PATTERN, 0, 1.0)?
                .with_validator(luhn_valid),
            Recognizer::new(PiiCategory::Person, LABELLED_NAME_PATTERN, 1, 0.6)?,
        ];

        if !alternation.is_empty() {
            let gazetteer = format!(
                r"\b(?:{})(?:[ \t]+[A-Z][a-z]+(?:-[A-Z][a-z]+)?)?\b",
                alternation
            );
            recognizers.push(Recognizer::new(PiiCategory::Person, &gazetteer, 0, 0.85)?);
        }

        Ok(Self { recognizers })
    }
}

impl EntityDetector for PatternDetector {
    fn detect(
        &self,
        text: &str,
        categories: &[PiiCategory],
        language: &str,
    ) -> Result<Vec<DetectedSpan>> {
        if !language.eq_ignore_ascii_case(Self::SUPPORTED_LANGUAGE) {
            return Err(Error::Detection(format!(
                "language '{}' is not supported (expected '{}')",
                language,
                Self::SUPPORTED_LANGUAGE
            )));
        }

        let mut spans = Vec::new();
        for recognizer in &self.recognizers {
            if categories.contains(&recognizer.category) {
                recognizer.find_spans(text, &mut spans);
            }
        }
        spans.sort_by_key(|span| (span.start, span.end));
        Ok(spans)
    }
}

/// Area 000, 666 and 900-999, group 00 and serial 0000 are never issued
fn valid_ssn(candidate: &str) -> bool {
    let mut parts = candidate.split('-');
    let (Some(area), Some(group), Some(serial)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    area != "000" && area != "666" && !area.starts_with('9') && group != "00" && serial != "0000"
}

fn luhn_valid(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();
    if !(13..=19).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}
