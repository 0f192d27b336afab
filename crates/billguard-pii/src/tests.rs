//! Masking behaviour across detector, redactor and transformer

#[cfg(test)]
mod masking_tests {
    use crate::{DocumentTransformer, PatternDetector, Redactor};
    use billguard_core::{
        DetectedSpan, Document, EntityDetector, PiiCategory, Result, PAGE_KEY, PII_MASKED_KEY,
        SOURCE_KEY,
    };
    use insta::assert_snapshot;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Wraps the pattern detector and counts invocations
    struct CountingDetector {
        inner: PatternDetector,
        calls: AtomicUsize,
    }

    impl CountingDetector {
        fn new() -> Self {
            Self {
                inner: PatternDetector::new().unwrap(),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl EntityDetector for CountingDetector {
        fn detect(
            &self,
            text: &str,
            categories: &[PiiCategory],
            language: &str,
        ) -> Result<Vec<DetectedSpan>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.detect(text, categories, language)
        }
    }

    fn redactor() -> Redactor<PatternDetector> {
        Redactor::new(PatternDetector::new().unwrap())
    }

    #[test]
    fn test_call_john_doe_scenario() {
        let masked = redactor()
            .mask_text("Call John Doe at 555-123-4567 or email john.doe@example.com.")
            .unwrap();
        assert_eq!(
            masked,
            "Call <PERSON> at <PHONE_NUMBER> or email <EMAIL_ADDRESS>."
        );
    }

    #[test]
    fn test_empty_text_skips_detector() {
        let detector = Arc::new(CountingDetector::new());
        let redactor = Redactor::new(detector.clone());

        assert_eq!(redactor.mask_text("").unwrap(), "");
        assert_eq!(detector.calls(), 0);

        redactor.mask_text("hello").unwrap();
        assert_eq!(detector.calls(), 1);
    }

    #[test]
    fn test_originals_removed_and_one_placeholder_per_occurrence() {
        let cases = [
            ("Phone: 555-987-6543, alt 555-987-6543", "555-987-6543", "<PHONE_NUMBER>", 2),
            ("Email: bob.brown@example.com", "bob.brown@example.com", "<EMAIL_ADDRESS>", 1),
            ("Prepared for Diana Evans", "Diana Evans", "<PERSON>", 1),
            ("SSN 219-09-9999 on file", "219-09-9999", "<SSN>", 1),
            ("Paid with 4111-1111-1111-1111", "4111-1111-1111-1111", "<CREDIT_CARD>", 1),
        ];

        let redactor = redactor();
        for (text, original, placeholder, occurrences) in cases {
            let masked = redactor.mask_text(text).unwrap();
            assert!(!masked.contains(original), "{} still in {}", original, masked);
            assert_eq!(masked.matches(placeholder).count(), occurrences, "{}", masked);
        }
    }

    #[test]
    fn test_adjacent_phone_numbers_each_masked() {
        let redactor = redactor();
        for first in ["555-109-4567", "555-117-4567", "555-125-4567", "555-412-7788"] {
            let text = format!("Calls: {} 555-987-6543 done", first);
            assert_eq!(
                redactor.mask_text(&text).unwrap(),
                "Calls: <PHONE_NUMBER> <PHONE_NUMBER> done",
                "{}",
                text
            );
        }
    }

    #[test]
    fn test_masking_is_idempotent() {
        let detector = PatternDetector::new().unwrap();
        let already = "Call <PERSON> at <PHONE_NUMBER>, SSN <SSN>, card <CREDIT_CARD>, \
                       mail <EMAIL_ADDRESS>.";

        let spans = detector.detect(already, &PiiCategory::ALL, "en").unwrap();
        assert!(spans.is_empty());

        let redactor = Redactor::new(detector);
        let once = redactor
            .mask_text("Customer Name: Jane Smith, Phone Number: 555-321-0000")
            .unwrap();
        let twice = redactor.mask_text(&once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(redactor.mask_text(already).unwrap(), already);
    }

    #[test]
    fn test_transformer_preserves_count_order_and_metadata() {
        let transformer = DocumentTransformer::new(redactor());
        let documents = vec![
            Document::new("Customer Name: Bob Brown")
                .with_metadata(SOURCE_KEY, "data/bill_1.pdf")
                .with_metadata(PAGE_KEY, 0),
            Document::new(""),
            Document::new("Total Amount Due: $88.20")
                .with_metadata(SOURCE_KEY, "data/bill_2.pdf")
                .with_metadata(PAGE_KEY, 1)
                .with_metadata("producer", "FPDF"),
        ];

        let masked = transformer.transform_documents(&documents).unwrap();

        assert_eq!(masked.len(), documents.len());
        assert_eq!(masked[0].content, "Customer Name: <PERSON>");
        assert_eq!(masked[1].content, "");
        assert_eq!(masked[2].content, "Total Amount Due: $88.20");

        for (input, output) in documents.iter().zip(&masked) {
            for (key, value) in &input.metadata {
                assert_eq!(output.metadata.get(key), Some(value));
            }
            assert_eq!(output.metadata[PII_MASKED_KEY], true);
            assert_eq!(output.metadata.len(), input.metadata.len() + 1);
        }
    }

    #[test]
    fn test_detector_failure_aborts_batch() {
        let transformer = DocumentTransformer::new(redactor().with_language("fr"));
        let documents = vec![Document::new("Bonjour Marie")];
        assert!(transformer.transform_documents(&documents).is_err());
    }

    #[test]
    fn test_masked_bill_snapshot() {
        let page = "TELEPHONE BILL STATEMENT\n\
                    Customer Name: Charlie Davis\n\
                    Address: 482 Oak Ave, Gotham, IL 61234\n\
                    Phone Number: 555-412-7788\n\
                    Email: charlie.davis@example.com\n\
                    Account Number: 734918265\n\
                    Total Amount Due: $74.35\n\
                    1. 2023-04-02 - 555-201-3344 - 12 mins - $1.2";

        assert_snapshot!(redactor().mask_text(page).unwrap(), @r###"
        TELEPHONE BILL STATEMENT
        Customer Name: <PERSON>
        Address: 482 Oak Ave, Gotham, IL 61234
        Phone Number: <PHONE_NUMBER>
        Email: <EMAIL_ADDRESS>
        Account Number: 734918265
        Total Amount Due: $74.35
        1. 2023-04-02 - <PHONE_NUMBER> - 12 mins - $1.2
        "###);
    }
}
