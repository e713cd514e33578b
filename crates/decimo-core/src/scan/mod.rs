//! Ticket number detection from OCR output.
//!
//! The pipeline is pure: candidates are extracted from the recognized text
//! and word tokens, scored by the rules in [`rules`], and at most one is
//! selected. Not finding a number is a normal outcome; callers fall back to
//! manual entry.

mod candidate;
mod patterns;
pub mod rules;
mod selector;
mod token;

pub use candidate::{extract_candidates, is_number, Candidate, CandidateOrigin};
pub use patterns::{MIN_SEQUENCE_LEN, NUMBER_LEN};
pub use rules::{breakdown, score, ScoringRule, KNOWN_DECOYS, SCORING_RULES};
pub use selector::{relative_cmp, ScoredCandidate, Selector};
pub use token::{token_frame, BoundingBox, WordToken};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::models::config::ScanConfig;
use crate::ocr::OcrResult;

/// Outcome surfaced to callers: a 5-digit number or an explicit absence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanResult {
    pub number: Option<String>,
}

/// Full scan outcome, including every scored candidate.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Selected number, if any candidate qualified.
    pub number: Option<String>,
    /// The selected candidate.
    pub selected: Option<ScoredCandidate>,
    /// Every candidate, in extraction order.
    pub candidates: Vec<ScoredCandidate>,
}

impl ScanReport {
    pub fn result(&self) -> ScanResult {
        ScanResult {
            number: self.number.clone(),
        }
    }

    pub fn is_found(&self) -> bool {
        self.number.is_some()
    }
}

/// Trait for ticket number extractors.
pub trait NumberExtractor {
    /// Extract the ticket number from an OCR result.
    fn extract(&self, ocr_result: &OcrResult) -> ScanReport;

    /// Extract the ticket number from plain text.
    fn extract_from_text(&self, text: &str) -> ScanReport;
}

/// Heuristic ticket number scanner.
#[derive(Debug, Clone)]
pub struct NumberScanner {
    min_sequence_score: i32,
    tie_tolerance: f32,
}

impl NumberScanner {
    /// Create a scanner with default settings.
    pub fn new() -> Self {
        Self::from_config(&ScanConfig::default())
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            min_sequence_score: config.min_sequence_score,
            tie_tolerance: config.tie_tolerance,
        }
    }

    /// Set the score a sequence-derived candidate must exceed.
    pub fn with_min_sequence_score(mut self, score: i32) -> Self {
        self.min_sequence_score = score;
        self
    }

    /// Set the relative tolerance for geometric tie-breaks.
    pub fn with_tie_tolerance(mut self, tolerance: f32) -> Self {
        self.tie_tolerance = tolerance;
        self
    }

    /// Run extraction, scoring and selection.
    pub fn scan(&self, text: &str, tokens: &[WordToken]) -> ScanReport {
        let candidates: Vec<ScoredCandidate> = extract_candidates(text, tokens)
            .into_iter()
            .map(ScoredCandidate::new)
            .collect();

        for c in &candidates {
            trace!(
                "{} {:?} pos={}/{} score={}",
                c.digits(),
                c.candidate.origin,
                c.candidate.position,
                c.candidate.windows,
                c.score
            );
        }

        let selector = Selector {
            min_sequence_score: self.min_sequence_score,
            tie_tolerance: self.tie_tolerance,
            frame: token_frame(tokens),
        };
        let selected = selector.select(&candidates).cloned();

        if selected.is_none() {
            debug!("No ticket number among {} candidates", candidates.len());
        }

        ScanReport {
            number: selected.as_ref().map(|c| c.digits().to_string()),
            selected,
            candidates,
        }
    }
}

impl Default for NumberScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberExtractor for NumberScanner {
    fn extract(&self, ocr_result: &OcrResult) -> ScanReport {
        self.scan(&ocr_result.text, &ocr_result.tokens())
    }

    fn extract_from_text(&self, text: &str) -> ScanReport {
        self.scan(text, &[])
    }
}

/// Extract the ticket number with default settings.
pub fn extract_number(text: &str, tokens: &[WordToken]) -> Option<String> {
    NumberScanner::new().scan(text, tokens).number
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_long_digit_runs() {
        assert_eq!(extract_number("", &[]), None);
        assert_eq!(extract_number("LOTERIA NACIONAL 20 EUROS 102/25 5a FRACCION", &[]), None);
        assert_eq!(extract_number("1234 123456 12345678", &[]), None);
    }

    #[test]
    fn test_single_standalone_token() {
        assert_eq!(extract_number("74873", &[]), Some("74873".to_string()));
        assert_eq!(extract_number("SORTEO\n74873\n20 EUR", &[]), Some("74873".to_string()));
    }

    #[test]
    fn test_barcode_window_selected() {
        let report = NumberScanner::new().scan("51025040905074873555", &[]);
        assert_eq!(report.number.as_deref(), Some("74873"));

        let score_of = |d: &str| {
            report
                .candidates
                .iter()
                .find(|c| c.digits() == d)
                .map(|c| c.score)
                .unwrap()
        };
        assert!(score_of("74873") > score_of("50748"));
        assert!(score_of("74873") > score_of("73555"));
        assert!(score_of("74873") > score_of("10250"));
    }

    #[test]
    fn test_idempotent() {
        let text = "DECIMO 5a FRACCION 102/25\n51025040905074873555\n20 EUROS";
        let scanner = NumberScanner::new();
        let first = scanner.scan(text, &[]);
        let second = scanner.scan(text, &[]);
        assert_eq!(first.number, second.number);
        assert_eq!(first.candidates, second.candidates);
    }

    #[test]
    fn test_word_dominates_sequence() {
        let text = "12222\n51025040905074873555";
        let report = NumberScanner::new().scan(text, &[]);
        assert_eq!(report.number.as_deref(), Some("12222"));
    }

    #[test]
    fn test_low_sequence_is_absent() {
        // Best window of an all-zero-and-one run scores far below the threshold.
        let report = NumberScanner::new().scan("1000000000001", &[]);
        assert!(!report.candidates.is_empty());
        assert!(report.candidates.iter().all(|c| c.score <= 20));
        assert_eq!(report.number, None);
        assert_eq!(report.result(), ScanResult { number: None });
    }

    #[test]
    fn test_threshold_configurable() {
        let text = "1000000000001";
        let best = NumberScanner::new()
            .scan(text, &[])
            .candidates
            .iter()
            .map(|c| c.score)
            .max()
            .unwrap();

        let lenient = NumberScanner::new().with_min_sequence_score(best - 1);
        assert!(lenient.scan(text, &[]).number.is_some());
    }

    #[test]
    fn test_token_geometry_picks_large_number() {
        let tokens = vec![
            WordToken::new("64823")
                .with_bbox(BoundingBox::new(20.0, 20.0, 80.0, 35.0))
                .with_confidence(90.0),
            WordToken::new("64827")
                .with_bbox(BoundingBox::new(100.0, 200.0, 500.0, 320.0))
                .with_confidence(85.0),
        ];
        let text = "64823\n64827";
        assert_eq!(extract_number(text, &tokens), Some("64827".to_string()));
    }

    #[test]
    fn test_scan_result_json() {
        let found = ScanResult {
            number: Some("74873".to_string()),
        };
        assert_eq!(serde_json::to_string(&found).unwrap(), r#"{"number":"74873"}"#);
        assert_eq!(
            serde_json::to_string(&ScanResult::default()).unwrap(),
            r#"{"number":null}"#
        );
    }

    #[test]
    fn test_extract_from_ocr_result() {
        let ocr = OcrResult::from_text("SERIE 102/25 74873");
        let report = NumberScanner::new().extract(&ocr);
        assert_eq!(report.number.as_deref(), Some("74873"));
    }
}
