//! Candidate extraction: every 5-digit string a ticket number could be.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, trace};

use super::patterns::{DIGIT_RUN, MIN_SEQUENCE_LEN, NUMBER_LEN};
use super::token::{BoundingBox, WordToken};

/// Where a candidate was sliced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrigin {
    /// A standalone run of exactly five digits.
    Word,
    /// A window of a run of ten or more digits (barcodes, serials).
    Sequence,
}

/// A proposed ticket number with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// Always exactly five ASCII digits.
    pub digits: String,
    pub origin: CandidateOrigin,
    /// Window index within the source run.
    pub position: usize,
    /// Number of windows the source run allows.
    pub windows: usize,
    /// Length of the source digit run.
    pub run_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl Candidate {
    fn new(digits: &str, origin: CandidateOrigin, position: usize, run_length: usize) -> Self {
        debug_assert_eq!(digits.len(), NUMBER_LEN);
        Self {
            digits: digits.to_string(),
            origin,
            position,
            windows: run_length + 1 - NUMBER_LEN,
            run_length,
            bbox: None,
            confidence: None,
        }
    }

    /// Build a standalone word-level candidate.
    ///
    /// Returns `None` unless `digits` is exactly five ASCII digits.
    pub fn word(digits: &str) -> Option<Self> {
        is_number(digits).then(|| Self::new(digits, CandidateOrigin::Word, 0, NUMBER_LEN))
    }

    /// Build the candidate at window `position` of a digit run.
    ///
    /// Returns `None` if the run is too short for a sequence or the window
    /// falls outside it.
    pub fn window(run: &str, position: usize) -> Option<Self> {
        if run.len() < MIN_SEQUENCE_LEN || !run.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let digits = run.get(position..position + NUMBER_LEN)?;
        Some(Self::new(digits, CandidateOrigin::Sequence, position, run.len()))
    }

    pub fn with_geometry(mut self, bbox: Option<BoundingBox>, confidence: Option<f32>) -> Self {
        self.bbox = bbox;
        self.confidence = confidence;
        self
    }

    /// Window index divided by the number of windows, in `[0, 1)`.
    pub fn relative_position(&self) -> f32 {
        self.position as f32 / self.windows as f32
    }

    pub fn is_word(&self) -> bool {
        self.origin == CandidateOrigin::Word
    }

    pub fn is_sequence(&self) -> bool {
        self.origin == CandidateOrigin::Sequence
    }

    pub fn has_geometry(&self) -> bool {
        self.bbox.is_some() || self.confidence.is_some()
    }

    /// Length of the longest run of identical consecutive digits.
    pub fn longest_repeat(&self) -> usize {
        let bytes = self.digits.as_bytes();
        let mut longest = 1;
        let mut current = 1;
        for pair in bytes.windows(2) {
            if pair[0] == pair[1] {
                current += 1;
                longest = longest.max(current);
            } else {
                current = 1;
            }
        }
        longest
    }

    /// Number of distinct digit values.
    pub fn distinct_digits(&self) -> usize {
        let mut seen = [false; 10];
        for b in self.digits.bytes() {
            seen[(b - b'0') as usize] = true;
        }
        seen.iter().filter(|s| **s).count()
    }
}

/// Whether `s` is exactly five ASCII digits.
pub fn is_number(s: &str) -> bool {
    s.len() == NUMBER_LEN && s.bytes().all(|b| b.is_ascii_digit())
}

/// Word candidates merge on digits alone, sequence candidates on their slot.
type CandidateKey = (CandidateOrigin, String, usize, usize);

/// Collects candidates while merging duplicates.
#[derive(Debug, Default)]
struct CandidateSet {
    candidates: Vec<Candidate>,
    index: HashMap<CandidateKey, usize>,
}

impl CandidateSet {
    fn key(candidate: &Candidate) -> CandidateKey {
        match candidate.origin {
            CandidateOrigin::Word => {
                (CandidateOrigin::Word, candidate.digits.clone(), 0, NUMBER_LEN)
            }
            CandidateOrigin::Sequence => (
                CandidateOrigin::Sequence,
                candidate.digits.clone(),
                candidate.position,
                candidate.run_length,
            ),
        }
    }

    fn push(&mut self, candidate: Candidate) {
        let key = Self::key(&candidate);
        match self.index.get(&key) {
            Some(&i) => {
                let c = &mut self.candidates[i];
                if !c.has_geometry() && candidate.has_geometry() {
                    c.bbox = candidate.bbox;
                    c.confidence = candidate.confidence;
                }
            }
            None => {
                self.index.insert(key, self.candidates.len());
                self.candidates.push(candidate);
            }
        }
    }

    fn scan(&mut self, text: &str, bbox: Option<BoundingBox>, confidence: Option<f32>) {
        for run in DIGIT_RUN.find_iter(text) {
            let run = run.as_str();
            match run.len() {
                NUMBER_LEN => {
                    if let Some(c) = Candidate::word(run) {
                        self.push(c.with_geometry(bbox, confidence));
                    }
                }
                len if len >= MIN_SEQUENCE_LEN => {
                    // DIGIT_RUN only matches ASCII digits
                    for position in 0..=len - NUMBER_LEN {
                        let digits = &run[position..position + NUMBER_LEN];
                        let c = Candidate::new(digits, CandidateOrigin::Sequence, position, len);
                        self.push(c.with_geometry(bbox, confidence));
                    }
                }
                len => trace!("Skipping {}-digit run {:?}", len, run),
            }
        }
    }
}

/// Extract every 5-digit candidate from recognized text and word tokens.
///
/// Standalone 5-digit runs become word-level candidates; every window of a
/// run of ten or more digits becomes a sequence-derived candidate. Runs of
/// six to nine digits yield nothing. Candidates found in `tokens` carry the
/// token's box and confidence. Nothing is filtered here.
pub fn extract_candidates(text: &str, tokens: &[WordToken]) -> Vec<Candidate> {
    let mut set = CandidateSet::default();

    set.scan(text, None, None);
    for token in tokens {
        set.scan(&token.text, token.bbox, token.confidence);
    }

    debug!(
        "Extracted {} candidates ({} word-level)",
        set.candidates.len(),
        set.candidates.iter().filter(|c| c.is_word()).count()
    );

    set.candidates
}
