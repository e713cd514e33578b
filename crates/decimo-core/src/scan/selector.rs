//! Picks the single ticket number out of the scored candidates.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::debug;

use super::candidate::Candidate;
use super::rules::{self, ScoringRule};
use super::token::BoundingBox;

/// A candidate together with its heuristic score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub score: i32,
    pub rules: Vec<(ScoringRule, i32)>,
}

impl ScoredCandidate {
    pub fn new(candidate: Candidate) -> Self {
        let rules = rules::breakdown(&candidate);
        let score = rules.iter().map(|(_, w)| w).sum();
        Self { candidate, score, rules }
    }

    pub fn digits(&self) -> &str {
        &self.candidate.digits
    }
}

/// Selection parameters.
#[derive(Debug, Clone, Copy)]
pub struct Selector {
    /// A sequence-derived winner must score strictly above this.
    pub min_sequence_score: i32,
    /// Relative difference under which two geometric values tie.
    pub tie_tolerance: f32,
    /// Reference frame for vertical centering.
    pub frame: Option<BoundingBox>,
}

impl Selector {
    /// Choose at most one candidate.
    ///
    /// Word-level candidates always win over sequence-derived ones. The best
    /// sequence-derived candidate is only returned when it clears
    /// `min_sequence_score`.
    pub fn select<'a>(&self, candidates: &'a [ScoredCandidate]) -> Option<&'a ScoredCandidate> {
        let best_word = self.best(candidates.iter().filter(|c| c.candidate.is_word()));
        if let Some(word) = best_word {
            debug!("Selected word-level candidate {} (score {})", word.digits(), word.score);
            return Some(word);
        }

        let best_sequence = self.best(candidates.iter().filter(|c| c.candidate.is_sequence()))?;
        if best_sequence.score > self.min_sequence_score {
            debug!(
                "Selected sequence candidate {} (score {})",
                best_sequence.digits(),
                best_sequence.score
            );
            Some(best_sequence)
        } else {
            debug!(
                "Best sequence candidate {} scored {}, not above {}",
                best_sequence.digits(),
                best_sequence.score,
                self.min_sequence_score
            );
            None
        }
    }

    /// Highest-ranked candidate.
    ///
    /// Only the top score survives, then each tie-break narrows the pool to
    /// the candidates within tolerance of the best value in that dimension.
    /// The result does not depend on input order, except that the first
    /// candidate wins a full tie.
    fn best<'a>(
        &self,
        candidates: impl Iterator<Item = &'a ScoredCandidate>,
    ) -> Option<&'a ScoredCandidate> {
        let mut pool: Vec<&ScoredCandidate> = candidates.collect();
        let top = pool.iter().map(|c| c.score).max()?;
        pool.retain(|c| c.score == top);

        for tie_break in TieBreak::ORDER {
            if pool.len() < 2 {
                break;
            }
            pool = self.narrow(pool, tie_break);
        }
        pool.first().copied()
    }

    fn narrow<'a>(
        &self,
        pool: Vec<&'a ScoredCandidate>,
        tie_break: TieBreak,
    ) -> Vec<&'a ScoredCandidate> {
        let values = pool.iter().filter_map(|c| self.measure(&c.candidate, tie_break));
        let best = if tie_break.larger_is_better() {
            values.reduce(f32::max)
        } else {
            values.reduce(f32::min)
        };
        let Some(best) = best else {
            return pool;
        };

        pool.into_iter()
            .filter(|c| {
                let value = self.measure(&c.candidate, tie_break);
                relative_cmp(value, Some(best), self.tie_tolerance) == Ordering::Equal
            })
            .collect()
    }

    fn measure(&self, candidate: &Candidate, tie_break: TieBreak) -> Option<f32> {
        match tie_break {
            TieBreak::Area => candidate.bbox.map(|r| r.area()),
            TieBreak::Height => candidate.bbox.map(|r| r.height()),
            TieBreak::Confidence => candidate.confidence,
            TieBreak::Centering => self.centering(candidate),
        }
    }

    /// Distance of the candidate's centre from the frame centre, as a
    /// fraction of the frame height. Smaller is more centered.
    fn centering(&self, candidate: &Candidate) -> Option<f32> {
        let frame = self.frame?;
        let bbox = candidate.bbox?;
        let height = frame.height();
        if height <= 0.0 {
            return None;
        }
        Some((bbox.center_y() - frame.center_y()).abs() / height)
    }
}

/// Geometric tie-breaks, applied in order between equal scores.
#[derive(Debug, Clone, Copy)]
enum TieBreak {
    Area,
    Height,
    Confidence,
    Centering,
}

impl TieBreak {
    const ORDER: [TieBreak; 4] = [
        TieBreak::Area,
        TieBreak::Height,
        TieBreak::Confidence,
        TieBreak::Centering,
    ];

    fn larger_is_better(self) -> bool {
        !matches!(self, TieBreak::Centering)
    }
}

/// Compare two optional measurements, treating values within `tolerance`
/// of the larger one as equal. A present value beats a missing one.
pub fn relative_cmp(a: Option<f32>, b: Option<f32>, tolerance: f32) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let scale = a.abs().max(b.abs());
            if scale <= f32::EPSILON || (a - b).abs() / scale <= tolerance {
                Ordering::Equal
            } else {
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }
        }
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}
