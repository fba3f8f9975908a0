use crate::config::subsystems::matcher::ScorerKind;
use crate::utils::string::default_process;
use super::similarity;

/// The SimilarityScorer trait defines the interface for comparing two strings.
/// Scores are normalized between 0.0 (nothing in common) and 100.0 (identical
/// after normalization).
pub trait SimilarityScorer: Send + Sync {
    /// Returns the kind of score this scorer computes
    fn kind(&self) -> ScorerKind;

    /// Scores two strings that were already passed through `default_process`
    fn score_processed(&self, a: &str, b: &str) -> f64;

    /// Normalizes both inputs and scores them
    fn score(&self, a: &str, b: &str) -> f64 {
        self.score_processed(&default_process(a), &default_process(b))
    }
}

/// Whole-string Indel ratio.
pub struct RatioScorer;

impl SimilarityScorer for RatioScorer {
    fn kind(&self) -> ScorerKind {
        ScorerKind::Ratio
    }

    #[inline]
    fn score_processed(&self, a: &str, b: &str) -> f64 {
        similarity::ratio(a, b)
    }
}

/// Best substring alignment of the shorter string inside the longer one.
pub struct PartialRatioScorer;

impl SimilarityScorer for PartialRatioScorer {
    fn kind(&self) -> ScorerKind {
        ScorerKind::PartialRatio
    }

    fn score_processed(&self, a: &str, b: &str) -> f64 {
        similarity::partial_ratio(a, b)
    }
}

pub struct TokenSortScorer;

impl SimilarityScorer for TokenSortScorer {
    fn kind(&self) -> ScorerKind {
        ScorerKind::TokenSortRatio
    }

    fn score_processed(&self, a: &str, b: &str) -> f64 {
        similarity::token_sort_ratio(a, b)
    }
}

pub struct TokenSetScorer;

impl SimilarityScorer for TokenSetScorer {
    fn kind(&self) -> ScorerKind {
        ScorerKind::TokenSetRatio
    }

    fn score_processed(&self, a: &str, b: &str) -> f64 {
        similarity::token_set_ratio(a, b)
    }
}

/// Default scorer: the maximum of the whole-string, partial and token scores
/// after length-dependent penalties.
pub struct WeightedRatioScorer;

impl SimilarityScorer for WeightedRatioScorer {
    fn kind(&self) -> ScorerKind {
        ScorerKind::WeightedRatio
    }

    #[inline]
    fn score_processed(&self, a: &str, b: &str) -> f64 {
        similarity::weighted_ratio(a, b)
    }
}

/// Returns the scorer implementation for a configured kind.
pub fn scorer_for(kind: ScorerKind) -> Box<dyn SimilarityScorer> {
    match kind {
        ScorerKind::Ratio => Box::new(RatioScorer),
        ScorerKind::PartialRatio => Box::new(PartialRatioScorer),
        ScorerKind::TokenSortRatio => Box::new(TokenSortScorer),
        ScorerKind::TokenSetRatio => Box::new(TokenSetScorer),
        ScorerKind::WeightedRatio => Box::new(WeightedRatioScorer),
    }
}
