// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Scoring: how counts become numbers, and how numbers are combined.
//!
//! A `FeatureScorer` turns one count iterator into scores with BM25,
//! Dirichlet or Jelinek-Mercer. `CombineIterator` averages several scorers
//! with weights. `MaxScoreIterator` computes the same average but skips
//! documents that provably cannot reach the result list.
//!
//! The pruning is only as good as the bounds each scorer reports, so every
//! scorer is tested against its own maximum and minimum.

pub mod combine;
pub mod feature;
pub mod functions;
pub mod maxscore;

pub use combine::CombineIterator;
pub use feature::FeatureScorer;
pub use functions::{
    create_function, Bm25, CollectionStatistics, Dirichlet, JelinekMercer, ScorerSettings,
    ScoringFunction, SCORER_NAMES,
};
pub use maxscore::MaxScoreIterator;

/// `Σ wᵢ·sᵢ / Σ wᵢ`, summed in index order. Combine and MaxScore both go
/// through here so their results agree to the bit.
pub(crate) fn weighted_sum(weights: &[f64], scores: &[f64], weight_sum: f64) -> f64 {
    let mut total = 0.0;
    for (w, s) in weights.iter().zip(scores) {
        total += w * s;
    }
    total / weight_sum
}
