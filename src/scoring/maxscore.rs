// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! MaxScore: a weighted combination that skips documents which cannot make
//! the result list.
//!
//! Children are ordered once by how much a match can lift the score above
//! the background, `ŵᵢ·(hiᵢ − Aᵢ)`, biggest first, where `hiᵢ` is the child's
//! maximum and `Aᵢ` its background bound. Shorter lists win ties.
//!
//! # Quorum
//!
//! Given the current threshold (the worst score still in the result list),
//! the quorum `q` is the shortest prefix of children such that a document on
//! none of them cannot reach the threshold:
//!
//! ```text
//! Σ_{i<q} ŵᵢ·Aᵢ + Σ_{j≥q} ŵⱼ·hiⱼ < threshold − ε
//! ```
//!
//! Only the first `q` children produce candidates. The rest are moved to a
//! candidate lazily, when it is scored. `q = 0` means nothing can enter any
//! more and the iterator is done.
//!
//! # Scoring
//!
//! Start from the best case `Σ ŵᵢ·hiᵢ` and replace one bound at a time by the
//! child's real score. The running value only drops. The moment it falls
//! below the threshold the document is abandoned and scores −∞; children
//! after that point are never touched for it. A document that survives gets
//! exactly the weighted average `CombineIterator` would compute, summed in
//! the same order, so both produce bit-identical scores.

use super::combine::check_weights;
use super::weighted_sum;
use crate::error::{IndexError, Result};
use crate::iterator::{
    minimum_id, DocId, Positional, Scorable, ScoringContext, TERMINATED,
};

/// Relative slack on bound comparisons, so that rounding in the bound sums
/// can never prune a document whose real score reaches the threshold.
const SLACK: f64 = 1e-9;

pub struct MaxScoreIterator {
    /// Children in pruning order.
    children: Vec<Box<dyn Scorable>>,
    /// Position of each sorted child in the caller's order.
    original: Vec<usize>,
    /// Weights in the caller's order.
    weights: Vec<f64>,
    weight_sum: f64,
    /// Normalized weight, maximum, and background bound per sorted child.
    normalized: Vec<f64>,
    upper: Vec<f64>,
    background: Vec<f64>,
    total_upper: f64,
    threshold: f64,
    quorum: usize,
    /// Scores in the caller's order, for the final sum.
    scores: Vec<f64>,
}

impl MaxScoreIterator {
    pub fn new(children: Vec<Box<dyn Scorable>>, weights: Vec<f64>) -> Result<Self> {
        let weight_sum = check_weights(children.len(), &weights)?;
        if weights.iter().any(|&w| w < 0.0) {
            return Err(IndexError::InvalidParameter {
                name: "weights".to_string(),
                value: "maxscore needs non-negative weights".to_string(),
            });
        }

        let gain = |i: usize, c: &dyn Scorable| {
            weights[i] / weight_sum * (c.maximum_score() - c.maximum_background_score())
        };
        let mut order: Vec<usize> = (0..children.len()).collect();
        order.sort_by(|&a, &b| {
            let (ca, cb) = (children[a].as_ref(), children[b].as_ref());
            gain(b, cb)
                .total_cmp(&gain(a, ca))
                .then_with(|| ca.total_entries().cmp(&cb.total_entries()))
        });

        let mut slots: Vec<Option<Box<dyn Scorable>>> = children.into_iter().map(Some).collect();
        let mut sorted = Vec::with_capacity(order.len());
        for &i in &order {
            if let Some(child) = slots[i].take() {
                sorted.push(child);
            }
        }

        let normalized: Vec<f64> = order.iter().map(|&i| weights[i] / weight_sum).collect();
        let upper: Vec<f64> = sorted.iter().map(|c| c.maximum_score()).collect();
        let background: Vec<f64> = sorted.iter().map(|c| c.maximum_background_score()).collect();
        let total_upper = normalized.iter().zip(&upper).map(|(w, hi)| w * hi).sum();

        log::debug!(
            "maxscore over {} children, order {:?}, upper bound {:.6}",
            sorted.len(),
            order,
            total_upper
        );

        let n = sorted.len();
        Ok(Self {
            children: sorted,
            original: order,
            weights,
            weight_sum,
            normalized,
            upper,
            background,
            total_upper,
            threshold: f64::NEG_INFINITY,
            quorum: n,
            scores: vec![0.0; n],
        })
    }

    pub fn quorum(&self) -> usize {
        self.quorum
    }

    fn slack(&self) -> f64 {
        SLACK * (1.0 + self.threshold.abs())
    }

    fn recompute_quorum(&mut self) {
        let n = self.children.len();
        if self.threshold == f64::NEG_INFINITY {
            self.quorum = n;
            return;
        }
        let limit = self.threshold - self.slack();
        // bound(q) = Σ_{i<q} ŵA + Σ_{j≥q} ŵhi, decreasing in q
        let mut bound = self.total_upper;
        let mut quorum = n;
        for q in 0..=n {
            if bound < limit {
                quorum = q;
                break;
            }
            if q < n {
                bound += self.normalized[q] * (self.background[q] - self.upper[q]);
            }
        }
        if quorum != self.quorum {
            log::trace!(
                "maxscore quorum {} -> {} at threshold {}",
                self.quorum,
                quorum,
                self.threshold
            );
        }
        self.quorum = quorum;
    }
}

impl Positional for MaxScoreIterator {
    fn is_done(&self) -> bool {
        self.children[..self.quorum].iter().all(|c| c.is_done())
    }

    fn current_id(&self) -> DocId {
        if self.quorum == 0 {
            return TERMINATED;
        }
        minimum_id(&self.children[..self.quorum])
    }

    fn move_to(&mut self, target: DocId) -> Result<bool> {
        for child in self.children[..self.quorum].iter_mut() {
            if !child.is_done() && child.current_id() < target {
                child.move_to(target)?;
            }
        }
        Ok(self.has_match(target))
    }

    fn reset(&mut self) -> Result<()> {
        for child in self.children.iter_mut() {
            child.reset()?;
        }
        self.threshold = f64::NEG_INFINITY;
        self.quorum = self.children.len();
        Ok(())
    }

    fn total_entries(&self) -> u64 {
        self.children
            .iter()
            .map(|c| c.total_entries())
            .max()
            .unwrap_or(0)
    }
}

impl Scorable for MaxScoreIterator {
    fn score(&mut self, context: &ScoringContext) -> Result<f64> {
        let limit = self.threshold - self.slack();
        let mut potential = self.total_upper;
        for i in 0..self.children.len() {
            let child = &mut self.children[i];
            if !child.is_done() && child.current_id() < context.document {
                child.move_to(context.document)?;
            }
            let score = child.score(context)?;
            self.scores[self.original[i]] = score;
            potential += self.normalized[i] * (score - self.upper[i]);
            if potential < limit {
                return Ok(f64::NEG_INFINITY);
            }
        }
        Ok(weighted_sum(&self.weights, &self.scores, self.weight_sum))
    }

    fn maximum_score(&self) -> f64 {
        self.total_upper
    }

    fn minimum_score(&self) -> f64 {
        self.children
            .iter()
            .zip(&self.normalized)
            .map(|(c, w)| w * c.minimum_score())
            .sum()
    }

    fn maximum_background_score(&self) -> f64 {
        self.normalized
            .iter()
            .zip(&self.background)
            .map(|(w, a)| w * a)
            .sum()
    }

    fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold;
        self.recompute_quorum();
    }
}
