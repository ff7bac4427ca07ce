// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Weighted combination of scorers: `Σ wᵢ·sᵢ / Σ wᵢ`.
//!
//! Candidates are the union of the children's documents. Every child is
//! moved to the candidate before it is scored; a child that has no entry for
//! it contributes its background score.

use super::weighted_sum;
use crate::error::{IndexError, Result};
use crate::iterator::{
    minimum_id, move_all_to, DocId, Positional, Scorable, ScoringContext, TERMINATED,
};

pub struct CombineIterator {
    children: Vec<Box<dyn Scorable>>,
    weights: Vec<f64>,
    weight_sum: f64,
    scores: Vec<f64>,
}

impl CombineIterator {
    pub fn new(children: Vec<Box<dyn Scorable>>, weights: Vec<f64>) -> Result<Self> {
        let weight_sum = check_weights(children.len(), &weights)?;
        let scores = vec![0.0; children.len()];
        Ok(Self {
            children,
            weights,
            weight_sum,
            scores,
        })
    }

    /// Every child weighted 1.
    pub fn unweighted(children: Vec<Box<dyn Scorable>>) -> Result<Self> {
        let weights = vec![1.0; children.len()];
        Self::new(children, weights)
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Children and weights, for handing over to MaxScore.
    pub fn into_parts(self) -> (Vec<Box<dyn Scorable>>, Vec<f64>) {
        (self.children, self.weights)
    }

    /// Weighted bound, taking `positive` of children with a non-negative
    /// weight and `negative` of the others.
    fn bound(&self, positive: fn(&dyn Scorable) -> f64, negative: fn(&dyn Scorable) -> f64) -> f64 {
        let total: f64 = self
            .children
            .iter()
            .zip(&self.weights)
            .map(|(c, &w)| {
                if w >= 0.0 {
                    w * positive(c.as_ref())
                } else {
                    w * negative(c.as_ref())
                }
            })
            .sum();
        total / self.weight_sum
    }
}

/// Validate weights and return their sum.
pub(crate) fn check_weights(children: usize, weights: &[f64]) -> Result<f64> {
    if weights.len() != children {
        return Err(IndexError::InvalidParameter {
            name: "weights".to_string(),
            value: format!("{} weights for {} children", weights.len(), children),
        });
    }
    if let Some(w) = weights.iter().find(|w| !w.is_finite()) {
        return Err(IndexError::InvalidParameter {
            name: "weights".to_string(),
            value: w.to_string(),
        });
    }
    let sum: f64 = weights.iter().sum();
    if sum == 0.0 && children > 0 {
        return Err(IndexError::InvalidParameter {
            name: "weights".to_string(),
            value: "weights sum to zero".to_string(),
        });
    }
    Ok(sum)
}

impl Positional for CombineIterator {
    fn is_done(&self) -> bool {
        self.children.iter().all(|c| c.is_done())
    }

    fn current_id(&self) -> DocId {
        if self.children.is_empty() {
            return TERMINATED;
        }
        minimum_id(&self.children)
    }

    fn move_to(&mut self, target: DocId) -> Result<bool> {
        move_all_to(&mut self.children, target)?;
        Ok(self.has_match(target))
    }

    fn reset(&mut self) -> Result<()> {
        for child in self.children.iter_mut() {
            child.reset()?;
        }
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

impl Scorable for CombineIterator {
    fn score(&mut self, context: &ScoringContext) -> Result<f64> {
        for (child, slot) in self.children.iter_mut().zip(self.scores.iter_mut()) {
            if !child.is_done() && child.current_id() < context.document {
                child.move_to(context.document)?;
            }
            *slot = child.score(context)?;
        }
        Ok(weighted_sum(&self.weights, &self.scores, self.weight_sum))
    }

    fn maximum_score(&self) -> f64 {
        self.bound(|c| c.maximum_score(), |c| c.minimum_score())
    }

    fn minimum_score(&self) -> f64 {
        self.bound(|c| c.minimum_score(), |c| c.maximum_score())
    }

    fn maximum_background_score(&self) -> f64 {
        self.bound(|c| c.maximum_background_score(), |c| c.minimum_score())
    }

    /// Not forwarded. The threshold bounds the combined score; a child can
    /// fall below it and still lift the sum above it.
    fn set_threshold(&mut self, _threshold: f64) {}
}
