// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Document-at-a-time top-k.
//!
//! The driver walks the root scorer one candidate at a time: look up the
//! length, score, offer the result to a bounded heap, move past. Once the
//! heap is full its worst score is the threshold, and every time the heap
//! changes the new threshold is pushed down the tree so pruning operators
//! can skip documents that would not make it.
//!
//! Ties are broken towards the lower document id. A later candidate with a
//! score equal to the worst kept one never replaces it, and the output lists
//! equal scores in increasing id order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;

use crate::error::{IndexError, Result};
use crate::index::LengthSource;
use crate::iterator::{DocId, Scorable, ScoringContext};

/// One ranked result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDocument {
    pub document: DocId,
    pub score: f64,
    /// 1-based position in the result list.
    pub rank: usize,
    /// Index the document came from.
    pub source: String,
    /// External document name.
    pub name: String,
}

/// Heap entry ordered so that the worst kept result sits on top of the
/// max-heap: lower score is greater, and among equal scores a higher id is
/// greater.
#[derive(Debug, Clone, Copy)]
struct Kept {
    score: f64,
    document: DocId,
}

impl PartialEq for Kept {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Kept {}

impl PartialOrd for Kept {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Kept {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.document.cmp(&other.document))
    }
}

/// Bounded collection of the best `k` (document, score) pairs.
#[derive(Debug)]
pub struct TopKCollector {
    heap: BinaryHeap<Kept>,
    k: usize,
}

impl TopKCollector {
    pub fn new(k: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(k.saturating_add(1).min(1 << 16)),
            k,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.k
    }

    /// Worst kept score once the heap is full; −∞ before that.
    pub fn threshold(&self) -> f64 {
        if self.is_full() {
            self.heap.peek().map_or(f64::NEG_INFINITY, |k| k.score)
        } else {
            f64::NEG_INFINITY
        }
    }

    /// Offer a result. Returns whether the kept set changed. Pruned
    /// candidates (−∞) and NaN scores are never kept.
    pub fn offer(&mut self, document: DocId, score: f64) -> bool {
        if self.k == 0 || score.is_nan() || score == f64::NEG_INFINITY {
            return false;
        }
        if !self.is_full() {
            self.heap.push(Kept { score, document });
            return true;
        }
        let candidate = Kept { score, document };
        match self.heap.peek() {
            // Strictly better, or equal with a lower id (only possible when
            // results are offered out of id order).
            Some(worst) if candidate < *worst => {
                self.heap.pop();
                self.heap.push(candidate);
                true
            }
            _ => false,
        }
    }

    /// Kept results, best first.
    pub fn into_sorted(self) -> Vec<(DocId, f64)> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|k| (k.document, k.score))
            .collect()
    }
}

/// Drain `root`, returning the best `requested` documents best first.
pub fn collect_top_k(
    root: &mut dyn Scorable,
    lengths: &mut dyn LengthSource,
    requested: usize,
) -> Result<Vec<(DocId, f64)>> {
    let mut collector = TopKCollector::new(requested);
    if requested == 0 {
        return Ok(Vec::new());
    }
    let mut scored = 0u64;
    while !root.is_done() {
        let document = root.current_id();
        let length = lengths.length(document)?.ok_or_else(|| {
            IndexError::NotFound(format!("length of candidate document {}", document))
        })?;
        let score = root.score(&ScoringContext { document, length })?;
        scored += 1;
        if collector.offer(document, score) && collector.is_full() {
            root.set_threshold(collector.threshold());
        }
        root.move_past(document)?;
    }
    log::debug!(
        "scored {} candidates, kept {} (threshold {})",
        scored,
        collector.len(),
        collector.threshold()
    );
    Ok(collector.into_sorted())
}
