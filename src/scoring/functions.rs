// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Scoring functions: `(count, document length) -> score`.
//!
//! Each function is built once per query node from collection and node
//! statistics, then evaluated per candidate. Besides the score itself every
//! function reports three bounds used by MaxScore:
//!
//! | bound            | meaning                                   |
//! |------------------|-------------------------------------------|
//! | maximum          | no document scores higher                 |
//! | minimum          | no document scores lower                  |
//! | background bound | no document with count 0 scores higher    |
//!
//! Getting a bound wrong does not crash anything. It silently drops
//! documents from the top-k, which is why the property tests compare
//! MaxScore against exhaustive scoring.

use std::fmt::Debug;

use crate::config::Parameters;
use crate::error::{IndexError, Result};
use crate::iterator::NodeStatistics;

/// Whole-collection numbers, from the lengths part manifest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectionStatistics {
    pub collection_length: u64,
    pub document_count: u64,
    pub max_length: u32,
    pub min_length: u32,
}

impl CollectionStatistics {
    pub fn average_length(&self) -> f64 {
        if self.document_count == 0 {
            0.0
        } else {
            self.collection_length as f64 / self.document_count as f64
        }
    }

    /// Collection probability of a node with `frequency` occurrences. Unseen
    /// nodes get half an occurrence so smoothed scores stay finite.
    pub fn background_probability(&self, frequency: u64) -> f64 {
        let length = self.collection_length.max(1) as f64;
        let p = if frequency == 0 {
            0.5 / length
        } else {
            frequency as f64 / length
        };
        p.min(1.0)
    }
}

/// Knobs the scoring functions read. Node parameters override the
/// retrieval-wide defaults before one of these is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorerSettings {
    pub k1: f64,
    pub b: f64,
    pub mu: f64,
    pub lambda: f64,
}

impl From<&Parameters> for ScorerSettings {
    fn from(params: &Parameters) -> Self {
        Self {
            k1: params.k1,
            b: params.b,
            mu: params.mu,
            lambda: params.lambda,
        }
    }
}

pub trait ScoringFunction: Send + Sync + Debug {
    fn name(&self) -> &'static str;
    fn score(&self, count: u32, length: u32) -> f64;
    fn maximum_score(&self) -> f64;
    fn minimum_score(&self) -> f64;
    fn maximum_background_score(&self) -> f64;
}

// ============================================================================
// BM25
// ============================================================================

#[derive(Debug, Clone)]
pub struct Bm25 {
    k1: f64,
    b: f64,
    idf: f64,
    average_length: f64,
    max_count: u32,
}

impl Bm25 {
    pub fn new(
        settings: &ScorerSettings,
        collection: &CollectionStatistics,
        node: &NodeStatistics,
    ) -> Self {
        let n = collection.document_count as f64;
        let df = node.node_document_count as f64;
        Self {
            k1: settings.k1,
            b: settings.b,
            idf: ((n - df + 0.5) / (df + 0.5) + 1.0).ln(),
            average_length: collection.average_length().max(1.0),
            max_count: node.maximum_count,
        }
    }
}

impl ScoringFunction for Bm25 {
    fn name(&self) -> &'static str {
        "bm25"
    }

    fn score(&self, count: u32, length: u32) -> f64 {
        // With b = 1 and an empty document the norm is 0, and 0/0 for tf = 0.
        if count == 0 {
            return 0.0;
        }
        let tf = count as f64;
        let norm = 1.0 - self.b + self.b * (length as f64 / self.average_length);
        self.idf * (tf * (self.k1 + 1.0)) / (tf + self.k1 * norm)
    }

    /// Largest count, shortest possible document.
    fn maximum_score(&self) -> f64 {
        self.score(self.max_count, 0)
    }

    fn minimum_score(&self) -> f64 {
        0.0
    }

    fn maximum_background_score(&self) -> f64 {
        0.0
    }
}

// ============================================================================
// DIRICHLET
// ============================================================================

#[derive(Debug, Clone)]
pub struct Dirichlet {
    mu: f64,
    background: f64,
    max_count: u32,
    max_length: u32,
    min_length: u32,
}

impl Dirichlet {
    pub fn new(
        settings: &ScorerSettings,
        collection: &CollectionStatistics,
        node: &NodeStatistics,
    ) -> Self {
        Self {
            mu: settings.mu,
            background: collection.background_probability(node.node_frequency),
            max_count: node.maximum_count,
            max_length: collection.max_length,
            min_length: collection.min_length,
        }
    }
}

impl ScoringFunction for Dirichlet {
    fn name(&self) -> &'static str {
        "dirichlet"
    }

    fn score(&self, count: u32, length: u32) -> f64 {
        let numerator = count as f64 + self.mu * self.background;
        let denominator = length as f64 + self.mu;
        (numerator / denominator).ln()
    }

    /// A document holding nothing but the node, as often as it ever occurs.
    fn maximum_score(&self) -> f64 {
        self.score(self.max_count, self.max_count)
    }

    fn minimum_score(&self) -> f64 {
        self.score(0, self.max_length)
    }

    fn maximum_background_score(&self) -> f64 {
        self.score(0, self.min_length)
    }
}

// ============================================================================
// JELINEK-MERCER
// ============================================================================

#[derive(Debug, Clone)]
pub struct JelinekMercer {
    lambda: f64,
    background: f64,
}

impl JelinekMercer {
    pub fn new(
        settings: &ScorerSettings,
        collection: &CollectionStatistics,
        node: &NodeStatistics,
    ) -> Self {
        Self {
            lambda: settings.lambda,
            background: collection.background_probability(node.node_frequency),
        }
    }
}

impl ScoringFunction for JelinekMercer {
    fn name(&self) -> &'static str {
        "jm"
    }

    fn score(&self, count: u32, length: u32) -> f64 {
        let foreground = if length == 0 {
            0.0
        } else {
            (count as f64 / length as f64).min(1.0)
        };
        ((1.0 - self.lambda) * foreground + self.lambda * self.background).ln()
    }

    fn maximum_score(&self) -> f64 {
        ((1.0 - self.lambda) + self.lambda * self.background).ln()
    }

    fn minimum_score(&self) -> f64 {
        (self.lambda * self.background).ln()
    }

    fn maximum_background_score(&self) -> f64 {
        self.minimum_score()
    }
}

// ============================================================================
// FACTORY
// ============================================================================

pub const SCORER_NAMES: &[&str] = &["bm25", "dirichlet", "jm"];

/// Build the scorer called `name`.
pub fn create_function(
    name: &str,
    settings: &ScorerSettings,
    collection: &CollectionStatistics,
    node: &NodeStatistics,
) -> Result<Box<dyn ScoringFunction>> {
    validate(settings)?;
    match name {
        "bm25" => Ok(Box::new(Bm25::new(settings, collection, node))),
        "dirichlet" => Ok(Box::new(Dirichlet::new(settings, collection, node))),
        "jm" | "jelinek-mercer" => Ok(Box::new(JelinekMercer::new(settings, collection, node))),
        other => Err(IndexError::unsupported(format!(
            "unknown scorer '{}' (expected one of {:?})",
            other, SCORER_NAMES
        ))),
    }
}

fn validate(settings: &ScorerSettings) -> Result<()> {
    let invalid = |name: &str, value: f64| {
        Err(IndexError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        })
    };
    if !(settings.mu > 0.0) {
        return invalid("mu", settings.mu);
    }
    if !(settings.lambda > 0.0 && settings.lambda <= 1.0) {
        return invalid("lambda", settings.lambda);
    }
    if !(settings.k1 > 0.0) {
        return invalid("k1", settings.k1);
    }
    if !(0.0..=1.0).contains(&settings.b) {
        return invalid("b", settings.b);
    }
    Ok(())
}
