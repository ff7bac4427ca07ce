// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Retrieval and build parameters.
//!
//! One flat struct covers both sides: the scorer defaults a query falls back
//! to when its operator tree does not override them, and the layout knobs the
//! index builder writes with. Missing fields in a JSON file take the defaults
//! below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::binary::{WriterOptions, DEFAULT_BLOCK_SIZE, DEFAULT_VOCAB_GROUP};
use crate::error::Result;
use crate::postings::PostingOptions;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// BM25 term-frequency saturation
    pub k1: f64,
    /// BM25 length normalization
    pub b: f64,
    /// Dirichlet smoothing mass
    pub mu: f64,
    /// Jelinek-Mercer background weight
    pub lambda: f64,
    /// Scorer applied to bare count nodes under `combine`
    pub default_scorer: String,
    /// Evaluate a root `combine` with MaxScore when fewer results than
    /// documents are requested
    pub max_score: bool,
    /// Results returned when the caller does not say
    pub requested: usize,
    pub skip_distance: u32,
    pub skip_reset_distance: u32,
    pub block_size: u32,
    pub vocab_group: u32,
    pub compressed: bool,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            k1: 1.2,
            b: 0.75,
            mu: 1500.0,
            lambda: 0.4,
            default_scorer: "dirichlet".to_string(),
            max_score: true,
            requested: 1000,
            skip_distance: 500,
            skip_reset_distance: 20,
            block_size: DEFAULT_BLOCK_SIZE,
            vocab_group: DEFAULT_VOCAB_GROUP,
            compressed: true,
        }
    }
}

impl Parameters {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            block_size: self.block_size,
            vocab_group: self.vocab_group,
            compressed: self.compressed,
        }
    }

    pub fn posting_options(&self) -> PostingOptions {
        PostingOptions {
            skip_distance: self.skip_distance,
            skip_reset_distance: self.skip_reset_distance,
        }
    }
}
