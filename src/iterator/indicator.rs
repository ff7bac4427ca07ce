// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Boolean filters and the scorers they gate.
//!
//! `all` and `any` answer yes/no per document. `require` and `reject` put
//! such an answer in front of a scorer: the first only visits documents the
//! filter accepts, the second only visits documents it does not.

use super::conjunction::ConjunctionIterator;
use super::{
    minimum_id, move_all_to, DocId, Indicator, Positional, Scorable, ScoringContext,
};
use crate::error::Result;

/// Any positional iterator used as a filter: it passes the documents it is on.
pub struct PresenceIndicator {
    inner: Box<dyn Positional>,
}

impl PresenceIndicator {
    pub fn new(inner: Box<dyn Positional>) -> Self {
        Self { inner }
    }
}

impl Positional for PresenceIndicator {
    fn is_done(&self) -> bool {
        self.inner.is_done()
    }
    fn current_id(&self) -> DocId {
        self.inner.current_id()
    }
    fn move_to(&mut self, target: DocId) -> Result<bool> {
        self.inner.move_to(target)
    }
    fn reset(&mut self) -> Result<()> {
        self.inner.reset()
    }
    fn total_entries(&self) -> u64 {
        self.inner.total_entries()
    }
}

impl Indicator for PresenceIndicator {}

// ============================================================================
// ALL / ANY
// ============================================================================

/// Passes documents every child is on. Shortest children lead.
pub struct AllIndicator {
    aligned: ConjunctionIterator,
}

impl AllIndicator {
    pub fn new(children: Vec<Box<dyn Positional>>) -> Result<Self> {
        Ok(Self {
            aligned: ConjunctionIterator::sorted_by_size(children)?,
        })
    }
}

impl Positional for AllIndicator {
    fn is_done(&self) -> bool {
        self.aligned.is_done()
    }
    fn current_id(&self) -> DocId {
        self.aligned.current_id()
    }
    fn move_to(&mut self, target: DocId) -> Result<bool> {
        self.aligned.move_to(target)
    }
    fn reset(&mut self) -> Result<()> {
        self.aligned.reset()
    }
    fn total_entries(&self) -> u64 {
        self.aligned.total_entries()
    }
}

impl Indicator for AllIndicator {}

/// Passes documents any child is on. No queue: the children are few, so
/// the minimum is recomputed on each step.
pub struct AnyIndicator {
    children: Vec<Box<dyn Positional>>,
}

impl AnyIndicator {
    pub fn new(children: Vec<Box<dyn Positional>>) -> Self {
        Self { children }
    }
}

impl Positional for AnyIndicator {
    fn is_done(&self) -> bool {
        self.children.iter().all(|c| c.is_done())
    }
    fn current_id(&self) -> DocId {
        minimum_id(&self.children)
    }
    fn move_to(&mut self, target: DocId) -> Result<bool> {
        move_all_to(&mut self.children, target)?;
        Ok(self.current_id() == target && !self.is_done())
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

impl Indicator for AnyIndicator {}

// ============================================================================
// REQUIRE / REJECT
// ============================================================================

/// Scores only the documents the filter accepts. Candidates come from the
/// filter; any other document scores the scorer's minimum.
pub struct RequireScorer {
    filter: Box<dyn Indicator>,
    scorer: Box<dyn Scorable>,
}

impl RequireScorer {
    pub fn new(filter: Box<dyn Indicator>, scorer: Box<dyn Scorable>) -> Self {
        Self { filter, scorer }
    }
}

impl Positional for RequireScorer {
    fn is_done(&self) -> bool {
        self.filter.is_done()
    }
    fn current_id(&self) -> DocId {
        self.filter.current_id()
    }
    fn move_to(&mut self, target: DocId) -> Result<bool> {
        self.filter.move_to(target)
    }
    fn reset(&mut self) -> Result<()> {
        self.filter.reset()?;
        self.scorer.reset()
    }
    fn total_entries(&self) -> u64 {
        self.filter.total_entries()
    }
}

impl Scorable for RequireScorer {
    fn score(&mut self, context: &ScoringContext) -> Result<f64> {
        self.filter.move_to(context.document)?;
        if !self.filter.indicator(context.document) {
            return Ok(self.scorer.minimum_score());
        }
        self.scorer.move_to(context.document)?;
        self.scorer.score(context)
    }
    fn maximum_score(&self) -> f64 {
        self.scorer.maximum_score()
    }
    fn minimum_score(&self) -> f64 {
        self.scorer.minimum_score()
    }
    fn maximum_background_score(&self) -> f64 {
        self.scorer.maximum_background_score()
    }
}

/// Scores only the documents the filter rejects. Candidates come from the
/// scorer, minus the filter's documents, which score the scorer's minimum.
pub struct RejectScorer {
    filter: Box<dyn Indicator>,
    scorer: Box<dyn Scorable>,
}

impl RejectScorer {
    pub fn new(filter: Box<dyn Indicator>, scorer: Box<dyn Scorable>) -> Result<Self> {
        let mut it = Self { filter, scorer };
        it.skip_rejected()?;
        Ok(it)
    }

    fn skip_rejected(&mut self) -> Result<()> {
        while !self.scorer.is_done() {
            let document = self.scorer.current_id();
            self.filter.move_to(document)?;
            if !self.filter.indicator(document) {
                break;
            }
            self.scorer.move_past(document)?;
        }
        Ok(())
    }
}

impl Positional for RejectScorer {
    fn is_done(&self) -> bool {
        self.scorer.is_done()
    }
    fn current_id(&self) -> DocId {
        self.scorer.current_id()
    }
    fn move_to(&mut self, target: DocId) -> Result<bool> {
        if !self.scorer.is_done() && self.scorer.current_id() < target {
            self.scorer.move_to(target)?;
            self.skip_rejected()?;
        }
        Ok(self.has_match(target))
    }
    fn reset(&mut self) -> Result<()> {
        self.filter.reset()?;
        self.scorer.reset()?;
        self.skip_rejected()
    }
    fn total_entries(&self) -> u64 {
        self.scorer.total_entries()
    }
}

impl Scorable for RejectScorer {
    fn score(&mut self, context: &ScoringContext) -> Result<f64> {
        self.filter.move_to(context.document)?;
        if self.filter.indicator(context.document) {
            return Ok(self.scorer.minimum_score());
        }
        self.scorer.move_to(context.document)?;
        self.scorer.score(context)
    }
    fn maximum_score(&self) -> f64 {
        self.scorer.maximum_score()
    }
    fn minimum_score(&self) -> f64 {
        self.scorer.minimum_score()
    }
    fn maximum_background_score(&self) -> f64 {
        self.scorer.maximum_background_score()
    }
}
