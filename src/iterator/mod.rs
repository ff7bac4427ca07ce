// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Capability traits for document-at-a-time iterators.
//!
//! Every node of an evaluated query is a forward-only cursor over sorted
//! document ids. What else a node can answer depends on what it is:
//!
//! ```text
//!                   Positional           is_done, current_id, move_to, ...
//!                  /     |     \
//!          Countable  Scorable  Indicator
//!              |
//!          Extentable
//! ```
//!
//! A term's posting list is `Extentable` (and so `Countable`). A window
//! operator produces extents. A scorer turns a count into a number. An
//! indicator says yes or no. Operators take children by the capability they
//! need, so asking a score node for extents fails while the tree is being
//! built, never in the middle of a query.
//!
//! Cursors never move backwards. `move_to(t)` positions on the first document
//! `>= t`; `reset()` is the only way back to the start.

pub mod conjunction;
pub mod disjunction;
pub mod indicator;
pub mod inside;
pub mod memory;
pub mod synonym;
pub mod window;

pub use conjunction::ConjunctionIterator;
pub use disjunction::DisjunctionIterator;
pub use indicator::{AllIndicator, AnyIndicator, PresenceIndicator, RejectScorer, RequireScorer};
pub use inside::InsideIterator;
pub use memory::MemoryListIterator;
pub use synonym::SynonymIterator;
pub use window::{OrderedWindowIterator, UnorderedWindowIterator};

use std::cmp::Ordering;

use crate::error::{IndexError, Result};

/// Document identifier. Ids are dense and assigned in build order.
pub type DocId = u32;

/// `current_id()` of an exhausted iterator. Sorts after every real id.
pub const TERMINATED: DocId = DocId::MAX;

// ============================================================================
// EXTENTS
// ============================================================================

/// One `[begin, end)` span of positions, with an optional payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub begin: u32,
    pub end: u32,
    pub value: u64,
}

/// The extents of one document, sorted by `begin`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtentArray {
    document: DocId,
    begins: Vec<u32>,
    ends: Vec<u32>,
    values: Vec<u64>,
}

impl ExtentArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> DocId {
        self.document
    }

    /// Empty the array and tag it with the document it will describe.
    pub fn reset(&mut self, document: DocId) {
        self.document = document;
        self.begins.clear();
        self.ends.clear();
        self.values.clear();
    }

    pub fn push(&mut self, begin: u32, end: u32) {
        self.push_with_value(begin, end, 0);
    }

    pub fn push_with_value(&mut self, begin: u32, end: u32, value: u64) {
        self.begins.push(begin);
        self.ends.push(end);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.begins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.begins.is_empty()
    }

    pub fn begin(&self, index: usize) -> u32 {
        self.begins[index]
    }

    pub fn end(&self, index: usize) -> u32 {
        self.ends[index]
    }

    pub fn value(&self, index: usize) -> u64 {
        self.values[index]
    }

    pub fn get(&self, index: usize) -> Extent {
        Extent {
            begin: self.begins[index],
            end: self.ends[index],
            value: self.values[index],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Extent> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }
}

// ============================================================================
// SCORING CONTEXT AND STATISTICS
// ============================================================================

/// The document being scored, set once per candidate by the retrieval loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringContext {
    pub document: DocId,
    pub length: u32,
}

/// Collection statistics of one count-producing node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeStatistics {
    /// Sum of counts over every document.
    pub node_frequency: u64,
    /// Documents with a non-zero count.
    pub node_document_count: u64,
    /// Largest count in any one document.
    pub maximum_count: u32,
}

// ============================================================================
// CAPABILITY TRAITS
// ============================================================================

/// A forward-only cursor over sorted document ids.
pub trait Positional: Send {
    fn is_done(&self) -> bool;

    /// Current document, or [`TERMINATED`] once exhausted.
    fn current_id(&self) -> DocId;

    /// Advance to the first document `>= target`. Returns whether the cursor
    /// now sits exactly on `target`. Never moves backwards.
    fn move_to(&mut self, target: DocId) -> Result<bool>;

    /// Advance to the first document `> document`.
    fn move_past(&mut self, document: DocId) -> Result<()> {
        self.move_to(document.saturating_add(1))?;
        Ok(())
    }

    /// Rewind to the first document.
    fn reset(&mut self) -> Result<()>;

    /// Size estimate used for planning (documents in the list, or a bound).
    fn total_entries(&self) -> u64;

    /// Whether this iterator has an entry for `document` right now.
    fn has_match(&self, document: DocId) -> bool {
        !self.is_done() && self.current_id() == document
    }
}

/// Iterators that know how often they match the current document.
pub trait Countable: Positional {
    /// Count at the current document; 0 once exhausted.
    fn count(&self) -> u32;

    /// Whole-list statistics, when they are known without a scan.
    fn statistics(&self) -> Option<NodeStatistics> {
        None
    }
}

/// Iterators that expose where in the current document they match.
pub trait Extentable: Countable {
    fn extents(&self) -> &ExtentArray;
}

/// Iterators that produce a score for the candidate document.
pub trait Scorable: Positional {
    /// Score of `context.document`. Children not positioned on the document
    /// score it as absent.
    fn score(&mut self, context: &ScoringContext) -> Result<f64>;

    /// Upper bound of every score this iterator can return.
    fn maximum_score(&self) -> f64;

    /// Lower bound of every score this iterator can return.
    fn minimum_score(&self) -> f64;

    /// Upper bound of the score of a document this iterator does not match.
    fn maximum_background_score(&self) -> f64 {
        self.maximum_score()
    }

    /// Lowest score that can still enter the result list. Pruning operators
    /// may skip work for documents that cannot reach it.
    fn set_threshold(&mut self, _threshold: f64) {}
}

/// Boolean filters: a document either passes or it does not.
pub trait Indicator: Positional {
    fn indicator(&self, document: DocId) -> bool {
        self.has_match(document)
    }
}

// Boxed iterators delegate, so `Box<dyn Extentable>` can stand in wherever a
// `Countable` or `Positional` child is expected.

impl<T: Positional + ?Sized> Positional for Box<T> {
    #[inline]
    fn is_done(&self) -> bool {
        (**self).is_done()
    }
    #[inline]
    fn current_id(&self) -> DocId {
        (**self).current_id()
    }
    #[inline]
    fn move_to(&mut self, target: DocId) -> Result<bool> {
        (**self).move_to(target)
    }
    #[inline]
    fn move_past(&mut self, document: DocId) -> Result<()> {
        (**self).move_past(document)
    }
    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }
    fn total_entries(&self) -> u64 {
        (**self).total_entries()
    }
    #[inline]
    fn has_match(&self, document: DocId) -> bool {
        (**self).has_match(document)
    }
}

impl<T: Countable + ?Sized> Countable for Box<T> {
    #[inline]
    fn count(&self) -> u32 {
        (**self).count()
    }
    fn statistics(&self) -> Option<NodeStatistics> {
        (**self).statistics()
    }
}

impl<T: Extentable + ?Sized> Extentable for Box<T> {
    #[inline]
    fn extents(&self) -> &ExtentArray {
        (**self).extents()
    }
}

impl<T: Scorable + ?Sized> Scorable for Box<T> {
    fn score(&mut self, context: &ScoringContext) -> Result<f64> {
        (**self).score(context)
    }
    fn maximum_score(&self) -> f64 {
        (**self).maximum_score()
    }
    fn minimum_score(&self) -> f64 {
        (**self).minimum_score()
    }
    fn maximum_background_score(&self) -> f64 {
        (**self).maximum_background_score()
    }
    fn set_threshold(&mut self, threshold: f64) {
        (**self).set_threshold(threshold)
    }
}

impl<T: Indicator + ?Sized> Indicator for Box<T> {
    fn indicator(&self, document: DocId) -> bool {
        (**self).indicator(document)
    }
}

// ============================================================================
// TAGGED ITERATOR
// ============================================================================

/// An iterator built from one operator node, tagged by its strongest
/// capability.
pub enum NodeIterator {
    Extents(Box<dyn Extentable>),
    Counts(Box<dyn Countable>),
    Scores(Box<dyn Scorable>),
    Indicator(Box<dyn Indicator>),
}

impl NodeIterator {
    pub fn kind(&self) -> &'static str {
        match self {
            NodeIterator::Extents(_) => "extents",
            NodeIterator::Counts(_) => "counts",
            NodeIterator::Scores(_) => "scores",
            NodeIterator::Indicator(_) => "indicator",
        }
    }

    pub fn is_countable(&self) -> bool {
        matches!(self, NodeIterator::Extents(_) | NodeIterator::Counts(_))
    }

    pub fn into_extents(self) -> Result<Box<dyn Extentable>> {
        match self {
            NodeIterator::Extents(it) => Ok(it),
            other => Err(IndexError::unsupported(format!(
                "{} node cannot produce extents",
                other.kind()
            ))),
        }
    }

    pub fn into_counts(self) -> Result<Box<dyn Countable>> {
        match self {
            NodeIterator::Extents(it) => Ok(Box::new(it)),
            NodeIterator::Counts(it) => Ok(it),
            other => Err(IndexError::unsupported(format!(
                "{} node cannot produce counts",
                other.kind()
            ))),
        }
    }

    pub fn into_scores(self) -> Result<Box<dyn Scorable>> {
        match self {
            NodeIterator::Scores(it) => Ok(it),
            other => Err(IndexError::unsupported(format!(
                "{} node cannot produce scores",
                other.kind()
            ))),
        }
    }

    /// Any node can act as a filter: it passes the documents it is on.
    pub fn into_indicator(self) -> Box<dyn Indicator> {
        match self {
            NodeIterator::Indicator(it) => it,
            other => Box::new(PresenceIndicator::new(other.into_positional())),
        }
    }

    pub fn into_positional(self) -> Box<dyn Positional> {
        match self {
            NodeIterator::Extents(it) => Box::new(it),
            NodeIterator::Counts(it) => Box::new(it),
            NodeIterator::Scores(it) => Box::new(it),
            NodeIterator::Indicator(it) => Box::new(it),
        }
    }
}

// ============================================================================
// SHARED HELPERS
// ============================================================================

/// Queue order for iterators: exhausted ones last, then by current id.
pub fn compare_positions<A, B>(a: &A, b: &B) -> Ordering
where
    A: Positional + ?Sized,
    B: Positional + ?Sized,
{
    match (a.is_done(), b.is_done()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.current_id().cmp(&b.current_id()),
    }
}

/// Smallest current id among children that are not done.
pub fn minimum_id<T: Positional>(children: &[T]) -> DocId {
    children
        .iter()
        .filter(|c| !c.is_done())
        .map(|c| c.current_id())
        .min()
        .unwrap_or(TERMINATED)
}

/// Move every child to its first document `>= target`.
pub fn move_all_to<T: Positional>(children: &mut [T], target: DocId) -> Result<()> {
    for child in children.iter_mut() {
        if !child.is_done() && child.current_id() < target {
            child.move_to(target)?;
        }
    }
    Ok(())
}

/// Sum the counts a countable iterator produces over the whole list,
/// leaving it exhausted.
pub fn collect_statistics<T: Countable + ?Sized>(iterator: &mut T) -> Result<NodeStatistics> {
    let mut stats = NodeStatistics::default();
    while !iterator.is_done() {
        let count = iterator.count();
        if count > 0 {
            stats.node_frequency += count as u64;
            stats.node_document_count += 1;
            stats.maximum_count = stats.maximum_count.max(count);
        }
        let document = iterator.current_id();
        iterator.move_past(document)?;
    }
    Ok(stats)
}
