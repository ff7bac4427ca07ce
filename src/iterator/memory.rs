// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Posting list held in memory.
//!
//! Stands in for a term that is not in the index (an empty list) and for
//! hand-built fixtures in tests. Behaves exactly like a disk list: same
//! capabilities, same forward-only contract.

use super::{
    Countable, DocId, ExtentArray, Extentable, NodeStatistics, Positional, TERMINATED,
};
use crate::error::Result;

/// One document of an in-memory list.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryPosting {
    pub document: DocId,
    pub count: u32,
    /// `(begin, end, value)` triples; empty for count-only lists.
    pub extents: Vec<(u32, u32, u64)>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryListIterator {
    postings: Vec<MemoryPosting>,
    index: usize,
    extents: ExtentArray,
}

impl MemoryListIterator {
    /// Postings must be sorted by strictly increasing document id.
    pub fn new(postings: Vec<MemoryPosting>) -> Self {
        debug_assert!(postings.windows(2).all(|w| w[0].document < w[1].document));
        let mut it = Self {
            postings,
            index: 0,
            extents: ExtentArray::new(),
        };
        it.load();
        it
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn from_counts(counts: &[(DocId, u32)]) -> Self {
        Self::new(
            counts
                .iter()
                .map(|&(document, count)| MemoryPosting {
                    document,
                    count,
                    extents: Vec::new(),
                })
                .collect(),
        )
    }

    /// Single-position extents, the shape a term's position list has.
    pub fn from_positions(positions: &[(DocId, &[u32])]) -> Self {
        Self::new(
            positions
                .iter()
                .map(|&(document, ps)| MemoryPosting {
                    document,
                    count: ps.len() as u32,
                    extents: ps.iter().map(|&p| (p, p + 1, 0)).collect(),
                })
                .collect(),
        )
    }

    fn load(&mut self) {
        match self.postings.get(self.index) {
            Some(posting) => {
                self.extents.reset(posting.document);
                for &(begin, end, value) in &posting.extents {
                    self.extents.push_with_value(begin, end, value);
                }
            }
            None => self.extents.reset(TERMINATED),
        }
    }
}

impl Positional for MemoryListIterator {
    fn is_done(&self) -> bool {
        self.index >= self.postings.len()
    }

    fn current_id(&self) -> DocId {
        self.postings
            .get(self.index)
            .map(|p| p.document)
            .unwrap_or(TERMINATED)
    }

    fn move_to(&mut self, target: DocId) -> Result<bool> {
        if self.current_id() < target {
            let remaining = &self.postings[self.index..];
            self.index += remaining.partition_point(|p| p.document < target);
            self.load();
        }
        Ok(self.has_match(target))
    }

    fn reset(&mut self) -> Result<()> {
        self.index = 0;
        self.load();
        Ok(())
    }

    fn total_entries(&self) -> u64 {
        self.postings.len() as u64
    }
}

impl Countable for MemoryListIterator {
    fn count(&self) -> u32 {
        self.postings.get(self.index).map(|p| p.count).unwrap_or(0)
    }

    fn statistics(&self) -> Option<NodeStatistics> {
        Some(NodeStatistics {
            node_frequency: self.postings.iter().map(|p| p.count as u64).sum(),
            node_document_count: self.postings.iter().filter(|p| p.count > 0).count() as u64,
            maximum_count: self.postings.iter().map(|p| p.count).max().unwrap_or(0),
        })
    }
}

impl Extentable for MemoryListIterator {
    fn extents(&self) -> &ExtentArray {
        &self.extents
    }
}
