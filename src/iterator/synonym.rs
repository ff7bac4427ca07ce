// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Synonym merge: several extent lists read as one.
//!
//! The document stream is the union of the children's. In each document the
//! extents of every child on it are merged in position order, so `syn(cat
//! cats)` counts both words as occurrences of one term.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::disjunction::DisjunctionIterator;
use super::{Countable, DocId, ExtentArray, Extentable, Positional, TERMINATED};
use crate::error::Result;

pub struct SynonymIterator {
    union: DisjunctionIterator<Box<dyn Extentable>>,
    extents: ExtentArray,
}

impl SynonymIterator {
    pub fn new(children: Vec<Box<dyn Extentable>>) -> Self {
        let mut it = Self {
            union: DisjunctionIterator::new(children),
            extents: ExtentArray::new(),
        };
        it.merge();
        it
    }

    fn merge(&mut self) {
        let document = self.union.current_id();
        self.extents.reset(document);
        if self.union.is_done() {
            return;
        }
        let children = self.union.children();
        let matching: Vec<usize> = self.union.matching_children().collect();

        // (begin, end, child, extent index): k-way merge by position.
        let mut heap: BinaryHeap<Reverse<(u32, u32, usize, usize)>> = matching
            .iter()
            .filter(|&&c| !children[c].extents().is_empty())
            .map(|&c| {
                let e = children[c].extents().get(0);
                Reverse((e.begin, e.end, c, 0))
            })
            .collect();

        while let Some(Reverse((begin, end, child, index))) = heap.pop() {
            let array = children[child].extents();
            self.extents.push_with_value(begin, end, array.value(index));
            if index + 1 < array.len() {
                let e = array.get(index + 1);
                heap.push(Reverse((e.begin, e.end, child, index + 1)));
            }
        }
    }
}

impl Positional for SynonymIterator {
    fn is_done(&self) -> bool {
        self.union.is_done()
    }

    fn current_id(&self) -> DocId {
        self.union.current_id()
    }

    fn move_to(&mut self, target: DocId) -> Result<bool> {
        if self.union.current_id() < target {
            self.union.move_to(target)?;
            self.merge();
        }
        Ok(self.has_match(target))
    }

    fn reset(&mut self) -> Result<()> {
        self.union.reset()?;
        self.merge();
        Ok(())
    }

    fn total_entries(&self) -> u64 {
        self.union.total_entries()
    }
}

impl Countable for SynonymIterator {
    fn count(&self) -> u32 {
        if self.union.current_id() == TERMINATED {
            0
        } else {
            self.extents.len() as u32
        }
    }
}

impl Extentable for SynonymIterator {
    fn extents(&self) -> &ExtentArray {
        &self.extents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterator::MemoryListIterator;

    fn term(postings: &[(DocId, &[u32])]) -> Box<dyn Extentable> {
        Box::new(MemoryListIterator::from_positions(postings))
    }

    #[test]
    fn test_merges_positions_in_order() {
        let mut it = SynonymIterator::new(vec![
            term(&[(1, &[4, 9]), (3, &[0])]),
            term(&[(1, &[2, 6]), (2, &[1])]),
        ]);
        let begins: Vec<u32> = it.extents().iter().map(|e| e.begin).collect();
        assert_eq!(begins, vec![2, 4, 6, 9]);
        assert_eq!(it.count(), 4);

        assert!(it.move_to(2).unwrap());
        assert_eq!(it.count(), 1);
        it.move_past(2).unwrap();
        assert_eq!(it.current_id(), 3);
        it.move_past(3).unwrap();
        assert!(it.is_done());
        assert_eq!(it.count(), 0);
    }
}
