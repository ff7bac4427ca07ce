// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Disjunction: documents any child is on.
//!
//! Children that are not exhausted sit in a min-heap keyed by current id.
//! The heap top is the current document. Moving pops every child below the
//! target, advances it, and pushes it back unless it ran out.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use super::{DocId, Indicator, Positional, TERMINATED};
use crate::error::Result;

pub struct DisjunctionIterator<T: Positional = Box<dyn Positional>> {
    children: Vec<T>,
    /// (current id, child index); ties pop the lower index first.
    queue: BinaryHeap<Reverse<(DocId, usize)>>,
}

impl<T: Positional> DisjunctionIterator<T> {
    pub fn new(children: Vec<T>) -> Self {
        let mut it = Self {
            children,
            queue: BinaryHeap::new(),
        };
        it.fill_queue();
        it
    }

    pub fn children(&self) -> &[T] {
        &self.children
    }

    /// Indices of the children positioned on the current document.
    pub fn matching_children(&self) -> impl Iterator<Item = usize> + '_ {
        let current = self.current_id();
        (0..self.children.len()).filter(move |&i| self.children[i].has_match(current))
    }

    fn fill_queue(&mut self) {
        self.queue = self
            .children
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_done())
            .map(|(i, c)| Reverse((c.current_id(), i)))
            .collect();
    }
}

impl<T: Positional> Positional for DisjunctionIterator<T> {
    fn is_done(&self) -> bool {
        self.queue.is_empty()
    }

    fn current_id(&self) -> DocId {
        self.queue
            .peek()
            .map(|Reverse((id, _))| *id)
            .unwrap_or(TERMINATED)
    }

    fn move_to(&mut self, target: DocId) -> Result<bool> {
        while let Some(&Reverse((id, index))) = self.queue.peek() {
            if id >= target {
                break;
            }
            self.queue.pop();
            let child = &mut self.children[index];
            child.move_to(target)?;
            if !child.is_done() {
                self.queue.push(Reverse((child.current_id(), index)));
            }
        }
        Ok(self.has_match(target))
    }

    fn reset(&mut self) -> Result<()> {
        for child in self.children.iter_mut() {
            child.reset()?;
        }
        self.fill_queue();
        Ok(())
    }

    fn total_entries(&self) -> u64 {
        self.children.iter().map(|c| c.total_entries()).sum()
    }
}

impl<T: Positional> Indicator for DisjunctionIterator<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterator::MemoryListIterator;

    fn list(ids: &[DocId]) -> Box<dyn Positional> {
        let counts: Vec<_> = ids.iter().map(|&d| (d, 1)).collect();
        Box::new(MemoryListIterator::from_counts(&counts))
    }

    #[test]
    fn test_union() {
        let mut it = DisjunctionIterator::new(vec![list(&[1, 5, 9]), list(&[2, 5, 12]), list(&[])]);
        let mut seen = Vec::new();
        while !it.is_done() {
            let d = it.current_id();
            seen.push(d);
            it.move_past(d).unwrap();
        }
        assert_eq!(seen, vec![1, 2, 5, 9, 12]);
    }

    #[test]
    fn test_matching_children() {
        let mut it = DisjunctionIterator::new(vec![list(&[1, 5]), list(&[5]), list(&[6])]);
        assert!(it.move_to(5).unwrap());
        assert_eq!(it.matching_children().collect::<Vec<_>>(), vec![0, 1]);
        assert!(!it.move_to(7).unwrap());
        assert!(it.is_done());
    }
}
