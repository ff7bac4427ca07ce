// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Conjunction: documents every child is on.
//!
//! Alignment works by chasing the maximum. Take the largest current id as the
//! candidate, move every child that is behind up to it, and if one of them
//! overshoots, its id becomes the new candidate. The loop ends when all
//! children agree or one runs out.

use super::{move_all_to, DocId, Indicator, Positional, TERMINATED};
use crate::error::Result;

pub struct ConjunctionIterator<T: Positional = Box<dyn Positional>> {
    children: Vec<T>,
    current: DocId,
    done: bool,
}

impl<T: Positional> ConjunctionIterator<T> {
    pub fn new(children: Vec<T>) -> Result<Self> {
        let mut it = Self {
            children,
            current: 0,
            done: false,
        };
        it.align()?;
        Ok(it)
    }

    /// Like `new`, but with the shortest lists first so the candidate is
    /// driven by the most selective child.
    pub fn sorted_by_size(mut children: Vec<T>) -> Result<Self> {
        children.sort_by_key(|c| c.total_entries());
        Self::new(children)
    }

    pub fn children(&self) -> &[T] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [T] {
        &mut self.children
    }

    fn align(&mut self) -> Result<()> {
        if self.children.is_empty() {
            return self.finish();
        }
        loop {
            if self.children.iter().any(|c| c.is_done()) {
                return self.finish();
            }
            let candidate = self
                .children
                .iter()
                .map(|c| c.current_id())
                .max()
                .unwrap_or(TERMINATED);

            let mut agreed = true;
            for child in self.children.iter_mut() {
                if child.current_id() < candidate {
                    child.move_to(candidate)?;
                }
                if child.is_done() {
                    return self.finish();
                }
                if child.current_id() != candidate {
                    agreed = false;
                    break;
                }
            }
            if agreed {
                self.current = candidate;
                return Ok(());
            }
        }
    }

    fn finish(&mut self) -> Result<()> {
        self.done = true;
        self.current = TERMINATED;
        Ok(())
    }
}

impl<T: Positional> Positional for ConjunctionIterator<T> {
    fn is_done(&self) -> bool {
        self.done
    }

    fn current_id(&self) -> DocId {
        self.current
    }

    fn move_to(&mut self, target: DocId) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        if self.current < target {
            move_all_to(&mut self.children, target)?;
            self.align()?;
        }
        Ok(self.has_match(target))
    }

    fn reset(&mut self) -> Result<()> {
        for child in self.children.iter_mut() {
            child.reset()?;
        }
        self.done = false;
        self.current = 0;
        self.align()
    }

    fn total_entries(&self) -> u64 {
        self.children
            .iter()
            .map(|c| c.total_entries())
            .min()
            .unwrap_or(0)
    }
}

impl<T: Positional> Indicator for ConjunctionIterator<T> {}
