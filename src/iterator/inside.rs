// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Containment: extents of the inner child that fall inside an extent of the
//! outer child, e.g. `inside(cat, title)` for "cat" in a title.

use super::conjunction::ConjunctionIterator;
use super::window::next_matching;
use super::{Countable, DocId, ExtentArray, Extentable, Positional};
use crate::error::Result;

pub struct InsideIterator {
    aligned: ConjunctionIterator<Box<dyn Extentable>>,
    extents: ExtentArray,
}

impl InsideIterator {
    pub fn new(inner: Box<dyn Extentable>, outer: Box<dyn Extentable>) -> Result<Self> {
        let mut it = Self {
            aligned: ConjunctionIterator::new(vec![inner, outer])?,
            extents: ExtentArray::new(),
        };
        it.find_match()?;
        Ok(it)
    }

    fn find_match(&mut self) -> Result<()> {
        next_matching(&mut self.aligned, &mut self.extents, |children, out| {
            let inner = children[0].extents();
            let outer = children[1].extents();
            for e in inner.iter() {
                // Outer extents are sorted by begin, not by end. A long inner
                // extent says nothing about the next, shorter one, so every
                // outer extent starting at or before it is a candidate.
                let contained = (0..outer.len())
                    .take_while(|&j| outer.begin(j) <= e.begin)
                    .any(|j| outer.end(j) >= e.end);
                if contained {
                    out.push_with_value(e.begin, e.end, e.value);
                }
            }
        })
    }
}

impl Positional for InsideIterator {
    fn is_done(&self) -> bool {
        self.aligned.is_done()
    }

    fn current_id(&self) -> DocId {
        self.aligned.current_id()
    }

    fn move_to(&mut self, target: DocId) -> Result<bool> {
        if !self.aligned.is_done() && self.aligned.current_id() < target {
            self.aligned.move_to(target)?;
            self.find_match()?;
        }
        Ok(self.has_match(target))
    }

    fn reset(&mut self) -> Result<()> {
        self.aligned.reset()?;
        self.find_match()
    }

    fn total_entries(&self) -> u64 {
        self.aligned.total_entries()
    }
}

impl Countable for InsideIterator {
    fn count(&self) -> u32 {
        if self.aligned.is_done() {
            0
        } else {
            self.extents.len() as u32
        }
    }
}

impl Extentable for InsideIterator {
    fn extents(&self) -> &ExtentArray {
        &self.extents
    }
}
