// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Proximity windows over extent children.
//!
//! Both operators first align their children like a conjunction, then look
//! at the children's extents in the aligned document. A document where the
//! children co-occur but never close enough together is skipped without a
//! match; the iterator moves straight on to the next aligned document.
//!
//! Ordered (`od`): one extent from each child, in child order, each starting
//! at or after the previous one ends, with fewer than `width` positions
//! between consecutive extents. A negative width removes the gap limit.
//!
//! Unordered (`uw`): one extent from each child, in any order, spanning at
//! most `width` positions from the first begin to the last end.

use super::conjunction::ConjunctionIterator;
use super::{
    Countable, DocId, ExtentArray, Extentable, Positional, TERMINATED,
};
use crate::error::Result;

pub const DEFAULT_ORDERED_WIDTH: i64 = 1;
pub const DEFAULT_UNORDERED_WIDTH: i64 = 4;

type Children = ConjunctionIterator<Box<dyn Extentable>>;

/// Advance `aligned` until `compute` finds at least one extent, or the
/// children run out.
pub(crate) fn next_matching<F>(
    aligned: &mut Children,
    out: &mut ExtentArray,
    mut compute: F,
) -> Result<()>
where
    F: FnMut(&[Box<dyn Extentable>], &mut ExtentArray),
{
    loop {
        if aligned.is_done() {
            out.reset(TERMINATED);
            return Ok(());
        }
        let document = aligned.current_id();
        out.reset(document);
        compute(aligned.children(), out);
        if !out.is_empty() {
            return Ok(());
        }
        log::trace!("children align on document {} without a match", document);
        aligned.move_past(document)?;
    }
}

fn ordered_matches(children: &[Box<dyn Extentable>], width: i64, out: &mut ExtentArray) {
    let arrays: Vec<&ExtentArray> = children.iter().map(|c| c.extents()).collect();
    let Some(first) = arrays.first() else {
        return;
    };
    let mut cursors = vec![0usize; arrays.len()];

    'candidates: for start in 0..first.len() {
        let begin = first.begin(start);
        let mut end = first.end(start);
        for (i, array) in arrays.iter().enumerate().skip(1) {
            while cursors[i] < array.len() && array.begin(cursors[i]) < end {
                cursors[i] += 1;
            }
            if cursors[i] == array.len() {
                // No later extent for this child; no later start can match.
                break 'candidates;
            }
            let next = cursors[i];
            if width >= 0 && (array.begin(next) - end) as i64 >= width {
                continue 'candidates;
            }
            end = array.end(next);
        }
        out.push(begin, end);
    }
}

fn unordered_matches(
    children: &[Box<dyn Extentable>],
    width: i64,
    overlap: bool,
    out: &mut ExtentArray,
) {
    let arrays: Vec<&ExtentArray> = children.iter().map(|c| c.extents()).collect();
    if arrays.is_empty() {
        return;
    }
    let mut cursors = vec![0usize; arrays.len()];

    loop {
        if arrays.iter().zip(&cursors).any(|(a, &c)| c >= a.len()) {
            return;
        }
        let mut min_child = 0;
        let mut min_begin = u32::MAX;
        let mut max_end = 0;
        for (i, array) in arrays.iter().enumerate() {
            let begin = array.begin(cursors[i]);
            if begin < min_begin {
                min_begin = begin;
                min_child = i;
            }
            max_end = max_end.max(array.end(cursors[i]));
        }

        if width < 0 || (max_end - min_begin) as i64 <= width {
            out.push(min_begin, max_end);
            if overlap {
                cursors[min_child] += 1;
            } else {
                let before = cursors[min_child];
                for (i, array) in arrays.iter().enumerate() {
                    while cursors[i] < array.len() && array.begin(cursors[i]) < max_end {
                        cursors[i] += 1;
                    }
                }
                // Zero-length extents at `max_end` are not passed by the
                // loop above.
                if cursors[min_child] == before {
                    cursors[min_child] += 1;
                }
            }
        } else {
            cursors[min_child] += 1;
        }
    }
}

// ============================================================================
// ORDERED
// ============================================================================

pub struct OrderedWindowIterator {
    aligned: Children,
    width: i64,
    extents: ExtentArray,
}

impl OrderedWindowIterator {
    pub fn new(children: Vec<Box<dyn Extentable>>, width: i64) -> Result<Self> {
        let mut it = Self {
            aligned: ConjunctionIterator::new(children)?,
            width,
            extents: ExtentArray::new(),
        };
        it.find_match()?;
        Ok(it)
    }

    fn find_match(&mut self) -> Result<()> {
        let width = self.width;
        next_matching(&mut self.aligned, &mut self.extents, |children, out| {
            ordered_matches(children, width, out)
        })
    }
}

// ============================================================================
// UNORDERED
// ============================================================================

pub struct UnorderedWindowIterator {
    aligned: Children,
    width: i64,
    overlap: bool,
    extents: ExtentArray,
}

impl UnorderedWindowIterator {
    pub fn new(children: Vec<Box<dyn Extentable>>, width: i64, overlap: bool) -> Result<Self> {
        let mut it = Self {
            aligned: ConjunctionIterator::new(children)?,
            width,
            overlap,
            extents: ExtentArray::new(),
        };
        it.find_match()?;
        Ok(it)
    }

    fn find_match(&mut self) -> Result<()> {
        let (width, overlap) = (self.width, self.overlap);
        next_matching(&mut self.aligned, &mut self.extents, |children, out| {
            unordered_matches(children, width, overlap, out)
        })
    }
}

// Both windows share the same cursor behavior; only `find_match` differs.
macro_rules! window_iterator {
    ($name:ident) => {
        impl Positional for $name {
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

        impl Countable for $name {
            fn count(&self) -> u32 {
                if self.aligned.is_done() {
                    0
                } else {
                    self.extents.len() as u32
                }
            }
        }

        impl Extentable for $name {
            fn extents(&self) -> &ExtentArray {
                &self.extents
            }
        }
    };
}

window_iterator!(OrderedWindowIterator);
window_iterator!(UnorderedWindowIterator);
