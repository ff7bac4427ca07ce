// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Two-tier skip lists.
//!
//! Tier 1 is read sequentially while a cursor moves forward: one checkpoint
//! document and one tier-2 pointer per skip, both delta-coded. Tier 2 is only
//! touched when a jump is taken. Its entries come in runs of R: the first of
//! each run is absolute and the rest are deltas against it, so resolving any
//! skip costs at most two small reads.

use crate::binary::{encode_vbyte, DataStream};
use crate::error::{IndexError, Result};

/// Byte offsets into the three data streams of a list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipOffsets {
    pub documents: u64,
    pub counts: u64,
    pub positions: u64,
}

// ============================================================================
// WRITER
// ============================================================================

#[derive(Debug)]
pub struct SkipWriter {
    reset_distance: u64,
    tier1: Vec<u8>,
    tier2: Vec<u8>,
    count: u64,
    last_checkpoint: u64,
    last_tier2_offset: u64,
    last_absolute: SkipOffsets,
}

impl SkipWriter {
    pub fn new(reset_distance: u32) -> Self {
        Self {
            reset_distance: reset_distance.max(1) as u64,
            tier1: Vec::new(),
            tier2: Vec::new(),
            count: 0,
            last_checkpoint: 0,
            last_tier2_offset: 0,
            last_absolute: SkipOffsets::default(),
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Record the next skip: the last document written so far, and where
    /// the streams stand before the next one.
    pub fn record(&mut self, checkpoint: u64, offsets: SkipOffsets) {
        let index = self.count;
        self.count += 1;

        let tier2_offset = self.tier2.len() as u64;
        encode_vbyte(checkpoint - self.last_checkpoint, &mut self.tier1);
        encode_vbyte(tier2_offset - self.last_tier2_offset, &mut self.tier1);
        self.last_checkpoint = checkpoint;
        self.last_tier2_offset = tier2_offset;

        if index % self.reset_distance == 0 {
            encode_vbyte(offsets.documents, &mut self.tier2);
            encode_vbyte(offsets.counts, &mut self.tier2);
            encode_vbyte(offsets.positions, &mut self.tier2);
            self.last_absolute = offsets;
        } else {
            encode_vbyte(offsets.documents - self.last_absolute.documents, &mut self.tier2);
            encode_vbyte(offsets.counts - self.last_absolute.counts, &mut self.tier2);
            encode_vbyte(offsets.positions - self.last_absolute.positions, &mut self.tier2);
        }
    }

    /// `(tier1, tier2)` bytes.
    pub fn into_streams(self) -> (Vec<u8>, Vec<u8>) {
        (self.tier1, self.tier2)
    }
}

// ============================================================================
// READER
// ============================================================================

/// A decoded tier-1 entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipEntry {
    /// 1-based skip number. The skip lands on document number
    /// `index * skip_distance`.
    pub index: u64,
    /// Id of the last document before the landing point.
    pub checkpoint: u64,
    tier2_offset: u64,
}

#[derive(Debug)]
pub struct SkipReader {
    distance: u64,
    reset_distance: u64,
    count: u64,
    tier1: DataStream,
    tier2: DataStream,
    next: Option<SkipEntry>,
    last_absolute_offset: u64,
}

impl SkipReader {
    pub fn new(
        distance: u32,
        reset_distance: u32,
        count: u64,
        tier1: DataStream,
        tier2: DataStream,
    ) -> Result<Self> {
        let mut reader = Self {
            distance: distance as u64,
            reset_distance: reset_distance.max(1) as u64,
            count,
            tier1,
            tier2,
            next: None,
            last_absolute_offset: 0,
        };
        reader.reset()?;
        Ok(reader)
    }

    pub fn reset(&mut self) -> Result<()> {
        self.tier1.seek(0)?;
        self.next = None;
        self.last_absolute_offset = 0;
        if self.count > 0 {
            self.next = Some(self.read_entry(1, 0, 0)?);
        }
        Ok(())
    }

    pub fn distance(&self) -> u64 {
        self.distance
    }

    /// The next skip not yet consumed.
    pub fn peek(&self) -> Option<SkipEntry> {
        self.next
    }

    /// Consume the peeked skip.
    pub fn advance(&mut self) -> Result<()> {
        let Some(current) = self.next.take() else {
            return Ok(());
        };
        if self.is_absolute(current.index) {
            self.last_absolute_offset = current.tier2_offset;
        }
        if current.index < self.count {
            self.next = Some(self.read_entry(
                current.index + 1,
                current.checkpoint,
                current.tier2_offset,
            )?);
        }
        Ok(())
    }

    /// Stream offsets of the most recently consumed skip.
    pub fn resolve(&mut self, entry: &SkipEntry) -> Result<SkipOffsets> {
        self.tier2.seek(self.last_absolute_offset)?;
        let mut offsets = SkipOffsets {
            documents: self.tier2.read_vbyte()?,
            counts: self.tier2.read_vbyte()?,
            positions: self.tier2.read_vbyte()?,
        };
        if !self.is_absolute(entry.index) {
            self.tier2.seek(entry.tier2_offset)?;
            offsets.documents = offset_add(offsets.documents, self.tier2.read_vbyte()?)?;
            offsets.counts = offset_add(offsets.counts, self.tier2.read_vbyte()?)?;
            offsets.positions = offset_add(offsets.positions, self.tier2.read_vbyte()?)?;
        }
        Ok(offsets)
    }

    /// Document number the skip lands on.
    pub fn landing_index(&self, entry: &SkipEntry) -> u64 {
        entry.index * self.distance
    }

    fn is_absolute(&self, index: u64) -> bool {
        (index - 1) % self.reset_distance == 0
    }

    fn read_entry(&mut self, index: u64, last_checkpoint: u64, last_offset: u64) -> Result<SkipEntry> {
        let checkpoint = offset_add(last_checkpoint, self.tier1.read_vbyte()?)?;
        let tier2_offset = offset_add(last_offset, self.tier1.read_vbyte()?)?;
        if tier2_offset > self.tier2.len() {
            return Err(IndexError::format(format!(
                "skip {} points past the tier-2 stream",
                index
            )));
        }
        Ok(SkipEntry {
            index,
            checkpoint,
            tier2_offset,
        })
    }
}

fn offset_add(base: u64, delta: u64) -> Result<u64> {
    base.checked_add(delta)
        .ok_or_else(|| IndexError::format(format!("skip delta {} overflows {}", delta, base)))
}
