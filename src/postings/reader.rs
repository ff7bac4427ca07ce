// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Lazy decoder for one posting list.
//!
//! The iterator decodes exactly one document at a time: its id, its count,
//! and its positions (or extents), which land in an `ExtentArray`. Nothing
//! beyond the current document is read until the cursor moves.
//!
//! `move_to` consumes tier-1 skips whose checkpoint is below the target and
//! jumps to the last one, but only when that lands further ahead than the
//! cursor already is. The remaining distance is a linear scan.

use super::skip::SkipReader;
use super::{ListHeader, ListKind};
use crate::binary::DataStream;
use crate::error::{IndexError, Result};
use crate::iterator::{
    Countable, DocId, ExtentArray, Extentable, NodeStatistics, Positional, TERMINATED,
};

pub struct DiskListIterator {
    key: Vec<u8>,
    header: ListHeader,
    documents: DataStream,
    counts: DataStream,
    positions: DataStream,
    skips: Option<SkipReader>,
    /// Documents decoded so far, including the current one.
    documents_read: u64,
    current_document: DocId,
    current_count: u32,
    extents: ExtentArray,
    done: bool,
}

impl DiskListIterator {
    /// Open the list stored in `stream`. `key` is kept for diagnostics.
    pub fn open(key: &[u8], mut stream: DataStream) -> Result<Self> {
        let header = ListHeader::read(&mut stream)?;
        let mut offset = stream.position();
        let mut take = |len: u64| -> Result<DataStream> {
            let sub = stream.sub_stream(offset, len)?;
            offset += len;
            Ok(sub)
        };
        let documents = take(header.documents_len)?;
        let counts = take(header.counts_len)?;
        let positions = take(header.positions_len)?;
        let skips = if header.has_skips() {
            let tier1 = take(header.skips_len)?;
            let tier2 = take(header.skip_positions_len)?;
            Some(SkipReader::new(
                header.skip_distance,
                header.skip_reset_distance,
                header.skip_count,
                tier1,
                tier2,
            )?)
        } else {
            None
        };

        let mut it = Self {
            key: key.to_vec(),
            header,
            documents,
            counts,
            positions,
            skips,
            documents_read: 0,
            current_document: 0,
            current_count: 0,
            extents: ExtentArray::new(),
            done: false,
        };
        it.reset()?;
        Ok(it)
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn header(&self) -> &ListHeader {
        &self.header
    }

    pub fn kind(&self) -> ListKind {
        self.header.kind()
    }

    fn read_next(&mut self) -> Result<()> {
        if self.documents_read >= self.header.document_count {
            self.done = true;
            self.current_document = TERMINATED;
            self.current_count = 0;
            self.extents.reset(TERMINATED);
            return Ok(());
        }

        let gap = self.documents.read_vbyte_u32()?;
        let document = if self.documents_read == 0 {
            gap
        } else {
            self.current_document
                .checked_add(gap)
                .filter(|&d| d != TERMINATED && gap > 0)
                .ok_or_else(|| {
                    IndexError::format(format!(
                        "bad document gap {} after {} in list {:?}",
                        gap,
                        self.current_document,
                        String::from_utf8_lossy(&self.key)
                    ))
                })?
        };
        self.current_document = document;
        self.current_count = self.counts.read_vbyte_u32()?;
        self.documents_read += 1;
        self.decode_positions()
    }

    fn decode_positions(&mut self) -> Result<()> {
        self.extents.reset(self.current_document);
        let mut last = 0u32;
        for _ in 0..self.current_count {
            match self.header.kind() {
                ListKind::Positions => {
                    let delta = self.positions.read_vbyte_u32()?;
                    let position = self.offset(last, delta)?;
                    self.extents.push(position, self.offset(position, 1)?);
                    last = position;
                }
                ListKind::Extents => {
                    let begin_delta = self.positions.read_vbyte_u32()?;
                    let begin = self.offset(last, begin_delta)?;
                    let end_delta = self.positions.read_vbyte_u32()?;
                    let end = self.offset(begin, end_delta)?;
                    let value = self.positions.read_vbyte()?;
                    self.extents.push_with_value(begin, end, value);
                    last = begin;
                }
            }
        }
        Ok(())
    }

    /// `base + delta`, or a format error when a corrupt gap overflows.
    fn offset(&self, base: u32, delta: u32) -> Result<u32> {
        base.checked_add(delta).ok_or_else(|| {
            IndexError::format(format!(
                "position {} + {} overflows in document {} of list {:?}",
                base,
                delta,
                self.current_document,
                String::from_utf8_lossy(&self.key)
            ))
        })
    }

    /// Take the furthest skip whose checkpoint is below `target`, if it lands
    /// ahead of the cursor.
    fn skip_towards(&mut self, target: DocId) -> Result<()> {
        let Some(skips) = self.skips.as_mut() else {
            return Ok(());
        };
        let mut jump = None;
        while let Some(entry) = skips.peek() {
            if entry.checkpoint >= target as u64 {
                break;
            }
            skips.advance()?;
            jump = Some(entry);
        }
        let Some(entry) = jump else {
            return Ok(());
        };
        let landing = skips.landing_index(&entry);
        if landing <= self.documents_read {
            return Ok(());
        }

        let offsets = skips.resolve(&entry)?;
        self.documents.seek(offsets.documents)?;
        self.counts.seek(offsets.counts)?;
        self.positions.seek(offsets.positions)?;
        self.documents_read = landing;
        self.current_document = u32::try_from(entry.checkpoint)
            .map_err(|_| IndexError::format("skip checkpoint overflows a document id"))?;
        log::trace!(
            "list {:?} skipped to document #{} (after {})",
            String::from_utf8_lossy(&self.key),
            landing,
            entry.checkpoint
        );
        Ok(())
    }
}

impl Positional for DiskListIterator {
    fn is_done(&self) -> bool {
        self.done
    }

    fn current_id(&self) -> DocId {
        if self.done {
            TERMINATED
        } else {
            self.current_document
        }
    }

    fn move_to(&mut self, target: DocId) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        if self.current_document >= target {
            return Ok(self.current_document == target);
        }
        self.skip_towards(target)?;
        loop {
            self.read_next()?;
            if self.done || self.current_document >= target {
                break;
            }
        }
        Ok(!self.done && self.current_document == target)
    }

    fn reset(&mut self) -> Result<()> {
        self.documents.seek(0)?;
        self.counts.seek(0)?;
        self.positions.seek(0)?;
        if let Some(skips) = self.skips.as_mut() {
            skips.reset()?;
        }
        self.documents_read = 0;
        self.current_document = 0;
        self.done = false;
        self.read_next()
    }

    fn total_entries(&self) -> u64 {
        self.header.document_count
    }
}

impl Countable for DiskListIterator {
    fn count(&self) -> u32 {
        if self.done {
            0
        } else {
            self.current_count
        }
    }

    fn statistics(&self) -> Option<NodeStatistics> {
        Some(NodeStatistics {
            node_frequency: self.header.total_position_count,
            node_document_count: self.header.document_count,
            maximum_count: self.header.max_count,
        })
    }
}

impl Extentable for DiskListIterator {
    fn extents(&self) -> &ExtentArray {
        &self.extents
    }
}
