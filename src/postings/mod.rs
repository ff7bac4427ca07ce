// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Delta-coded posting lists with two-tier skips.
//!
//! One list is one BlockStore value. It starts with a small header and is
//! followed by up to five independently addressable streams:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ HEADER (all vbyte)                                            │
//! │   options            bit 0: has skips, bit 1: extent list     │
//! │   document_count, total_position_count, max_count             │
//! │   [skip_distance, skip_reset_distance, skip_count]            │
//! │   documents_len, counts_len, positions_len                    │
//! │   [skips_len, skip_positions_len]                             │
//! ├───────────────────────────────────────────────────────────────┤
//! │ DOCUMENTS       document d-gaps                               │
//! │ COUNTS          positions (or extents) per document           │
//! │ POSITIONS       position d-gaps, baseline reset per document  │
//! │                 or (begin d-gap, length, value) per extent    │
//! │ SKIPS           tier 1: (checkpoint d-gap, tier-2 d-gap)      │
//! │ SKIP_POSITIONS  tier 2: stream offsets, absolute or delta     │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bracketed fields and the two skip streams exist only when bit 0 is set.
//!
//! # Skips
//!
//! Skip `k` (1-based) is recorded right before document number `k·D` is
//! written, where D is the skip distance. Its checkpoint is the id of the
//! document before it, and its tier-2 entry holds the byte offsets of the
//! three data streams at that moment. Every R-th tier-2 entry (R being the
//! reset distance) stores the offsets in full; the ones in between store
//! deltas against the last full entry. Resolving a skip therefore reads at
//! most two tier-2 entries.

pub mod reader;
pub mod skip;
pub mod writer;

pub use reader::DiskListIterator;
pub use writer::PostingListBuilder;

use crate::binary::{encode_vbyte, DataStream};
use crate::error::{IndexError, Result};

/// Header flag: the list carries skip streams.
pub const HAS_SKIPS: u64 = 0b01;
/// Header flag: the position stream holds extents.
pub const EXTENT_LIST: u64 = 0b10;

pub const DEFAULT_SKIP_DISTANCE: u32 = 500;
pub const DEFAULT_SKIP_RESET_DISTANCE: u32 = 20;

/// What the position stream of a list holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Positions,
    Extents,
}

/// Skip layout for new lists. A distance of 0 disables skips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingOptions {
    pub skip_distance: u32,
    pub skip_reset_distance: u32,
}

impl Default for PostingOptions {
    fn default() -> Self {
        Self {
            skip_distance: DEFAULT_SKIP_DISTANCE,
            skip_reset_distance: DEFAULT_SKIP_RESET_DISTANCE,
        }
    }
}

impl PostingOptions {
    pub fn without_skips() -> Self {
        Self {
            skip_distance: 0,
            skip_reset_distance: 0,
        }
    }
}

/// Decoded list header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListHeader {
    pub options: u64,
    pub document_count: u64,
    pub total_position_count: u64,
    pub max_count: u32,
    pub skip_distance: u32,
    pub skip_reset_distance: u32,
    pub skip_count: u64,
    pub documents_len: u64,
    pub counts_len: u64,
    pub positions_len: u64,
    pub skips_len: u64,
    pub skip_positions_len: u64,
}

impl ListHeader {
    pub fn has_skips(&self) -> bool {
        self.options & HAS_SKIPS != 0
    }

    pub fn kind(&self) -> ListKind {
        if self.options & EXTENT_LIST != 0 {
            ListKind::Extents
        } else {
            ListKind::Positions
        }
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        encode_vbyte(self.options, buf);
        encode_vbyte(self.document_count, buf);
        encode_vbyte(self.total_position_count, buf);
        encode_vbyte(self.max_count as u64, buf);
        if self.has_skips() {
            encode_vbyte(self.skip_distance as u64, buf);
            encode_vbyte(self.skip_reset_distance as u64, buf);
            encode_vbyte(self.skip_count, buf);
        }
        encode_vbyte(self.documents_len, buf);
        encode_vbyte(self.counts_len, buf);
        encode_vbyte(self.positions_len, buf);
        if self.has_skips() {
            encode_vbyte(self.skips_len, buf);
            encode_vbyte(self.skip_positions_len, buf);
        }
    }

    pub fn read(stream: &mut DataStream) -> Result<Self> {
        let mut header = ListHeader {
            options: stream.read_vbyte()?,
            ..ListHeader::default()
        };
        if header.options & !(HAS_SKIPS | EXTENT_LIST) != 0 {
            return Err(IndexError::format(format!(
                "unknown posting list options {:#x}",
                header.options
            )));
        }
        header.document_count = stream.read_vbyte()?;
        header.total_position_count = stream.read_vbyte()?;
        header.max_count = stream.read_vbyte_u32()?;
        if header.has_skips() {
            header.skip_distance = stream.read_vbyte_u32()?;
            header.skip_reset_distance = stream.read_vbyte_u32()?;
            header.skip_count = stream.read_vbyte()?;
            if header.skip_distance == 0 || header.skip_reset_distance == 0 {
                return Err(IndexError::format("skip list with zero distance"));
            }
        }
        header.documents_len = stream.read_vbyte()?;
        header.counts_len = stream.read_vbyte()?;
        header.positions_len = stream.read_vbyte()?;
        if header.has_skips() {
            header.skips_len = stream.read_vbyte()?;
            header.skip_positions_len = stream.read_vbyte()?;
        }
        let body = header.documents_len
            + header.counts_len
            + header.positions_len
            + header.skips_len
            + header.skip_positions_len;
        if body > stream.remaining() {
            return Err(IndexError::format(format!(
                "posting list claims {} body bytes, {} remain",
                body,
                stream.remaining()
            )));
        }
        Ok(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_without_skips_omits_skip_fields() {
        let header = ListHeader {
            document_count: 3,
            total_position_count: 5,
            max_count: 2,
            documents_len: 3,
            counts_len: 3,
            positions_len: 5,
            ..ListHeader::default()
        };
        let mut buf = Vec::new();
        header.encode(&mut buf);
        assert_eq!(buf.len(), 7);
        buf.extend_from_slice(&[0u8; 11]);
        let back = ListHeader::read(&mut DataStream::from_vec(buf)).unwrap();
        assert_eq!(back, header);
        assert_eq!(back.kind(), ListKind::Positions);
    }

    #[test]
    fn test_header_claiming_too_much_body_rejected() {
        let header = ListHeader {
            options: EXTENT_LIST,
            documents_len: 100,
            ..ListHeader::default()
        };
        let mut buf = Vec::new();
        header.encode(&mut buf);
        assert!(ListHeader::read(&mut DataStream::from_vec(buf))
            .unwrap_err()
            .is_format());
    }

    #[test]
    fn test_unknown_option_bits_rejected() {
        let mut buf = Vec::new();
        encode_vbyte(0b100, &mut buf);
        assert!(ListHeader::read(&mut DataStream::from_vec(buf)).is_err());
    }
}
