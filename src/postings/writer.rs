// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Encoder for a single posting list.
//!
//! Call `add_document` once per document in increasing id order, then
//! `add_position` (or `add_extent`) for each occurrence inside it, then
//! `finish`. Documents with no positions are allowed; they get a count of 0.

use super::skip::{SkipOffsets, SkipWriter};
use super::{ListHeader, ListKind, PostingOptions, EXTENT_LIST, HAS_SKIPS};
use crate::binary::encode_vbyte;
use crate::error::{IndexError, Result};
use crate::iterator::DocId;

#[derive(Debug)]
pub struct PostingListBuilder {
    kind: ListKind,
    options: PostingOptions,
    documents: Vec<u8>,
    counts: Vec<u8>,
    positions: Vec<u8>,
    skips: Option<SkipWriter>,
    document_count: u64,
    total_position_count: u64,
    max_count: u32,
    last_document: Option<DocId>,
    /// Last position (or extent begin) in the current document.
    last_position: Option<u32>,
    current_count: u32,
}

impl PostingListBuilder {
    pub fn new(kind: ListKind, options: PostingOptions) -> Self {
        let skips = (options.skip_distance > 0).then(|| SkipWriter::new(options.skip_reset_distance));
        Self {
            kind,
            options,
            documents: Vec::new(),
            counts: Vec::new(),
            positions: Vec::new(),
            skips,
            document_count: 0,
            total_position_count: 0,
            max_count: 0,
            last_document: None,
            last_position: None,
            current_count: 0,
        }
    }

    pub fn positions(options: PostingOptions) -> Self {
        Self::new(ListKind::Positions, options)
    }

    pub fn extents(options: PostingOptions) -> Self {
        Self::new(ListKind::Extents, options)
    }

    pub fn document_count(&self) -> u64 {
        self.document_count
    }

    pub fn is_empty(&self) -> bool {
        self.document_count == 0
    }

    pub fn add_document(&mut self, document: DocId) -> Result<()> {
        if let Some(last) = self.last_document {
            if document <= last {
                return Err(IndexError::format(format!(
                    "document {} added after {}",
                    document, last
                )));
            }
        }
        self.flush_count();

        if let (Some(skips), Some(last)) = (self.skips.as_mut(), self.last_document) {
            if self.document_count % self.options.skip_distance as u64 == 0 {
                skips.record(
                    last as u64,
                    SkipOffsets {
                        documents: self.documents.len() as u64,
                        counts: self.counts.len() as u64,
                        positions: self.positions.len() as u64,
                    },
                );
            }
        }

        let gap = document - self.last_document.unwrap_or(0);
        encode_vbyte(gap as u64, &mut self.documents);
        self.last_document = Some(document);
        self.last_position = None;
        self.current_count = 0;
        self.document_count += 1;
        Ok(())
    }

    pub fn add_position(&mut self, position: u32) -> Result<()> {
        self.expect_kind(ListKind::Positions)?;
        self.expect_document()?;
        if let Some(last) = self.last_position {
            if position <= last {
                return Err(IndexError::format(format!(
                    "position {} added after {} in document {:?}",
                    position, last, self.last_document
                )));
            }
        }
        let gap = position - self.last_position.unwrap_or(0);
        encode_vbyte(gap as u64, &mut self.positions);
        self.last_position = Some(position);
        self.current_count += 1;
        Ok(())
    }

    /// Add the extent `[begin, end)`. Extents of one document must come in
    /// non-decreasing `begin` order.
    pub fn add_extent(&mut self, begin: u32, end: u32, value: u64) -> Result<()> {
        self.expect_kind(ListKind::Extents)?;
        self.expect_document()?;
        let last = self.last_position.unwrap_or(0);
        if begin < last || end < begin {
            return Err(IndexError::format(format!(
                "extent [{}, {}) out of order in document {:?}",
                begin, end, self.last_document
            )));
        }
        encode_vbyte((begin - last) as u64, &mut self.positions);
        encode_vbyte((end - begin) as u64, &mut self.positions);
        encode_vbyte(value, &mut self.positions);
        self.last_position = Some(begin);
        self.current_count += 1;
        Ok(())
    }

    /// Encode the list: header followed by its streams.
    pub fn finish(mut self) -> Vec<u8> {
        self.flush_count();

        let mut header = ListHeader {
            options: if self.kind == ListKind::Extents {
                EXTENT_LIST
            } else {
                0
            },
            document_count: self.document_count,
            total_position_count: self.total_position_count,
            max_count: self.max_count,
            documents_len: self.documents.len() as u64,
            counts_len: self.counts.len() as u64,
            positions_len: self.positions.len() as u64,
            ..ListHeader::default()
        };

        let skip_streams = match self.skips.take() {
            Some(skips) if skips.count() > 0 => {
                header.options |= HAS_SKIPS;
                header.skip_distance = self.options.skip_distance;
                header.skip_reset_distance = self.options.skip_reset_distance.max(1);
                header.skip_count = skips.count();
                let (tier1, tier2) = skips.into_streams();
                header.skips_len = tier1.len() as u64;
                header.skip_positions_len = tier2.len() as u64;
                Some((tier1, tier2))
            }
            _ => None,
        };

        let mut out = Vec::with_capacity(
            32 + self.documents.len() + self.counts.len() + self.positions.len(),
        );
        header.encode(&mut out);
        out.extend_from_slice(&self.documents);
        out.extend_from_slice(&self.counts);
        out.extend_from_slice(&self.positions);
        if let Some((tier1, tier2)) = skip_streams {
            out.extend_from_slice(&tier1);
            out.extend_from_slice(&tier2);
        }
        out
    }

    fn flush_count(&mut self) {
        if self.last_document.is_none() {
            return;
        }
        encode_vbyte(self.current_count as u64, &mut self.counts);
        self.total_position_count += self.current_count as u64;
        self.max_count = self.max_count.max(self.current_count);
        self.current_count = 0;
    }

    fn expect_kind(&self, kind: ListKind) -> Result<()> {
        if self.kind != kind {
            return Err(IndexError::unsupported(format!(
                "{:?} entry added to a {:?} list",
                kind, self.kind
            )));
        }
        Ok(())
    }

    fn expect_document(&self) -> Result<()> {
        if self.last_document.is_none() {
            return Err(IndexError::format("position added before any document"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::DataStream;

    #[test]
    fn test_small_list_bytes() {
        let mut builder = PostingListBuilder::positions(PostingOptions::without_skips());
        builder.add_document(3).unwrap();
        builder.add_position(5).unwrap();
        builder.add_document(10).unwrap();
        builder.add_position(0).unwrap();
        builder.add_position(2).unwrap();
        let bytes = builder.finish();

        let mut stream = DataStream::from_vec(bytes.clone());
        let header = ListHeader::read(&mut stream).unwrap();
        assert_eq!(header.document_count, 2);
        assert_eq!(header.total_position_count, 3);
        assert_eq!(header.max_count, 2);
        assert!(!header.has_skips());
        let body = &bytes[stream.position() as usize..];
        // documents: 3, 7 | counts: 1, 2 | positions: 5, 0, 2
        assert_eq!(body, &[0x83, 0x87, 0x81, 0x82, 0x85, 0x80, 0x82]);
    }

    #[test]
    fn test_out_of_order_rejected() {
        let mut builder = PostingListBuilder::positions(PostingOptions::default());
        builder.add_document(4).unwrap();
        assert!(builder.add_document(4).is_err());
        builder.add_position(2).unwrap();
        assert!(builder.add_position(2).is_err());
        assert!(builder.add_extent(1, 2, 0).is_err());
    }

    #[test]
    fn test_position_before_document_rejected() {
        let mut builder = PostingListBuilder::positions(PostingOptions::default());
        assert!(builder.add_position(0).unwrap_err().is_format());
    }

    #[test]
    fn test_skips_recorded_every_distance() {
        let mut builder = PostingListBuilder::positions(PostingOptions {
            skip_distance: 2,
            skip_reset_distance: 2,
        });
        for d in 0..7 {
            builder.add_document(d * 2).unwrap();
            builder.add_position(1).unwrap();
        }
        let bytes = builder.finish();
        let header = ListHeader::read(&mut DataStream::from_vec(bytes)).unwrap();
        assert!(header.has_skips());
        // Before documents 2, 4 and 6
        assert_eq!(header.skip_count, 3);
    }
}
