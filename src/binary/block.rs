// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! One block of a BlockStore file: prefix-compressed keys plus their values.
//!
//! Keys in a block share a prefix that is written once. Each key's remainder
//! is front-coded against the previous key's remainder, so sorted keys like
//! `apple`, `applesauce`, `apply` cost a handful of bytes each. Values are
//! concatenated into one region whose boundaries are recorded as cumulative
//! end offsets, which is what lets a reader jump straight to value `i`.
//!
//! The header is always stored raw so that key scans never inflate anything.
//! Only the value region goes through deflate, and only when the file was
//! written in compressed mode.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ header_len: vbyte                                       │
//! │ header:                                                 │
//! │   key_count: vbyte                                      │
//! │   prefix_len: vbyte, prefix: [u8]                       │
//! │   per key: shared: vbyte, tail_len: vbyte, tail: [u8]   │
//! │   per key: value_end: vbyte (uncompressed offsets)      │
//! │   stored_len: vbyte                                     │
//! ├─────────────────────────────────────────────────────────┤
//! │ values: [u8; stored_len]  (deflated if compressed)      │
//! └─────────────────────────────────────────────────────────┘
//! ```

use std::io::{Read, Write};
use std::sync::Arc;

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use super::encoding::{common_prefix_len, encode_vbyte, vbyte_len, SliceReader};
use super::stream::DataStream;
use crate::error::{IndexError, Result};

// ============================================================================
// WRITER SIDE
// ============================================================================

/// Accumulates sorted key/value pairs until the writer decides to flush.
#[derive(Debug, Default)]
pub struct BlockBuilder {
    keys: Vec<Vec<u8>>,
    value_ends: Vec<u64>,
    values: Vec<u8>,
    key_bytes: usize,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn first_key(&self) -> Option<&[u8]> {
        self.keys.first().map(Vec::as_slice)
    }

    /// Rough size of the block if flushed now, before compression.
    pub fn estimated_size(&self) -> usize {
        self.key_bytes + self.values.len() + self.keys.len() * 4
    }

    /// Size the block would have after adding one more entry.
    pub fn estimated_size_with(&self, key: &[u8], value_len: usize) -> usize {
        self.estimated_size() + key.len() + value_len + 4
    }

    pub fn add(&mut self, key: &[u8], value: &[u8]) {
        self.key_bytes += key.len();
        self.keys.push(key.to_vec());
        self.values.extend_from_slice(value);
        self.value_ends.push(self.values.len() as u64);
    }

    /// Serialize the block and reset the builder for the next one.
    pub fn finish(&mut self, compressed: bool) -> Result<Vec<u8>> {
        let prefix_len = self.shared_prefix_len();
        let prefix = self.keys.first().map(|k| &k[..prefix_len]).unwrap_or(&[]);

        let stored_values = if compressed {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(&self.values)?;
            encoder.finish()?
        } else {
            std::mem::take(&mut self.values)
        };

        let mut header = Vec::with_capacity(self.key_bytes + self.keys.len() * 6 + 16);
        encode_vbyte(self.keys.len() as u64, &mut header);
        encode_vbyte(prefix_len as u64, &mut header);
        header.extend_from_slice(prefix);

        let mut previous: &[u8] = &[];
        for key in &self.keys {
            let tail = &key[prefix_len..];
            let shared = common_prefix_len(previous, tail);
            encode_vbyte(shared as u64, &mut header);
            encode_vbyte((tail.len() - shared) as u64, &mut header);
            header.extend_from_slice(&tail[shared..]);
            previous = tail;
        }
        for &end in &self.value_ends {
            encode_vbyte(end, &mut header);
        }
        encode_vbyte(stored_values.len() as u64, &mut header);

        let mut out =
            Vec::with_capacity(vbyte_len(header.len() as u64) + header.len() + stored_values.len());
        encode_vbyte(header.len() as u64, &mut out);
        out.extend_from_slice(&header);
        out.extend_from_slice(&stored_values);

        self.keys.clear();
        self.value_ends.clear();
        self.values.clear();
        self.key_bytes = 0;
        Ok(out)
    }

    fn shared_prefix_len(&self) -> usize {
        match (self.keys.first(), self.keys.last()) {
            // Keys are sorted, so the first/last pair bounds every other key.
            (Some(first), Some(last)) => common_prefix_len(first, last),
            _ => 0,
        }
    }
}

// ============================================================================
// READER SIDE
// ============================================================================

/// Decoded block header: every key in the block and where its value ends.
#[derive(Debug, Clone)]
pub struct BlockHeader {
    pub keys: Vec<Vec<u8>>,
    pub value_ends: Vec<u64>,
    pub stored_len: u64,
    /// Offset of the value region from the start of the block.
    pub values_offset: u64,
}

impl BlockHeader {
    /// Read the header from a stream positioned at the start of a block.
    pub fn read(stream: &mut DataStream) -> Result<Self> {
        let start = stream.position();
        let header_len = stream.read_vbyte()?;
        if header_len > stream.remaining() {
            return Err(IndexError::format(format!(
                "block header length {} exceeds block size",
                header_len
            )));
        }
        let mut raw = vec![0u8; header_len as usize];
        stream.read_exact(&mut raw)?;
        let values_offset = stream.position() - start;

        let mut r = SliceReader::new(&raw);
        let key_count = r.read_usize()?;
        if key_count > raw.len() {
            return Err(IndexError::format(format!(
                "block claims {} keys in a {}-byte header",
                key_count,
                raw.len()
            )));
        }
        let prefix_len = r.read_usize()?;
        let prefix = r.read_bytes(prefix_len)?.to_vec();

        let mut keys = Vec::with_capacity(key_count);
        let mut tail: Vec<u8> = Vec::new();
        for _ in 0..key_count {
            let shared = r.read_usize()?;
            let extra = r.read_usize()?;
            if shared > tail.len() {
                return Err(IndexError::format("key shares more bytes than previous key"));
            }
            tail.truncate(shared);
            tail.extend_from_slice(r.read_bytes(extra)?);
            let mut key = Vec::with_capacity(prefix.len() + tail.len());
            key.extend_from_slice(&prefix);
            key.extend_from_slice(&tail);
            keys.push(key);
        }

        let mut value_ends = Vec::with_capacity(key_count);
        let mut last = 0u64;
        for _ in 0..key_count {
            let end = r.read_vbyte()?;
            if end < last {
                return Err(IndexError::format("value offsets are not monotonic"));
            }
            value_ends.push(end);
            last = end;
        }
        let stored_len = r.read_vbyte()?;

        Ok(BlockHeader {
            keys,
            value_ends,
            stored_len,
            values_offset,
        })
    }

    pub fn value_range(&self, index: usize) -> (u64, u64) {
        let start = if index == 0 {
            0
        } else {
            self.value_ends[index - 1]
        };
        (start, self.value_ends[index] - start)
    }

    pub fn values_len(&self) -> u64 {
        self.value_ends.last().copied().unwrap_or(0)
    }
}

/// A block whose header is decoded and whose values are fetched on demand.
#[derive(Debug)]
pub struct Block {
    pub header: BlockHeader,
    region: DataStream,
    compressed: bool,
    inflated: Option<Arc<[u8]>>,
}

impl Block {
    /// Load the block that occupies all of `stream`.
    pub fn load(mut stream: DataStream, compressed: bool) -> Result<Self> {
        let header = BlockHeader::read(&mut stream)?;
        let region = stream.sub_stream(header.values_offset, header.stored_len)?;
        if !compressed && header.stored_len != header.values_len() {
            return Err(IndexError::format(format!(
                "uncompressed block stores {} value bytes, offsets say {}",
                header.stored_len,
                header.values_len()
            )));
        }
        Ok(Block {
            header,
            region,
            compressed,
            inflated: None,
        })
    }

    pub fn len(&self) -> usize {
        self.header.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.header.keys.is_empty()
    }

    pub fn key(&self, index: usize) -> &[u8] {
        &self.header.keys[index]
    }

    /// Position of `key` in this block, or where it would be inserted.
    pub fn search(&self, key: &[u8]) -> std::result::Result<usize, usize> {
        self.header.keys.binary_search_by(|k| k.as_slice().cmp(key))
    }

    pub fn is_inflated(&self) -> bool {
        self.inflated.is_some()
    }

    /// Stream over the value of entry `index`. Inflates the block on first use
    /// in compressed mode; reads lazily from the file otherwise.
    pub fn value(&mut self, index: usize) -> Result<DataStream> {
        let (start, len) = self.header.value_range(index);
        if !self.compressed {
            return self.region.sub_stream(start, len);
        }
        if self.inflated.is_none() {
            let mut raw = self.region.clone();
            raw.seek(0)?;
            let raw = raw.read_to_vec()?;
            let mut values = Vec::with_capacity(self.header.values_len() as usize);
            DeflateDecoder::new(raw.as_slice()).read_to_end(&mut values)?;
            if values.len() as u64 != self.header.values_len() {
                return Err(IndexError::format(format!(
                    "inflated block has {} bytes, expected {}",
                    values.len(),
                    self.header.values_len()
                )));
            }
            log::debug!("inflated block: {} keys, {} bytes", self.len(), values.len());
            self.inflated = Some(Arc::from(values));
        }
        let inflated = self.inflated.clone().unwrap_or_else(|| Arc::from(Vec::new()));
        DataStream::from_memory(inflated).sub_stream(start, len)
    }
}
