// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! In-memory block index: the first key of every block and where it starts.
//!
//! On disk the vocabulary is front-compressed in groups. The first entry of
//! each group stores its key and offset in full; the rest store the bytes they
//! share with the previous key and an offset delta. Groups bound how far a
//! decoder must look back, which is the same trade skip lists make.

use super::encoding::{common_prefix_len, encode_vbyte, SliceReader};
use crate::error::{IndexError, Result};

/// First key of one block and the block's byte offset in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyEntry {
    pub first_key: Vec<u8>,
    pub offset: u64,
}

/// Sorted list of block entries plus the end of the last block.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entries: Vec<VocabularyEntry>,
    data_end: u64,
}

impl Vocabulary {
    pub fn new(entries: Vec<VocabularyEntry>, data_end: u64) -> Self {
        Self { entries, data_end }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    /// Byte range `(start, len)` of block `index`.
    pub fn block_range(&self, index: usize) -> (u64, u64) {
        let start = self.entries[index].offset;
        let end = self
            .entries
            .get(index + 1)
            .map(|e| e.offset)
            .unwrap_or(self.data_end);
        (start, end - start)
    }

    /// Index of the only block that could contain `key`: the last block whose
    /// first key is <= `key`. `None` if `key` sorts before every block.
    pub fn find_block(&self, key: &[u8]) -> Option<usize> {
        let after = self
            .entries
            .partition_point(|e| e.first_key.as_slice() <= key);
        after.checked_sub(1)
    }

    pub fn encode(&self, group: u32, buf: &mut Vec<u8>) {
        let group = group.max(1) as usize;
        encode_vbyte(self.entries.len() as u64, buf);
        let mut previous: Option<&VocabularyEntry> = None;
        for (i, entry) in self.entries.iter().enumerate() {
            match previous {
                Some(prev) if i % group != 0 => {
                    let shared = common_prefix_len(&prev.first_key, &entry.first_key);
                    encode_vbyte(shared as u64, buf);
                    encode_vbyte((entry.first_key.len() - shared) as u64, buf);
                    buf.extend_from_slice(&entry.first_key[shared..]);
                    encode_vbyte(entry.offset - prev.offset, buf);
                }
                _ => {
                    encode_vbyte(entry.first_key.len() as u64, buf);
                    buf.extend_from_slice(&entry.first_key);
                    encode_vbyte(entry.offset, buf);
                }
            }
            previous = Some(entry);
        }
    }

    pub fn decode(bytes: &[u8], group: u32, data_end: u64) -> Result<Self> {
        let group = group.max(1) as usize;
        let mut r = SliceReader::new(bytes);
        let count = r.read_usize()?;
        if count > bytes.len() {
            return Err(IndexError::format(format!(
                "vocabulary claims {} entries in {} bytes",
                count,
                bytes.len()
            )));
        }

        let mut entries: Vec<VocabularyEntry> = Vec::with_capacity(count);
        for i in 0..count {
            let entry = match entries.last() {
                Some(prev) if i % group != 0 => {
                    let shared = r.read_usize()?;
                    if shared > prev.first_key.len() {
                        return Err(IndexError::format("vocabulary key shares too many bytes"));
                    }
                    let tail_len = r.read_usize()?;
                    let mut key = prev.first_key[..shared].to_vec();
                    key.extend_from_slice(r.read_bytes(tail_len)?);
                    let offset = prev.offset + r.read_vbyte()?;
                    VocabularyEntry {
                        first_key: key,
                        offset,
                    }
                }
                _ => {
                    let len = r.read_usize()?;
                    let key = r.read_bytes(len)?.to_vec();
                    let offset = r.read_vbyte()?;
                    VocabularyEntry {
                        first_key: key,
                        offset,
                    }
                }
            };
            if let Some(prev) = entries.last() {
                if entry.first_key <= prev.first_key || entry.offset <= prev.offset {
                    return Err(IndexError::format(format!(
                        "vocabulary entry {} is out of order",
                        i
                    )));
                }
            }
            if entry.offset >= data_end {
                return Err(IndexError::format(format!(
                    "block offset {} is past the data section",
                    entry.offset
                )));
            }
            entries.push(entry);
        }

        Ok(Vocabulary { entries, data_end })
    }
}
