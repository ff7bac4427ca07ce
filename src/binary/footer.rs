// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fixed-size footer at the very end of every BlockStore file.
//!
//! The footer is the first thing a reader touches: seek to `len - SIZE`, read
//! 33 bytes, check the magic number, and you know where the vocabulary and
//! manifest live. Fields are raw big-endian, the only non-vbyte integers in
//! the format, so the footer can be parsed without knowing anything else.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ vocabulary_offset : i64 (big-endian)         │
//! │ manifest_offset   : i64                      │
//! │ block_size        : i32                      │
//! │ vocab_group       : i32                      │
//! │ compressed        : u8 (0 or 1)              │
//! │ magic             : u64 = FOOTER_MAGIC       │
//! └──────────────────────────────────────────────┘
//! ```

use std::io::{Read, Write};

use crate::error::{IndexError, Result};

/// "QUARRYIX" in ASCII. Marks a complete, valid file end.
pub const FOOTER_MAGIC: u64 = 0x5155_4152_5259_4958;

/// Default target size of one block's uncompressed payload.
pub const DEFAULT_BLOCK_SIZE: u32 = 32 * 1024;

/// Default number of vocabulary entries sharing one front-compression run.
pub const DEFAULT_VOCAB_GROUP: u32 = 16;

/// Footer of a BlockStore file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    pub vocabulary_offset: u64,
    pub manifest_offset: u64,
    pub block_size: u32,
    pub vocab_group: u32,
    pub compressed: bool,
}

impl Footer {
    // 8 (vocab offset) + 8 (manifest offset) + 4 + 4 + 1 (flag) + 8 (magic) = 33
    pub const SIZE: usize = 33;

    pub fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&(self.vocabulary_offset as i64).to_be_bytes())?;
        w.write_all(&(self.manifest_offset as i64).to_be_bytes())?;
        w.write_all(&(self.block_size as i32).to_be_bytes())?;
        w.write_all(&(self.vocab_group as i32).to_be_bytes())?;
        w.write_all(&[u8::from(self.compressed)])?;
        w.write_all(&FOOTER_MAGIC.to_be_bytes())?;
        Ok(())
    }

    /// Parse a footer from exactly `SIZE` bytes and check it against the file length.
    pub fn read<R: Read>(r: &mut R, file_len: u64) -> Result<Self> {
        let mut buf = [0u8; Self::SIZE];
        r.read_exact(&mut buf)
            .map_err(|_| IndexError::format("truncated footer"))?;
        Self::from_bytes(&buf, file_len)
    }

    pub fn from_bytes(buf: &[u8; Self::SIZE], file_len: u64) -> Result<Self> {
        let magic = u64::from_be_bytes(take::<8>(buf, 25));
        if magic != FOOTER_MAGIC {
            return Err(IndexError::format(format!(
                "bad magic number {:#018x} (expected {:#018x})",
                magic, FOOTER_MAGIC
            )));
        }

        let vocabulary_offset = i64::from_be_bytes(take::<8>(buf, 0));
        let manifest_offset = i64::from_be_bytes(take::<8>(buf, 8));
        let block_size = i32::from_be_bytes(take::<4>(buf, 16));
        let vocab_group = i32::from_be_bytes(take::<4>(buf, 20));
        let compressed = match buf[24] {
            0 => false,
            1 => true,
            other => {
                return Err(IndexError::format(format!(
                    "bad compressed flag {}",
                    other
                )))
            }
        };

        let footer_start = file_len.saturating_sub(Self::SIZE as u64);
        if vocabulary_offset < 0
            || manifest_offset < vocabulary_offset
            || manifest_offset as u64 > footer_start
        {
            return Err(IndexError::format(format!(
                "footer offsets out of range: vocabulary={} manifest={} file_len={}",
                vocabulary_offset, manifest_offset, file_len
            )));
        }
        if block_size <= 0 || vocab_group <= 0 {
            return Err(IndexError::format(format!(
                "bad footer sizes: block_size={} vocab_group={}",
                block_size, vocab_group
            )));
        }

        Ok(Footer {
            vocabulary_offset: vocabulary_offset as u64,
            manifest_offset: manifest_offset as u64,
            block_size: block_size as u32,
            vocab_group: vocab_group as u32,
            compressed,
        })
    }
}

fn take<const N: usize>(buf: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&buf[at..at + N]);
    out
}
