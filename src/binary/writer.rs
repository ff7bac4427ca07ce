// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Streaming writer for BlockStore files.
//!
//! Keys must arrive in strictly increasing byte order. The writer buffers
//! entries into a `BlockBuilder` and flushes a block whenever the next entry
//! would push it past the configured block size. A value bigger than a block
//! simply gets a block to itself.
//!
//! `close()` writes the vocabulary, the manifest, and the footer, in that
//! order. A file without a footer is not a BlockStore file: readers refuse it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::block::BlockBuilder;
use super::footer::{Footer, DEFAULT_BLOCK_SIZE, DEFAULT_VOCAB_GROUP};
use super::manifest::Manifest;
use super::vocabulary::{Vocabulary, VocabularyEntry};
use crate::error::{IndexError, Result};

/// Knobs for a new BlockStore file.
#[derive(Debug, Clone, Copy)]
pub struct WriterOptions {
    pub block_size: u32,
    pub vocab_group: u32,
    pub compressed: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            vocab_group: DEFAULT_VOCAB_GROUP,
            compressed: true,
        }
    }
}

/// Writes sorted key/value pairs into a new BlockStore file.
pub struct BlockStoreWriter {
    path: PathBuf,
    out: BufWriter<File>,
    options: WriterOptions,
    builder: BlockBuilder,
    offset: u64,
    blocks: Vec<VocabularyEntry>,
    last_key: Option<Vec<u8>>,
    key_count: u64,
    manifest: Manifest,
}

impl BlockStoreWriter {
    pub fn create(path: impl AsRef<Path>, options: WriterOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            out: BufWriter::new(file),
            options,
            builder: BlockBuilder::new(),
            offset: 0,
            blocks: Vec::new(),
            last_key: None,
            key_count: 0,
            manifest: Manifest::new(),
        })
    }

    pub fn manifest_mut(&mut self) -> &mut Manifest {
        &mut self.manifest
    }

    pub fn key_count(&self) -> u64 {
        self.key_count
    }

    /// Append one entry. Fails with a format error on a duplicate or
    /// out-of-order key; the file is unusable after that.
    pub fn add(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if let Some(last) = &self.last_key {
            if key <= last.as_slice() {
                return Err(IndexError::format(format!(
                    "key {:?} added after {:?} in {}",
                    String::from_utf8_lossy(key),
                    String::from_utf8_lossy(last),
                    self.path.display()
                )));
            }
        }

        if !self.builder.is_empty()
            && self.builder.estimated_size_with(key, value.len()) > self.options.block_size as usize
        {
            self.flush_block()?;
        }

        self.builder.add(key, value);
        self.last_key = Some(key.to_vec());
        self.key_count += 1;
        Ok(())
    }

    fn flush_block(&mut self) -> Result<()> {
        let Some(first_key) = self.builder.first_key().map(<[u8]>::to_vec) else {
            return Ok(());
        };
        let keys = self.builder.len();
        let bytes = self.builder.finish(self.options.compressed)?;
        self.out.write_all(&bytes)?;
        self.blocks.push(VocabularyEntry {
            first_key,
            offset: self.offset,
        });
        log::debug!(
            "flushed block {} at offset {}: {} keys, {} bytes",
            self.blocks.len() - 1,
            self.offset,
            keys,
            bytes.len()
        );
        self.offset += bytes.len() as u64;
        Ok(())
    }

    /// Flush the last block and write vocabulary, manifest and footer.
    pub fn close(mut self) -> Result<Footer> {
        self.flush_block()?;

        let vocabulary_offset = self.offset;
        let vocabulary = Vocabulary::new(std::mem::take(&mut self.blocks), vocabulary_offset);
        let mut vocab_bytes = Vec::new();
        vocabulary.encode(self.options.vocab_group, &mut vocab_bytes);
        self.out.write_all(&vocab_bytes)?;

        self.manifest
            .set("vocabularyChecksum", crc32fast::hash(&vocab_bytes) as u64);
        self.manifest.set("keyCount", self.key_count);
        self.manifest.set("blockCount", vocabulary.len() as u64);
        let manifest_offset = vocabulary_offset + vocab_bytes.len() as u64;
        let manifest_bytes = self.manifest.to_json_bytes()?;
        self.out.write_all(&manifest_bytes)?;

        let footer = Footer {
            vocabulary_offset,
            manifest_offset,
            block_size: self.options.block_size,
            vocab_group: self.options.vocab_group,
            compressed: self.options.compressed,
        };
        footer.write(&mut self.out)?;
        self.out.flush()?;
        self.out.get_ref().sync_all()?;

        log::info!(
            "wrote {}: {} keys in {} blocks",
            self.path.display(),
            self.key_count,
            vocabulary.len()
        );
        Ok(footer)
    }
}
