// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Random-access reader for BlockStore files.
//!
//! Opening a file reads only the footer, the vocabulary and the manifest.
//! Blocks are loaded one at a time as cursors reach them, and a compressed
//! block's values are inflated only when someone asks for a value. A full
//! key scan therefore costs one header read per block and nothing more.
//!
//! Lookup is two steps: binary search the vocabulary for the one block whose
//! key range could hold the key, then binary search that block's keys.
//!
//! A reader and all of its cursors share one file handle. That handle is not
//! meant to be shared between query threads; each thread opens its own reader.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::block::Block;
use super::footer::Footer;
use super::manifest::Manifest;
use super::stream::{DataStream, SharedFile, Source};
use super::vocabulary::Vocabulary;
use crate::error::{IndexError, Result};

#[derive(Debug)]
struct ReaderInner {
    path: PathBuf,
    file: SharedFile,
    footer: Footer,
    vocabulary: Vocabulary,
    manifest: Manifest,
}

impl ReaderInner {
    fn load_block(&self, index: usize) -> Result<Block> {
        let (start, len) = self.vocabulary.block_range(index);
        let stream = DataStream::new(Source::File(self.file.clone()), start, len);
        Block::load(stream, self.footer.compressed)
    }
}

/// An open BlockStore file.
#[derive(Debug, Clone)]
pub struct BlockStoreReader {
    inner: Arc<ReaderInner>,
}

impl BlockStoreReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path)?;
        let file_len = file.metadata()?.len();
        if file_len < Footer::SIZE as u64 {
            return Err(IndexError::format(format!(
                "{} is {} bytes, too short for a footer",
                path.display(),
                file_len
            )));
        }

        file.seek(SeekFrom::Start(file_len - Footer::SIZE as u64))?;
        let footer = Footer::read(&mut file, file_len)?;

        let vocab_len = footer.manifest_offset - footer.vocabulary_offset;
        let mut vocab_bytes = vec![0u8; vocab_len as usize];
        file.seek(SeekFrom::Start(footer.vocabulary_offset))?;
        file.read_exact(&mut vocab_bytes)?;

        let manifest_len = file_len - Footer::SIZE as u64 - footer.manifest_offset;
        let mut manifest_bytes = vec![0u8; manifest_len as usize];
        file.read_exact(&mut manifest_bytes)?;
        let manifest = Manifest::from_json_bytes(&manifest_bytes)?;

        if manifest.contains("vocabularyChecksum") {
            let expected = manifest.get_u64("vocabularyChecksum", 0);
            let actual = crc32fast::hash(&vocab_bytes) as u64;
            if expected != actual {
                return Err(IndexError::format(format!(
                    "vocabulary checksum mismatch in {}: stored {:#010x}, computed {:#010x}",
                    path.display(),
                    expected,
                    actual
                )));
            }
        }

        let vocabulary =
            Vocabulary::decode(&vocab_bytes, footer.vocab_group, footer.vocabulary_offset)?;

        log::debug!(
            "opened {}: {} blocks, compressed={}",
            path.display(),
            vocabulary.len(),
            footer.compressed
        );

        Ok(Self {
            inner: Arc::new(ReaderInner {
                path,
                file: Arc::new(Mutex::new(file)),
                footer,
                vocabulary,
                manifest,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn footer(&self) -> &Footer {
        &self.inner.footer
    }

    pub fn manifest(&self) -> &Manifest {
        &self.inner.manifest
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.inner.vocabulary
    }

    pub fn block_count(&self) -> usize {
        self.inner.vocabulary.len()
    }

    /// Cursor on the first entry of the file, or `None` if the file is empty.
    pub fn iterator(&self) -> Result<Option<BlockCursor>> {
        if self.inner.vocabulary.is_empty() {
            return Ok(None);
        }
        BlockCursor::open(self.inner.clone(), 0, 0).map(Some)
    }

    /// Cursor positioned exactly on `key`, or `None` if the key is absent.
    pub fn seek(&self, key: &[u8]) -> Result<Option<BlockCursor>> {
        let Some(block_index) = self.inner.vocabulary.find_block(key) else {
            return Ok(None);
        };
        let block = self.inner.load_block(block_index)?;
        match block.search(key) {
            Ok(entry) => Ok(Some(BlockCursor::with_block(
                self.inner.clone(),
                block_index,
                block,
                entry,
            ))),
            Err(_) => Ok(None),
        }
    }

    /// Cursor on the first key >= `key`, or `None` if every key is smaller.
    pub fn seek_ge(&self, key: &[u8]) -> Result<Option<BlockCursor>> {
        let block_index = self.inner.vocabulary.find_block(key).unwrap_or(0);
        if self.inner.vocabulary.is_empty() {
            return Ok(None);
        }
        let block = self.inner.load_block(block_index)?;
        let entry = match block.search(key) {
            Ok(i) | Err(i) => i,
        };
        let mut cursor = BlockCursor::with_block(self.inner.clone(), block_index, block, entry);
        if entry >= cursor.block.len() {
            // Key sorts after the last entry of its block: first key of the next block.
            cursor.entry = cursor.block.len().saturating_sub(1);
            if !cursor.next()? {
                return Ok(None);
            }
        }
        Ok(Some(cursor))
    }

    /// Stream over the value stored under `key`.
    pub fn value_stream(&self, key: &[u8]) -> Result<Option<DataStream>> {
        match self.seek(key)? {
            Some(mut cursor) => cursor.value_stream().map(Some),
            None => Ok(None),
        }
    }

    /// Value bytes stored under `key`, fully materialized.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.value_stream(key)? {
            Some(mut stream) => stream.read_to_vec().map(Some),
            None => Ok(None),
        }
    }
}

/// Forward cursor over the entries of a BlockStore file.
#[derive(Debug)]
pub struct BlockCursor {
    reader: Arc<ReaderInner>,
    block_index: usize,
    block: Block,
    entry: usize,
    done: bool,
}

impl BlockCursor {
    fn open(reader: Arc<ReaderInner>, block_index: usize, entry: usize) -> Result<Self> {
        let block = reader.load_block(block_index)?;
        Ok(Self::with_block(reader, block_index, block, entry))
    }

    fn with_block(reader: Arc<ReaderInner>, block_index: usize, block: Block, entry: usize) -> Self {
        let done = block.is_empty();
        Self {
            reader,
            block_index,
            block,
            entry,
            done,
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn key(&self) -> &[u8] {
        self.block.key(self.entry)
    }

    pub fn block_index(&self) -> usize {
        self.block_index
    }

    /// Whether the current block's values have been inflated yet.
    pub fn is_value_loaded(&self) -> bool {
        self.block.is_inflated()
    }

    pub fn value_stream(&mut self) -> Result<DataStream> {
        self.block.value(self.entry)
    }

    pub fn value_bytes(&mut self) -> Result<Vec<u8>> {
        self.value_stream()?.read_to_vec()
    }

    /// Reposition on `key`, in either direction. The loaded block is reused
    /// when the key falls inside it, which makes runs of nearby lookups cheap.
    /// On a miss the cursor rests near where the key would be.
    pub fn seek(&mut self, key: &[u8]) -> Result<bool> {
        let Some(block_index) = self.reader.vocabulary.find_block(key) else {
            return Ok(false);
        };
        if block_index != self.block_index {
            self.block = self.reader.load_block(block_index)?;
            self.block_index = block_index;
        }
        self.done = self.block.is_empty();
        match self.block.search(key) {
            Ok(entry) => {
                self.entry = entry;
                Ok(true)
            }
            Err(entry) => {
                self.entry = entry.min(self.block.len().saturating_sub(1));
                Ok(false)
            }
        }
    }

    /// Advance to the next key, loading the following block when this one is
    /// exhausted. Returns false once the file is exhausted.
    pub fn next(&mut self) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        if self.entry + 1 < self.block.len() {
            self.entry += 1;
            return Ok(true);
        }
        if self.block_index + 1 >= self.reader.vocabulary.len() {
            self.done = true;
            return Ok(false);
        }
        self.block_index += 1;
        self.block = self.reader.load_block(self.block_index)?;
        self.entry = 0;
        self.done = self.block.is_empty();
        Ok(!self.done)
    }
}
