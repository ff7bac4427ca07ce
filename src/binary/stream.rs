// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Byte-range streams over either an in-memory buffer or a file.
//!
//! A compressed block is inflated into memory once and every value in it is a
//! slice of that buffer. An uncompressed block never has to be loaded at all:
//! its values are read straight from the file, a few KB at a time, only when
//! an iterator actually asks for the bytes. Both cases hide behind
//! `DataStream`, so posting list decoders do not care which one they got.
//!
//! File-backed streams share one handle per reader through a mutex. Each
//! read locks, seeks, and reads a chunk into the stream's private buffer, so
//! many cursors over the same file can interleave without stepping on each
//! other's file position.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{IndexError, Result};

/// File handle shared by every stream opened from one reader.
pub type SharedFile = Arc<Mutex<File>>;

/// Bytes fetched from a file per buffer refill.
const READ_CHUNK: usize = 8 * 1024;

/// Where a stream's bytes come from.
#[derive(Clone, Debug)]
pub enum Source {
    Memory(Arc<[u8]>),
    File(SharedFile),
}

/// A seekable, bounded view of `len` bytes starting at `start` in a source.
#[derive(Clone, Debug)]
pub struct DataStream {
    source: Source,
    start: u64,
    len: u64,
    pos: u64,
    buffer: Vec<u8>,
    buffer_start: u64,
}

impl DataStream {
    pub fn from_memory(bytes: Arc<[u8]>) -> Self {
        let len = bytes.len() as u64;
        Self::new(Source::Memory(bytes), 0, len)
    }

    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self::from_memory(Arc::from(bytes))
    }

    pub fn new(source: Source, start: u64, len: u64) -> Self {
        Self {
            source,
            start,
            len,
            pos: 0,
            buffer: Vec::new(),
            buffer_start: 0,
        }
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current offset relative to the start of this stream.
    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn remaining(&self) -> u64 {
        self.len - self.pos
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.len
    }

    pub fn seek(&mut self, pos: u64) -> Result<()> {
        if pos > self.len {
            return Err(IndexError::format(format!(
                "seek to {} past end of {}-byte stream",
                pos, self.len
            )));
        }
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, n: u64) -> Result<()> {
        self.seek(self.pos + n)
    }

    /// A new stream over `len` bytes starting `offset` bytes into this one.
    pub fn sub_stream(&self, offset: u64, len: u64) -> Result<DataStream> {
        let end = offset.checked_add(len).filter(|&end| end <= self.len);
        if end.is_none() {
            return Err(IndexError::format(format!(
                "sub-stream {}+{} exceeds {}-byte stream",
                offset, len, self.len
            )));
        }
        Ok(DataStream::new(self.source.clone(), self.start + offset, len))
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        if self.pos >= self.len {
            return Err(IndexError::format("read past end of stream"));
        }
        let byte = if let Source::Memory(bytes) = &self.source {
            bytes[(self.start + self.pos) as usize]
        } else {
            let in_buffer = self.pos >= self.buffer_start
                && self.pos < self.buffer_start + self.buffer.len() as u64;
            if !in_buffer {
                self.fill()?;
            }
            self.buffer[(self.pos - self.buffer_start) as usize]
        };
        self.pos += 1;
        Ok(byte)
    }

    /// Decode one variable-byte integer (terminal byte has the high bit set).
    pub fn read_vbyte(&mut self) -> Result<u64> {
        let mut result = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.read_u8()?;
            result |= ((byte & 0x7F) as u64) << shift;
            if byte & 0x80 != 0 {
                return Ok(result);
            }
            shift += 7;
            if shift >= 70 {
                return Err(IndexError::format("vbyte exceeds maximum length"));
            }
        }
    }

    pub fn read_vbyte_u32(&mut self) -> Result<u32> {
        let value = self.read_vbyte()?;
        u32::try_from(value)
            .map_err(|_| IndexError::format(format!("vbyte value {} overflows u32", value)))
    }

    pub fn read_exact(&mut self, out: &mut [u8]) -> Result<()> {
        let n = out.len() as u64;
        if n > self.remaining() {
            return Err(IndexError::format(format!(
                "wanted {} bytes, {} remain in stream",
                n,
                self.remaining()
            )));
        }
        match &self.source {
            Source::Memory(bytes) => {
                let from = (self.start + self.pos) as usize;
                out.copy_from_slice(&bytes[from..from + out.len()]);
            }
            Source::File(file) => {
                let mut file = file.lock();
                file.seek(SeekFrom::Start(self.start + self.pos))?;
                file.read_exact(out)?;
            }
        }
        self.pos += n;
        Ok(())
    }

    /// Read everything from the current position to the end.
    pub fn read_to_vec(&mut self) -> Result<Vec<u8>> {
        let mut out = vec![0u8; self.remaining() as usize];
        self.read_exact(&mut out)?;
        Ok(out)
    }

    fn fill(&mut self) -> Result<()> {
        let Source::File(file) = &self.source else {
            return Ok(());
        };
        let want = (self.len - self.pos).min(READ_CHUNK as u64) as usize;
        self.buffer.resize(want, 0);
        {
            let mut file = file.lock();
            file.seek(SeekFrom::Start(self.start + self.pos))?;
            file.read_exact(&mut self.buffer)?;
        }
        self.buffer_start = self.pos;
        Ok(())
    }
}
