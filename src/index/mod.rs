// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! An index on disk: a directory of BlockStore parts.
//!
//! ```text
//! index/
//!   postings   term        -> position list
//!   extents    field name  -> extent list      (optional)
//!   lengths    doc id      -> vbyte length
//!   names      doc id      -> UTF-8 external name
//! ```
//!
//! Document ids are keyed as 4-byte big-endian integers, so byte order and
//! numeric order agree and a cursor over `lengths` walks documents in id
//! order. Collection statistics live in the `lengths` manifest.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::binary::{decode_vbyte, BlockCursor, BlockStoreReader};
use crate::error::{IndexError, Result};
use crate::iterator::DocId;
use crate::postings::DiskListIterator;
use crate::scoring::CollectionStatistics;

pub const POSTINGS_PART: &str = "postings";
pub const EXTENTS_PART: &str = "extents";
pub const LENGTHS_PART: &str = "lengths";
pub const NAMES_PART: &str = "names";

/// Manifest keys of the lengths part.
pub const COLLECTION_LENGTH: &str = "collectionLength";
pub const DOCUMENT_COUNT: &str = "documentCount";
pub const MAX_LENGTH: &str = "maxLength";
pub const MIN_LENGTH: &str = "minLength";

pub fn document_key(document: DocId) -> [u8; 4] {
    document.to_be_bytes()
}

pub fn decode_document_key(key: &[u8]) -> Result<DocId> {
    let bytes: [u8; 4] = key
        .try_into()
        .map_err(|_| IndexError::format(format!("document key of {} bytes", key.len())))?;
    Ok(DocId::from_be_bytes(bytes))
}

/// Lengths by document id. The retrieval loop asks once per candidate, in
/// increasing id order.
pub trait LengthSource {
    fn length(&mut self, document: DocId) -> Result<Option<u32>>;
}

impl LengthSource for HashMap<DocId, u32> {
    fn length(&mut self, document: DocId) -> Result<Option<u32>> {
        Ok(self.get(&document).copied())
    }
}

/// Read-only handle on an index directory. Cloning shares the open files;
/// a thread that queries independently should `open` its own.
#[derive(Debug, Clone)]
pub struct DiskIndex {
    path: PathBuf,
    postings: BlockStoreReader,
    extents: Option<BlockStoreReader>,
    lengths: BlockStoreReader,
    names: BlockStoreReader,
    collection: CollectionStatistics,
}

impl DiskIndex {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let postings = BlockStoreReader::open(path.join(POSTINGS_PART))?;
        let extents_path = path.join(EXTENTS_PART);
        let extents = if extents_path.exists() {
            Some(BlockStoreReader::open(extents_path)?)
        } else {
            None
        };
        let lengths = BlockStoreReader::open(path.join(LENGTHS_PART))?;
        let names = BlockStoreReader::open(path.join(NAMES_PART))?;

        let manifest = lengths.manifest();
        let collection = CollectionStatistics {
            collection_length: manifest.get_u64(COLLECTION_LENGTH, 0),
            document_count: manifest.get_u64(DOCUMENT_COUNT, 0),
            max_length: manifest.get_u64(MAX_LENGTH, 0) as u32,
            min_length: manifest.get_u64(MIN_LENGTH, 0) as u32,
        };

        log::info!(
            "opened index {} ({} documents, {} terms in {} blocks)",
            path.display(),
            collection.document_count,
            postings.manifest().get_u64("keyCount", 0),
            postings.block_count()
        );

        Ok(Self {
            path,
            postings,
            extents,
            lengths,
            names,
            collection,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn collection(&self) -> CollectionStatistics {
        self.collection
    }

    pub fn document_count(&self) -> u64 {
        self.collection.document_count
    }

    /// The part called `name`. A missing `extents` part is `Ok(None)`.
    pub fn part(&self, name: &str) -> Result<Option<&BlockStoreReader>> {
        match name {
            POSTINGS_PART => Ok(Some(&self.postings)),
            EXTENTS_PART => Ok(self.extents.as_ref()),
            LENGTHS_PART => Ok(Some(&self.lengths)),
            NAMES_PART => Ok(Some(&self.names)),
            other => Err(IndexError::unsupported(format!("unknown index part '{}'", other))),
        }
    }

    /// The list stored under `key` in a list part, or `None` when the key is
    /// absent.
    pub fn list(&self, part: &str, key: &str) -> Result<Option<DiskListIterator>> {
        if part == LENGTHS_PART || part == NAMES_PART {
            return Err(IndexError::unsupported(format!(
                "part '{}' does not hold posting lists",
                part
            )));
        }
        let Some(reader) = self.part(part)? else {
            return Ok(None);
        };
        match reader.value_stream(key.as_bytes())? {
            Some(stream) => Ok(Some(DiskListIterator::open(key.as_bytes(), stream)?)),
            None => Ok(None),
        }
    }

    /// A cursor for the length of many documents in increasing id order.
    pub fn lengths(&self) -> DocumentLengths {
        DocumentLengths {
            reader: self.lengths.clone(),
            cursor: None,
        }
    }

    pub fn length(&self, document: DocId) -> Result<Option<u32>> {
        self.lengths().length(document)
    }

    pub fn name(&self, document: DocId) -> Result<Option<String>> {
        match self.names.get(&document_key(document))? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| IndexError::format(format!("name of document {}: {}", document, e))),
            None => Ok(None),
        }
    }
}

/// Length lookups that keep the current block loaded between calls.
#[derive(Debug)]
pub struct DocumentLengths {
    reader: BlockStoreReader,
    cursor: Option<BlockCursor>,
}

impl LengthSource for DocumentLengths {
    fn length(&mut self, document: DocId) -> Result<Option<u32>> {
        let key = document_key(document);
        let found = match self.cursor.as_mut() {
            Some(cursor) => cursor.seek(&key)?,
            None => match self.reader.seek(&key)? {
                Some(cursor) => {
                    self.cursor = Some(cursor);
                    true
                }
                None => false,
            },
        };
        if !found {
            return Ok(None);
        }
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };
        let bytes = cursor.value_bytes()?;
        let (length, _) = decode_vbyte(&bytes)?;
        u32::try_from(length)
            .map(Some)
            .map_err(|_| IndexError::format(format!("length {} of document {}", length, document)))
    }
}
