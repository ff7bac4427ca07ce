// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! BlockStore: the on-disk key/value container every index part is made of.
//!
//! A BlockStore file is a run of blocks followed by three trailer sections.
//! Keys are sorted bytes; values are opaque. The posting lists, the document
//! lengths and the document names all live in files of this one format, so
//! the reader has to be good at two things: jumping to a single key, and
//! scanning every key without touching the values.
//!
//! # Format Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ BLOCK 0 .. BLOCK n-1  (see block.rs)                     │
//! ├──────────────────────────────────────────────────────────┤
//! │ VOCABULARY                                               │
//! │   count: vbyte                                           │
//! │   per block: first key + offset, front-coded in groups   │
//! ├──────────────────────────────────────────────────────────┤
//! │ MANIFEST (JSON object)                                   │
//! ├──────────────────────────────────────────────────────────┤
//! │ FOOTER (33 bytes, big-endian)                            │
//! │   vocabulary_offset: i64, manifest_offset: i64           │
//! │   block_size: i32, vocab_group: i32                      │
//! │   compressed: u8, magic: u64                             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every integer outside the footer is a vbyte (see `encoding`).
//!
//! # Security Considerations
//!
//! Readers treat the file as untrusted: lengths are checked against what is
//! left of the enclosing region before anything is allocated, varints are
//! length-limited, and the vocabulary is covered by a CRC32 stored in the
//! manifest.

pub mod block;
pub mod encoding;
pub mod footer;
pub mod manifest;
pub mod reader;
pub mod stream;
pub mod vocabulary;
pub mod writer;

pub use block::{Block, BlockBuilder, BlockHeader};
pub use encoding::{decode_vbyte, encode_vbyte, vbyte_len, write_vbyte, SliceReader};
pub use footer::{Footer, DEFAULT_BLOCK_SIZE, DEFAULT_VOCAB_GROUP, FOOTER_MAGIC};
pub use manifest::Manifest;
pub use reader::{BlockCursor, BlockStoreReader};
pub use stream::{DataStream, SharedFile, Source};
pub use vocabulary::{Vocabulary, VocabularyEntry};
pub use writer::{BlockStoreWriter, WriterOptions};
