// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Disk-backed inverted index with document-at-a-time query evaluation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐
//! │   binary     │──▶│   postings   │──▶│    iterator      │
//! │ (BlockStore, │   │ (lists with  │   │ (AND, OR, window │
//! │  vbyte)      │   │  skips)      │   │  synonym, filter)│
//! └──────────────┘   └──────────────┘   └──────────────────┘
//!        │                                       │
//!        ▼                                       ▼
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐
//! │   index      │──▶│  retrieval   │◀──│    scoring       │
//! │ (parts on    │   │ (Node tree,  │   │ (BM25, Dirichlet │
//! │  disk)       │   │  top-k)      │   │  JM, MaxScore)   │
//! └──────────────┘   └──────────────┘   └──────────────────┘
//! ```
//!
//! `build` writes an index from documents; everything else reads one.
//!
//! # Usage
//!
//! ```ignore
//! use quarry::build::{build_index, TrecDocument};
//! use quarry::config::Parameters;
//! use quarry::retrieval::{Node, Retrieval};
//!
//! let docs = vec![TrecDocument::new("d1", "the cat and the dog")];
//! build_index(&docs, "index", &Parameters::default())?;
//!
//! let retrieval = Retrieval::open("index", Parameters::default())?;
//! let query = Node::new("combine", vec![Node::extents("cat"), Node::extents("dog")]);
//! let results = retrieval.run_query(&query, 10)?;
//! ```

pub mod binary;
pub mod build;
pub mod config;
pub mod error;
pub mod index;
pub mod iterator;
pub mod postings;
pub mod retrieval;
pub mod scoring;
pub mod utils;

pub use config::Parameters;
pub use error::{IndexError, Result};
pub use index::DiskIndex;
pub use retrieval::{run_batch, Node, Retrieval, ScoredDocument};
