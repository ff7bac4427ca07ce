// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the quarry command-line interface.
//!
//! Four subcommands: `build` turns a TREC text file into an index directory,
//! `inspect` dumps one BlockStore file, `search` ranks documents for a JSON
//! operator tree, and `xcount` sums the counts of one.

pub mod display;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "quarry",
    about = "Disk-backed inverted index with document-at-a-time ranking",
    version
)]
pub struct Cli {
    /// JSON parameter file (scorer settings and build layout)
    #[arg(short, long, global = true)]
    pub parameters: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build an index from a TREC text file
    Build {
        /// File of <DOC> records
        #[arg(short, long)]
        input: PathBuf,

        /// Index directory to create
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show the footer, manifest and keys of a BlockStore file
    Inspect {
        /// Path to one index part (postings, extents, lengths, names)
        file: PathBuf,

        /// Maximum number of keys to list
        #[arg(short, long, default_value = "20")]
        keys: usize,
    },

    /// Rank documents for an operator tree
    Search {
        /// Index directory
        index: PathBuf,

        /// Operator tree as JSON, or a bare term list ranked with #combine
        query: String,

        /// Maximum number of results to return
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Count how often an operator tree matches across the collection
    Xcount {
        /// Index directory
        index: PathBuf,

        /// Operator tree as JSON, or a single term
        query: String,
    },
}
