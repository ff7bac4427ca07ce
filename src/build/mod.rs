// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Index construction: documents in, four BlockStore parts out.
//!
//! Everything is accumulated in memory and written in one pass at the end,
//! which is fine for test collections and small corpora. Document ids are
//! assigned in the order documents are added, starting at 0.
//!
//! Positions count terms from the start of the document. A title, when
//! present, is tokenized first and recorded as a `title` extent over its
//! positions, so `#inside(cat title)` finds title matches.

pub mod trec;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[cfg(feature = "parallel")]
use indicatif::{ProgressBar, ProgressStyle};

use crate::binary::{encode_vbyte, BlockStoreWriter};
use crate::config::Parameters;
use crate::error::{IndexError, Result};
use crate::index::{
    document_key, COLLECTION_LENGTH, DOCUMENT_COUNT, EXTENTS_PART, LENGTHS_PART, MAX_LENGTH,
    MIN_LENGTH, NAMES_PART, POSTINGS_PART,
};
use crate::iterator::DocId;
use crate::postings::PostingListBuilder;
use crate::utils::tokenize;

pub use trec::{parse_trec, TrecDocument};

/// Field name of title extents.
pub const TITLE_FIELD: &str = "title";

/// What a finished build wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildSummary {
    pub documents: u64,
    pub terms: u64,
    pub collection_length: u64,
}

/// In-memory inverted index waiting to be written.
pub struct IndexBuilder {
    parameters: Parameters,
    terms: BTreeMap<String, Vec<(DocId, Vec<u32>)>>,
    fields: BTreeMap<String, Vec<(DocId, Vec<(u32, u32)>)>>,
    lengths: Vec<u32>,
    names: Vec<String>,
}

impl IndexBuilder {
    pub fn new(parameters: Parameters) -> Self {
        Self {
            parameters,
            terms: BTreeMap::new(),
            fields: BTreeMap::new(),
            lengths: Vec::new(),
            names: Vec::new(),
        }
    }

    pub fn document_count(&self) -> usize {
        self.names.len()
    }

    /// Tokenize and record one document. Returns its id.
    pub fn add_document(&mut self, document: &TrecDocument) -> Result<DocId> {
        let id = DocId::try_from(self.names.len())
            .map_err(|_| IndexError::format("too many documents for 32-bit ids"))?;

        let mut tokens = Vec::new();
        if let Some(title) = &document.title {
            tokens = tokenize(title);
            if !tokens.is_empty() {
                self.fields
                    .entry(TITLE_FIELD.to_string())
                    .or_default()
                    .push((id, vec![(0, tokens.len() as u32)]));
            }
        }
        tokens.extend(tokenize(&document.text));

        let mut positions: BTreeMap<&str, Vec<u32>> = BTreeMap::new();
        for (position, token) in tokens.iter().enumerate() {
            positions.entry(token).or_default().push(position as u32);
        }
        for (term, list) in positions {
            self.terms.entry(term.to_string()).or_default().push((id, list));
        }

        self.lengths.push(tokens.len() as u32);
        self.names.push(document.name.clone());
        Ok(id)
    }

    /// Write the index parts into `dir`, creating it if needed.
    pub fn write(self, dir: impl AsRef<Path>) -> Result<BuildSummary> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let writer_options = self.parameters.writer_options();
        let posting_options = self.parameters.posting_options();

        let mut postings = BlockStoreWriter::create(dir.join(POSTINGS_PART), writer_options)?;
        for (term, documents) in &self.terms {
            let mut list = PostingListBuilder::positions(posting_options);
            for (document, positions) in documents {
                list.add_document(*document)?;
                for &position in positions {
                    list.add_position(position)?;
                }
            }
            postings.add(term.as_bytes(), &list.finish())?;
        }
        let manifest = postings.manifest_mut();
        manifest.set("partName", POSTINGS_PART);
        manifest.set("skipDistance", posting_options.skip_distance as u64);
        manifest.set("skipResetDistance", posting_options.skip_reset_distance as u64);
        postings.close()?;

        if !self.fields.is_empty() {
            let mut extents = BlockStoreWriter::create(dir.join(EXTENTS_PART), writer_options)?;
            for (field, documents) in &self.fields {
                let mut list = PostingListBuilder::extents(posting_options);
                for (document, spans) in documents {
                    list.add_document(*document)?;
                    for &(begin, end) in spans {
                        list.add_extent(begin, end, 0)?;
                    }
                }
                extents.add(field.as_bytes(), &list.finish())?;
            }
            extents.manifest_mut().set("partName", EXTENTS_PART);
            extents.close()?;
        }

        let collection_length: u64 = self.lengths.iter().map(|&l| l as u64).sum();
        let mut lengths = BlockStoreWriter::create(dir.join(LENGTHS_PART), writer_options)?;
        let mut value = Vec::new();
        for (document, &length) in self.lengths.iter().enumerate() {
            value.clear();
            encode_vbyte(length as u64, &mut value);
            lengths.add(&document_key(document as DocId), &value)?;
        }
        let manifest = lengths.manifest_mut();
        manifest.set("partName", LENGTHS_PART);
        manifest.set(COLLECTION_LENGTH, collection_length);
        manifest.set(DOCUMENT_COUNT, self.lengths.len() as u64);
        manifest.set(MAX_LENGTH, self.lengths.iter().copied().max().unwrap_or(0) as u64);
        manifest.set(MIN_LENGTH, self.lengths.iter().copied().min().unwrap_or(0) as u64);
        lengths.close()?;

        let mut names = BlockStoreWriter::create(dir.join(NAMES_PART), writer_options)?;
        for (document, name) in self.names.iter().enumerate() {
            names.add(&document_key(document as DocId), name.as_bytes())?;
        }
        names.manifest_mut().set("partName", NAMES_PART);
        names.close()?;

        let summary = BuildSummary {
            documents: self.names.len() as u64,
            terms: self.terms.len() as u64,
            collection_length,
        };
        log::info!(
            "built index {}: {} documents, {} terms, {} positions",
            dir.display(),
            summary.documents,
            summary.terms,
            summary.collection_length
        );
        Ok(summary)
    }
}

/// Build an index from documents already in memory.
pub fn build_index(
    documents: &[TrecDocument],
    dir: impl AsRef<Path>,
    parameters: &Parameters,
) -> Result<BuildSummary> {
    let mut builder = IndexBuilder::new(parameters.clone());
    for document in documents {
        builder.add_document(document)?;
    }
    builder.write(dir)
}

#[cfg(feature = "parallel")]
fn create_progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {prefix:<12} [{bar:40.cyan/dim}] {pos}/{len} {msg}")
        .map(|style| style.progress_chars("━━╸"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Build an index from a TREC text file, with a progress bar when the
/// `parallel` feature is on.
pub fn run_build(input: &Path, output: &Path, parameters: &Parameters) -> Result<BuildSummary> {
    let text = fs::read_to_string(input)?;
    let documents = parse_trec(&text)?;
    if documents.is_empty() {
        log::warn!("{} holds no <DOC> records", input.display());
    }

    #[cfg(feature = "parallel")]
    let progress = {
        let bar = ProgressBar::new(documents.len() as u64);
        bar.set_style(create_progress_style());
        bar.set_prefix("Indexing");
        bar
    };

    let mut builder = IndexBuilder::new(parameters.clone());
    for document in &documents {
        builder.add_document(document)?;
        #[cfg(feature = "parallel")]
        progress.inc(1);
    }

    #[cfg(feature = "parallel")]
    progress.set_message("writing parts...");

    let summary = builder.write(output)?;

    #[cfg(feature = "parallel")]
    progress.finish_with_message(format!("{} documents", summary.documents));

    Ok(summary)
}
