//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::path::Path;

use quarry::binary::DataStream;
use quarry::build::{build_index, TrecDocument};
use quarry::iterator::{Countable, DocId, Extentable, Positional};
use quarry::postings::{DiskListIterator, PostingListBuilder, PostingOptions};
use quarry::Parameters;
use tempfile::TempDir;

// ============================================================================
// TOY COLLECTION
// ============================================================================

/// Ten documents over "cat", "dog" and "moon". Both pets appear in
/// doc-02, doc-05 and doc-09; nothing relevant is in doc-03, doc-08, doc-10.
pub const TOY_TREC: &str = "\
<DOC><DOCNO>doc-01</DOCNO><TEXT>the cat sat on the mat</TEXT></DOC>
<DOC><DOCNO>doc-02</DOCNO><TEXT>the dog chased the cat</TEXT></DOC>
<DOC><DOCNO>doc-03</DOCNO><TEXT>the moon was bright</TEXT></DOC>
<DOC><DOCNO>doc-04</DOCNO><TEXT>a dog howled at the moon</TEXT></DOC>
<DOC><DOCNO>doc-05</DOCNO><TEXT>cat and dog are friends</TEXT></DOC>
<DOC><DOCNO>doc-06</DOCNO><TEXT>the cat watched the moon</TEXT></DOC>
<DOC><DOCNO>doc-07</DOCNO><TEXT>my dog sleeps all day</TEXT></DOC>
<DOC><DOCNO>doc-08</DOCNO><TEXT>the moon and the stars</TEXT></DOC>
<DOC><DOCNO>doc-09</DOCNO><TEXT>a dog and a cat played</TEXT></DOC>
<DOC><DOCNO>doc-10</DOCNO><TEXT>nothing to see here</TEXT></DOC>
";

pub fn bm25_parameters() -> Parameters {
    Parameters {
        default_scorer: "bm25".to_string(),
        k1: 1.2,
        b: 0.75,
        ..Parameters::default()
    }
}

/// Build `documents` into a fresh temporary directory.
pub fn build_temp_index(documents: &[TrecDocument], parameters: &Parameters) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    build_index(documents, dir.path(), parameters).unwrap();
    dir
}

pub fn build_toy_index(parameters: &Parameters) -> TempDir {
    let documents = quarry::build::parse_trec(TOY_TREC).unwrap();
    assert_eq!(documents.len(), 10);
    build_temp_index(&documents, parameters)
}

pub fn index_path(dir: &TempDir) -> &Path {
    dir.path()
}

// ============================================================================
// POSTING LISTS
// ============================================================================

/// One decoded posting: document and its positions.
pub type Posting = (DocId, Vec<u32>);

pub fn encode_positions(postings: &[Posting], options: PostingOptions) -> Vec<u8> {
    let mut builder = PostingListBuilder::positions(options);
    for (document, positions) in postings {
        builder.add_document(*document).unwrap();
        for &position in positions {
            builder.add_position(position).unwrap();
        }
    }
    builder.finish()
}

pub fn open_list(bytes: &[u8]) -> DiskListIterator {
    DiskListIterator::open(b"test", DataStream::from_vec(bytes.to_vec())).unwrap()
}

/// Walk a list from its current position to the end.
pub fn drain(list: &mut DiskListIterator) -> Vec<Posting> {
    let mut out = Vec::new();
    while !list.is_done() {
        let document = list.current_id();
        assert_eq!(list.count() as usize, list.extents().len());
        let positions = list.extents().iter().map(|e| e.begin).collect();
        out.push((document, positions));
        list.move_past(document).unwrap();
    }
    out
}

/// Documents a positional iterator visits, in order.
pub fn collect_ids<P: Positional + ?Sized>(iterator: &mut P) -> Vec<DocId> {
    let mut ids = Vec::new();
    while !iterator.is_done() {
        let document = iterator.current_id();
        ids.push(document);
        iterator.move_past(document).unwrap();
    }
    ids
}
