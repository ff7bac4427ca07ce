// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Query sessions over one index.
//!
//! A `Retrieval` owns its readers. Every query builds a fresh iterator tree
//! and a fresh length cursor, so queries run one after another on the same
//! session without interfering. Concurrent queries each get their own
//! session: `run_asynchronous_query` opens one on its worker thread, and
//! `run_batch` opens one per rayon worker.
//!
//! ```text
//! Node ──IteratorBuilder──▶ root scorer ──collect_top_k──▶ [(doc, score)]
//!                                                             │ names
//!                                                             ▼
//!                                                      [ScoredDocument]
//! ```

pub mod builder;
pub mod node;
pub mod topk;

pub use builder::IteratorBuilder;
pub use node::Node;
pub use topk::{collect_top_k, ScoredDocument, TopKCollector};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::Parameters;
use crate::error::{IndexError, Result};
use crate::index::DiskIndex;
use crate::iterator::{NodeIterator, NodeStatistics};

/// Where an asynchronous query leaves its results.
pub type ResultSink = Arc<Mutex<Vec<ScoredDocument>>>;

pub struct Retrieval {
    index: DiskIndex,
    parameters: Parameters,
    pending: Option<JoinHandle<Result<()>>>,
}

impl Retrieval {
    pub fn open(path: impl AsRef<Path>, parameters: Parameters) -> Result<Self> {
        Ok(Self {
            index: DiskIndex::open(path)?,
            parameters,
            pending: None,
        })
    }

    pub fn index(&self) -> &DiskIndex {
        &self.index
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Build the iterator tree for `node` without running it.
    pub fn create_iterator(&self, node: &Node) -> Result<NodeIterator> {
        IteratorBuilder::new(&self.index, &self.parameters).build(node)
    }

    /// Rank documents for `node` and return the best `requested`, best
    /// first. MaxScore evaluates a root `combine` when fewer results than
    /// documents are asked for.
    pub fn run_query(&self, node: &Node, requested: usize) -> Result<Vec<ScoredDocument>> {
        let max_score = self.parameters.max_score && (requested as u64) < self.index.document_count();
        let builder = IteratorBuilder::new(&self.index, &self.parameters);
        let mut root = builder.build_root(node, max_score)?;
        let mut lengths = self.index.lengths();
        let ranked = collect_top_k(root.as_mut(), &mut lengths, requested)?;

        let source = self.index.path().display().to_string();
        let mut results = Vec::with_capacity(ranked.len());
        for (i, (document, score)) in ranked.into_iter().enumerate() {
            let name = self.index.name(document)?.ok_or_else(|| {
                IndexError::NotFound(format!("name of ranked document {}", document))
            })?;
            results.push(ScoredDocument {
                document,
                score,
                rank: i + 1,
                source: source.clone(),
                name,
            });
        }
        log::info!("{} -> {} results", node, results.len());
        Ok(results)
    }

    /// Start `node` on a background thread with its own readers. Results are
    /// appended to `sink` when the query finishes. One query runs at a time;
    /// starting another waits for the previous one first.
    pub fn run_asynchronous_query(
        &mut self,
        node: Node,
        requested: usize,
        sink: ResultSink,
    ) -> Result<()> {
        self.wait_for_asynchronous_query()?;
        let path = self.index.path().to_path_buf();
        let parameters = self.parameters.clone();
        let handle = std::thread::Builder::new()
            .name("quarry-query".to_string())
            .spawn(move || {
                let session = Retrieval::open(&path, parameters)?;
                let results = session.run_query(&node, requested)?;
                sink.lock().extend(results);
                Ok(())
            })?;
        self.pending = Some(handle);
        Ok(())
    }

    /// Block until the running asynchronous query, if any, has finished, and
    /// return its outcome.
    pub fn wait_for_asynchronous_query(&mut self) -> Result<()> {
        match self.pending.take() {
            None => Ok(()),
            Some(handle) => handle.join().map_err(|_| IndexError::QueryPanicked)?,
        }
    }

    /// Total count a count-producing tree yields over the whole collection.
    pub fn xcount(&self, node: &Node) -> Result<u64> {
        Ok(self.node_statistics(node)?.node_frequency)
    }

    /// Number of documents a count-producing tree matches at least once.
    pub fn doc_count(&self, node: &Node) -> Result<u64> {
        Ok(self.node_statistics(node)?.node_document_count)
    }

    pub fn node_statistics(&self, node: &Node) -> Result<NodeStatistics> {
        IteratorBuilder::new(&self.index, &self.parameters).statistics(node)
    }
}

impl Drop for Retrieval {
    fn drop(&mut self) {
        if let Err(e) = self.wait_for_asynchronous_query() {
            log::warn!("asynchronous query failed: {}", e);
        }
    }
}

/// Run many queries against the index at `path`, in parallel when the
/// `parallel` feature is on. Each worker opens its own session; results come
/// back in query order.
pub fn run_batch(
    path: &Path,
    parameters: &Parameters,
    queries: &[(Node, usize)],
) -> Result<Vec<Vec<ScoredDocument>>> {
    let path: PathBuf = path.to_path_buf();

    #[cfg(feature = "parallel")]
    {
        // Surface open errors once, with their real cause.
        drop(Retrieval::open(&path, parameters.clone())?);
        queries
            .par_iter()
            .map_init(
                || Retrieval::open(&path, parameters.clone()),
                |session, (node, requested)| match session {
                    Ok(session) => session.run_query(node, *requested),
                    Err(e) => Err(IndexError::NotFound(format!(
                        "index {} for worker: {}",
                        path.display(),
                        e
                    ))),
                },
            )
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        let session = Retrieval::open(&path, parameters.clone())?;
        queries
            .iter()
            .map(|(node, requested)| session.run_query(node, *requested))
            .collect()
    }
}
