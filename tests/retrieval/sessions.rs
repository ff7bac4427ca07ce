//! Asynchronous queries and batches: each runs on its own readers and
//! returns what a direct query returns.

use std::sync::Arc;

use parking_lot::Mutex;
use quarry::retrieval::{Node, Retrieval, ResultSink};
use quarry::run_batch;

use crate::common::{bm25_parameters, build_toy_index};

fn pets() -> Node {
    Node::new("combine", vec![Node::extents("cat"), Node::extents("dog")])
}

#[test]
fn test_asynchronous_query_matches_direct_query() {
    let dir = build_toy_index(&bm25_parameters());
    let mut retrieval = Retrieval::open(dir.path(), bm25_parameters()).unwrap();
    let expected = retrieval.run_query(&pets(), 5).unwrap();

    let sink: ResultSink = Arc::new(Mutex::new(Vec::new()));
    retrieval.run_asynchronous_query(pets(), 5, sink.clone()).unwrap();
    retrieval.wait_for_asynchronous_query().unwrap();
    assert_eq!(*sink.lock(), expected);
}

#[test]
fn test_asynchronous_failure_surfaces_on_wait() {
    let dir = build_toy_index(&bm25_parameters());
    let mut retrieval = Retrieval::open(dir.path(), bm25_parameters()).unwrap();
    let sink: ResultSink = Arc::new(Mutex::new(Vec::new()));
    let bad = Node::new("frobnicate", Vec::new());
    retrieval.run_asynchronous_query(bad, 5, sink.clone()).unwrap();
    assert!(retrieval.wait_for_asynchronous_query().is_err());
    assert!(sink.lock().is_empty());
    // Nothing pending any more.
    assert!(retrieval.wait_for_asynchronous_query().is_ok());
}

#[test]
fn test_sessions_do_not_share_cursors() {
    let dir = build_toy_index(&bm25_parameters());
    let first = Retrieval::open(dir.path(), bm25_parameters()).unwrap();
    let second = Retrieval::open(dir.path(), bm25_parameters()).unwrap();
    let a = first.run_query(&pets(), 10).unwrap();
    let moon = Node::new("combine", vec![Node::extents("moon")]);
    second.run_query(&moon, 10).unwrap();
    assert_eq!(first.run_query(&pets(), 10).unwrap(), a);
}

#[test]
fn test_batch_returns_results_in_query_order() {
    let dir = build_toy_index(&bm25_parameters());
    let retrieval = Retrieval::open(dir.path(), bm25_parameters()).unwrap();
    let queries: Vec<(Node, usize)> = ["cat", "dog", "moon", "unicorn"]
        .iter()
        .map(|term| (Node::new("combine", vec![Node::extents(term)]), 10))
        .collect();
    let batch = run_batch(dir.path(), &bm25_parameters(), &queries).unwrap();
    assert_eq!(batch.len(), 4);
    for ((node, requested), results) in queries.iter().zip(&batch) {
        assert_eq!(results, &retrieval.run_query(node, *requested).unwrap());
    }
    assert!(batch[3].is_empty());
}
