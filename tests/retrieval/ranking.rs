//! Ranking behavior: the toy collection, ties, and result annotations.

use std::collections::HashSet;

use quarry::build::TrecDocument;
use quarry::retrieval::{Node, Retrieval};
use quarry::Parameters;

use crate::common::{bm25_parameters, build_temp_index, build_toy_index};

fn cat_dog() -> Node {
    Node::new("combine", vec![Node::extents("cat"), Node::extents("dog")])
}

#[test]
fn test_both_terms_rank_above_one_term() {
    let dir = build_toy_index(&bm25_parameters());
    let retrieval = Retrieval::open(dir.path(), bm25_parameters()).unwrap();
    let results = retrieval.run_query(&cat_dog(), 10).unwrap();

    let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
    let top: HashSet<&str> = names[..3].iter().copied().collect();
    assert_eq!(top, ["doc-02", "doc-05", "doc-09"].into_iter().collect());

    // Single-pet documents follow; documents with neither never appear
    // because BM25 gives an absent term nothing.
    let rest: HashSet<&str> = names[3..].iter().copied().collect();
    assert_eq!(
        rest,
        ["doc-01", "doc-04", "doc-06", "doc-07"].into_iter().collect()
    );
    assert!(results[2].score > results[3].score);
}

#[test]
fn test_results_are_annotated() {
    let dir = build_toy_index(&bm25_parameters());
    let retrieval = Retrieval::open(dir.path(), bm25_parameters()).unwrap();
    let results = retrieval.run_query(&cat_dog(), 10).unwrap();
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.rank, i + 1);
        assert_eq!(result.source, dir.path().display().to_string());
        assert_eq!(
            retrieval.index().name(result.document).unwrap().as_deref(),
            Some(result.name.as_str())
        );
    }
    for pair in results.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_requested_limits_results() {
    let dir = build_toy_index(&bm25_parameters());
    let retrieval = Retrieval::open(dir.path(), bm25_parameters()).unwrap();
    assert_eq!(retrieval.run_query(&cat_dog(), 2).unwrap().len(), 2);
    assert!(retrieval.run_query(&cat_dog(), 0).unwrap().is_empty());
}

#[test]
fn test_equal_scores_order_by_document_id() {
    let documents: Vec<TrecDocument> = (0..6)
        .map(|i| TrecDocument::new(format!("same-{}", i), "lunar cat lunar"))
        .collect();
    let dir = build_temp_index(&documents, &Parameters::default());
    for max_score in [true, false] {
        let parameters = Parameters {
            max_score,
            ..Parameters::default()
        };
        let retrieval = Retrieval::open(dir.path(), parameters).unwrap();
        let query = Node::new("combine", vec![Node::extents("lunar"), Node::extents("cat")]);
        let results = retrieval.run_query(&query, 3).unwrap();
        let ids: Vec<u32> = results.iter().map(|r| r.document).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(results[0].score, results[2].score);
    }
}

#[test]
fn test_dirichlet_scores_every_candidate_below_zero() {
    let dir = build_toy_index(&Parameters::default());
    let retrieval = Retrieval::open(dir.path(), Parameters::default()).unwrap();
    let results = retrieval.run_query(&cat_dog(), 10).unwrap();
    // Candidates are the union of both lists.
    assert_eq!(results.len(), 7);
    assert!(results.iter().all(|r| r.score < 0.0));
    let top: HashSet<&str> = results[..3].iter().map(|r| r.name.as_str()).collect();
    assert_eq!(top, ["doc-02", "doc-05", "doc-09"].into_iter().collect());
}

#[test]
fn test_unknown_term_matches_nothing() {
    let dir = build_toy_index(&bm25_parameters());
    let retrieval = Retrieval::open(dir.path(), bm25_parameters()).unwrap();
    let query = Node::new("combine", vec![Node::extents("unicorn")]);
    assert!(retrieval.run_query(&query, 10).unwrap().is_empty());
}

#[test]
fn test_query_terms_are_normalized() {
    let dir = build_toy_index(&bm25_parameters());
    let retrieval = Retrieval::open(dir.path(), bm25_parameters()).unwrap();
    let upper = Node::new("combine", vec![Node::extents("CAT")]);
    let lower = Node::new("combine", vec![Node::extents("cat")]);
    assert_eq!(
        retrieval.run_query(&upper, 10).unwrap(),
        retrieval.run_query(&lower, 10).unwrap()
    );
}
