//! Operator trees evaluated against the toy collection.

use std::collections::HashSet;

use quarry::build::TrecDocument;
use quarry::retrieval::{Node, Retrieval};
use quarry::{IndexError, Parameters};

use crate::common::{bm25_parameters, build_temp_index, build_toy_index};

fn names(retrieval: &Retrieval, node: &Node) -> HashSet<String> {
    retrieval
        .run_query(node, 100)
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect()
}

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_require_keeps_filtered_documents() {
    let dir = build_toy_index(&bm25_parameters());
    let retrieval = Retrieval::open(dir.path(), bm25_parameters()).unwrap();
    let node = Node::new(
        "require",
        vec![
            Node::new("band", vec![Node::extents("cat"), Node::extents("dog")]),
            Node::new("combine", vec![Node::extents("cat"), Node::extents("dog")]),
        ],
    );
    assert_eq!(names(&retrieval, &node), set(&["doc-02", "doc-05", "doc-09"]));
}

#[test]
fn test_reject_drops_filtered_documents() {
    let dir = build_toy_index(&bm25_parameters());
    let retrieval = Retrieval::open(dir.path(), bm25_parameters()).unwrap();
    let node = Node::new("reject", vec![Node::extents("dog"), Node::extents("cat")]);
    assert_eq!(names(&retrieval, &node), set(&["doc-01", "doc-06"]));
}

#[test]
fn test_phrase_scores_only_phrase_matches() {
    let dir = build_toy_index(&bm25_parameters());
    let retrieval = Retrieval::open(dir.path(), bm25_parameters()).unwrap();
    let node = Node::new(
        "combine",
        vec![Node::new("od", vec![Node::extents("the"), Node::extents("cat")])],
    );
    assert_eq!(names(&retrieval, &node), set(&["doc-01", "doc-02", "doc-06"]));
}

#[test]
fn test_synonym_merges_lists() {
    let dir = build_toy_index(&bm25_parameters());
    let retrieval = Retrieval::open(dir.path(), bm25_parameters()).unwrap();
    let node = Node::new("syn", vec![Node::extents("cat"), Node::extents("moon")]);
    let stats = retrieval.node_statistics(&node).unwrap();
    // cat in 5 documents, moon in 4, both in doc-06.
    assert_eq!(stats.node_document_count, 8);
    assert_eq!(stats.node_frequency, 9);
}

#[test]
fn test_explicit_feature_scorers() {
    let dir = build_toy_index(&Parameters::default());
    let retrieval = Retrieval::open(dir.path(), Parameters::default()).unwrap();
    for operator in ["feature:bm25", "feature:jm", "feature:dirichlet"] {
        let node = Node::new(operator, vec![Node::counts("moon")]);
        let results = retrieval.run_query(&node, 10).unwrap();
        assert_eq!(results.len(), 4, "{}", operator);
    }
    let node = Node::new("feature", vec![Node::counts("moon")]).with("scorer", "bm25");
    let results = retrieval.run_query(&node, 10).unwrap();
    assert!(results.iter().all(|r| r.score > 0.0));
}

#[test]
fn test_title_matches_inside_title_extent() {
    let documents = vec![
        TrecDocument::new("a", "a dog story").with_title("cat tales"),
        TrecDocument::new("b", "the cat came back").with_title("dog days"),
        TrecDocument::new("c", "no pets").with_title("cat"),
    ];
    let dir = build_temp_index(&documents, &bm25_parameters());
    let retrieval = Retrieval::open(dir.path(), bm25_parameters()).unwrap();
    let inside = Node::new(
        "inside",
        vec![
            Node::extents("cat"),
            Node::extents("title").with("part", "extents"),
        ],
    );
    assert_eq!(retrieval.doc_count(&inside).unwrap(), 2);
    let node = Node::new("combine", vec![inside]);
    assert_eq!(names(&retrieval, &node), set(&["a", "c"]));
}

#[test]
fn test_node_scorer_parameters_override_defaults() {
    let dir = build_toy_index(&bm25_parameters());
    let retrieval = Retrieval::open(dir.path(), bm25_parameters()).unwrap();
    let plain = Node::new("feature:bm25", vec![Node::counts("moon")]);
    let flat = Node::new("feature:bm25", vec![Node::counts("moon")]).with("b", 0.0);
    let plain = retrieval.run_query(&plain, 10).unwrap();
    let flat = retrieval.run_query(&flat, 10).unwrap();
    // Without length normalization every single occurrence scores the same.
    assert!(flat.windows(2).all(|w| w[0].score == w[1].score));
    assert!(plain.windows(2).any(|w| w[0].score != w[1].score));
}

#[test]
fn test_mismatched_trees_are_rejected_before_reading() {
    let dir = build_toy_index(&bm25_parameters());
    let retrieval = Retrieval::open(dir.path(), bm25_parameters()).unwrap();

    let unknown = Node::new("frobnicate", vec![Node::extents("cat")]);
    assert!(matches!(
        retrieval.run_query(&unknown, 10),
        Err(IndexError::Unsupported(_))
    ));

    // An indicator cannot be ranked on its own.
    let band = Node::new("band", vec![Node::extents("cat"), Node::extents("dog")]);
    assert!(matches!(
        retrieval.run_query(&band, 10),
        Err(IndexError::Unsupported(_))
    ));

    // A window needs extents, not scores.
    let window = Node::new(
        "od",
        vec![Node::new("combine", vec![Node::extents("cat")]), Node::extents("dog")],
    );
    assert!(matches!(
        retrieval.create_iterator(&window),
        Err(IndexError::Unsupported(_))
    ));

    let inside = Node::new("inside", vec![Node::extents("cat")]);
    assert!(matches!(
        retrieval.create_iterator(&inside),
        Err(IndexError::Unsupported(_))
    ));

    let bad_width = Node::new("od", vec![Node::extents("cat")]).with("width", "wide");
    assert!(matches!(
        retrieval.create_iterator(&bad_width),
        Err(IndexError::InvalidParameter { .. })
    ));
}

#[test]
fn test_json_query_tree() {
    let dir = build_toy_index(&bm25_parameters());
    let retrieval = Retrieval::open(dir.path(), bm25_parameters()).unwrap();
    let node = Node::from_json_str(
        r#"{"operator":"combine","children":[
            {"operator":"extents","parameters":{"term":"moon"}}
        ]}"#,
    )
    .unwrap();
    assert_eq!(
        names(&retrieval, &node),
        set(&["doc-03", "doc-04", "doc-06", "doc-08"])
    );
}
