//! MaxScore equivalence: on random collections, pruned top-k evaluation
//! returns exactly the ids and scores exhaustive scoring returns.

use proptest::prelude::*;
use quarry::build::TrecDocument;
use quarry::retrieval::{Node, Retrieval};
use quarry::Parameters;

use crate::common::build_temp_index;

const WORDS: &[&str] = &["ant", "bee", "cow", "doe", "eel", "fox", "gnu", "hen", "zzz"];

fn collection_strategy() -> impl Strategy<Value = Vec<Vec<usize>>> {
    // "zzz" never occurs in documents.
    prop::collection::vec(prop::collection::vec(0usize..8, 1..14), 5..50)
}

fn query_strategy() -> impl Strategy<Value = Vec<(usize, f64)>> {
    prop::collection::btree_set(0usize..WORDS.len(), 3..6).prop_flat_map(|terms| {
        let n = terms.len();
        prop::collection::vec(0.1f64..3.0, n).prop_map(move |weights| {
            terms.iter().copied().zip(weights).collect::<Vec<_>>()
        })
    })
}

fn run(
    dir: &std::path::Path,
    base: &Parameters,
    query: &Node,
    requested: usize,
    max_score: bool,
) -> Vec<(u32, f64)> {
    let parameters = Parameters {
        max_score,
        ..base.clone()
    };
    let retrieval = Retrieval::open(dir, parameters).unwrap();
    retrieval
        .run_query(query, requested)
        .unwrap()
        .into_iter()
        .map(|r| (r.document, r.score))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn prop_maxscore_matches_exhaustive(
        collection in collection_strategy(),
        query in query_strategy(),
        requested in 1usize..12,
        scorer in prop::sample::select(vec!["bm25", "dirichlet", "jm"]),
    ) {
        let documents = documents(&collection);
        let parameters = Parameters {
            default_scorer: scorer.to_string(),
            mu: 50.0,
            ..Parameters::default()
        };
        let dir = build_temp_index(&documents, &parameters);

        let mut node = Node::new(
            "combine",
            query.iter().map(|&(w, _)| Node::extents(WORDS[w])).collect(),
        );
        for (i, &(_, weight)) in query.iter().enumerate() {
            node = node.with(&i.to_string(), weight);
        }

        let pruned = run(dir.path(), &parameters, &node, requested, true);
        let exhaustive = run(dir.path(), &parameters, &node, requested, false);
        prop_assert_eq!(pruned, exhaustive);
    }

    #[test]
    fn prop_nested_maxscore_matches_nested_combine(
        collection in collection_strategy(),
        terms in prop::collection::btree_set(0usize..WORDS.len(), 3..5),
        requested in 1usize..12,
        scorer in prop::sample::select(vec!["bm25", "dirichlet", "jm"]),
    ) {
        let documents = documents(&collection);
        let parameters = Parameters {
            default_scorer: scorer.to_string(),
            mu: 50.0,
            ..Parameters::default()
        };
        let dir = build_temp_index(&documents, &parameters);

        let leaves: Vec<Node> = terms.iter().map(|&w| Node::extents(WORDS[w])).collect();
        let (inner, outer) = leaves.split_at(2);
        let nested = |operator: &str| {
            let mut children = vec![Node::new(operator, inner.to_vec())];
            children.extend(outer.iter().cloned());
            Node::new("combine", children)
        };

        let expected = run(dir.path(), &parameters, &nested("combine"), requested, false);
        for max_score in [true, false] {
            let got = run(dir.path(), &parameters, &nested("maxscore"), requested, max_score);
            prop_assert_eq!(&got, &expected);
        }
    }
}

fn documents(collection: &[Vec<usize>]) -> Vec<TrecDocument> {
    collection
        .iter()
        .enumerate()
        .map(|(i, words)| {
            let text: Vec<&str> = words.iter().map(|&w| WORDS[w]).collect();
            TrecDocument::new(format!("d{}", i), text.join(" "))
        })
        .collect()
}

#[test]
fn test_explicit_maxscore_operator_matches_combine() {
    let documents: Vec<TrecDocument> = (0..30)
        .map(|i| {
            let mut text = vec!["ant"; 1 + i % 3];
            if i % 4 == 0 {
                text.push("bee");
            }
            if i % 7 == 0 {
                text.push("cow");
            }
            TrecDocument::new(format!("d{}", i), text.join(" "))
        })
        .collect();
    let parameters = Parameters {
        max_score: false,
        ..Parameters::default()
    };
    let dir = build_temp_index(&documents, &parameters);
    let retrieval = Retrieval::open(dir.path(), parameters).unwrap();
    let children = vec![Node::extents("ant"), Node::extents("bee"), Node::extents("cow")];
    let combine = Node::new("combine", children.clone());
    let maxscore = Node::new("maxscore", children);
    let a: Vec<(u32, f64)> = retrieval
        .run_query(&combine, 5)
        .unwrap()
        .into_iter()
        .map(|r| (r.document, r.score))
        .collect();
    let b: Vec<(u32, f64)> = retrieval
        .run_query(&maxscore, 5)
        .unwrap()
        .into_iter()
        .map(|r| (r.document, r.score))
        .collect();
    assert_eq!(a.len(), 5);
    assert_eq!(a, b);
}
