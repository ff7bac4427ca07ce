//! Counting queries: `xcount` and `doc_count` over terms and windows.

use quarry::retrieval::{Node, Retrieval};
use quarry::Parameters;

use crate::common::build_toy_index;

fn session() -> (tempfile::TempDir, Retrieval) {
    let dir = build_toy_index(&Parameters::default());
    let retrieval = Retrieval::open(dir.path(), Parameters::default()).unwrap();
    (dir, retrieval)
}

#[test]
fn test_term_counts_come_from_list_headers() {
    let (_dir, retrieval) = session();
    assert_eq!(retrieval.xcount(&Node::extents("cat")).unwrap(), 5);
    assert_eq!(retrieval.doc_count(&Node::extents("moon")).unwrap(), 4);
    // "the" occurs twice in several documents.
    assert!(retrieval.xcount(&Node::extents("the")).unwrap() > retrieval.doc_count(&Node::extents("the")).unwrap());
    assert_eq!(retrieval.xcount(&Node::extents("unicorn")).unwrap(), 0);
}

#[test]
fn test_ordered_window_counts() {
    let (_dir, retrieval) = session();
    let phrase = Node::new("od", vec![Node::extents("the"), Node::extents("cat")]);
    assert_eq!(retrieval.xcount(&phrase).unwrap(), 3);
    assert_eq!(retrieval.doc_count(&phrase).unwrap(), 3);

    // "dog ... cat" with at most two words between.
    let near = Node::new("od", vec![Node::extents("dog"), Node::extents("cat")]).with("width", 3);
    assert_eq!(retrieval.doc_count(&near).unwrap(), 2);
}

#[test]
fn test_unordered_window_counts() {
    let (_dir, retrieval) = session();
    let pets = |width: i64| {
        Node::new("uw", vec![Node::extents("cat"), Node::extents("dog")]).with("width", width)
    };
    assert_eq!(retrieval.doc_count(&pets(3)).unwrap(), 1);
    assert_eq!(retrieval.doc_count(&pets(4)).unwrap(), 3);
    assert_eq!(retrieval.doc_count(&pets(-1)).unwrap(), 3);
}

#[test]
fn test_scores_cannot_be_counted() {
    let (_dir, retrieval) = session();
    let node = Node::new("combine", vec![Node::extents("cat")]);
    assert!(retrieval.xcount(&node).is_err());
}
