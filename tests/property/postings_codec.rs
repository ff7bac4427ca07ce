//! Property tests for posting list encoding and decoding.
//!
//! Verifies:
//! 1. Position lists round-trip with and without skips
//! 2. Header statistics match the data
//! 3. Extent lists round-trip with values

use proptest::prelude::*;
use quarry::iterator::{Countable, Extentable, Positional};
use quarry::postings::{PostingListBuilder, PostingOptions};

use crate::common::{drain, encode_positions, open_list, Posting};

// ============================================================================
// STRATEGIES
// ============================================================================

/// Strictly increasing positions from gaps.
fn positions_strategy() -> impl Strategy<Value = Vec<u32>> {
    (0u32..5, prop::collection::vec(1u32..40, 0..8)).prop_map(|(first, gaps)| {
        let mut positions = vec![first];
        for gap in gaps {
            let next = positions[positions.len() - 1] + gap;
            positions.push(next);
        }
        positions
    })
}

/// Strictly increasing documents, each with at least one position.
fn postings_strategy() -> impl Strategy<Value = Vec<Posting>> {
    prop::collection::vec((1u32..300, positions_strategy()), 0..120).prop_map(|entries| {
        let mut document = 0u32;
        let mut out = Vec::with_capacity(entries.len());
        for (i, (gap, positions)) in entries.into_iter().enumerate() {
            document = if i == 0 { gap - 1 } else { document + gap };
            out.push((document, positions));
        }
        out
    })
}

fn options_strategy() -> impl Strategy<Value = PostingOptions> {
    prop_oneof![
        Just(PostingOptions::without_skips()),
        (1u32..8, 1u32..5).prop_map(|(d, r)| PostingOptions {
            skip_distance: d,
            skip_reset_distance: r,
        }),
        Just(PostingOptions::default()),
    ]
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_positions_round_trip(postings in postings_strategy(), options in options_strategy()) {
        let bytes = encode_positions(&postings, options);
        let mut list = open_list(&bytes);
        prop_assert_eq!(drain(&mut list), postings);
    }

    #[test]
    fn prop_statistics_match_data(postings in postings_strategy(), options in options_strategy()) {
        let bytes = encode_positions(&postings, options);
        let list = open_list(&bytes);
        let stats = list.statistics().unwrap();
        let frequency: u64 = postings.iter().map(|(_, p)| p.len() as u64).sum();
        let maximum = postings.iter().map(|(_, p)| p.len() as u32).max().unwrap_or(0);
        prop_assert_eq!(stats.node_frequency, frequency);
        prop_assert_eq!(stats.node_document_count, postings.len() as u64);
        prop_assert_eq!(stats.maximum_count, maximum);
        prop_assert_eq!(list.total_entries(), postings.len() as u64);
    }

    #[test]
    fn prop_reset_replays_list(postings in postings_strategy(), options in options_strategy()) {
        let bytes = encode_positions(&postings, options);
        let mut list = open_list(&bytes);
        let first = drain(&mut list);
        list.reset().unwrap();
        prop_assert_eq!(drain(&mut list), first);
    }

    #[test]
    fn prop_extents_round_trip(
        spans in prop::collection::vec(
            (1u32..50, prop::collection::vec((0u32..10, 0u32..6, any::<u64>()), 1..5)),
            1..60,
        )
    ) {
        let mut builder = PostingListBuilder::extents(PostingOptions { skip_distance: 4, skip_reset_distance: 2 });
        let mut expected = Vec::new();
        let mut document = 0u32;
        for (gap, extents) in &spans {
            document += gap;
            builder.add_document(document).unwrap();
            let mut begin = 0u32;
            let mut decoded = Vec::new();
            for &(step, length, value) in extents {
                begin += step;
                builder.add_extent(begin, begin + length, value).unwrap();
                decoded.push((begin, begin + length, value));
            }
            expected.push((document, decoded));
        }
        let bytes = builder.finish();
        let mut list = open_list(&bytes);
        let mut actual = Vec::new();
        while !list.is_done() {
            let document = list.current_id();
            let extents: Vec<(u32, u32, u64)> = list.extents().iter().map(|e| (e.begin, e.end, e.value)).collect();
            actual.push((document, extents));
            list.move_past(document).unwrap();
        }
        prop_assert_eq!(actual, expected);
    }
}

#[test]
fn test_empty_list_is_done() {
    let bytes = encode_positions(&[], PostingOptions::default());
    let list = open_list(&bytes);
    assert!(list.is_done());
    assert_eq!(list.count(), 0);
}
