//! Skip correctness: `move_to` through skip data lands exactly where a
//! linear scan lands, for every target.

use proptest::prelude::*;
use quarry::iterator::{Countable, Extentable, Positional};
use quarry::postings::PostingOptions;

use crate::common::{encode_positions, open_list, Posting};

fn documents_strategy() -> impl Strategy<Value = Vec<Posting>> {
    (1usize..1300, any::<u64>()).prop_map(|(n, seed)| {
        // Cheap deterministic gaps so large lists stay fast to generate.
        let mut state = seed | 1;
        let mut document = 0u32;
        (0..n)
            .map(|i| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                let gap = (state % 4) as u32 + 1;
                document = if i == 0 { gap - 1 } else { document + gap };
                let count = (state >> 8) % 3 + 1;
                (document, (0..count as u32).map(|p| p * 3).collect())
            })
            .collect()
    })
}

/// Move a skipping and a linear iterator through the same increasing
/// targets and compare every answer.
fn check_targets(postings: &[Posting], distance: u32, reset: u32, step: u32) {
    let with_skips = encode_positions(
        postings,
        PostingOptions {
            skip_distance: distance,
            skip_reset_distance: reset,
        },
    );
    let linear = encode_positions(postings, PostingOptions::without_skips());
    let mut skipping = open_list(&with_skips);
    let mut scanning = open_list(&linear);
    let max_id = postings.last().map_or(0, |p| p.0);

    let mut target = 0u32;
    while target <= max_id + 1 {
        let a = skipping.move_to(target).unwrap();
        let b = scanning.move_to(target).unwrap();
        assert_eq!(a, b, "matched at target {} (D={}, R={})", target, distance, reset);
        assert_eq!(
            skipping.current_id(),
            scanning.current_id(),
            "position at target {} (D={}, R={})",
            target,
            distance,
            reset
        );
        assert_eq!(skipping.count(), scanning.count());
        assert_eq!(skipping.extents(), scanning.extents());
        target += step;
    }
    assert!(!skipping.move_to(max_id + 1).unwrap());
    assert!(skipping.is_done());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_skips_match_linear_scan(
        postings in documents_strategy(),
        distance in prop::sample::select(vec![1u32, 2, 500]),
        reset in prop::sample::select(vec![1u32, 3, 20]),
    ) {
        for step in [1u32, 7, 61, 997] {
            check_targets(&postings, distance, reset, step);
        }
    }
}

#[test]
fn test_single_jump_per_target_from_fresh_iterators() {
    let postings: Vec<Posting> = (0..2000u32).map(|i| (i * 2 + 1, vec![0])).collect();
    let options = PostingOptions {
        skip_distance: 2,
        skip_reset_distance: 3,
    };
    let bytes = encode_positions(&postings, options);
    for target in [0u32, 1, 2, 3, 4, 5, 999, 1000, 1001, 3998, 3999, 4000, 4001] {
        let mut list = open_list(&bytes);
        let matched = list.move_to(target).unwrap();
        let expected = postings.iter().find(|p| p.0 >= target).map(|p| p.0);
        match expected {
            Some(document) => {
                assert_eq!(list.current_id(), document, "target {}", target);
                assert_eq!(matched, document == target);
            }
            None => assert!(list.is_done(), "target {}", target),
        }
    }
}
