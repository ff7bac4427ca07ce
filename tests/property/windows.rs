//! Unordered windows over arbitrary extents, including zero-length and
//! overlapping ones: evaluation finishes and every span honors the width.

use proptest::prelude::*;
use quarry::iterator::memory::MemoryPosting;
use quarry::iterator::{Extentable, MemoryListIterator, Positional, UnorderedWindowIterator};

const DOCUMENT: u32 = 1;

fn child_strategy() -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop::collection::vec((0u32..20, 0u32..4), 1..8).prop_map(|mut extents| {
        extents.sort();
        extents
            .into_iter()
            .map(|(begin, len)| (begin, begin + len))
            .collect()
    })
}

fn child(extents: &[(u32, u32)]) -> Box<dyn Extentable> {
    Box::new(MemoryListIterator::new(vec![MemoryPosting {
        document: DOCUMENT,
        count: extents.len() as u32,
        extents: extents.iter().map(|&(b, e)| (b, e, 0)).collect(),
    }]))
}

proptest! {
    #[test]
    fn prop_unordered_window_spans_are_bounded(
        children in prop::collection::vec(child_strategy(), 1..4),
        width in -1i64..8,
        overlap in any::<bool>(),
    ) {
        let it = UnorderedWindowIterator::new(
            children.iter().map(|c| child(c)).collect(),
            width,
            overlap,
        )
        .unwrap();

        let spans: Vec<(u32, u32)> = if it.current_id() == DOCUMENT {
            it.extents().iter().map(|e| (e.begin, e.end)).collect()
        } else {
            Vec::new()
        };

        let total: usize = children.iter().map(Vec::len).sum();
        prop_assert!(spans.len() <= total);
        for &(begin, end) in &spans {
            prop_assert!(begin <= end);
            if width >= 0 {
                prop_assert!(i64::from(end - begin) <= width);
            }
        }
        for pair in spans.windows(2) {
            prop_assert!(pair[0].0 <= pair[1].0);
            if !overlap {
                prop_assert!(pair[0].1 <= pair[1].0, "{:?}", spans);
            }
        }
    }
}
