//! Set properties of the boolean operators.

use std::collections::BTreeSet;

use proptest::prelude::*;
use quarry::iterator::{
    AllIndicator, AnyIndicator, ConjunctionIterator, DisjunctionIterator, DocId,
    MemoryListIterator, Positional,
};

use crate::common::collect_ids;

fn id_set() -> impl Strategy<Value = BTreeSet<DocId>> {
    prop::collection::btree_set(0u32..200, 0..60)
}

fn list(ids: &BTreeSet<DocId>) -> MemoryListIterator {
    let counts: Vec<(DocId, u32)> = ids.iter().map(|&d| (d, 1)).collect();
    MemoryListIterator::from_counts(&counts)
}

fn boxed(ids: &BTreeSet<DocId>) -> Box<dyn Positional> {
    Box::new(list(ids))
}

proptest! {
    #[test]
    fn prop_and_is_intersection(a in id_set(), b in id_set()) {
        let mut and = ConjunctionIterator::new(vec![list(&a), list(&b)]).unwrap();
        let expected: Vec<DocId> = a.intersection(&b).copied().collect();
        prop_assert_eq!(collect_ids(&mut and), expected);
    }

    #[test]
    fn prop_or_is_union(a in id_set(), b in id_set()) {
        let mut or = DisjunctionIterator::new(vec![list(&a), list(&b)]);
        let expected: Vec<DocId> = a.union(&b).copied().collect();
        prop_assert_eq!(collect_ids(&mut or), expected);
    }

    #[test]
    fn prop_all_and_any_over_three(a in id_set(), b in id_set(), c in id_set()) {
        let mut all = AllIndicator::new(vec![boxed(&a), boxed(&b), boxed(&c)]).unwrap();
        let both: BTreeSet<DocId> = a.intersection(&b).copied().collect();
        let expected: Vec<DocId> = both.intersection(&c).copied().collect();
        prop_assert_eq!(collect_ids(&mut all), expected);

        let mut any = AnyIndicator::new(vec![boxed(&a), boxed(&b), boxed(&c)]);
        let either: BTreeSet<DocId> = a.union(&b).copied().collect();
        let expected: Vec<DocId> = either.union(&c).copied().collect();
        prop_assert_eq!(collect_ids(&mut any), expected);
    }

    #[test]
    fn prop_and_move_to_agrees_with_set(a in id_set(), b in id_set(), target in 0u32..220) {
        let mut and = ConjunctionIterator::new(vec![list(&a), list(&b)]).unwrap();
        let matched = and.move_to(target).unwrap();
        let both: BTreeSet<DocId> = a.intersection(&b).copied().collect();
        let next = both.range(target..).next().copied();
        prop_assert_eq!(matched, next == Some(target));
        match next {
            Some(document) => prop_assert_eq!(and.current_id(), document),
            None => prop_assert!(and.is_done()),
        }
    }
}
