// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Posting list decoding under adversarial input.
//!
//! A corrupt list may fail to open or fail part way through, but it must
//! never panic or move backwards.

#![no_main]

use libfuzzer_sys::fuzz_target;
use quarry::binary::DataStream;
use quarry::iterator::{Countable, Positional};
use quarry::postings::DiskListIterator;

fuzz_target!(|data: &[u8]| {
    let Some((&step, bytes)) = data.split_first() else {
        return;
    };
    let Ok(mut list) = DiskListIterator::open(b"fuzz", DataStream::from_vec(bytes.to_vec()))
    else {
        return;
    };

    // Alternate skip-driven jumps and single steps.
    let step = u32::from(step) + 1;
    let mut previous = None;
    for _ in 0..10_000 {
        if list.is_done() {
            break;
        }
        let document = list.current_id();
        if let Some(previous) = previous {
            assert!(document >= previous, "list moved from {} to {}", previous, document);
        }
        previous = Some(document);
        let _ = list.count();
        let moved = if document % 2 == 0 {
            list.move_to(document.saturating_add(step)).map(|_| ())
        } else {
            list.move_past(document)
        };
        if moved.is_err() {
            break;
        }
    }
});
