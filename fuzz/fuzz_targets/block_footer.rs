// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! BlockStore footer parsing.
//!
//! The footer is the first thing read from an index file. Any offsets it
//! accepts must lie inside the file it claims to describe.

#![no_main]

use libfuzzer_sys::fuzz_target;
use quarry::binary::Footer;

fuzz_target!(|data: &[u8]| {
    let Some(buf) = data.get(..Footer::SIZE) else {
        return;
    };
    let Ok(buf) = <&[u8; Footer::SIZE]>::try_from(buf) else {
        return;
    };
    let file_len = data.len() as u64 + 4096;
    if let Ok(footer) = Footer::from_bytes(buf, file_len) {
        assert!(footer.vocabulary_offset <= footer.manifest_offset);
        assert!(footer.manifest_offset + Footer::SIZE as u64 <= file_len);
        assert!(footer.block_size > 0);
        assert!(footer.vocab_group > 0);
    }
});
