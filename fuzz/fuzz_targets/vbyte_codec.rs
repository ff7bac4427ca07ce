// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Variable-byte decoding of arbitrary bytes.
//!
//! Every number in a posting list goes through this decoder. Garbage must
//! come back as an error, and anything that decodes must re-encode to a
//! form that decodes to the same value.

#![no_main]

use libfuzzer_sys::fuzz_target;
use quarry::binary::{decode_vbyte, encode_vbyte, vbyte_len};

fuzz_target!(|data: &[u8]| {
    if let Ok((value, consumed)) = decode_vbyte(data) {
        assert!(consumed <= data.len());
        assert!(consumed <= 10);

        let mut reencoded = Vec::new();
        encode_vbyte(value, &mut reencoded);
        assert_eq!(reencoded.len(), vbyte_len(value));

        let (redecoded, reconsumed) =
            decode_vbyte(&reencoded).expect("re-encoded value decodes");
        assert_eq!(value, redecoded);
        assert_eq!(reconsumed, reencoded.len());
    }
});
