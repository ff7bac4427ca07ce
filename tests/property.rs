//! Property-based tests using proptest.
//!
//! These tests check the storage and evaluation invariants against randomly
//! generated inputs: codecs reproduce what was written, skipping agrees with
//! scanning, set operators agree with set arithmetic, MaxScore agrees
//! with exhaustive scoring, and unordered windows stay within their width.

mod common;

#[path = "property/postings_codec.rs"]
mod postings_codec;

#[path = "property/skips.rs"]
mod skips;

#[path = "property/boolean.rs"]
mod boolean;

#[path = "property/blockstore.rs"]
mod blockstore;

#[path = "property/maxscore.rs"]
mod maxscore;

#[path = "property/windows.rs"]
mod windows;
