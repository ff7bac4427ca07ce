//! BlockStore: sequential reads return what was written, in order, and every
//! key can be sought.

use std::collections::BTreeMap;

use proptest::prelude::*;
use quarry::binary::{BlockStoreReader, BlockStoreWriter, WriterOptions};

fn entries_strategy() -> impl Strategy<Value = BTreeMap<Vec<u8>, Vec<u8>>> {
    prop::collection::btree_map(
        prop::collection::vec(any::<u8>(), 1..24),
        prop::collection::vec(any::<u8>(), 0..300),
        1..150,
    )
}

fn options_strategy() -> impl Strategy<Value = WriterOptions> {
    (
        prop::sample::select(vec![64u32, 256, 4096]),
        1u32..6,
        any::<bool>(),
    )
        .prop_map(|(block_size, vocab_group, compressed)| WriterOptions {
            block_size,
            vocab_group,
            compressed,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_sequential_read_and_seek(entries in entries_strategy(), options in options_strategy()) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store");
        let mut writer = BlockStoreWriter::create(&path, options).unwrap();
        for (key, value) in &entries {
            writer.add(key, value).unwrap();
        }
        writer.close().unwrap();

        let reader = BlockStoreReader::open(&path).unwrap();
        let mut cursor = reader.iterator().unwrap().unwrap();
        let mut read = Vec::new();
        loop {
            read.push((cursor.key().to_vec(), cursor.value_bytes().unwrap()));
            if !cursor.next().unwrap() {
                break;
            }
        }
        let written: Vec<(Vec<u8>, Vec<u8>)> = entries.clone().into_iter().collect();
        prop_assert_eq!(read, written);

        for (key, value) in &entries {
            let mut found = reader.seek(key).unwrap().unwrap();
            prop_assert_eq!(found.key(), key.as_slice());
            prop_assert_eq!(&found.value_bytes().unwrap(), value);
            let got = reader.get(key).unwrap();
            prop_assert_eq!(got.as_ref(), Some(value));
        }
    }

    #[test]
    fn prop_seek_ge_finds_successor(
        entries in entries_strategy(),
        target in prop::collection::vec(any::<u8>(), 1..24),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store");
        let mut writer = BlockStoreWriter::create(&path, WriterOptions { block_size: 128, vocab_group: 3, compressed: true }).unwrap();
        for (key, value) in &entries {
            writer.add(key, value).unwrap();
        }
        writer.close().unwrap();

        let reader = BlockStoreReader::open(&path).unwrap();
        let expected = entries.range(target.clone()..).next().map(|(k, _)| k.clone());
        let actual = reader.seek_ge(&target).unwrap().map(|c| c.key().to_vec());
        prop_assert_eq!(actual, expected);
        if !entries.contains_key(&target) {
            prop_assert!(reader.seek(&target).unwrap().is_none());
        }
    }
}
