#![no_main]

use arbitrary::Arbitrary;
use fuse_filter::{BinaryFuse, Endianness, Fingerprint};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    width: u8,
    big_endian: bool,
    keys: Vec<u64>,
}

fn check<T: Fingerprint>(keys: &[u64], big_endian: bool) {
    let Ok(mut filter) = BinaryFuse::<T>::new(keys) else {
        return;
    };
    if big_endian {
        filter.convert_endianness(Endianness::Big);
    }

    let mut out = Vec::new();
    filter.save(&mut out).expect("save to Vec");
    assert_eq!(out.len(), filter.encoded_len());

    let loaded = BinaryFuse::<T>::load(&mut out.as_slice()).expect("load what we saved");
    assert_eq!(loaded, filter);
    for &key in keys {
        assert!(loaded.contains(key));
    }
}

fuzz_target!(|input: Input| {
    match input.width % 3 {
        0 => check::<u8>(&input.keys, input.big_endian),
        1 => check::<u16>(&input.keys, input.big_endian),
        _ => check::<u32>(&input.keys, input.big_endian),
    }
});
