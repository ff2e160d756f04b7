#![no_main]

use fuse_filter::codec::portable;
use fuse_filter::{BinaryFuse, Fingerprint, LoadOptions};
use libfuzzer_sys::fuzz_target;

const OPTIONS: LoadOptions = LoadOptions {
    max_fingerprints: Some(1 << 20),
};

fn check<T: Fingerprint>(data: &[u8]) {
    let default = BinaryFuse::<T>::load_with_options(&mut &data[..], OPTIONS);
    let portable = portable::load_with_options::<T, _>(&mut &data[..], OPTIONS);

    match (default, portable) {
        (Ok(a), Ok(b)) => {
            assert_eq!(a, b);

            // Whatever decodes must re-encode to the exact prefix it came from.
            let mut out = Vec::new();
            a.save(&mut out).expect("save to Vec");
            assert_eq!(out.as_slice(), &data[..out.len()]);
            let _ = a.contains(0);
        }
        (Err(_), Err(_)) => {}
        (a, b) => panic!("codecs disagree: {a:?} vs {b:?}"),
    }
}

fuzz_target!(|data: &[u8]| {
    check::<u8>(data);
    check::<u16>(data);
    check::<u32>(data);
});
