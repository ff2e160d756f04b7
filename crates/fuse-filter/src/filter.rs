use std::io::{Read, Write};

use crate::builder::Builder;
use crate::codec::{self, LoadOptions};
use crate::endian::{Endianness, EndiannessTag};
use crate::error::Result;
use crate::fingerprint::Fingerprint;
use crate::format;
use crate::hash::{fingerprint, mixsplit, mulhi};

/// Arity-3 binary fuse filter over `u64` keys.
///
/// The fields are public so collaborators can inspect and rebuild filters directly; keeping
/// `fingerprints` consistent with `fingerprints_endianness` is the caller's job unless it goes
/// through [`BinaryFuse::convert_endianness`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryFuse<T: Fingerprint> {
    pub seed: u64,
    pub segment_length: u32,
    pub segment_length_mask: u32,
    pub segment_count: u32,
    pub segment_count_length: u32,
    pub fingerprints: Vec<T>,
    pub fingerprints_endianness: EndiannessTag,
}

pub type BinaryFuse8 = BinaryFuse<u8>;
pub type BinaryFuse16 = BinaryFuse<u16>;
pub type BinaryFuse32 = BinaryFuse<u32>;

impl<T: Fingerprint> BinaryFuse<T> {
    /// Build a filter containing every key in `keys`. Duplicate keys are allowed.
    pub fn new(keys: &[u64]) -> Result<Self> {
        Builder::new().build(keys)
    }

    pub fn contains(&self, key: u64) -> bool {
        let hash = mixsplit(key, self.seed);
        let swap = self.fingerprints_endianness != EndiannessTag::native();
        let mut acc = T::from_hash(fingerprint(hash));
        for slot in self.slots(hash) {
            // A loaded filter's geometry is unchecked; treat stray slots as a miss.
            let Some(&fp) = self.fingerprints.get(slot) else {
                return false;
            };
            let fp = if swap { fp.swap_bytes() } else { fp };
            acc = acc ^ fp;
        }
        acc == T::default()
    }

    /// Relabel the fingerprint byte order without touching the stored bytes.
    pub fn set_fingerprints_endianness(&mut self, tag: EndiannessTag) {
        self.fingerprints_endianness = tag;
    }

    /// Rewrite every fingerprint into `target` byte order and update the tag to match.
    ///
    /// A tag value this crate does not recognise is treated as non-native, the same way
    /// [`BinaryFuse::contains`] reads it.
    pub fn convert_endianness(&mut self, target: Endianness) {
        let current = self
            .fingerprints_endianness
            .endianness()
            .unwrap_or(Endianness::native().opposite());
        if current != target && T::WIDTH > 1 {
            for fp in &mut self.fingerprints {
                *fp = fp.swap_bytes();
            }
        }
        self.fingerprints_endianness = EndiannessTag::from(target);
    }

    pub fn save<W: Write + ?Sized>(&self, w: &mut W) -> Result<()> {
        codec::save(w, self)
    }

    pub fn load<R: Read + ?Sized>(r: &mut R) -> Result<Self> {
        codec::load(r)
    }

    pub fn load_with_options<R: Read + ?Sized>(r: &mut R, options: LoadOptions) -> Result<Self> {
        codec::load_with_options(r, options)
    }

    /// Number of bytes [`BinaryFuse::save`] writes for this filter.
    pub fn encoded_len(&self) -> usize {
        format::encoded_len(self.fingerprints.len(), T::WIDTH)
    }

    /// The three fingerprint slots a hash maps to, one per consecutive segment.
    pub(crate) fn slots(&self, hash: u64) -> [usize; 3] {
        let h0 = mulhi(hash, u64::from(self.segment_count_length)) as u32;
        let h1 = h0.wrapping_add(self.segment_length);
        let h2 = h1.wrapping_add(self.segment_length);
        let h1 = h1 ^ ((hash >> 18) as u32 & self.segment_length_mask);
        let h2 = h2 ^ (hash as u32 & self.segment_length_mask);
        [h0 as usize, h1 as usize, h2 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [u64; 10] = [1, 2, 3, 4, 5, 100, 200, 300, 1000, 2000];

    fn assert_all_present<T: Fingerprint>(filter: &BinaryFuse<T>) {
        for key in KEYS {
            assert!(filter.contains(key), "key {key} missing");
        }
    }

    #[test]
    fn tag_only_change_keeps_fingerprint_bytes() {
        let mut filter = BinaryFuse16::new(&KEYS).unwrap();
        let before = filter.fingerprints.clone();
        let original = filter.fingerprints_endianness;

        filter.set_fingerprints_endianness(EndiannessTag::from(Endianness::native().opposite()));
        assert_eq!(filter.fingerprints, before);

        let hits = KEYS.iter().filter(|&&key| filter.contains(key)).count();
        assert!(hits < KEYS.len(), "lying about the tag went unnoticed");

        filter.set_fingerprints_endianness(original);
        assert_all_present(&filter);
    }

    #[test]
    fn single_byte_fingerprints_ignore_the_tag() {
        let mut filter = BinaryFuse8::new(&KEYS).unwrap();
        let expected: Vec<bool> = (0..5000u64).map(|key| filter.contains(key)).collect();

        for tag in [EndiannessTag::BIG, EndiannessTag::LITTLE, EndiannessTag(0x55)] {
            filter.set_fingerprints_endianness(tag);
            let actual: Vec<bool> = (0..5000u64).map(|key| filter.contains(key)).collect();
            assert_eq!(actual, expected, "tag {tag} changed query results");
        }
    }

    #[test]
    fn convert_endianness_swaps_and_relabels() {
        let mut filter = BinaryFuse32::new(&KEYS).unwrap();
        let native = filter.fingerprints.clone();
        let foreign = Endianness::native().opposite();

        filter.convert_endianness(foreign);
        assert_eq!(filter.fingerprints_endianness, EndiannessTag::from(foreign));
        let swapped: Vec<u32> = native.iter().map(|fp| fp.swap_bytes()).collect();
        assert_eq!(filter.fingerprints, swapped);
        assert_all_present(&filter);

        // Converting to the current order is a no-op.
        filter.convert_endianness(foreign);
        assert_eq!(filter.fingerprints, swapped);

        filter.convert_endianness(Endianness::native());
        assert_eq!(filter.fingerprints, native);
        assert_all_present(&filter);
    }

    #[test]
    fn convert_endianness_leaves_single_bytes_alone() {
        let mut filter = BinaryFuse8::new(&KEYS).unwrap();
        let before = filter.fingerprints.clone();
        filter.convert_endianness(Endianness::Big);
        assert_eq!(filter.fingerprints, before);
        assert_eq!(filter.fingerprints_endianness, EndiannessTag::BIG);
        assert_all_present(&filter);
    }

    #[test]
    fn inconsistent_geometry_is_a_miss_not_a_panic() {
        let filter = BinaryFuse16 {
            seed: 0,
            segment_length: 4,
            segment_length_mask: 3,
            segment_count: 2,
            segment_count_length: 1 << 20,
            fingerprints: Vec::new(),
            fingerprints_endianness: EndiannessTag::LITTLE,
        };
        for key in KEYS {
            assert!(!filter.contains(key));
        }
    }

    #[test]
    fn encoded_len_tracks_width() {
        let filter = BinaryFuse32::new(&KEYS).unwrap();
        assert_eq!(filter.encoded_len(), 29 + filter.fingerprints.len() * 4);
    }
}
