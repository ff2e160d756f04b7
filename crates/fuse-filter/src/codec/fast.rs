//! Raw-memory codec for little-endian hosts.
//!
//! On a little-endian host the in-memory bytes of every header field already are the wire bytes,
//! so fields and the fingerprint array are copied as-is. This is purely an optimization of
//! [`super::portable`]: both must produce and accept identical streams.

use std::io::{Read, Write};

use bytemuck::Pod;
use tracing::trace;

use super::{fingerprint_count, reserve_step, LoadOptions};
use crate::endian::EndiannessTag;
use crate::error::Result;
use crate::filter::BinaryFuse;
use crate::fingerprint::Fingerprint;
use crate::format;
use crate::io::{ReadLeExt, WriteLeExt};

pub fn save<T: Fingerprint, W: Write + ?Sized>(w: &mut W, filter: &BinaryFuse<T>) -> Result<()> {
    let count = fingerprint_count(filter)?;

    w.write_bytes(bytemuck::bytes_of(&filter.seed))?;
    w.write_bytes(bytemuck::bytes_of(&filter.segment_length))?;
    w.write_bytes(bytemuck::bytes_of(&filter.segment_length_mask))?;
    w.write_bytes(bytemuck::bytes_of(&filter.segment_count))?;
    w.write_bytes(bytemuck::bytes_of(&filter.segment_count_length))?;
    w.write_bytes(bytemuck::bytes_of(&count))?;
    w.write_bytes(bytemuck::bytes_of(&filter.fingerprints_endianness.0))?;

    if !filter.fingerprints.is_empty() {
        w.write_bytes(bytemuck::cast_slice(filter.fingerprints.as_slice()))?;
    }

    trace!(
        fingerprints = count,
        width = T::WIDTH,
        tag = %filter.fingerprints_endianness,
        "saved filter (fast path)"
    );
    Ok(())
}

pub fn load<T: Fingerprint, R: Read + ?Sized>(r: &mut R) -> Result<BinaryFuse<T>> {
    load_with_options(r, LoadOptions::default())
}

pub fn load_with_options<T: Fingerprint, R: Read + ?Sized>(
    r: &mut R,
    options: LoadOptions,
) -> Result<BinaryFuse<T>> {
    let seed: u64 = read_raw(r, format::SEED.name)?;
    let segment_length: u32 = read_raw(r, format::SEGMENT_LENGTH.name)?;
    let segment_length_mask: u32 = read_raw(r, format::SEGMENT_LENGTH_MASK.name)?;
    let segment_count: u32 = read_raw(r, format::SEGMENT_COUNT.name)?;
    let segment_count_length: u32 = read_raw(r, format::SEGMENT_COUNT_LENGTH.name)?;
    let count: u32 = read_raw(r, format::FINGERPRINT_COUNT.name)?;
    options.check_count(count)?;
    let tag = EndiannessTag(read_raw::<u8, _>(r, format::ENDIANNESS_TAG.name)?);

    let fingerprints = if count == 0 {
        Vec::new()
    } else {
        read_region(r, count as usize)?
    };

    trace!(fingerprints = count, width = T::WIDTH, tag = %tag, "loaded filter (fast path)");
    Ok(BinaryFuse {
        seed,
        segment_length,
        segment_length_mask,
        segment_count,
        segment_count_length,
        fingerprints,
        fingerprints_endianness: tag,
    })
}

fn read_raw<P: Pod, R: Read + ?Sized>(r: &mut R, what: &'static str) -> Result<P> {
    let mut value = P::zeroed();
    r.read_exact_or_short(bytemuck::bytes_of_mut(&mut value), what)?;
    Ok(value)
}

/// Read `len` fingerprints straight into their backing storage.
///
/// Storage grows in bounded steps so a bogus count on a truncated stream fails with a short read
/// instead of allocating the whole declared region up front.
fn read_region<T: Fingerprint, R: Read + ?Sized>(r: &mut R, len: usize) -> Result<Vec<T>> {
    let mut fingerprints: Vec<T> = Vec::new();
    while fingerprints.len() < len {
        let start = fingerprints.len();
        let end = reserve_step(&mut fingerprints, len)?;
        fingerprints.resize(end, T::zeroed());
        r.read_exact_or_short(
            bytemuck::cast_slice_mut(&mut fingerprints[start..end]),
            format::FINGERPRINTS,
        )?;
    }
    Ok(fingerprints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{portable, PREALLOC_FINGERPRINTS};
    use crate::error::FilterError;
    use crate::endian::Endianness;
    use proptest::prelude::*;
    use std::io::{self, Cursor};

    fn arb_filter<T: Fingerprint + Arbitrary>() -> impl Strategy<Value = BinaryFuse<T>> {
        (
            any::<u64>(),
            any::<[u32; 4]>(),
            proptest::collection::vec(any::<T>(), 0..300),
            any::<u8>(),
        )
            .prop_map(|(seed, geometry, fingerprints, tag)| BinaryFuse {
                seed,
                segment_length: geometry[0],
                segment_length_mask: geometry[1],
                segment_count: geometry[2],
                segment_count_length: geometry[3],
                fingerprints,
                fingerprints_endianness: EndiannessTag(tag),
            })
    }

    fn check_equivalent<T: Fingerprint>(
        filter: &BinaryFuse<T>,
    ) -> std::result::Result<(), TestCaseError> {
        let mut fast_bytes = Vec::new();
        save(&mut fast_bytes, filter).unwrap();
        let mut portable_bytes = Vec::new();
        portable::save(&mut portable_bytes, filter).unwrap();

        prop_assert_eq!(&fast_bytes, &portable_bytes);
        prop_assert_eq!(fast_bytes.len(), filter.encoded_len());

        let via_fast: BinaryFuse<T> = load(&mut Cursor::new(&portable_bytes)).unwrap();
        let via_portable: BinaryFuse<T> = portable::load(&mut Cursor::new(&fast_bytes)).unwrap();
        prop_assert_eq!(&via_fast, filter);
        prop_assert_eq!(&via_portable, filter);
        Ok(())
    }

    proptest! {
        #[test]
        fn matches_portable_u8(filter in arb_filter::<u8>()) {
            check_equivalent(&filter)?;
        }

        #[test]
        fn matches_portable_u16(filter in arb_filter::<u16>()) {
            check_equivalent(&filter)?;
        }

        #[test]
        fn matches_portable_u32(filter in arb_filter::<u32>()) {
            check_equivalent(&filter)?;
        }
    }

    #[test]
    fn converted_filters_match_portable() {
        let keys: Vec<u64> = (0..1000).map(|k| k * 31).collect();
        let mut filter = BinaryFuse::<u32>::new(&keys).unwrap();
        filter.convert_endianness(Endianness::Big);
        check_equivalent(&filter).unwrap();

        let mut out = Vec::new();
        save(&mut out, &filter).unwrap();
        let loaded: BinaryFuse<u32> = load(&mut Cursor::new(&out)).unwrap();
        assert!(keys.iter().all(|&key| loaded.contains(key)));
    }

    #[test]
    fn region_larger_than_one_step_loads() {
        let filter = BinaryFuse::<u16> {
            seed: 9,
            segment_length: 1,
            segment_length_mask: 0,
            segment_count: 1,
            segment_count_length: 1,
            fingerprints: (0..PREALLOC_FINGERPRINTS as u32 * 2 + 3)
                .map(|i| i as u16)
                .collect(),
            fingerprints_endianness: EndiannessTag::LITTLE,
        };
        check_equivalent(&filter).unwrap();
    }

    #[test]
    fn empty_region_reads_nothing_past_the_header() {
        let mut out = Vec::new();
        let filter = BinaryFuse::<u32> {
            seed: 1,
            segment_length: 4,
            segment_length_mask: 3,
            segment_count: 1,
            segment_count_length: 4,
            fingerprints: Vec::new(),
            fingerprints_endianness: EndiannessTag::BIG,
        };
        save(&mut out, &filter).unwrap();
        assert_eq!(out.len(), format::HEADER_LEN);

        // Trailing bytes after an empty region are left unread.
        out.extend_from_slice(&[0xFF; 8]);
        let mut cursor = Cursor::new(&out);
        let loaded: BinaryFuse<u32> = load(&mut cursor).unwrap();
        assert_eq!(loaded, filter);
        assert_eq!(cursor.position() as usize, format::HEADER_LEN);
    }

    #[test]
    fn write_errors_propagate() {
        /// Accepts the header, then fails inside the fingerprint region.
        struct FullAfter(usize);
        impl Write for FullAfter {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                if self.0 == 0 {
                    return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
                }
                let n = buf.len().min(self.0);
                self.0 -= n;
                Ok(n)
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let filter = BinaryFuse::<u32> {
            seed: 3,
            segment_length: 4,
            segment_length_mask: 3,
            segment_count: 1,
            segment_count_length: 4,
            fingerprints: vec![7; 12],
            fingerprints_endianness: EndiannessTag::LITTLE,
        };
        for budget in [0, format::HEADER_LEN - 1, format::HEADER_LEN + 5] {
            let err = save(&mut FullAfter(budget), &filter).unwrap_err();
            assert!(
                matches!(err, FilterError::Io(ref e) if e.kind() == io::ErrorKind::Other),
                "budget {budget}: {err:?}"
            );
        }
    }
}
