//! Field-by-field codec that works regardless of host byte order.

use std::io::{Read, Write};

use tracing::trace;

use super::{fingerprint_count, reserve_step, LoadOptions};
use crate::endian::{Endianness, EndiannessTag};
use crate::error::Result;
use crate::filter::BinaryFuse;
use crate::fingerprint::Fingerprint;
use crate::format;
use crate::io::{ReadLeExt, WriteLeExt};

pub fn save<T: Fingerprint, W: Write + ?Sized>(w: &mut W, filter: &BinaryFuse<T>) -> Result<()> {
    let count = fingerprint_count(filter)?;

    w.write_u64_le(filter.seed)?;
    w.write_u32_le(filter.segment_length)?;
    w.write_u32_le(filter.segment_length_mask)?;
    w.write_u32_le(filter.segment_count)?;
    w.write_u32_le(filter.segment_count_length)?;
    w.write_u32_le(count)?;
    w.write_u8(filter.fingerprints_endianness.0)?;

    // Fingerprints go out as their in-memory byte pattern, whatever the tag says.
    let native = Endianness::native();
    let mut buf = [0u8; 4];
    for &fp in &filter.fingerprints {
        fp.encode_into(native, &mut buf);
        w.write_bytes(&buf[..T::WIDTH])?;
    }

    trace!(
        fingerprints = count,
        width = T::WIDTH,
        tag = %filter.fingerprints_endianness,
        "saved filter (portable)"
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
    let seed = r.read_u64_le(format::SEED.name)?;
    let segment_length = r.read_u32_le(format::SEGMENT_LENGTH.name)?;
    let segment_length_mask = r.read_u32_le(format::SEGMENT_LENGTH_MASK.name)?;
    let segment_count = r.read_u32_le(format::SEGMENT_COUNT.name)?;
    let segment_count_length = r.read_u32_le(format::SEGMENT_COUNT_LENGTH.name)?;
    let count = r.read_u32_le(format::FINGERPRINT_COUNT.name)?;
    options.check_count(count)?;
    let tag = EndiannessTag(r.read_u8(format::ENDIANNESS_TAG.name)?);

    // Raw bytes are reinterpreted in native order; the tag is left for the query side.
    let len = count as usize;
    let native = Endianness::native();
    let mut fingerprints = Vec::new();
    let mut buf = [0u8; 4];
    while fingerprints.len() < len {
        let end = reserve_step(&mut fingerprints, len)?;
        while fingerprints.len() < end {
            r.read_exact_or_short(&mut buf[..T::WIDTH], format::FINGERPRINTS)?;
            fingerprints.push(T::decode_from(native, &buf));
        }
    }

    trace!(fingerprints = count, width = T::WIDTH, tag = %tag, "loaded filter (portable)");
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
