//! Persistent encoding of [`BinaryFuse`] filters.
//!
//! Two codecs produce the same bytes (see [`crate::format`]):
//! - [`portable`] writes every field through explicit byte-order conversions and works on any
//!   host.
//! - `fast` (little-endian hosts with the `fast-path` feature) copies the in-memory
//!   representation directly.
//!
//! [`save`]/[`load`] use whichever one the build selected. Neither codec converts fingerprint
//! bytes: they travel verbatim, and the endianness tag tells [`BinaryFuse::contains`] how to read
//! them. A reader of the opposite byte order sees every fingerprint swapped, and since the tag
//! then differs from its native order, queries swap them back. Use
//! [`BinaryFuse::convert_endianness`] to settle the array into one order before hot lookups.
//!
//! Both codecs issue one write per field, so wrap unbuffered sinks in a `BufWriter`.

use std::io::{Read, Write};

use crate::error::{FilterError, Result};
use crate::filter::BinaryFuse;
use crate::fingerprint::Fingerprint;

#[cfg(all(target_endian = "little", feature = "fast-path"))]
pub mod fast;
pub mod portable;

#[cfg(all(target_endian = "little", feature = "fast-path"))]
use self::fast as selected;
#[cfg(not(all(target_endian = "little", feature = "fast-path")))]
use self::portable as selected;

/// Initial fingerprint allocation when loading; the buffer grows as input actually arrives.
pub(crate) const PREALLOC_FINGERPRINTS: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    Portable,
    FastPath,
}

impl CodecKind {
    /// Codec behind [`save`] and [`load`] in this build.
    pub const fn selected() -> Self {
        if cfg!(all(target_endian = "little", feature = "fast-path")) {
            CodecKind::FastPath
        } else {
            CodecKind::Portable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadOptions {
    /// Reject streams that declare more fingerprints than this. `None` accepts any count.
    pub max_fingerprints: Option<u32>,
}

impl LoadOptions {
    pub(crate) fn check_count(&self, count: u32) -> Result<()> {
        match self.max_fingerprints {
            Some(max) if count > max => Err(FilterError::TooManyFingerprints { count, max }),
            _ => Ok(()),
        }
    }
}

pub fn save<T: Fingerprint, W: Write + ?Sized>(w: &mut W, filter: &BinaryFuse<T>) -> Result<()> {
    selected::save(w, filter)
}

pub fn load<T: Fingerprint, R: Read + ?Sized>(r: &mut R) -> Result<BinaryFuse<T>> {
    load_with_options(r, LoadOptions::default())
}

pub fn load_with_options<T: Fingerprint, R: Read + ?Sized>(
    r: &mut R,
    options: LoadOptions,
) -> Result<BinaryFuse<T>> {
    selected::load_with_options(r, options)
}

/// Reserve the next bounded step of a `len`-element fingerprint buffer and return where the step
/// ends. Reservation is fallible, so a failed allocation surfaces as
/// [`FilterError::OutOfMemory`] naming the total the buffer would have held.
pub(crate) fn reserve_step<T>(fingerprints: &mut Vec<T>, len: usize) -> Result<usize> {
    let start = fingerprints.len();
    let end = len.min(start.saturating_add(PREALLOC_FINGERPRINTS));
    fingerprints
        .try_reserve_exact(end - start)
        .map_err(|_| FilterError::OutOfMemory { len: end })?;
    Ok(end)
}

pub(crate) fn fingerprint_count<T: Fingerprint>(filter: &BinaryFuse<T>) -> Result<u32> {
    let len = filter.fingerprints.len();
    u32::try_from(len).map_err(|_| FilterError::FingerprintCountOverflow { len })
}
