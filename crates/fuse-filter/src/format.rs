//! Wire layout shared by every codec.
//!
//! All scalar header fields travel in [`WIRE_ORDER`]. Fingerprint bytes follow the header verbatim;
//! their byte order is whatever the endianness tag says it is.

use crate::endian::Endianness;

/// Byte order of the fixed-width header fields.
pub const WIRE_ORDER: Endianness = Endianness::Little;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLayout {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
}

pub const SEED: FieldLayout = FieldLayout {
    name: "seed",
    offset: 0,
    width: 8,
};
pub const SEGMENT_LENGTH: FieldLayout = FieldLayout {
    name: "segment_length",
    offset: 8,
    width: 4,
};
pub const SEGMENT_LENGTH_MASK: FieldLayout = FieldLayout {
    name: "segment_length_mask",
    offset: 12,
    width: 4,
};
pub const SEGMENT_COUNT: FieldLayout = FieldLayout {
    name: "segment_count",
    offset: 16,
    width: 4,
};
pub const SEGMENT_COUNT_LENGTH: FieldLayout = FieldLayout {
    name: "segment_count_length",
    offset: 20,
    width: 4,
};
pub const FINGERPRINT_COUNT: FieldLayout = FieldLayout {
    name: "fingerprint_count",
    offset: 24,
    width: 4,
};
pub const ENDIANNESS_TAG: FieldLayout = FieldLayout {
    name: "endianness_tag",
    offset: 28,
    width: 1,
};

/// Header fields in encoding order.
pub const HEADER_LAYOUT: [FieldLayout; 7] = [
    SEED,
    SEGMENT_LENGTH,
    SEGMENT_LENGTH_MASK,
    SEGMENT_COUNT,
    SEGMENT_COUNT_LENGTH,
    FINGERPRINT_COUNT,
    ENDIANNESS_TAG,
];

pub const HEADER_LEN: usize = 29;

/// Name reported in short-read errors for the fingerprint region.
pub const FINGERPRINTS: &str = "fingerprints";

/// Encoded size of a filter holding `count` fingerprints of `width` bytes each.
pub const fn encoded_len(count: usize, width: usize) -> usize {
    HEADER_LEN + count * width
}
