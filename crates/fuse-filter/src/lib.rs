#![forbid(unsafe_code)]

//! Binary fuse filters with a stable on-disk encoding.
//!
//! A [`BinaryFuse`] answers approximate membership queries over `u64` keys using 8, 16 or 32-bit
//! fingerprints. Filters serialize to a fixed little-endian header followed by the fingerprint
//! array (see [`format`]); the array's byte order is recorded in an [`EndiannessTag`] that travels
//! with it.
//!
//! ```
//! use fuse_filter::BinaryFuse16;
//!
//! let keys = [1u64, 2, 3, 100, 200];
//! let filter = BinaryFuse16::new(&keys).unwrap();
//!
//! let mut bytes = Vec::new();
//! filter.save(&mut bytes).unwrap();
//! let loaded = BinaryFuse16::load(&mut bytes.as_slice()).unwrap();
//!
//! assert_eq!(loaded, filter);
//! assert!(keys.iter().all(|&key| loaded.contains(key)));
//! ```

mod builder;
pub mod codec;
mod endian;
mod error;
mod filter;
mod fingerprint;
pub mod format;
pub mod hash;
mod io;

pub use crate::builder::{Builder, MAX_ITERATIONS};
pub use crate::codec::{CodecKind, LoadOptions};
pub use crate::endian::{Endianness, EndiannessTag};
pub use crate::error::{FilterError, Result};
pub use crate::filter::{BinaryFuse, BinaryFuse16, BinaryFuse32, BinaryFuse8};
pub use crate::fingerprint::Fingerprint;
