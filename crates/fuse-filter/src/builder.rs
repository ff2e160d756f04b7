use std::borrow::Cow;

use crate::endian::EndiannessTag;
use crate::error::{FilterError, Result};
use crate::filter::BinaryFuse;
use crate::fingerprint::Fingerprint;
use crate::hash::{fingerprint, mixsplit, splitmix64};
use crate::io::try_zeroed_vec;

const ARITY: u32 = 3;
const MAX_SEGMENT_LENGTH: u32 = 262_144;

/// Seeds tried before construction gives up.
pub const MAX_ITERATIONS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Geometry {
    segment_length: u32,
    segment_count: u32,
    array_len: u32,
}

impl Geometry {
    fn for_size(size: u32) -> Result<Self> {
        let segment_length = if size == 0 {
            4
        } else {
            let exponent = (f64::from(size).ln() / 3.33f64.ln() + 2.25).floor() as u32;
            1u32.checked_shl(exponent)
                .unwrap_or(MAX_SEGMENT_LENGTH)
                .min(MAX_SEGMENT_LENGTH)
        };

        let capacity = if size > 1 {
            let size_factor =
                f64::max(1.125, 0.875 + 0.25 * 1_000_000f64.ln() / f64::from(size).ln());
            (f64::from(size) * size_factor).round() as u64
        } else {
            0
        };

        let segment_length_u64 = u64::from(segment_length);
        let segments = capacity.div_ceil(segment_length_u64);
        let segment_count = segments.saturating_sub(u64::from(ARITY - 1)).max(1);
        let array_len = (segment_count + u64::from(ARITY - 1)) * segment_length_u64;

        let too_many = || FilterError::TooManyKeys {
            len: size as usize,
        };
        Ok(Self {
            segment_length,
            segment_count: u32::try_from(segment_count).map_err(|_| too_many())?,
            array_len: u32::try_from(array_len).map_err(|_| too_many())?,
        })
    }
}

/// Filter constructor that keeps its scratch buffers between builds.
#[derive(Debug, Default)]
pub struct Builder {
    alone: Vec<u32>,
    t2count: Vec<u8>,
    t2hash: Vec<u64>,
    reverse_h: Vec<u8>,
    reverse_order: Vec<u64>,
    start_pos: Vec<usize>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build<T: Fingerprint>(&mut self, keys: &[u64]) -> Result<BinaryFuse<T>> {
        let len = keys.len();
        let key_count = u32::try_from(len).map_err(|_| FilterError::TooManyKeys { len })?;
        let geometry = Geometry::for_size(key_count)?;

        let mut rng = 1u64;
        let mut filter = BinaryFuse {
            seed: splitmix64(&mut rng),
            segment_length: geometry.segment_length,
            segment_length_mask: geometry.segment_length - 1,
            segment_count: geometry.segment_count,
            segment_count_length: geometry.segment_count * geometry.segment_length,
            fingerprints: try_zeroed_vec::<T>(geometry.array_len as usize)?,
            fingerprints_endianness: EndiannessTag::native(),
        };
        let capacity = filter.fingerprints.len();

        let mut keys = Cow::Borrowed(keys);
        let mut size = len;

        reset(&mut self.alone, capacity);
        reset(&mut self.reverse_h, size);

        let mut block_bits = 1u32;
        while (1u64 << block_bits) < u64::from(filter.segment_count) {
            block_bits += 1;
        }
        let blocks = 1usize << block_bits;
        let block_mask = blocks - 1;

        let mut attempts = 0;
        loop {
            attempts += 1;
            if attempts > MAX_ITERATIONS {
                tracing::warn!(keys = len, "binary fuse construction did not converge");
                return Err(FilterError::ConstructionFailed {
                    attempts: MAX_ITERATIONS,
                });
            }

            reset(&mut self.t2count, capacity);
            reset(&mut self.t2hash, capacity);
            reset(&mut self.reverse_order, size + 1);
            // Sentinel so bucket placement never runs past the last key.
            self.reverse_order[size] = 1;

            self.start_pos.clear();
            self.start_pos
                .extend((0..blocks).map(|i| ((i as u64 * size as u64) >> block_bits) as usize));

            for &key in keys.iter() {
                let hash = mixsplit(key, filter.seed);
                let mut segment = (hash >> (64 - block_bits)) as usize;
                while self.reverse_order[self.start_pos[segment]] != 0 {
                    segment = (segment + 1) & block_mask;
                }
                self.reverse_order[self.start_pos[segment]] = hash;
                self.start_pos[segment] += 1;
            }

            let mut failed = false;
            let mut duplicates = 0usize;
            for i in 0..size {
                let hash = self.reverse_order[i];
                let slots = filter.slots(hash);
                for (slot, &index) in slots.iter().enumerate() {
                    self.toggle(index, hash, slot as u8, true);
                }

                // Two identical hashes cancel out: the slot is back to a zero hash with a count
                // of two.
                let [a, b, c] = slots;
                if self.t2hash[a] & self.t2hash[b] & self.t2hash[c] == 0
                    && slots
                        .iter()
                        .any(|&index| self.t2hash[index] == 0 && self.t2count[index] == 8)
                {
                    duplicates += 1;
                    for (slot, &index) in slots.iter().enumerate() {
                        self.toggle(index, hash, slot as u8, false);
                    }
                }
                if slots.iter().any(|&index| self.t2count[index] < 4) {
                    failed = true;
                }
            }
            if failed {
                filter.seed = splitmix64(&mut rng);
                continue;
            }

            let stack_size = self.peel(&filter, capacity);
            if stack_size + duplicates == size {
                size = stack_size;
                break;
            }
            if duplicates > 0 {
                let mut unique = keys.into_owned();
                unique.sort_unstable();
                unique.dedup();
                size = unique.len();
                keys = Cow::Owned(unique);
            }
            filter.seed = splitmix64(&mut rng);
        }

        for i in (0..size).rev() {
            let hash = self.reverse_order[i];
            let [a, b, c] = filter.slots(hash);
            let h012 = [a, b, c, a, b];
            let found = self.reverse_h[i] as usize;
            filter.fingerprints[h012[found]] = T::from_hash(fingerprint(hash))
                ^ filter.fingerprints[h012[found + 1]]
                ^ filter.fingerprints[h012[found + 2]];
        }

        tracing::debug!(
            keys = len,
            attempts,
            seed = filter.seed,
            fingerprints = capacity,
            "built binary fuse filter"
        );
        Ok(filter)
    }

    /// Add (`insert`) or remove a hash from one slot's running count and xor.
    ///
    /// The low two bits of `t2count` hold the xor of the slot numbers, the rest count entries.
    fn toggle(&mut self, index: usize, hash: u64, slot: u8, insert: bool) {
        let count = &mut self.t2count[index];
        *count = if insert {
            count.wrapping_add(4)
        } else {
            count.wrapping_sub(4)
        };
        *count ^= slot;
        self.t2hash[index] ^= hash;
    }

    /// Peel singleton slots onto the reverse stack. Returns how many hashes were peeled.
    fn peel<T: Fingerprint>(&mut self, filter: &BinaryFuse<T>, capacity: usize) -> usize {
        let mut queue = 0usize;
        for i in 0..capacity {
            self.alone[queue] = i as u32;
            if self.t2count[i] >> 2 == 1 {
                queue += 1;
            }
        }

        let mut stack_size = 0usize;
        while queue > 0 {
            queue -= 1;
            let index = self.alone[queue] as usize;
            if self.t2count[index] >> 2 != 1 {
                continue;
            }
            let hash = self.t2hash[index];
            let found = self.t2count[index] & 3;
            self.reverse_h[stack_size] = found;
            self.reverse_order[stack_size] = hash;
            stack_size += 1;

            let [a, b, c] = filter.slots(hash);
            let h012 = [a, b, c, a, b];
            for delta in 1..=2u8 {
                let other = h012[usize::from(found + delta)];
                self.alone[queue] = other as u32;
                if self.t2count[other] >> 2 == 2 {
                    queue += 1;
                }
                self.t2count[other] = self.t2count[other].wrapping_sub(4);
                self.t2count[other] ^= (found + delta) % 3;
                self.t2hash[other] ^= hash;
            }
        }
        stack_size
    }
}

fn reset<T: Copy + Default>(buf: &mut Vec<T>, len: usize) {
    buf.clear();
    buf.resize(len, T::default());
}
