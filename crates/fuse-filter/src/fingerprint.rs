use core::fmt::Debug;
use core::hash::Hash;
use core::ops::BitXor;

use crate::endian::Endianness;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
}

/// Fixed-width unsigned integer stored in a filter slot.
///
/// Implemented for `u8`, `u16` and `u32`. The width is a property of the type, so it is never
/// written to the wire.
pub trait Fingerprint:
    sealed::Sealed
    + bytemuck::Pod
    + Copy
    + Default
    + Debug
    + Eq
    + Hash
    + BitXor<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Size of one fingerprint in bytes.
    const WIDTH: usize;

    /// Truncate a 64-bit fingerprint hash to this width.
    fn from_hash(hash: u64) -> Self;

    fn swap_bytes(self) -> Self;

    /// Render the value into `out[..Self::WIDTH]` in `order`.
    fn encode_into(self, order: Endianness, out: &mut [u8]);

    /// Interpret `bytes[..Self::WIDTH]` in `order`.
    fn decode_from(order: Endianness, bytes: &[u8]) -> Self;
}

macro_rules! impl_fingerprint {
    ($ty:ty) => {
        impl Fingerprint for $ty {
            const WIDTH: usize = core::mem::size_of::<$ty>();

            #[inline]
            fn from_hash(hash: u64) -> Self {
                hash as $ty
            }

            #[inline]
            fn swap_bytes(self) -> Self {
                <$ty>::swap_bytes(self)
            }

            #[inline]
            fn encode_into(self, order: Endianness, out: &mut [u8]) {
                let bytes = match order {
                    Endianness::Little => self.to_le_bytes(),
                    Endianness::Big => self.to_be_bytes(),
                };
                out[..Self::WIDTH].copy_from_slice(&bytes);
            }

            #[inline]
            fn decode_from(order: Endianness, bytes: &[u8]) -> Self {
                let mut buf = [0u8; core::mem::size_of::<$ty>()];
                buf.copy_from_slice(&bytes[..Self::WIDTH]);
                match order {
                    Endianness::Little => <$ty>::from_le_bytes(buf),
                    Endianness::Big => <$ty>::from_be_bytes(buf),
                }
            }
        }
    };
}

impl_fingerprint!(u8);
impl_fingerprint!(u16);
impl_fingerprint!(u32);
