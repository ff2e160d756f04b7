use std::io::{Read, Write};

use crate::error::{FilterError, Result};

pub trait WriteLeExt: Write {
    fn write_u8(&mut self, v: u8) -> Result<()> {
        self.write_all(&[v])?;
        Ok(())
    }

    fn write_u32_le(&mut self, v: u32) -> Result<()> {
        self.write_all(&v.to_le_bytes())?;
        Ok(())
    }

    fn write_u64_le(&mut self, v: u64) -> Result<()> {
        self.write_all(&v.to_le_bytes())?;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_all(bytes)?;
        Ok(())
    }
}

impl<T: Write + ?Sized> WriteLeExt for T {}

/// Reads fixed-width values, reporting EOF as [`FilterError::ShortRead`] naming `what`.
pub trait ReadLeExt: Read {
    fn read_exact_or_short(&mut self, buf: &mut [u8], what: &'static str) -> Result<()> {
        self.read_exact(buf)
            .map_err(|err| FilterError::from_read(err, what))
    }

    fn read_le_array<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact_or_short(&mut buf, what)?;
        Ok(buf)
    }

    fn read_u8(&mut self, what: &'static str) -> Result<u8> {
        let [v] = self.read_le_array::<1>(what)?;
        Ok(v)
    }

    fn read_u32_le(&mut self, what: &'static str) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_le_array(what)?))
    }

    fn read_u64_le(&mut self, what: &'static str) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_le_array(what)?))
    }
}

impl<T: Read + ?Sized> ReadLeExt for T {}

/// Allocate `len` zeroed elements, surfacing allocation failure instead of aborting.
pub fn try_zeroed_vec<T: Copy + Default>(len: usize) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| FilterError::OutOfMemory { len })?;
    buf.resize(len, T::default());
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    #[test]
    fn try_zeroed_vec_allocation_failure_returns_error() {
        let err = try_zeroed_vec::<u32>(usize::MAX).unwrap_err();
        assert!(matches!(err, FilterError::OutOfMemory { len } if len == usize::MAX));
    }

    #[test]
    fn eof_is_reported_as_short_read() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3]);
        let err = cursor.read_u32_le("segment_length").unwrap_err();
        assert!(matches!(err, FilterError::ShortRead { what: "segment_length" }));
    }

    #[test]
    fn other_read_errors_pass_through() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "nope"))
            }
        }

        let err = Broken.read_u64_le("seed").unwrap_err();
        match err {
            FilterError::Io(err) => assert_eq!(err.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn read_le_array_takes_exactly_n_bytes() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3, 4, 5]);
        assert_eq!(cursor.read_le_array::<3>("a").unwrap(), [1, 2, 3]);
        assert_eq!(cursor.position(), 3);
        assert!(matches!(
            cursor.read_le_array::<3>("b"),
            Err(FilterError::ShortRead { what: "b" })
        ));
    }

    #[test]
    fn little_endian_helpers_round_trip() {
        let mut buf = Vec::new();
        buf.write_u64_le(0x0102_0304_0506_0708).unwrap();
        buf.write_u32_le(0xAABB_CCDD).unwrap();
        buf.write_u8(0x7F).unwrap();
        assert_eq!(
            buf,
            [8, 7, 6, 5, 4, 3, 2, 1, 0xDD, 0xCC, 0xBB, 0xAA, 0x7F]
        );

        let mut cursor = Cursor::new(buf);
        assert_eq!(cursor.read_u64_le("a").unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(cursor.read_u32_le("b").unwrap(), 0xAABB_CCDD);
        assert_eq!(cursor.read_u8("c").unwrap(), 0x7F);
    }
}
