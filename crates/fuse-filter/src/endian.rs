/// Byte order of a host or of a stored fingerprint array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    /// Native byte order of the host this crate was compiled for.
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            Endianness::Little
        } else {
            Endianness::Big
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Endianness::Little => Endianness::Big,
            Endianness::Big => Endianness::Little,
        }
    }
}

/// One-byte marker recording which byte order the stored fingerprint bytes represent.
///
/// Decoding is permissive: any byte read off the wire is kept as-is, so unknown values survive a
/// load/save cycle unchanged. Only [`EndiannessTag::LITTLE`] and [`EndiannessTag::BIG`] are ever
/// produced by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EndiannessTag(pub u8);

impl EndiannessTag {
    pub const LITTLE: EndiannessTag = EndiannessTag(0);
    pub const BIG: EndiannessTag = EndiannessTag(1);

    pub const fn native() -> Self {
        Self::from_endianness(Endianness::native())
    }

    pub const fn from_endianness(endianness: Endianness) -> Self {
        match endianness {
            Endianness::Little => EndiannessTag::LITTLE,
            Endianness::Big => EndiannessTag::BIG,
        }
    }

    /// Decoded byte order, or `None` for a tag value this crate does not know.
    pub fn endianness(self) -> Option<Endianness> {
        match self {
            EndiannessTag::LITTLE => Some(Endianness::Little),
            EndiannessTag::BIG => Some(Endianness::Big),
            _ => None,
        }
    }

    pub fn name(self) -> Option<&'static str> {
        match self {
            EndiannessTag::LITTLE => Some("LITTLE"),
            EndiannessTag::BIG => Some("BIG"),
            _ => None,
        }
    }
}

impl From<Endianness> for EndiannessTag {
    fn from(endianness: Endianness) -> Self {
        Self::from_endianness(endianness)
    }
}

impl Default for EndiannessTag {
    fn default() -> Self {
        Self::native()
    }
}

impl core::fmt::Display for EndiannessTag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if let Some(name) = self.name() {
            write!(f, "{name}({})", self.0)
        } else {
            write!(f, "EndiannessTag({})", self.0)
        }
    }
}
