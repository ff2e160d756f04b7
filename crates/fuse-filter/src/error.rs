use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FilterError>;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The source ran dry before `what` was fully read.
    #[error("unexpected end of input while reading {what}")]
    ShortRead { what: &'static str },

    #[error("out of memory allocating {len} fingerprints")]
    OutOfMemory { len: usize },

    #[error("fingerprint count {count} exceeds limit {max}")]
    TooManyFingerprints { count: u32, max: u32 },

    #[error("{len} fingerprints do not fit in a u32 count")]
    FingerprintCountOverflow { len: usize },

    #[error("{len} keys do not fit in a u32 count")]
    TooManyKeys { len: usize },

    #[error("filter construction failed after {attempts} attempts")]
    ConstructionFailed { attempts: usize },
}

impl FilterError {
    /// Map an I/O error raised while reading `what`, splitting EOF out of the generic case.
    pub(crate) fn from_read(err: io::Error, what: &'static str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            FilterError::ShortRead { what }
        } else {
            FilterError::Io(err)
        }
    }
}
