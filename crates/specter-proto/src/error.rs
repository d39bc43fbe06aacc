//! Protocol-level errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("buffer too short: need {needed} more bytes, have {remaining}")]
    BufferTooShort { needed: usize, remaining: usize },

    #[error("variable-length integer overruns {max_bytes} bytes")]
    VarIntTooLong { max_bytes: usize },

    #[error("variable-length integer truncated")]
    VarIntTruncated,

    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    #[error("decompression error: {0}")]
    DecompressError(String),

    #[error("compression error: {0}")]
    CompressError(String),

    #[error("unknown compression algorithm: 0x{0:02X}")]
    UnknownCompression(u8),

    #[error("packet batch is empty")]
    EmptyBatch,

    #[error("invalid {field}: {value}")]
    InvalidField { field: &'static str, value: u64 },
}

impl ProtoError {
    /// Shorthand for enum-field decode failures.
    pub fn invalid(field: &'static str, value: impl Into<u64>) -> Self {
        Self::InvalidField {
            field,
            value: value.into(),
        }
    }
}
