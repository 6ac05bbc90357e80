use std::fmt::Display;

use thiserror::Error;

/// Errors raised while converting or validating ternary data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrinaryError {
    #[error("invalid tryte character {0:?}")]
    InvalidTryte(char),

    #[error("invalid trit value {0}")]
    InvalidTrit(i8),

    #[error("trit sequence of length {0} is not tryte aligned")]
    Unaligned(usize),

    #[error("expected {expected} trytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("unsupported security level {0}, expected 1..=3")]
    InvalidSecurity(u8),

    #[error("tryte pair at offset {0} does not encode a byte")]
    InvalidByte(usize),

    /// Raised by `iota-crypto` or `iota-conversion`.
    #[error("ternary backend: {0}")]
    Backend(String),
}

impl TrinaryError {
    pub(crate) fn backend(e: impl Display) -> Self {
        TrinaryError::Backend(e.to_string())
    }
}
