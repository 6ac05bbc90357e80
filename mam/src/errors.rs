use iota_merkle::MerkleError;
use iota_trinary::TrinaryError;
use thiserror::Error;

use crate::ledger::{LookupError, StoreError};

/// Why a message failed to authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Message hash does not commit to any security level
    InvalidHash,
    /// Signature does not lead back to the expected root
    InvalidSignature,
    /// Unmasked trits do not parse as a message
    Malformed,
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AuthFailure::InvalidHash => "invalid hash",
            AuthFailure::InvalidSignature => "invalid signature",
            AuthFailure::Malformed => "malformed message",
        })
    }
}

#[derive(Error, Debug)]
pub enum MamError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("leaf {index} is outside the window [{start}, {end})")]
    IndexOutOfRange {
        index: usize,
        start: usize,
        end: usize,
    },

    #[error("authentication failed: {0}")]
    AuthenticationFailed(AuthFailure),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl MamError {
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, MamError::AuthenticationFailed(_))
    }
}

impl From<MerkleError> for MamError {
    fn from(e: MerkleError) -> Self {
        match e {
            MerkleError::InvalidParameters(msg) => MamError::InvalidParameters(msg),
            MerkleError::IndexOutOfRange { index, start, end } => {
                MamError::IndexOutOfRange { index, start, end }
            }
            MerkleError::ResourceExhausted(msg) => MamError::ResourceExhausted(msg),
            MerkleError::Trinary(e) => e.into(),
        }
    }
}

impl From<TrinaryError> for MamError {
    fn from(e: TrinaryError) -> Self {
        MamError::InvalidParameters(e.to_string())
    }
}

impl From<AuthFailure> for MamError {
    fn from(failure: AuthFailure) -> Self {
        MamError::AuthenticationFailed(failure)
    }
}

pub type Result<T> = std::result::Result<T, MamError>;
