//! Authentication trees binding a channel root to seed-derived leaves.
//!
//! Leaf `i` of a channel is the ISS address of the one-time key derived from
//! `seed + i`. A [`MerkleTree`] covers the window `[start, start + count)`;
//! its root is what a reader follows, and a [`Branch`] is what a signer
//! ships so the reader can get back to that root with [`recompute_root`].

mod seed;
mod tree;

pub use seed::Seed;
pub use tree::{depth, recompute_root, Branch, MerkleTree, MAX_DEPTH, MAX_LEAF_COUNT};

use iota_trinary::{iss, Digest, Security, Trit, TrinaryError};
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MerkleError {
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("leaf {index} is outside the window [{start}, {end})")]
    IndexOutOfRange {
        index: usize,
        start: usize,
        end: usize,
    },

    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    #[error(transparent)]
    Trinary(#[from] TrinaryError),
}

pub type Result<T> = std::result::Result<T, MerkleError>;

/// One-time signing key for the absolute leaf `index`.
pub fn key(seed: &Seed, index: usize, security: Security) -> Result<Zeroizing<Vec<Trit>>> {
    let subseed = iss::subseed(seed.trits(), index)?;
    Ok(iss::key(&subseed[..], security)?)
}

/// Public address of the absolute leaf `index`.
pub fn leaf_address(seed: &Seed, index: usize, security: Security) -> Result<Digest> {
    let key = key(seed, index, security)?;
    Ok(iss::address(&iss::digests(&key)?)?)
}
