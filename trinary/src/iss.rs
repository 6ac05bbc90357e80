//! ISS: the Winternitz one-time signature scheme over Curl-P-81.
//!
//! Key derivation, signing and digest recovery come from `iota-crypto`; this
//! module fixes the hash mode, checks security levels and adds
//! [`checksum_security`], which lets a message hash commit to the length of
//! its own signature.

use std::fmt;

use zeroize::Zeroizing;

use crate::curl::MODE;
use crate::digest::Digest;
use crate::error::TrinaryError;
use crate::num;
use crate::trytes::{Trit, HASH_LENGTH};

pub use iota_crypto::{
    FRAGMENT_LENGTH as KEY_FRAGMENT_LENGTH, NORMALIZED_FRAGMENT_LENGTH, NUMBER_OF_FRAGMENT_CHUNKS,
};

pub const MAX_SECURITY: u8 = iota_crypto::NUMBER_OF_SECURITY_LEVELS as u8;
/// Trits of the hash summed per security level in [`checksum_security`].
pub const CHECKSUM_TRITS: usize = HASH_LENGTH / 3;

/// Signature security level, 1 to 3.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Security(u8);

impl Security {
    pub const LOW: Security = Security(1);
    pub const MEDIUM: Security = Security(2);
    pub const HIGH: Security = Security(3);

    pub fn new(level: u8) -> Result<Self, TrinaryError> {
        if (1..=MAX_SECURITY).contains(&level) {
            Ok(Security(level))
        } else {
            Err(TrinaryError::InvalidSecurity(level))
        }
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn key_length(self) -> usize {
        self.0 as usize * KEY_FRAGMENT_LENGTH
    }

    pub fn signature_length(self) -> usize {
        self.key_length()
    }
}

impl TryFrom<u8> for Security {
    type Error = TrinaryError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Security::new(level)
    }
}

impl fmt::Debug for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Security({})", self.0)
    }
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-index subseed: `Curl(seed + index)`.
pub fn subseed(
    seed: &[Trit],
    index: usize,
) -> Result<Zeroizing<[Trit; HASH_LENGTH]>, TrinaryError> {
    // iota-crypto counts up one step at a time, so add the index up front.
    let mut preimage = Zeroizing::new(seed.to_vec());
    num::add_assign(&mut preimage, index as i64);
    iota_crypto::subseed(MODE, &preimage, 0)
        .map(Zeroizing::new)
        .map_err(TrinaryError::backend)
}

/// Private key of `security` fragments squeezed from a subseed.
pub fn key(subseed: &[Trit], security: Security) -> Result<Zeroizing<Vec<Trit>>, TrinaryError> {
    let mut subseed = Zeroizing::new(subseed.to_vec());
    iota_crypto::key(MODE, &mut subseed, security.level() as usize)
        .map(Zeroizing::new)
        .map_err(TrinaryError::backend)
}

/// One digest per key fragment, each committing to the fully hashed chunks.
pub fn digests(key: &[Trit]) -> Result<Vec<Trit>, TrinaryError> {
    iota_crypto::digests(MODE, key).map_err(TrinaryError::backend)
}

pub fn address(digests: &[Trit]) -> Result<Digest, TrinaryError> {
    iota_crypto::address(MODE, &mut digests.to_vec())
        .map(Digest::new)
        .map_err(TrinaryError::backend)
}

/// Normalize a hash into 81 tryte values whose thirds each sum to zero.
pub fn normalize(hash: &[Trit]) -> Result<[i8; 81], TrinaryError> {
    iota_crypto::normalized_bundle(hash).map_err(TrinaryError::backend)
}

/// Sign the first `key.len() / KEY_FRAGMENT_LENGTH` fragments of `normalized`.
pub fn signature(normalized: &[i8], key: &[Trit]) -> Result<Vec<Trit>, TrinaryError> {
    let mut signature = Vec::with_capacity(key.len());
    for (fragment, values) in key
        .chunks(KEY_FRAGMENT_LENGTH)
        .zip(normalized.chunks(NORMALIZED_FRAGMENT_LENGTH))
    {
        signature.extend(
            iota_crypto::signature_fragment(MODE, values, fragment).map_err(TrinaryError::backend)?,
        );
    }
    Ok(signature)
}

/// Recover the per-fragment digests committed to by a signature.
pub fn signature_digests(
    normalized: &[i8],
    signature: &[Trit],
) -> Result<Vec<Trit>, TrinaryError> {
    let mut out = Vec::with_capacity(signature.len() / NUMBER_OF_FRAGMENT_CHUNKS);
    for (fragment, values) in signature
        .chunks(KEY_FRAGMENT_LENGTH)
        .zip(normalized.chunks(NORMALIZED_FRAGMENT_LENGTH))
    {
        out.extend_from_slice(
            &iota_crypto::digest(MODE, values, fragment).map_err(TrinaryError::backend)?,
        );
    }
    Ok(out)
}

/// Security level a hash commits to: the smallest `k` for which the first
/// `k * 81` trits sum to zero, or `0` if there is none.
pub fn checksum_security(hash: &[Trit]) -> usize {
    let mut sum = 0i32;
    for (level, part) in hash[..HASH_LENGTH].chunks(CHECKSUM_TRITS).enumerate() {
        sum += part.iter().map(|&t| t as i32).sum::<i32>();
        if sum == 0 {
            return level + 1;
        }
    }
    0
}
