use std::fmt;
use std::str::FromStr;

use crate::error::TrinaryError;
use crate::trytes::{self, Trit, HASH_LENGTH, TRYTES_PER_HASH};

/// A 243 trit hash: a channel root, a merkle node or a ledger address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([Trit; HASH_LENGTH]);

impl Digest {
    /// All-zero digest, `9` repeated 81 times.
    pub const EMPTY: Digest = Digest([0; HASH_LENGTH]);

    pub fn new(trits: [Trit; HASH_LENGTH]) -> Self {
        Digest(trits)
    }

    pub fn from_trits(trits: &[Trit]) -> Result<Self, TrinaryError> {
        let array: [Trit; HASH_LENGTH] =
            trits
                .try_into()
                .map_err(|_| TrinaryError::InvalidLength {
                    expected: TRYTES_PER_HASH,
                    actual: trits.len() / 3,
                })?;
        trytes::check_trytes(&array)?;
        Ok(Digest(array))
    }

    pub fn trits(&self) -> &[Trit] {
        &self.0
    }

    pub fn to_trytes(&self) -> String {
        // Digests only ever hold valid trits.
        trytes::trytes_from_trits(&self.0).unwrap_or_default()
    }
}

impl AsRef<[Trit]> for Digest {
    fn as_ref(&self) -> &[Trit] {
        &self.0
    }
}

impl FromStr for Digest {
    type Err = TrinaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != TRYTES_PER_HASH {
            return Err(TrinaryError::InvalidLength {
                expected: TRYTES_PER_HASH,
                actual: s.chars().count(),
            });
        }
        Digest::from_trits(&trytes::trits_from_trytes(s)?)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_trytes())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_trytes())
    }
}
