use std::fmt;
use std::str::FromStr;

use iota_trinary::trytes::{self, Trit, HASH_LENGTH, TRYTES_PER_HASH};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::MerkleError;

/// The 81 tryte secret every key of a channel is derived from.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed([Trit; HASH_LENGTH]);

impl Seed {
    pub fn from_trits(trits: &[Trit]) -> Result<Self, MerkleError> {
        if trits.len() != HASH_LENGTH {
            return Err(MerkleError::InvalidParameters(format!(
                "seed must be {TRYTES_PER_HASH} trytes, got {} trits",
                trits.len()
            )));
        }
        trytes::check_trytes(trits)
            .map_err(|e| MerkleError::InvalidParameters(format!("seed: {e}")))?;
        let mut seed = Seed([0; HASH_LENGTH]);
        seed.0.copy_from_slice(trits);
        Ok(seed)
    }

    pub fn trits(&self) -> &[Trit] {
        &self.0
    }
}

impl FromStr for Seed {
    type Err = MerkleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.chars().count() != TRYTES_PER_HASH {
            return Err(MerkleError::InvalidParameters(format!(
                "seed must be {TRYTES_PER_HASH} trytes, got {}",
                s.chars().count()
            )));
        }
        let trits = zeroize::Zeroizing::new(
            trytes::trits_from_trytes(s)
                .map_err(|e| MerkleError::InvalidParameters(format!("seed: {e}")))?,
        );
        Seed::from_trits(&trits)
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(..)")
    }
}
