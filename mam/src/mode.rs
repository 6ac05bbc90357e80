//! Channel access modes and restricted-mode side keys.

use std::fmt;
use std::str::FromStr;

use iota_trinary::curl::{self, CpuCurl};
use iota_trinary::trytes::{self, Trit, HASH_LENGTH, TRYTES_PER_HASH};
use iota_trinary::Digest;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{MamError, Result};

/// Shared secret mixed into the masking keystream of a restricted channel.
///
/// Shorter keys are padded with `9`. The all-`9` key is the placeholder used
/// when a channel has no side key, so every message is masked the same way.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SideKey([Trit; HASH_LENGTH]);

impl SideKey {
    /// The all-`9` placeholder.
    pub fn none() -> Self {
        SideKey([0; HASH_LENGTH])
    }

    pub fn from_trits(trits: &[Trit]) -> Result<Self> {
        trytes::check_trytes(trits)?;
        if trits.len() > HASH_LENGTH {
            return Err(MamError::InvalidParameters(format!(
                "side key longer than {TRYTES_PER_HASH} trytes"
            )));
        }
        let mut key = SideKey::none();
        key.0[..trits.len()].copy_from_slice(trits);
        Ok(key)
    }

    pub fn trits(&self) -> &[Trit] {
        &self.0
    }

    pub fn is_placeholder(&self) -> bool {
        self.0.iter().all(|&t| t == 0)
    }
}

impl FromStr for SideKey {
    type Err = MamError;

    fn from_str(s: &str) -> Result<Self> {
        let trits = zeroize::Zeroizing::new(trytes::trits_from_trytes(s)?);
        SideKey::from_trits(&trits)
    }
}

impl fmt::Debug for SideKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_placeholder() {
            f.write_str("SideKey(none)")
        } else {
            f.write_str("SideKey(..)")
        }
    }
}

/// Who can find and read a channel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// Messages live at their root; anyone holding a root can read on.
    #[default]
    Public,
    /// Messages live at the hash of their root, so the ledger address does
    /// not reveal the root needed to unmask them.
    Private,
    /// As private, with a side key mixed into the keystream.
    Restricted(SideKey),
}

impl Mode {
    pub fn side_key(&self) -> Option<&SideKey> {
        match self {
            Mode::Restricted(key) => Some(key),
            Mode::Public | Mode::Private => None,
        }
    }

    /// Ledger address a message with channel root `root` is stored at.
    pub fn address(&self, root: &Digest) -> Digest {
        match self {
            Mode::Public => *root,
            Mode::Private | Mode::Restricted(_) => curl::hash::<CpuCurl>(root.trits()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Public => "public",
            Mode::Private => "private",
            Mode::Restricted(_) => "restricted",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
