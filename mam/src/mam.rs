use iota_merkle::{Seed, MAX_DEPTH};
use iota_trinary::curl::CpuCurl;
use iota_trinary::trytes::{self, is_trits};
use iota_trinary::{Digest, Security, Trit, HASH_LENGTH, TRITS_PER_TRYTE};
use tracing::debug;

use crate::auth;
use crate::errors::{AuthFailure, MamError, Result};
use crate::mask::{channel_key, mask, unmask};
use crate::mode::SideKey;

/// A message read back from a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Root the message was authenticated against.
    pub root: Digest,
    pub payload: Vec<Trit>,
    /// Root of the following message.
    pub next_root: Digest,
}

impl Message {
    pub fn payload_trytes(&self) -> Result<String> {
        Ok(trytes::trytes_from_trits(&self.payload)?)
    }

    /// Payload as bytes, for messages published from
    /// [`trits_from_bytes`](iota_trinary::trytes::trits_from_bytes).
    pub fn payload_bytes(&self) -> Result<Vec<u8>> {
        Ok(trytes::bytes_from_trits(&self.payload)?)
    }
}

/// Sign and mask `payload` as leaf `start + leaf_index` of the tree with
/// root `root` and authentication path `siblings`.
#[allow(clippy::too_many_arguments)]
pub fn encode(
    seed: &Seed,
    payload: &[Trit],
    side_key: Option<&SideKey>,
    root: &Digest,
    siblings: &[Digest],
    next_root: &Digest,
    start: usize,
    leaf_index: usize,
    security: Security,
) -> Result<Vec<Trit>> {
    trytes::check_trytes(payload)?;
    let depth = siblings.len();
    if depth > MAX_DEPTH {
        return Err(MamError::InvalidParameters(format!(
            "{depth} siblings exceeds the maximum depth of {MAX_DEPTH}"
        )));
    }
    if leaf_index >> depth != 0 {
        return Err(MamError::IndexOutOfRange {
            index: start.saturating_add(leaf_index),
            start,
            end: start.saturating_add(1 << depth),
        });
    }
    let index = start
        .checked_add(leaf_index)
        .ok_or_else(|| MamError::InvalidParameters(format!("leaf {start}+{leaf_index} overflows")))?;

    let key = iota_merkle::key(seed, index, security)?;
    let mut body = Vec::with_capacity(HASH_LENGTH + payload.len());
    body.extend_from_slice(next_root.trits());
    body.extend_from_slice(payload);

    let mut blob = auth::sign::<CpuCurl>(&body, leaf_index, &key, siblings, security)?;
    let none = SideKey::none();
    let key = channel_key(side_key.unwrap_or(&none), root);
    mask(&mut blob, &key, &mut CpuCurl::default());

    debug!(index, depth, trits = blob.len(), "encoded message");
    Ok(blob)
}

/// Unmask and authenticate a blob published under `root`.
pub fn decode(blob: &[Trit], side_key: Option<&SideKey>, root: &Digest) -> Result<Message> {
    if blob.len() % TRITS_PER_TRYTE != 0 || !is_trits(blob) {
        return Err(AuthFailure::Malformed.into());
    }
    let none = SideKey::none();
    let key = channel_key(side_key.unwrap_or(&none), root);
    let mut plain = blob.to_vec();
    unmask(&mut plain, &key, &mut CpuCurl::default());

    let (payload, next_root) = auth::authenticate::<CpuCurl>(&plain, root)?;
    Ok(Message {
        root: *root,
        payload,
        next_root,
    })
}
