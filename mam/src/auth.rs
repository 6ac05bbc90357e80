//! Signing and authentication of unmasked messages.
//!
//! Unmasked layout, padded with zero trits to whole trytes:
//!
//! ```text
//! pascal(body trytes) body pascal(leaf index) pascal(nonce trytes) nonce
//! signature pascal(depth) siblings
//! ```
//!
//! `body` is the next root followed by the payload. The signed hash covers
//! the body length, the body, the leaf index and the nonce; the nonce is
//! chosen so that [`iss::checksum_security`] of the hash equals the signing
//! security, which is how a reader knows how long the signature is.

use iota_merkle::{recompute_root, MAX_DEPTH};
use iota_trinary::curl::Curl;
use iota_trinary::{iss, num, Digest, Security, Trit, HASH_LENGTH, TRITS_PER_TRYTE};
use tracing::trace;

use crate::errors::{AuthFailure, MamError, Result};

/// Give up on a nonce after this many candidates.
pub const MAX_NONCE_ATTEMPTS: u64 = 1 << 20;

fn message_curl<C: Curl>(body: &[Trit], leaf_index: usize) -> C {
    let mut curl = C::default();
    curl.absorb(&num::int2trits((body.len() / TRITS_PER_TRYTE) as i64));
    curl.absorb(body);
    curl.absorb(&iota_pascal::encode(leaf_index));
    curl
}

fn nonce_trits(attempt: u64) -> Vec<Trit> {
    let mut nonce = num::int2trits(attempt as i64);
    nonce.resize(num::round_third(nonce.len()), 0);
    nonce
}

fn search_nonce<C: Curl>(prefix: &C, security: Security) -> Result<(Vec<Trit>, Vec<Trit>)> {
    for attempt in 0..MAX_NONCE_ATTEMPTS {
        let nonce = nonce_trits(attempt);
        let mut curl = prefix.clone();
        curl.absorb(&nonce);
        if iss::checksum_security(curl.rate()) == security.level() as usize {
            trace!(attempt, "found message nonce");
            return Ok((nonce, curl.rate().to_vec()));
        }
    }
    Err(MamError::ResourceExhausted(format!(
        "no nonce for security {security} within {MAX_NONCE_ATTEMPTS} attempts"
    )))
}

/// Sign `body` with the one-time `key` and lay the message out for masking.
pub fn sign<C: Curl>(
    body: &[Trit],
    leaf_index: usize,
    key: &[Trit],
    siblings: &[Digest],
    security: Security,
) -> Result<Vec<Trit>> {
    let prefix = message_curl::<C>(body, leaf_index);
    let (nonce, hash) = search_nonce(&prefix, security)?;
    let signature = iss::signature(&iss::normalize(&hash)?, key)?;

    let mut out = Vec::with_capacity(
        body.len() + nonce.len() + signature.len() + siblings.len() * HASH_LENGTH + 64,
    );
    out.extend(iota_pascal::encode(body.len() / TRITS_PER_TRYTE));
    out.extend_from_slice(body);
    out.extend(iota_pascal::encode(leaf_index));
    out.extend(iota_pascal::encode(nonce.len() / TRITS_PER_TRYTE));
    out.extend(nonce);
    out.extend(signature);
    out.extend(iota_pascal::encode(siblings.len()));
    for sibling in siblings {
        out.extend_from_slice(sibling.trits());
    }
    out.resize(num::round_third(out.len()), 0);
    Ok(out)
}

struct Reader<'a> {
    trits: &'a [Trit],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(trits: &'a [Trit]) -> Self {
        Reader { trits, offset: 0 }
    }

    fn take(&mut self, len: usize) -> std::result::Result<&'a [Trit], AuthFailure> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.trits.len())
            .ok_or(AuthFailure::Malformed)?;
        let out = &self.trits[self.offset..end];
        self.offset = end;
        Ok(out)
    }

    fn trytes(&mut self, count: usize) -> std::result::Result<&'a [Trit], AuthFailure> {
        self.take(
            count
                .checked_mul(TRITS_PER_TRYTE)
                .ok_or(AuthFailure::Malformed)?,
        )
    }

    fn pascal(&mut self) -> std::result::Result<usize, AuthFailure> {
        let (value, used) =
            iota_pascal::decode(&self.trits[self.offset..]).map_err(|_| AuthFailure::Malformed)?;
        self.offset += used;
        Ok(value)
    }

    fn rest(&self) -> &'a [Trit] {
        &self.trits[self.offset..]
    }
}

/// Check an unmasked message against `root`, returning its payload and the
/// next root it points to.
pub fn authenticate<C: Curl>(payload: &[Trit], root: &Digest) -> Result<(Vec<Trit>, Digest)> {
    let mut reader = Reader::new(payload);

    let body_length = reader.pascal()?;
    let body = reader.trytes(body_length)?;
    if body.len() < HASH_LENGTH {
        return Err(AuthFailure::Malformed.into());
    }
    let leaf_index = reader.pascal()?;
    let nonce_length = reader.pascal()?;
    let nonce = reader.trytes(nonce_length)?;

    let hash = {
        let mut curl = message_curl::<C>(body, leaf_index);
        curl.absorb(nonce);
        curl.rate().to_vec()
    };
    let security = match iss::checksum_security(&hash) {
        0 => return Err(AuthFailure::InvalidHash.into()),
        level => Security::new(level as u8).map_err(|_| AuthFailure::InvalidHash)?,
    };

    let signature = reader.take(security.signature_length())?;
    let depth = reader.pascal()?;
    if depth > MAX_DEPTH || leaf_index >> depth != 0 {
        return Err(AuthFailure::Malformed.into());
    }
    let siblings = reader
        .take(depth * HASH_LENGTH)?
        .chunks(HASH_LENGTH)
        .map(Digest::from_trits)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| AuthFailure::Malformed)?;
    let padding = reader.rest();
    if padding.len() >= TRITS_PER_TRYTE || padding.iter().any(|&t| t != 0) {
        return Err(AuthFailure::Malformed.into());
    }

    let address = iss::normalize(&hash)
        .and_then(|normalized| iss::signature_digests(&normalized, signature))
        .and_then(|digests| iss::address(&digests))
        .map_err(|_| AuthFailure::Malformed)?;
    if recompute_root::<C>(&address, &siblings, leaf_index) != *root {
        return Err(AuthFailure::InvalidSignature.into());
    }

    let next_root = Digest::from_trits(&body[..HASH_LENGTH]).map_err(|_| AuthFailure::Malformed)?;
    Ok((body[HASH_LENGTH..].to_vec(), next_root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use iota_merkle::{key, MerkleTree, Seed};
    use iota_trinary::curl::CpuCurl;
    use iota_trinary::trytes::trits_from_trytes;

    fn seed() -> Seed {
        "ABCDEFGHIJKLMNOPQRSTUVWXYZ9".repeat(3).parse().unwrap()
    }

    fn signed(tree: &MerkleTree, index: usize, security: Security) -> Vec<Trit> {
        let branch = tree.branch(index).unwrap();
        let mut body = Digest::EMPTY.trits().to_vec();
        body.extend(trits_from_trytes("IAMSOMEMESSAGE").unwrap());
        sign::<CpuCurl>(
            &body,
            branch.leaf_index(),
            &key(&seed(), index, security).unwrap(),
            branch.siblings(),
            security,
        )
        .unwrap()
    }

    #[test]
    fn signed_messages_authenticate() {
        let tree = MerkleTree::build(&seed(), 1, 3, Security::LOW).unwrap();
        let message = signed(&tree, 3, Security::LOW);
        assert_eq!(message.len() % TRITS_PER_TRYTE, 0);
        let (payload, next_root) = authenticate::<CpuCurl>(&message, tree.root()).unwrap();
        assert_eq!(payload, trits_from_trytes("IAMSOMEMESSAGE").unwrap());
        assert_eq!(next_root, Digest::EMPTY);
    }

    #[test]
    fn security_is_recovered_from_the_hash() {
        for security in [Security::MEDIUM, Security::HIGH] {
            let tree = MerkleTree::build(&seed(), 0, 1, security).unwrap();
            let message = signed(&tree, 0, security);
            assert!(authenticate::<CpuCurl>(&message, tree.root()).is_ok());
        }
    }

    #[test]
    fn foreign_roots_are_rejected() {
        let tree = MerkleTree::build(&seed(), 1, 2, Security::LOW).unwrap();
        let other = MerkleTree::build(&seed(), 3, 2, Security::LOW).unwrap();
        let message = signed(&tree, 2, Security::LOW);
        assert!(matches!(
            authenticate::<CpuCurl>(&message, other.root()),
            Err(MamError::AuthenticationFailed(AuthFailure::InvalidSignature))
        ));
    }

    #[test]
    fn truncated_and_padded_messages_are_malformed() {
        let tree = MerkleTree::build(&seed(), 1, 1, Security::LOW).unwrap();
        let message = signed(&tree, 1, Security::LOW);
        for cut in [0, 5, 300, message.len() - 3] {
            assert!(matches!(
                authenticate::<CpuCurl>(&message[..cut], tree.root()),
                Err(MamError::AuthenticationFailed(AuthFailure::Malformed))
            ));
        }
        let mut longer = message.clone();
        longer.extend_from_slice(&[0, 0, 0]);
        assert!(matches!(
            authenticate::<CpuCurl>(&longer, tree.root()),
            Err(MamError::AuthenticationFailed(AuthFailure::Malformed))
        ));
    }

    #[test]
    fn nonces_are_whole_trytes() {
        for attempt in [0, 1, 13, 14, 1000] {
            let nonce = nonce_trits(attempt);
            assert_eq!(nonce.len() % TRITS_PER_TRYTE, 0);
            assert_eq!(num::trits2int(&nonce), attempt as i64);
        }
    }
}
