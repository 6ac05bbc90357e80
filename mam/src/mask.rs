//! Autokey stream cipher over Curl.
//!
//! The sponge absorbs the key, and each rate-sized chunk of plaintext is
//! added to the current keystream before being absorbed itself, so every
//! chunk's keystream depends on all the plaintext before it.

use iota_trinary::curl::Curl;
use iota_trinary::num::trit_sum;
use iota_trinary::{Digest, Trit, HASH_LENGTH};

use crate::mode::SideKey;

/// Masking key of a message: its side key (or the placeholder) then its root.
pub fn channel_key(side_key: &SideKey, root: &Digest) -> Vec<Trit> {
    let mut key = Vec::with_capacity(2 * HASH_LENGTH);
    key.extend_from_slice(side_key.trits());
    key.extend_from_slice(root.trits());
    key
}

pub fn mask<C: Curl>(payload: &mut [Trit], key: &[Trit], curl: &mut C) {
    curl.absorb(key);
    let mut key_chunk = [0 as Trit; HASH_LENGTH];
    curl.squeeze(&mut key_chunk);
    for chunk in payload.chunks_mut(HASH_LENGTH) {
        let len = chunk.len();
        curl.absorb(chunk);
        for (trit, k) in chunk.iter_mut().zip(key_chunk.iter()) {
            *trit = trit_sum(*trit, *k);
        }
        key_chunk[..len].copy_from_slice(&curl.rate()[..len]);
    }
}

pub fn unmask<C: Curl>(payload: &mut [Trit], key: &[Trit], curl: &mut C) {
    curl.absorb(key);
    let mut key_chunk = [0 as Trit; HASH_LENGTH];
    curl.squeeze(&mut key_chunk);
    for chunk in payload.chunks_mut(HASH_LENGTH) {
        let len = chunk.len();
        for (trit, k) in chunk.iter_mut().zip(key_chunk.iter()) {
            *trit = trit_sum(*trit, -*k);
        }
        curl.absorb(chunk);
        key_chunk[..len].copy_from_slice(&curl.rate()[..len]);
    }
}
