//! The Curl-P sponge.
//!
//! The permutation is `iota_crypto::Curl`; this module puts it behind the
//! small [`Curl`] trait the message codec and the merkle tree are generic
//! over, and adds direct access to the rate.

use iota_crypto::HashMode;

use crate::digest::Digest;
use crate::trytes::{Trit, HASH_LENGTH};

pub use iota_crypto::Curl as CpuCurl;

/// Curl-P-81, the variant every channel hash uses.
pub const MODE: HashMode = HashMode::CURLP81;

/// A ternary sponge with a 243 trit rate.
pub trait Curl: Default + Clone {
    /// Absorb `trits` in rate sized chunks, transforming after each one.
    fn absorb(&mut self, trits: &[Trit]);
    /// Fill `out` from the rate, transforming after each chunk.
    fn squeeze(&mut self, out: &mut [Trit]);
    /// The current rate, without transforming.
    fn rate(&self) -> &[Trit];
    fn reset(&mut self);
}

impl Curl for CpuCurl {
    fn absorb(&mut self, trits: &[Trit]) {
        // Curl-P accepts any length; only Kerl can fail here.
        let _ = iota_crypto::Sponge::absorb(self, trits);
    }

    fn squeeze(&mut self, out: &mut [Trit]) {
        // iota-crypto only squeezes whole rates, so a short tail goes
        // through a scratch rate.
        let whole = out.len() - out.len() % HASH_LENGTH;
        let (full, tail) = out.split_at_mut(whole);
        let _ = iota_crypto::Sponge::squeeze(self, full);
        if !tail.is_empty() {
            let mut chunk = [0 as Trit; HASH_LENGTH];
            let _ = iota_crypto::Sponge::squeeze(self, &mut chunk);
            tail.copy_from_slice(&chunk[..tail.len()]);
        }
    }

    fn rate(&self) -> &[Trit] {
        &self.state()[..HASH_LENGTH]
    }

    fn reset(&mut self) {
        iota_crypto::Sponge::reset(self);
    }
}

/// Absorb `input` into a fresh sponge and squeeze one hash.
pub fn hash<C: Curl>(input: &[Trit]) -> Digest {
    let mut curl = C::default();
    curl.absorb(input);
    let mut out = [0; HASH_LENGTH];
    curl.squeeze(&mut out);
    Digest::new(out)
}
