//! Trits, trytes and their textual forms.
//!
//! Conversions go through `iota-conversion`, which maps characters outside
//! the alphabet to zero trits; everything here validates first.

use iota_conversion::Trinary;

use crate::error::TrinaryError;

/// A balanced ternary digit, one of `-1`, `0` or `1`.
pub type Trit = i8;

pub use iota_constants::{
    MAX_TRIT_VALUE, MAX_TRYTE_VALUE, MIN_TRIT_VALUE, MIN_TRYTE_VALUE, TRITS_PER_TRYTE,
    TRYTE_ALPHABET,
};

pub const RADIX: i8 = iota_constants::TRINARY_RADIX as i8;

/// Trits in a Curl hash, an address or a merkle node.
pub const HASH_LENGTH: usize = iota_constants::HASH_TRINARY_SIZE;
/// Trytes in a hash.
pub const TRYTES_PER_HASH: usize = iota_constants::HASH_TRYTES_SIZE;

fn alphabet_index(c: char) -> Option<usize> {
    TRYTE_ALPHABET.iter().position(|&t| t == c)
}

/// Trit triple for a tryte character, least significant trit first.
pub fn char_to_trits(c: char) -> Option<[Trit; TRITS_PER_TRYTE]> {
    alphabet_index(c)?;
    let mut out = [0; TRITS_PER_TRYTE];
    out.copy_from_slice(&c.to_string().trits());
    Some(out)
}

/// Tryte character for three trits.
pub fn trits_to_char(trits: &[Trit]) -> Option<char> {
    if trits.len() != TRITS_PER_TRYTE || !is_trits(trits) {
        return None;
    }
    trits.trytes().ok()?.chars().next()
}

/// Whether every element is a valid trit.
pub fn is_trits(trits: &[Trit]) -> bool {
    trits
        .iter()
        .all(|&t| (MIN_TRIT_VALUE..=MAX_TRIT_VALUE).contains(&t))
}

/// Validate a trit sequence that must hold whole trytes.
pub fn check_trytes(trits: &[Trit]) -> Result<(), TrinaryError> {
    if let Some(&bad) = trits
        .iter()
        .find(|t| !(MIN_TRIT_VALUE..=MAX_TRIT_VALUE).contains(*t))
    {
        return Err(TrinaryError::InvalidTrit(bad));
    }
    if trits.len() % TRITS_PER_TRYTE != 0 {
        return Err(TrinaryError::Unaligned(trits.len()));
    }
    Ok(())
}

pub fn trits_from_trytes(trytes: &str) -> Result<Vec<Trit>, TrinaryError> {
    if let Some(bad) = trytes.chars().find(|&c| alphabet_index(c).is_none()) {
        return Err(TrinaryError::InvalidTryte(bad));
    }
    Ok(trytes.trits())
}

pub fn trytes_from_trits(trits: &[Trit]) -> Result<String, TrinaryError> {
    check_trytes(trits)?;
    trits.trytes().map_err(TrinaryError::backend)
}

/// Pack bytes two trytes per byte: `b % 27` then `b / 27`.
pub fn trytes_from_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(TRYTE_ALPHABET[(b % 27) as usize]);
        out.push(TRYTE_ALPHABET[(b / 27) as usize]);
    }
    out
}

/// Inverse of [`trytes_from_bytes`].
pub fn bytes_from_trytes(trytes: &str) -> Result<Vec<u8>, TrinaryError> {
    let indices = trytes
        .chars()
        .map(|c| alphabet_index(c).ok_or(TrinaryError::InvalidTryte(c)))
        .collect::<Result<Vec<_>, _>>()?;
    if indices.len() % 2 != 0 {
        return Err(TrinaryError::InvalidByte(indices.len() - 1));
    }
    indices
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| {
            let value = pair[0] + pair[1] * 27;
            u8::try_from(value).map_err(|_| TrinaryError::InvalidByte(i * 2))
        })
        .collect()
}

pub fn trits_from_bytes(bytes: &[u8]) -> Vec<Trit> {
    trytes_from_bytes(bytes).trits()
}

pub fn bytes_from_trits(trits: &[Trit]) -> Result<Vec<u8>, TrinaryError> {
    bytes_from_trytes(&trytes_from_trits(trits)?)
}
