//! Integer conversion and arithmetic on little-endian balanced trits.

use iota_conversion::Trinary;

use crate::trytes::{Trit, RADIX, TRITS_PER_TRYTE};

/// Longest trit sequence [`trits2int`] converts without overflowing `i64`.
pub const MAX_INT_TRITS: usize = 39;

/// Sum of two trits, wrapped back into `{-1, 0, 1}`.
#[inline]
pub fn trit_sum(a: Trit, b: Trit) -> Trit {
    match a + b {
        2 => -1,
        -2 => 1,
        s => s,
    }
}

/// Smallest number of trits that can hold `value` in balanced form.
/// Zero still takes one trit.
pub fn min_trits(value: u64) -> usize {
    let value = value as u128;
    let mut trits = 1;
    let mut max = 1u128;
    while value > max {
        trits += 1;
        max = max * RADIX as u128 + 1;
    }
    trits
}

/// Round a trit count up to whole trytes.
#[inline]
pub fn round_third(length: usize) -> usize {
    length.div_ceil(TRITS_PER_TRYTE) * TRITS_PER_TRYTE
}

/// Write `value` into `out`, zero filling the tail. Digits that do not fit
/// are dropped. Returns the number of significant trits written.
pub fn write_trits(value: i64, out: &mut [Trit]) -> usize {
    let trits = value.trits();
    let written = trits.len().min(out.len());
    out[..written].copy_from_slice(&trits[..written]);
    out[written..].fill(0);
    written
}

/// Minimal balanced representation of `value`; zero is a single trit.
pub fn int2trits(value: i64) -> Vec<Trit> {
    value.trits_with_length(min_trits(value.unsigned_abs()))
}

/// Value of a trit sequence of at most [`MAX_INT_TRITS`] trits.
pub fn trits2int(trits: &[Trit]) -> i64 {
    debug_assert!(trits.len() <= MAX_INT_TRITS);
    iota_conversion::long_value(trits)
}

/// Add `value` to the number held in `trits`, discarding overflow.
pub fn add_assign(trits: &mut [Trit], value: i64) {
    let mut carry = value;
    for trit in trits.iter_mut() {
        if carry == 0 {
            break;
        }
        let sum = *trit as i64 + carry;
        let digit = (sum + 1).rem_euclid(RADIX as i64) - 1;
        carry = (sum - digit) / RADIX as i64;
        *trit = digit as Trit;
    }
}
