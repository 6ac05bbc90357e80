//! Pascal encoding: self-delimiting non-negative integers in trits.
//!
//! A number is written as balanced trytes, least significant first. Every
//! tryte but the last is made non-positive by negating the positive ones, and
//! the last is always positive, so a reader stops at the first positive
//! tryte. Which trytes were negated is recorded as a bit mask of
//! `min_trits(2^n - 1)` trits following the `n` trytes. Zero has its own
//! four trit form.

use iota_trinary::num;
use iota_trinary::trytes::{Trit, TRITS_PER_TRYTE};
use thiserror::Error;

const ZERO: [Trit; 4] = [1, 0, 0, -1];
/// Longest encoding in trytes; enough for `u64::MAX`.
const MAX_TRYTES: usize = 14;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PascalError {
    #[error("input ends inside an encoded number")]
    Truncated,

    #[error("encoded number is longer than {MAX_TRYTES} trytes")]
    TooLong,

    #[error("encoded number does not fit a usize")]
    Overflow,

    #[error("encoding is not canonical")]
    NonCanonical,
}

fn encoder_length(trytes: usize) -> usize {
    num::min_trits((1u64 << trytes) - 1)
}

fn write_unsigned(mut value: u64, out: &mut [Trit]) {
    for slot in out.iter_mut() {
        let mut digit = (value % 3) as Trit;
        value /= 3;
        if digit > 1 {
            digit = -1;
            value += 1;
        }
        *slot = digit;
    }
}

pub fn encoded_length(value: usize) -> usize {
    if value == 0 {
        ZERO.len()
    } else {
        let length = num::round_third(num::min_trits(value as u64));
        length + encoder_length(length / TRITS_PER_TRYTE)
    }
}

pub fn encode(value: usize) -> Vec<Trit> {
    if value == 0 {
        return ZERO.to_vec();
    }
    let length = num::round_third(num::min_trits(value as u64));
    let trytes = length / TRITS_PER_TRYTE;
    let mut out = vec![0; length + encoder_length(trytes)];
    write_unsigned(value as u64, &mut out[..length]);

    // The most significant tryte of a positive number is already positive.
    let mut encoding = 0i64;
    for (i, tryte) in out[..length - TRITS_PER_TRYTE]
        .chunks_mut(TRITS_PER_TRYTE)
        .enumerate()
    {
        if num::trits2int(tryte) > 0 {
            encoding |= 1 << i;
            tryte.iter_mut().for_each(|t| *t = -*t);
        }
    }
    num::write_trits(encoding, &mut out[length..]);
    out
}

/// Decode a number from the front of `input`, returning it together with the
/// number of trits it occupied.
pub fn decode(input: &[Trit]) -> Result<(usize, usize), PascalError> {
    if input.starts_with(&ZERO) {
        return Ok((0, ZERO.len()));
    }

    let mut trytes = 0;
    loop {
        if trytes == MAX_TRYTES {
            return Err(PascalError::TooLong);
        }
        let tryte = input
            .get(trytes * TRITS_PER_TRYTE..(trytes + 1) * TRITS_PER_TRYTE)
            .ok_or(PascalError::Truncated)?;
        trytes += 1;
        if num::trits2int(tryte) > 0 {
            break;
        }
    }

    let length = trytes * TRITS_PER_TRYTE;
    let end = length + encoder_length(trytes);
    let encoding = num::trits2int(input.get(length..end).ok_or(PascalError::Truncated)?);
    if encoding < 0 {
        return Err(PascalError::NonCanonical);
    }

    let value = input[..length]
        .chunks(TRITS_PER_TRYTE)
        .enumerate()
        .fold(0i128, |acc, (i, tryte)| {
            let digit = num::trits2int(tryte) as i128;
            let digit = if (encoding >> i) & 1 == 1 { -digit } else { digit };
            acc + 27i128.pow(i as u32) * digit
        });
    let value = usize::try_from(value).map_err(|_| PascalError::Overflow)?;

    if encode(value).as_slice() != &input[..end] {
        return Err(PascalError::NonCanonical);
    }
    Ok((value, end))
}
