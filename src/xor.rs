// Byte-wise XOR difference between two payloads.
//
// The shorter operand reads as zero past its end, and the result is trimmed
// to its last nonzero byte. Both operands are assumed to describe the same
// offsets; nothing is aligned or shifted.
//
// Trimming means `xor(xor(a, b), a) == b` only when `b` does not end in zero
// bytes (or `a` is at least as long and carries the same tail). Keyframes are
// never XORed and so always round-trip exactly.

use crate::error::{Error, Result};
use crate::pool::Buffer;

/// XOR `a` and `b` into `out[..max(a.len(), b.len())]` and return the trimmed
/// length: one past the last nonzero byte, or 0.
///
/// # Panics
///
/// Panics if `out` is shorter than the longer operand.
pub fn xor_into(a: &[u8], b: &[u8], out: &mut [u8]) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let out = &mut out[..long.len()];

    for ((o, &x), &y) in out.iter_mut().zip(long).zip(short) {
        *o = x ^ y;
    }
    out[short.len()..].copy_from_slice(&long[short.len()..]);

    out.iter().rposition(|&byte| byte != 0).map_or(0, |last| last + 1)
}

/// XOR `a` and `b` into `out`, setting its length to the trimmed result.
///
/// Fails with `InvalidLength` when the longer operand exceeds the capacity of
/// `out`; `out` is left unchanged in that case.
pub fn xor(a: &[u8], b: &[u8], out: &mut Buffer) -> Result<()> {
    let length = a.len().max(b.len());
    let capacity = out.capacity();
    if length > capacity {
        return Err(Error::InvalidLength { length, capacity });
    }

    out.resize(length)?;
    let trimmed = xor_into(a, b, out.as_mut_slice());
    out.resize(trimmed)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
