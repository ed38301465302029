// Variable-length integer encoding for section headers.
//
// Base-128, big-endian: most-significant group first.
// Each byte has bit 7 set except the final byte.
// The value 0 is the empty sequence; every other value uses the
// minimal number of 7-bit groups.

use std::io;

use thiserror::Error;

/// Maximum encoded length for a 64-bit value (ceil(64/7) = 10).
pub const MAX_VARINT_LEN: usize = 10;

/// Overflow guard for the 64-bit accumulator: if these bits are set before a
/// shift, the next `<< 7` would overflow.
const U64_OVERFLOW_MASK: u64 = 0xFE00_0000_0000_0000;

const CONTINUATION: u8 = 0x80;
const VALUE_MASK: u8 = 0x7F;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VarIntError {
    /// The buffer ended while the last byte still had its continuation bit set.
    #[error("varint truncated (input ended inside an integer)")]
    Truncated,
    /// Value would overflow a `u64`.
    #[error("varint overflow")]
    Overflow,
    /// Decoding started beyond the end of the buffer.
    #[error("varint offset {offset} is past the end of a {len}-byte buffer")]
    OffsetOutOfBounds { offset: usize, len: usize },
}

impl From<VarIntError> for io::Error {
    fn from(e: VarIntError) -> io::Error {
        io::Error::new(io::ErrorKind::InvalidData, e)
    }
}

// ---------------------------------------------------------------------------
// Sizing
// ---------------------------------------------------------------------------

/// Return the encoded byte-length of `num`.
///
/// Counts 7-bit groups by shifting, so exact powers of 128 land on the
/// right side of the boundary. Zero needs no bytes at all.
#[inline]
pub fn sizeof_value(mut num: u64) -> usize {
    let mut groups = 0;
    while num != 0 {
        num >>= 7;
        groups += 1;
    }
    groups
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Append the encoding of `num` to `out`.
pub fn write_value(out: &mut Vec<u8>, num: u64) {
    let len = sizeof_value(num);
    out.reserve(len);
    for group in (0..len).rev() {
        let bits = (num >> (7 * group)) as u8 & VALUE_MASK;
        if group == 0 {
            out.push(bits);
        } else {
            out.push(bits | CONTINUATION);
        }
    }
}

/// Encode `num` as a standalone byte vector.
///
/// ```
/// use runpack::format::varint::encode_value;
///
/// assert!(encode_value(0).is_empty());
/// assert_eq!(encode_value(127), [0x7F]);
/// assert_eq!(encode_value(128), [0x81, 0x00]);
/// ```
pub fn encode_value(num: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(sizeof_value(num));
    write_value(&mut out, num);
    out
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a value starting at `offset`.
/// Returns `(value, new_offset)` where `new_offset` is just past the last
/// byte consumed.
///
/// An `offset` equal to `bytes.len()` yields `(0, offset)`: the empty
/// sequence is the encoding of zero. Offsets beyond the end are rejected.
pub fn decode_value(bytes: &[u8], offset: usize) -> Result<(u64, usize), VarIntError> {
    if offset == bytes.len() {
        return Ok((0, offset));
    }
    let tail = bytes.get(offset..).ok_or(VarIntError::OffsetOutOfBounds {
        offset,
        len: bytes.len(),
    })?;

    let mut val: u64 = 0;
    for (i, &byte) in tail.iter().enumerate() {
        if val & U64_OVERFLOW_MASK != 0 {
            return Err(VarIntError::Overflow);
        }
        val = (val << 7) | u64::from(byte & VALUE_MASK);
        if byte & CONTINUATION == 0 {
            return Ok((val, offset + i + 1));
        }
    }
    Err(VarIntError::Truncated)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
