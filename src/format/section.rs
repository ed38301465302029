// Section header encoding/decoding.
//
// A section header packs `(len, literal)` into one varint:
//
//     packed = len << 1 | literal
//
// Literal sections are followed by `len` verbatim bytes; run sections by a
// single byte that repeats `len` times.

use super::varint::{self, VarIntError};

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Largest length that still fits the packed header after the flag shift.
pub const MAX_SECTION_LEN: u64 = u64::MAX >> 1;

/// Low bit of the packed header: set for literal sections.
const LITERAL_FLAG: u64 = 1;

// ---------------------------------------------------------------------------
// SectionHeader
// ---------------------------------------------------------------------------

/// Decoded section header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionHeader {
    /// Literal byte count, or repetition count for runs.
    pub len: u64,
    /// `true` when `len` verbatim bytes follow, `false` for a run.
    pub literal: bool,
}

impl SectionHeader {
    pub fn literal(len: u64) -> Self {
        Self { len, literal: true }
    }

    pub fn run(len: u64) -> Self {
        Self {
            len,
            literal: false,
        }
    }

    /// The integer this header is serialized as.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds [`MAX_SECTION_LEN`].
    pub fn packed(&self) -> u64 {
        assert!(
            self.len <= MAX_SECTION_LEN,
            "section length {} exceeds {MAX_SECTION_LEN}",
            self.len
        );
        (self.len << 1) | u64::from(self.literal)
    }

    pub fn from_packed(value: u64) -> Self {
        Self {
            len: value >> 1,
            literal: value & LITERAL_FLAG != 0,
        }
    }

    /// Number of bytes the serialized header occupies.
    pub fn encoded_len(&self) -> usize {
        varint::sizeof_value(self.packed())
    }

    /// Number of payload bytes following the header in the compressed stream.
    pub fn payload_len(&self) -> u64 {
        if self.literal { self.len } else { 1 }
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Append a section header to `out`.
///
/// # Panics
///
/// Panics if `len` exceeds [`MAX_SECTION_LEN`].
pub fn write_section(out: &mut Vec<u8>, len: u64, literal: bool) {
    let header = SectionHeader { len, literal };
    varint::write_value(out, header.packed());
}

/// Encode a section header as a standalone byte vector.
///
/// ```
/// use runpack::format::section::encode_section;
/// use runpack::format::varint::encode_value;
///
/// assert_eq!(encode_section(5, true), encode_value(11));
/// assert_eq!(encode_section(10, false), [0x14]);
/// ```
///
/// # Panics
///
/// Panics if `len` exceeds [`MAX_SECTION_LEN`].
pub fn encode_section(len: u64, literal: bool) -> Vec<u8> {
    let mut out = Vec::new();
    write_section(&mut out, len, literal);
    out
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a section header starting at `offset`.
/// Returns the header and the offset of its first payload byte.
pub fn decode_section(bytes: &[u8], offset: usize) -> Result<(SectionHeader, usize), VarIntError> {
    let (value, next) = varint::decode_value(bytes, offset)?;
    Ok((SectionHeader::from_packed(value), next))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
