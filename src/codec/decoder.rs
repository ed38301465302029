// Run-length decoder.
//
// Walks the compressed buffer one section at a time. Literal sections are
// copied through, run sections expand their single payload byte. Every
// payload is bounds-checked against the buffer before it is touched; a
// section that runs off the end aborts the whole decode.

use thiserror::Error;

use crate::format::section::{self, SectionHeader};
use crate::format::varint::VarIntError;

// ---------------------------------------------------------------------------
// Decoder error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The section header at `offset` is not a valid varint.
    #[error("invalid section header at offset {offset}: {source}")]
    Header {
        offset: usize,
        #[source]
        source: VarIntError,
    },
    /// A section payload extends past the end of the buffer.
    #[error(
        "truncated input: section at offset {offset} needs {needed} payload bytes, {available} available"
    )]
    Truncated {
        offset: usize,
        needed: u64,
        available: usize,
    },
    /// A section length does not fit in memory on this platform.
    #[error("section at offset {offset} has unaddressable length {len}")]
    LengthOverflow { offset: usize, len: u64 },
    /// The total decoded size no longer fits a `u64`.
    #[error("decoded size overflows at section offset {offset}")]
    SizeOverflow { offset: usize },
    /// Decoded output would exceed the configured limit.
    #[error("decoded output would reach {needed} bytes, limit is {limit}")]
    OutputLimit { limit: usize, needed: u64 },
    /// The allocator refused to grow the output buffer.
    #[error("cannot allocate {requested} bytes of output")]
    Alloc { requested: usize },
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Decode-time limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Upper bound on the number of decoded bytes (`None` = unlimited).
    pub max_output: Option<usize>,
}

impl DecodeOptions {
    pub fn with_max_output(max_output: usize) -> Self {
        Self {
            max_output: Some(max_output),
        }
    }
}

// ---------------------------------------------------------------------------
// Section iterator
// ---------------------------------------------------------------------------

/// A validated section of a compressed buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section<'a> {
    /// Verbatim bytes; `offset` is the position of the section header.
    Literal { offset: usize, data: &'a [u8] },
    /// `len` copies of `byte`.
    Run { offset: usize, byte: u8, len: usize },
}

impl Section<'_> {
    /// Offset of the section header within the compressed buffer.
    pub fn offset(&self) -> usize {
        match self {
            Section::Literal { offset, .. } | Section::Run { offset, .. } => *offset,
        }
    }

    /// Number of bytes this section decodes to.
    pub fn output_len(&self) -> usize {
        match self {
            Section::Literal { data, .. } => data.len(),
            Section::Run { len, .. } => *len,
        }
    }
}

/// Iterates over the sections of a compressed buffer.
///
/// Yields `Err` at most once; iteration ends after the first error.
pub struct Sections<'a> {
    data: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> Sections<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            failed: false,
        }
    }

    /// Offset of the next section header.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn parse_next(&mut self) -> Result<Section<'a>, DecodeError> {
        let data = self.data;
        let offset = self.pos;
        let (header, start) = section::decode_section(data, offset)
            .map_err(|source| DecodeError::Header { offset, source })?;
        let available = data.len() - start;

        if header.payload_len() > available as u64 {
            return Err(truncated(offset, header, available));
        }

        if header.literal {
            // Bounded by `available` above, so the length fits a usize.
            let len = header.len as usize;
            self.pos = start + len;
            Ok(Section::Literal {
                offset,
                data: &data[start..start + len],
            })
        } else {
            let len = usize::try_from(header.len).map_err(|_| DecodeError::LengthOverflow {
                offset,
                len: header.len,
            })?;
            self.pos = start + 1;
            Ok(Section::Run {
                offset,
                byte: data[start],
                len,
            })
        }
    }
}

fn truncated(offset: usize, header: SectionHeader, available: usize) -> DecodeError {
    DecodeError::Truncated {
        offset,
        needed: header.payload_len(),
        available,
    }
}

impl<'a> Iterator for Sections<'a> {
    type Item = Result<Section<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }
        let item = self.parse_next();
        if item.is_err() {
            self.failed = true;
        }
        Some(item)
    }
}

/// Iterate over the sections of `data`.
pub fn sections(data: &[u8]) -> Sections<'_> {
    Sections::new(data)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decompress `data`, appending the result to `out`.
///
/// On error `out` is restored to its original length.
pub fn decode_into(data: &[u8], out: &mut Vec<u8>, opts: DecodeOptions) -> Result<(), DecodeError> {
    let base = out.len();
    let result = decode_sections(data, out, base, opts);
    if result.is_err() {
        out.truncate(base);
    }
    result
}

fn decode_sections(
    data: &[u8],
    out: &mut Vec<u8>,
    base: usize,
    opts: DecodeOptions,
) -> Result<(), DecodeError> {
    for section in sections(data) {
        let section = section?;
        let produced = out.len() - base;

        if let Some(limit) = opts.max_output {
            let needed = (produced as u64).saturating_add(section.output_len() as u64);
            if needed > limit as u64 {
                return Err(DecodeError::OutputLimit { limit, needed });
            }
        }

        match section {
            Section::Literal { data, .. } => out.extend_from_slice(data),
            Section::Run { byte, len, .. } => {
                out.try_reserve(len)
                    .map_err(|_| DecodeError::Alloc { requested: len })?;
                out.resize(out.len() + len, byte);
            }
        }
    }
    Ok(())
}

/// Decompress `data` with explicit limits.
pub fn decode_with(data: &[u8], opts: DecodeOptions) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::new();
    decode_into(data, &mut out, opts)?;
    Ok(out)
}

/// Decompress `data`.
///
/// ```
/// use runpack::{decode, encode};
///
/// let data = b"aaaaaaaabcd";
/// assert_eq!(decode(&encode(data)).unwrap(), data);
/// assert!(decode(&[0x0B, 1, 2]).is_err());
/// ```
pub fn decode(data: &[u8]) -> Result<Vec<u8>, DecodeError> {
    decode_with(data, DecodeOptions::default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
