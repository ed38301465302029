// Run-length encoder.
//
// Partitions the input into alternating literal spans and runs of a single
// repeated byte, then emits one section per span:
//
//     literal: header(len, true)  + len verbatim bytes
//     run:     header(len, false) + the repeated byte
//
// Runs are maximal and at least MIN_RUN bytes long. Adjacent runs of
// different bytes stay separate sections.

use crate::format::section::{self, SectionHeader};

/// Shortest repetition emitted as a run section.
pub const MIN_RUN: usize = 2;

// ---------------------------------------------------------------------------
// Span partition
// ---------------------------------------------------------------------------

/// One piece of the input partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span<'a> {
    /// Bytes copied through verbatim.
    Literal(&'a [u8]),
    /// `len` copies of `byte`.
    Run { byte: u8, len: usize },
}

impl Span<'_> {
    /// Number of input bytes this span covers.
    pub fn input_len(&self) -> usize {
        match self {
            Span::Literal(bytes) => bytes.len(),
            Span::Run { len, .. } => *len,
        }
    }

    pub fn header(&self) -> SectionHeader {
        match self {
            Span::Literal(bytes) => SectionHeader::literal(bytes.len() as u64),
            Span::Run { len, .. } => SectionHeader::run(*len as u64),
        }
    }

    /// Size of the section this span encodes to (header + payload).
    pub fn encoded_len(&self) -> usize {
        let header = self.header();
        header.encoded_len() + header.payload_len() as usize
    }
}

/// Iterator over the literal/run partition of a buffer.
///
/// Concatenating the covered bytes of every span reproduces the input.
pub struct Spans<'a> {
    data: &'a [u8],
    pos: usize,
    /// Run found while scanning past a literal; emitted on the next call.
    pending_run: Option<(u8, usize)>,
}

impl<'a> Spans<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            pending_run: None,
        }
    }
}

impl<'a> Iterator for Spans<'a> {
    type Item = Span<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((byte, len)) = self.pending_run.take() {
            return Some(Span::Run { byte, len });
        }

        let rest = self.data.get(self.pos..).filter(|r| !r.is_empty())?;

        let Some(run_start) = rest
            .windows(MIN_RUN)
            .position(|w| w.iter().all(|&b| b == w[0]))
        else {
            self.pos = self.data.len();
            return Some(Span::Literal(rest));
        };

        let byte = rest[run_start];
        let run_len = run_length(&rest[run_start..], byte);
        self.pos += run_start + run_len;

        if run_start == 0 {
            Some(Span::Run { byte, len: run_len })
        } else {
            self.pending_run = Some((byte, run_len));
            Some(Span::Literal(&rest[..run_start]))
        }
    }
}

/// Partition `data` into literal spans and runs.
pub fn spans(data: &[u8]) -> Spans<'_> {
    Spans::new(data)
}

/// Length of the prefix of `data` made of `byte`.
#[inline]
fn run_length(data: &[u8], byte: u8) -> usize {
    data.iter().take_while(|&&b| b == byte).count()
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Compress `data`, appending the sections to `out`.
pub fn encode_into(data: &[u8], out: &mut Vec<u8>) {
    for span in spans(data) {
        match span {
            Span::Literal(bytes) => {
                section::write_section(out, bytes.len() as u64, true);
                out.extend_from_slice(bytes);
            }
            Span::Run { byte, len } => {
                section::write_section(out, len as u64, false);
                out.push(byte);
            }
        }
    }
}

/// Compress `data` into a new buffer.
///
/// ```
/// use runpack::encode;
///
/// assert_eq!(encode(&[0x42, 0x42, 0x42]), [0x06, 0x42]);
/// assert!(encode(&[]).is_empty());
/// ```
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(data));
    encode_into(data, &mut out);
    out
}

/// Size `encode(data)` would produce, without producing it.
pub fn encoded_len(data: &[u8]) -> usize {
    spans(data).map(|s| s.encoded_len()).sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
