// File-level I/O helpers for run-length encoding/decoding.
//
// Provides `encode_file()` / `decode_file()` and their reader/writer forms.
// Input is read fully into memory (the codec works on whole buffers), output
// goes through a `BufWriter`. Optionally computes SHA-256 digests of the
// uncompressed side (feature-gated behind `file-io`).

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::codec::decoder::{self, DecodeError, DecodeOptions};
use crate::codec::{self, SectionSummary, encoder};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `encode_file()`.
#[derive(Debug, Clone)]
pub struct EncodeStats {
    /// Uncompressed input size in bytes.
    pub input_size: u64,
    /// Compressed output size in bytes.
    pub output_size: u64,
    /// Section breakdown of the compressed output.
    pub summary: SectionSummary,
    /// SHA-256 of the input (if `file-io` feature is enabled).
    pub input_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `decode_file()`.
#[derive(Debug, Clone)]
pub struct DecodeStats {
    /// Compressed input size in bytes.
    pub input_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
    /// Section breakdown of the compressed input.
    pub summary: SectionSummary,
    /// SHA-256 of the reconstructed output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file I/O operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// I/O error (file open, read, write).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Malformed compressed input.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

pub(crate) const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Read all of `reader`, compress it, and write the result to `writer`.
pub fn encode_stream<R: Read, W: Write>(reader: &mut R, writer: &mut W) -> Result<EncodeStats, IoError> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;

    let compressed = encoder::encode(&input);
    writer.write_all(&compressed)?;
    writer.flush()?;

    // Freshly encoded output always parses.
    let summary = codec::summarize(&compressed)?;
    log::debug!(
        "encoded {} bytes into {} ({} sections)",
        input.len(),
        compressed.len(),
        summary.sections()
    );

    Ok(EncodeStats {
        input_size: input.len() as u64,
        output_size: compressed.len() as u64,
        summary,
        input_sha256: digest(&input),
    })
}

/// Compress the file at `input_path` into `output_path`.
pub fn encode_file(input_path: &Path, output_path: &Path) -> Result<EncodeStats, IoError> {
    let mut input = File::open(input_path)?;
    let mut output = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    encode_stream(&mut input, &mut output)
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decompress an in-memory buffer and describe the result.
///
/// Limits in `opts` are enforced before the section summary is built.
pub fn decode_buffer(input: &[u8], opts: DecodeOptions) -> Result<(Vec<u8>, DecodeStats), DecodeError> {
    let output = decoder::decode_with(input, opts)?;
    let summary = codec::summarize(input)?;
    log::debug!(
        "decoded {} bytes into {} ({} sections)",
        input.len(),
        output.len(),
        summary.sections()
    );

    let stats = DecodeStats {
        input_size: input.len() as u64,
        output_size: output.len() as u64,
        summary,
        output_sha256: digest(&output),
    };
    Ok((output, stats))
}

/// Read all of `reader`, decompress it, and write the result to `writer`.
///
/// Nothing is written if the input is malformed.
pub fn decode_stream<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    opts: DecodeOptions,
) -> Result<DecodeStats, IoError> {
    let mut input = Vec::new();
    reader.read_to_end(&mut input)?;

    let (output, stats) = decode_buffer(&input, opts)?;
    writer.write_all(&output)?;
    writer.flush()?;
    Ok(stats)
}

/// Decompress the file at `input_path` into `output_path`.
///
/// `output_path` is only created or truncated after the whole input has
/// decoded successfully.
pub fn decode_file(
    input_path: &Path,
    output_path: &Path,
    opts: DecodeOptions,
) -> Result<DecodeStats, IoError> {
    let input = std::fs::read(input_path)?;
    let (output, stats) = decode_buffer(&input, opts)?;

    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    writer.write_all(&output)?;
    writer.flush()?;
    Ok(stats)
}

// ---------------------------------------------------------------------------
// Digest
// ---------------------------------------------------------------------------

#[cfg(feature = "file-io")]
fn digest(data: &[u8]) -> Option<[u8; 32]> {
    use sha2::Digest;
    Some(sha2::Sha256::digest(data).into())
}

#[cfg(not(feature = "file-io"))]
fn digest(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

/// Lowercase hex rendering of a digest.
pub fn hex_digest(digest: &[u8; 32]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
