//! Runpack: lossless run-length compression with varint section headers.
//!
//! The crate provides:
//! - The wire format (`format`): big-endian base-128 varints and
//!   `(length, literal)` section headers
//! - The whole-buffer codec (`codec`): `encode` / `decode`
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! A compressed buffer is a plain concatenation of sections. Runs of two or
//! more equal bytes become `header(len, false) + byte`; everything else is
//! copied through as `header(len, true) + bytes`.
//!
//! # Quick Start
//!
//! ```
//! let data = b"aaaaaaaabcdddd";
//! let packed = runpack::encode(data);
//! assert_eq!(packed, [0x10, b'a', 0x05, b'b', b'c', 0x08, b'd']);
//! assert_eq!(runpack::decode(&packed).unwrap(), data);
//! ```

pub mod codec;
pub mod format;
pub mod io;

#[cfg(feature = "cli")]
pub mod cli;

pub use codec::decoder::{DecodeError, DecodeOptions, decode, decode_with};
pub use codec::encoder::{encode, encoded_len};
pub use format::section::{SectionHeader, decode_section, encode_section};
pub use format::varint::{VarIntError, decode_value, encode_value};
