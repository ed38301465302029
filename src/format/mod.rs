// Compressed stream wire format.
//
// # Modules
//
// - `varint`:  Variable-length integer encoding (base-128, big-endian)
// - `section`: Section header packing (length << 1 | literal flag)

pub mod section;
pub mod varint;

pub use section::{MAX_SECTION_LEN, SectionHeader, decode_section, encode_section};
pub use varint::{VarIntError, decode_value, encode_value};
