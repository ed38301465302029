// Whole-buffer run-length codec.
//
// - `encoder`: literal/run partition and section emission
// - `decoder`: bounds-checked section walking and reconstruction
//
// `summarize` reports what a compressed buffer is made of without
// materializing the decoded output.

pub mod decoder;
pub mod encoder;

pub use decoder::{DecodeError, DecodeOptions, Section, Sections, decode, decode_with};
pub use encoder::{MIN_RUN, Span, Spans, encode, encoded_len};

/// Section counts for a compressed buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionSummary {
    pub literal_sections: u64,
    pub run_sections: u64,
    /// Decoded bytes produced by literal sections.
    pub literal_bytes: u64,
    /// Decoded bytes produced by run sections.
    pub run_bytes: u64,
}

impl SectionSummary {
    pub fn sections(&self) -> u64 {
        self.literal_sections.saturating_add(self.run_sections)
    }

    /// Total decoded size.
    pub fn decoded_len(&self) -> u64 {
        self.literal_bytes.saturating_add(self.run_bytes)
    }

    /// Compressed size divided by decoded size (0.0 for empty output).
    pub fn ratio(&self, compressed_len: usize) -> f64 {
        match self.decoded_len() {
            0 => 0.0,
            n => compressed_len as f64 / n as f64,
        }
    }

    /// Add one section; the decoded total must stay within `u64`.
    fn record(&mut self, section: &Section<'_>) -> Result<(), DecodeError> {
        let len = section.output_len() as u64;
        self.literal_bytes
            .checked_add(self.run_bytes)
            .and_then(|total| total.checked_add(len))
            .ok_or(DecodeError::SizeOverflow {
                offset: section.offset(),
            })?;
        match section {
            Section::Literal { .. } => {
                self.literal_sections += 1;
                self.literal_bytes += len;
            }
            Section::Run { .. } => {
                self.run_sections += 1;
                self.run_bytes += len;
            }
        }
        Ok(())
    }
}

/// Walk every section of `compressed` and tally it.
pub fn summarize(compressed: &[u8]) -> Result<SectionSummary, DecodeError> {
    let mut summary = SectionSummary::default();
    for section in decoder::sections(compressed) {
        let section = section?;
        log::trace!(
            "section at {}: {} output bytes",
            section.offset(),
            section.output_len()
        );
        summary.record(&section)?;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::section::MAX_SECTION_LEN;

    #[test]
    fn summary_counts() {
        let data = b"aaaab cdddd";
        let summary = summarize(&encode(data)).unwrap();
        assert_eq!(summary.run_sections, 2);
        assert_eq!(summary.literal_sections, 1);
        assert_eq!(summary.run_bytes, 8);
        assert_eq!(summary.literal_bytes, 3);
        assert_eq!(summary.decoded_len(), data.len() as u64);
        assert_eq!(summary.sections(), 3);
    }

    #[test]
    fn empty_summary() {
        let summary = summarize(&[]).unwrap();
        assert_eq!(summary, SectionSummary::default());
        assert_eq!(summary.ratio(0), 0.0);
    }

    #[test]
    fn ratio_of_long_run() {
        let compressed = encode(&[1u8; 1000]);
        let summary = summarize(&compressed).unwrap();
        assert!(summary.ratio(compressed.len()) < 0.01);
    }

    #[test]
    fn summarize_propagates_errors() {
        assert!(summarize(&[0x0B, 0x00]).is_err());
    }

    /// Run sections that each claim just under 2^63 bytes.
    fn giant_runs(count: usize) -> Vec<u8> {
        let mut stream = Vec::new();
        for _ in 0..count {
            crate::format::section::write_section(&mut stream, MAX_SECTION_LEN - 1, false);
            stream.push(0);
        }
        stream
    }

    #[test]
    fn summary_rejects_overflowing_total() {
        // A single run of that size is only addressable on 64-bit hosts.
        if usize::BITS == 64 {
            let one = summarize(&giant_runs(1)).unwrap();
            assert_eq!(one.run_bytes, MAX_SECTION_LEN - 1);
        }
        let err = summarize(&giant_runs(3)).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::SizeOverflow { .. } | DecodeError::LengthOverflow { .. }
        ));
    }

    #[test]
    fn summary_rejects_overflow_across_kinds() {
        let mut summary = SectionSummary {
            literal_bytes: u64::MAX - 1,
            ..Default::default()
        };
        let run = Section::Run {
            offset: 7,
            byte: 0,
            len: 2,
        };
        assert_eq!(
            summary.record(&run),
            Err(DecodeError::SizeOverflow { offset: 7 })
        );
        assert_eq!(summary.run_sections, 0);
        assert_eq!(summary.run_bytes, 0);
    }
}
