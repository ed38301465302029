use proptest::prelude::*;
use runpack::codec::decoder::{self, Section};
use runpack::codec::encoder::{self, MIN_RUN};
use runpack::format::section::{MAX_SECTION_LEN, write_section};
use runpack::format::varint::sizeof_value;
use runpack::io::decode_stream;
use runpack::{DecodeOptions, codec};
use runpack::{decode, decode_value, encode, encode_section, encode_value, encoded_len};

/// Bytes from a small alphabet so that runs are common.
fn runny_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(0u8..4, 0..max_len)
}

/// Section headers claiming lengths near the packable maximum.
fn huge_sections() -> impl Strategy<Value = Vec<u8>> {
    let lens = (MAX_SECTION_LEN >> 2)..=MAX_SECTION_LEN;
    proptest::collection::vec((lens, any::<bool>(), any::<u8>()), 1..6).prop_map(|sections| {
        let mut stream = Vec::new();
        for (len, literal, byte) in sections {
            write_section(&mut stream, len, literal);
            stream.push(byte);
        }
        stream
    })
}

/// Explicit runs of arbitrary bytes, concatenated.
fn run_list() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec((any::<u8>(), 1usize..300), 0..32).prop_map(|runs| {
        runs.into_iter()
            .flat_map(|(byte, len)| std::iter::repeat_n(byte, len))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_encode_decode_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
        let packed = encode(&data);
        prop_assert_eq!(decode(&packed).unwrap(), data);
    }

    #[test]
    fn prop_runny_roundtrip(data in runny_bytes(4096)) {
        prop_assert_eq!(decode(&encode(&data)).unwrap(), data);
    }

    #[test]
    fn prop_run_list_roundtrip(data in run_list()) {
        let packed = encode(&data);
        // At most 32 input runs, each costing at most a two-byte literal header.
        prop_assert!(packed.len() <= data.len() + 64);
        prop_assert_eq!(decode(&packed).unwrap(), data);
    }

    #[test]
    fn prop_varint_roundtrip(n in any::<u64>()) {
        let enc = encode_value(n);
        prop_assert_eq!(decode_value(&enc, 0).unwrap(), (n, enc.len()));
    }

    #[test]
    fn prop_varint_is_minimal(n in 1u64..) {
        let enc = encode_value(n);
        // Leading group carries value bits; only the last byte lacks the continuation bit.
        prop_assert_ne!(enc[0], 0x80);
        prop_assert_ne!(enc[0], 0x00);
        prop_assert!(enc[..enc.len() - 1].iter().all(|b| b & 0x80 != 0));
        prop_assert_eq!(enc[enc.len() - 1] & 0x80, 0);
        let bits = 64 - n.leading_zeros() as usize;
        prop_assert_eq!(enc.len(), bits.div_ceil(7));
        prop_assert_eq!(sizeof_value(n), enc.len());
    }

    #[test]
    fn prop_section_packs_length_and_flag(len in 0u64..(1 << 40), literal in any::<bool>()) {
        prop_assert_eq!(encode_section(len, literal), encode_value(len * 2 + u64::from(literal)));
    }

    #[test]
    fn prop_runs_are_at_least_two(data in runny_bytes(2048)) {
        let packed = encode(&data);
        for section in decoder::sections(&packed) {
            if let Section::Run { len, .. } = section.unwrap() {
                prop_assert!(len >= MIN_RUN);
            }
        }
    }

    #[test]
    fn prop_spans_alternate_kinds(data in runny_bytes(2048)) {
        // Two literal spans never sit next to each other.
        let spans: Vec<_> = encoder::spans(&data).collect();
        for pair in spans.windows(2) {
            let both_literal = matches!(
                pair,
                [encoder::Span::Literal(_), encoder::Span::Literal(_)]
            );
            prop_assert!(!both_literal);
        }
    }

    #[test]
    fn prop_encoded_len_matches(data in runny_bytes(2048)) {
        prop_assert_eq!(encoded_len(&data), encode(&data).len());
    }

    #[test]
    fn prop_decode_arbitrary_bytes_never_panics(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = runpack::decode_with(&data, DecodeOptions::with_max_output(1 << 16));
    }

    #[test]
    fn prop_summary_agrees_with_stream_decode(data in proptest::collection::vec(any::<u8>(), 0..256)) {
        let summary = codec::summarize(&data);
        let mut out = Vec::new();
        let streamed = decode_stream(&mut data.as_slice(), &mut out, DecodeOptions::with_max_output(1 << 16));
        match streamed {
            Ok(stats) => {
                prop_assert_eq!(stats.output_size, out.len() as u64);
                prop_assert_eq!(Ok(stats.summary), summary);
                prop_assert_eq!(stats.summary.decoded_len(), out.len() as u64);
            }
            Err(_) => prop_assert!(out.is_empty()),
        }
    }

    #[test]
    fn prop_huge_sections_are_rejected(stream in huge_sections()) {
        let _ = codec::summarize(&stream);
        let mut out = Vec::new();
        let streamed = decode_stream(&mut stream.as_slice(), &mut out, DecodeOptions::with_max_output(1 << 16));
        prop_assert!(streamed.is_err());
        prop_assert!(out.is_empty());
    }
}

#[test]
#[ignore = "performance properties are workload and machine dependent"]
fn perf_property_decode_not_pathological() {
    use std::time::Instant;
    let data: Vec<u8> = (0..16 * 1024 * 1024).map(|i| ((i / 7) % 251) as u8).collect();
    let packed = encode(&data);
    let t0 = Instant::now();
    let decoded = decode(&packed).unwrap();
    let dt = t0.elapsed();
    assert_eq!(decoded, data);
    assert!(dt.as_secs_f64() < 20.0, "decode took {:?}", dt);
}
