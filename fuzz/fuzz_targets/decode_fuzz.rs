#![no_main]
use libfuzzer_sys::fuzz_target;
use runpack::codec::{self, decoder};
use runpack::DecodeOptions;

fuzz_target!(|data: &[u8]| {
    // The decoder must never panic, only return errors.
    let opts = DecodeOptions::with_max_output(16 << 20);
    let decoded = decoder::decode_with(data, opts);

    // Section walking agrees with the decoder on success.
    let summary = codec::summarize(data);
    if let Ok(out) = decoded {
        assert_eq!(summary.unwrap().decoded_len(), out.len() as u64);
    }

    // The stream helper writes all of the output or none of it.
    let mut sink = Vec::new();
    match runpack::io::decode_stream(&mut &data[..], &mut sink, opts) {
        Ok(stats) => assert_eq!(stats.output_size, sink.len() as u64),
        Err(_) => assert!(sink.is_empty()),
    }

    // Header parsing at every offset stays in bounds.
    for offset in 0..=data.len() {
        let _ = runpack::decode_section(data, offset);
    }
});
