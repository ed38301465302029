#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // Use first byte as control flags.
    let flags = data[0];
    let payload = &data[1..];

    // Stretch payload bytes into runs so long sections get exercised.
    let input: Vec<u8> = if flags & 1 != 0 {
        payload
            .chunks(2)
            .flat_map(|pair| {
                let len = pair.get(1).map_or(1, |&n| n as usize);
                std::iter::repeat_n(pair[0], len)
            })
            .collect()
    } else {
        payload.to_vec()
    };

    let packed = runpack::encode(&input);
    assert_eq!(packed.len(), runpack::encoded_len(&input));

    let decoded = runpack::decode(&packed).unwrap();
    assert_eq!(decoded, input);
});
