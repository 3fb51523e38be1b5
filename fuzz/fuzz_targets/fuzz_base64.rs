#![no_main]

use base64_external::{engine::general_purpose::STANDARD, Engine};
use base64_kernels::{codecs, decoded_len, encoded_len, scalar};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut expected = vec![0u8; encoded_len(data.len())];
    let n = scalar().encode(data, &mut expected).unwrap();
    expected.truncate(n);

    // Conformance with external crate
    assert_eq!(expected, STANDARD.encode(data).as_bytes(), "External crate encode mismatch");

    // Fuzz input treated as base64 text
    let mut scalar_out = vec![0u8; decoded_len(data.len())];
    let scalar_result = scalar().decode(data, &mut scalar_out);
    if let Ok(n) = scalar_result {
        let external = STANDARD.decode(data);
        // The external crate rejects non-zero trailing bits
        if let Ok(external) = external {
            assert_eq!(&scalar_out[..n], &external[..], "External crate decode mismatch");
        }
    }

    for codec in codecs().iter().filter(|c| c.is_available()) {
        let mut encoded = vec![0u8; encoded_len(data.len())];
        let n = codec.encode(data, &mut encoded).unwrap();
        assert_eq!(&encoded[..n], &expected[..], "{} encode mismatch", codec.name());

        let mut decoded = vec![0u8; data.len()];
        let m = codec.decode(&encoded[..n], &mut decoded).unwrap();
        assert_eq!(&decoded[..m], data, "{} roundtrip failed", codec.name());

        let mut out = vec![0u8; decoded_len(data.len())];
        match (codec.decode(data, &mut out), scalar_result) {
            (Ok(a), Ok(b)) => assert_eq!(&out[..a], &scalar_out[..b], "{} decode mismatch", codec.name()),
            (Err(a), Err(b)) => assert_eq!(a, b, "{} error mismatch", codec.name()),
            (a, b) => panic!("{} disagrees with scalar: {:?} vs {:?}", codec.name(), a, b),
        }
    }
});
