//! Integration tests across every codec available on this machine

use std::sync::Once;

use base64_external::{engine::general_purpose::STANDARD, Engine};
use base64_kernels::{codecs, decoded_len, encoded_len, scalar, Codec, Config, Error, Force};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Input sizes straddling every vector stride: 24/48 bytes when encoding,
// 32 symbols (24 bytes) when decoding.
const STRIDES: [usize; 3] = [24, 48, 24];

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    });
}

fn available() -> impl Iterator<Item = &'static Codec> {
    codecs().iter().filter(|c| c.is_available())
}

fn encode_with(codec: &Codec, data: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; encoded_len(data.len())];
    let n = codec.encode(data, &mut out).unwrap();
    out.truncate(n);
    out
}

fn decode_with(codec: &Codec, encoded: &[u8]) -> Result<Vec<u8>, Error> {
    let mut out = vec![0u8; decoded_len(encoded.len())];
    let n = codec.decode(encoded, &mut out)?;
    out.truncate(n);
    Ok(out)
}

// ===== Round trips =====

#[test]
fn test_random_roundtrip_every_codec() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(0x6261_7365_3634);
    for _ in 0..300 {
        let len = rng.gen_range(0..2048);
        let mut data = vec![0u8; len];
        rng.fill(&mut data[..]);
        let expected = STANDARD.encode(&data);

        for c in available() {
            let encoded = encode_with(c, &data);
            assert_eq!(encoded, expected.as_bytes(), "{} len {}", c.name(), len);
            assert_eq!(decode_with(c, &encoded).unwrap(), data, "{} len {}", c.name(), len);
        }
    }
}

#[test]
fn test_stride_boundaries() {
    init_tracing();
    for stride in STRIDES {
        for k in 0..3 {
            for extra in 0..3 {
                let len = k * stride + extra;
                let data: Vec<u8> = (0..len).map(|i| (i * 251 + 13) as u8).collect();
                let expected = STANDARD.encode(&data);
                for c in available() {
                    let encoded = encode_with(c, &data);
                    assert_eq!(encoded, expected.as_bytes(), "{} len {}", c.name(), len);
                    assert_eq!(decode_with(c, &encoded).unwrap(), data, "{} len {}", c.name(), len);
                }
            }
        }
    }
}

#[test]
fn test_decode_symbol_counts_at_stride_boundaries() {
    // 32-symbol decode strides, plus or minus a group.
    for symbols in [4, 28, 32, 36, 60, 64, 68, 96, 100] {
        let data = vec![0xC3u8; symbols / 4 * 3];
        let encoded = STANDARD.encode(&data);
        assert_eq!(encoded.len(), symbols);
        for c in available() {
            assert_eq!(decode_with(c, encoded.as_bytes()).unwrap(), data, "{}", c.name());
        }
    }
}

#[test]
fn test_large_input() {
    let data: Vec<u8> = (0..1 << 20).map(|i: u32| (i ^ (i >> 7)) as u8).collect();
    let expected = encode_with(scalar(), &data);
    for c in available() {
        assert_eq!(encode_with(c, &data), expected, "{}", c.name());
        assert_eq!(decode_with(c, &expected).unwrap(), data, "{}", c.name());
    }
}

// ===== Error parity =====

#[test]
fn test_invalid_byte_error_parity() {
    let mut rng = StdRng::seed_from_u64(7);
    let data: Vec<u8> = (0..300).map(|_| rng.gen()).collect();
    let encoded = encode_with(scalar(), &data);

    for pos in 0..encoded.len() - 4 {
        for bad in [b'*', b'\n', 0x80, 0xFF, b'='] {
            let mut input = encoded.clone();
            input[pos] = bad;
            let expected = decode_with(scalar(), &input).unwrap_err();
            match expected {
                Error::InvalidCharacter { offset, .. } | Error::InvalidPadding { offset } => {
                    assert_eq!(offset, pos)
                }
                other => panic!("unexpected error {:?}", other),
            }
            for c in available() {
                assert_eq!(decode_with(c, &input), Err(expected), "{} pos {}", c.name(), pos);
            }
        }
    }
}

#[test]
fn test_error_leaves_no_output() {
    let encoded = STANDARD.encode(vec![0x11u8; 240]);
    let mut input = encoded.into_bytes();
    let last = input.len() - 5;
    input[last] = b'.';
    for c in available() {
        let mut out = vec![0xEEu8; decoded_len(input.len())];
        assert!(c.decode(&input, &mut out).is_err(), "{}", c.name());
        let produced = last / 4 * 3;
        assert!(out[..produced].iter().all(|&b| b == 0), "{}", c.name());
    }
}

#[test]
fn test_padding_error_parity() {
    for input in ["TQ==TWFu", "TWFu====", "TWFuT=Fu", "TWFuTW=u", "=WFu"] {
        let expected = decode_with(scalar(), input.as_bytes()).unwrap_err();
        assert!(expected.is_invalid_encoding());
        for c in available() {
            assert_eq!(decode_with(c, input.as_bytes()), Err(expected), "{} {}", c.name(), input);
        }
    }
}

#[test]
fn test_unavailable_codecs_are_not_applicable() {
    for c in codecs().iter().filter(|c| !c.is_available()) {
        let mut out = [0u8; 64];
        assert_eq!(c.encode(&[0u8; 48], &mut out), Err(Error::NotApplicable(c.name())));
        assert_eq!(c.decode(&[b'A'; 64], &mut out), Err(Error::NotApplicable(c.name())));
    }
}

// ===== Selection =====

#[test]
fn test_forced_codec_selection() {
    init_tracing();
    for c in codecs() {
        let config = Config::parse(Some(c.name()));
        assert_eq!(config.requested, Force::Codec(c));
        assert!(config.effective.is_available());
    }
    assert_eq!(Config::parse(Some("portable")).effective, scalar());
    assert_eq!(Config::parse(Some("nonsense")).requested, Force::Auto);
}

#[test]
fn test_top_level_api_uses_an_available_codec() {
    init_tracing();
    assert!(base64_kernels::active().is_available());
    assert_eq!(base64_kernels::encode(b"Man"), "TWFu");
    assert_eq!(base64_kernels::decode("TWFu").unwrap(), b"Man");
}
