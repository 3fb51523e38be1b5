//! Vectorized base64 (RFC 4648, standard alphabet, `=` padding).
//!
//! Each codec pairs an encode and a decode kernel with the CPU feature it
//! needs. The vector kernels process fixed strides (48 bytes into 64 symbols
//! and 32 symbols into 24 bytes on NEON, 24 into 32 and 32 into 24 on AVX2)
//! and hand the tail to the scalar codec, which alone handles padding.
//!
//! The top-level functions use the codec picked by [`active`]. Set
//! `BASE64_KERNELS_FORCE` to a codec name to override the choice.
//!
//! ```
//! assert_eq!(base64_kernels::encode(b"Man"), "TWFu");
//! assert_eq!(base64_kernels::decode("TWE=").unwrap(), b"Ma");
//! assert!(base64_kernels::decode("!!!!").is_err());
//! ```

mod avx2;
mod codec;
mod config;
mod driver;
mod error;
mod neon;
mod scalar;
mod translate;

pub use codec::{codec, codecs, scalar, Codec, Feature, KernelFn};
pub use config::{active, detect, Config, Force, FORCE_ENV};
pub use error::Error;
pub use translate::{ALPHABET, PAD};

/// Number of symbols produced by encoding `len` bytes, padding included.
///
/// ```
/// use base64_kernels::encoded_len;
///
/// assert_eq!(encoded_len(0), 0);
/// assert_eq!(encoded_len(1), 4);
/// assert_eq!(encoded_len(4), 8);
/// ```
pub const fn encoded_len(len: usize) -> usize {
    len.div_ceil(3) * 4
}

/// Upper bound on the bytes produced by decoding `len` symbols.
pub const fn decoded_len(len: usize) -> usize {
    len.div_ceil(4) * 3
}

/// Encodes `src` into `dst`, returning the number of symbols written.
///
/// `dst` must hold at least [`encoded_len`]`(src.len())` bytes.
pub fn encode_to_slice(src: &[u8], dst: &mut [u8]) -> Result<usize, Error> {
    match active().encode(src, dst) {
        Err(Error::NotApplicable(_)) => scalar().encode(src, dst),
        result => result,
    }
}

/// Decodes `src` into `dst`, returning the number of bytes written.
///
/// Decoding is all-or-nothing: on error, no decoded bytes remain in `dst`.
pub fn decode_to_slice(src: &[u8], dst: &mut [u8]) -> Result<usize, Error> {
    match active().decode(src, dst) {
        Err(Error::NotApplicable(_)) => scalar().decode(src, dst),
        result => result,
    }
}

/// Encodes `src` into a padded base64 string.
pub fn encode(src: impl AsRef<[u8]>) -> String {
    let src = src.as_ref();
    let mut out = vec![0u8; encoded_len(src.len())];
    let n = match encode_to_slice(src, &mut out) {
        Ok(n) => n,
        // The buffer is sized exactly, which leaves scalar as the only option.
        Err(_) => scalar::encode(src, &mut out),
    };
    out.truncate(n);
    // SAFETY: every codec writes only alphabet symbols and `=`, all ASCII.
    unsafe { String::from_utf8_unchecked(out) }
}

/// Decodes padded base64 into bytes.
pub fn decode(src: impl AsRef<[u8]>) -> Result<Vec<u8>, Error> {
    let src = src.as_ref();
    let mut out = vec![0u8; decoded_len(src.len())];
    let n = decode_to_slice(src, &mut out)?;
    out.truncate(n);
    Ok(out)
}
