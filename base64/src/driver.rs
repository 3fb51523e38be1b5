//! Strided loop driver shared by the vector kernels.
//!
//! A kernel supplies one encode stride and one decode stride; the driver
//! runs them over the input, advancing both cursors, and hands whatever is
//! shorter than a stride to the scalar codec.

use crate::error::Error;
use crate::scalar;

/// One vector stride of a kernel.
///
/// Encode strides consume a multiple of 3 bytes and decode strides a multiple
/// of 4, so no group ever straddles two iterations.
pub(crate) trait Stride {
    /// Bytes consumed per encode stride.
    const ENC_IN: usize;
    /// Symbols produced per encode stride.
    const ENC_OUT: usize;
    /// Symbols consumed per decode stride.
    const DEC_IN: usize;
    /// Bytes produced per decode stride.
    const DEC_OUT: usize;

    /// Encodes exactly `ENC_IN` bytes from `src` into `ENC_OUT` bytes of `dst`.
    ///
    /// # Safety
    /// `src.len() >= ENC_IN`, `dst.len() >= ENC_OUT`, and the CPU supports the kernel.
    unsafe fn encode_stride(src: &[u8], dst: &mut [u8]);

    /// Decodes exactly `DEC_IN` symbols from `src` into `DEC_OUT` bytes of `dst`.
    ///
    /// Returns `false`, leaving `dst` untouched, if any symbol is outside
    /// the alphabet (`=` included).
    ///
    /// # Safety
    /// `src.len() >= DEC_IN`, `dst.len() >= DEC_OUT`, and the CPU supports the kernel.
    unsafe fn decode_stride(src: &[u8], dst: &mut [u8]) -> bool;
}

/// Runs full encode strides, returning how many were processed.
///
/// # Safety
/// The CPU supports `K`. Panics if `dst` cannot hold the strides' output.
#[inline(always)]
pub(crate) unsafe fn encode_strides<K: Stride>(src: &[u8], dst: &mut [u8]) -> usize {
    let rounds = src.len() / K::ENC_IN;
    let dst = &mut dst[..rounds * K::ENC_OUT];
    for (s, d) in src.chunks_exact(K::ENC_IN).zip(dst.chunks_exact_mut(K::ENC_OUT)) {
        K::encode_stride(s, d);
    }
    rounds
}

/// Encodes all of `src`: vector strides first, then the scalar remainder.
///
/// # Safety
/// The CPU supports `K`. Panics if `dst` is shorter than the encoded output.
#[inline(always)]
pub(crate) unsafe fn encode<K: Stride>(src: &[u8], dst: &mut [u8]) -> usize {
    let rounds = encode_strides::<K>(src, dst);
    let (consumed, produced) = (rounds * K::ENC_IN, rounds * K::ENC_OUT);
    produced + scalar::encode(&src[consumed..], &mut dst[produced..])
}

/// Runs decode strides until fewer than one stride remains or a stride is
/// invalid, returning how many succeeded.
///
/// # Safety
/// The CPU supports `K`. Panics if `dst` cannot hold the strides' output.
#[inline(always)]
pub(crate) unsafe fn decode_strides<K: Stride>(src: &[u8], dst: &mut [u8]) -> usize {
    let rounds = src.len() / K::DEC_IN;
    let dst = &mut dst[..rounds * K::DEC_OUT];
    let mut done = 0;
    for (s, d) in src.chunks_exact(K::DEC_IN).zip(dst.chunks_exact_mut(K::DEC_OUT)) {
        if !K::decode_stride(s, d) {
            break;
        }
        done += 1;
    }
    done
}

/// Decodes all of `src`, all-or-nothing.
///
/// The final group never enters a vector stride, so padding is always seen
/// by the scalar codec. If a stride reports invalid input, the scalar codec
/// resumes at that stride and produces the precise error.
///
/// # Safety
/// The CPU supports `K`. Panics if `dst` is shorter than the decoded output.
#[inline(always)]
pub(crate) unsafe fn decode<K: Stride>(src: &[u8], dst: &mut [u8]) -> Result<usize, Error> {
    if src.len() % 4 != 0 {
        return Err(Error::InvalidLength(src.len()));
    }
    let body = &src[..src.len().saturating_sub(4)];
    let rounds = decode_strides::<K>(body, dst);
    let (consumed, produced) = (rounds * K::DEC_IN, rounds * K::DEC_OUT);

    match scalar::decode(&src[consumed..], &mut dst[produced..]) {
        Ok(n) => Ok(produced + n),
        Err(e) => {
            dst[..produced].fill(0);
            Err(e.offset_by(consumed))
        }
    }
}
