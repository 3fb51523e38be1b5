//! AVX2 SIMD kernel for x86_64.
//!
//! Encodes 24 bytes into 32 symbols and decodes 32 symbols into 24 bytes per
//! stride. On other targets, or when AVX2 is not detected, the entry points
//! return [`Error::NotApplicable`].

use crate::error::Error;

#[cfg(target_arch = "x86_64")]
use crate::driver::{self, Stride};
#[cfg(target_arch = "x86_64")]
use crate::translate::{DEC_LUT_HI, DEC_LUT_LO, DEC_ROLL, ENC_DELTAS, ENC_OFFSET, ENC_RANGE0_MAX};
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

pub(crate) const NAME: &str = "avx2";

/// Check if AVX2 is available at runtime.
#[inline]
pub(crate) fn is_available() -> bool {
    #[cfg(target_arch = "x86_64")]
    {
        is_x86_feature_detected!("avx2")
    }
    #[cfg(not(target_arch = "x86_64"))]
    {
        false
    }
}

pub(crate) fn encode(src: &[u8], dst: &mut [u8]) -> Result<usize, Error> {
    #[cfg(target_arch = "x86_64")]
    {
        if is_available() {
            // SAFETY: AVX2 was detected at runtime
            return Ok(unsafe { encode_avx2(src, dst) });
        }
    }
    #[cfg(not(target_arch = "x86_64"))]
    let _ = (src, dst);
    Err(Error::NotApplicable(NAME))
}

pub(crate) fn decode(src: &[u8], dst: &mut [u8]) -> Result<usize, Error> {
    #[cfg(target_arch = "x86_64")]
    {
        if is_available() {
            // SAFETY: AVX2 was detected at runtime
            return unsafe { decode_avx2(src, dst) };
        }
    }
    #[cfg(not(target_arch = "x86_64"))]
    let _ = (src, dst);
    Err(Error::NotApplicable(NAME))
}

#[cfg(target_arch = "x86_64")]
struct Avx2;

#[cfg(target_arch = "x86_64")]
impl Stride for Avx2 {
    const ENC_IN: usize = 24;
    const ENC_OUT: usize = 32;
    const DEC_IN: usize = 32;
    const DEC_OUT: usize = 24;

    #[inline(always)]
    unsafe fn encode_stride(src: &[u8], dst: &mut [u8]) {
        encode_block(src, dst)
    }

    #[inline(always)]
    unsafe fn decode_stride(src: &[u8], dst: &mut [u8]) -> bool {
        decode_block(src, dst)
    }
}

/// Encode using AVX2 SIMD instructions.
///
/// # Safety
/// Caller must ensure AVX2 is available (check with `is_available()`).
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn encode_avx2(src: &[u8], dst: &mut [u8]) -> usize {
    driver::encode::<Avx2>(src, dst)
}

/// Decode using AVX2 SIMD instructions.
///
/// # Safety
/// Caller must ensure AVX2 is available (check with `is_available()`).
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn decode_avx2(src: &[u8], dst: &mut [u8]) -> Result<usize, Error> {
    driver::decode::<Avx2>(src, dst)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn broadcast_lut(table: &[u8; 16]) -> __m256i {
    _mm256_broadcastsi128_si256(_mm_loadu_si128(table.as_ptr() as *const __m128i))
}

/// Loads 24 bytes so that each 128-bit lane holds four 3-byte groups
/// repeated as `b1 b0 b2 b1`, ready for the multiply-based field split.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn enc_load(src: &[u8]) -> __m256i {
    // Low lane reads bytes 0..16 and uses 0..12, high lane reads 8..24 and uses 12..24.
    let lo = _mm_loadu_si128(src.as_ptr() as *const __m128i);
    let hi = _mm_loadu_si128(src.as_ptr().add(8) as *const __m128i);
    let input = _mm256_inserti128_si256::<1>(_mm256_castsi128_si256(lo), hi);
    _mm256_shuffle_epi8(
        input,
        _mm256_setr_epi8(
            1, 0, 2, 1, 4, 3, 5, 4, 7, 6, 8, 7, 10, 9, 11, 10, //
            5, 4, 6, 5, 8, 7, 9, 8, 11, 10, 12, 11, 14, 13, 15, 14,
        ),
    )
}

/// Splits each 32-bit `b1 b0 b2 b1` word into four 6-bit fields, one per byte.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn enc_reshuffle(input: __m256i) -> __m256i {
    // https://github.com/WojciechMula/base64simd/blob/master/encode/unpack_bigendian.cpp
    let t0 = _mm256_and_si256(input, _mm256_set1_epi32(0x0fc0fc00u32 as i32));
    let t1 = _mm256_mulhi_epu16(t0, _mm256_set1_epi32(0x04000040));

    let t2 = _mm256_and_si256(input, _mm256_set1_epi32(0x003f03f0));
    let t3 = _mm256_mullo_epi16(t2, _mm256_set1_epi32(0x01000010));

    _mm256_or_si256(t1, t3)
}

/// Translate 6-bit indices to ASCII characters for the standard alphabet.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn enc_translate(input: __m256i) -> __m256i {
    let lut = broadcast_lut(&ENC_DELTAS);
    let mut indices = _mm256_subs_epu8(input, _mm256_set1_epi8(ENC_OFFSET as i8));
    let mask = _mm256_cmpgt_epi8(input, _mm256_set1_epi8(ENC_RANGE0_MAX as i8));
    indices = _mm256_sub_epi8(indices, mask);

    _mm256_add_epi8(input, _mm256_shuffle_epi8(lut, indices))
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn encode_block(src: &[u8], dst: &mut [u8]) {
    debug_assert!(src.len() >= 24 && dst.len() >= 32);
    let translated = enc_translate(enc_reshuffle(enc_load(src)));
    _mm256_storeu_si256(dst.as_mut_ptr() as *mut __m256i, translated);
}

/// Reshuffle decoded 6-bit values into bytes. The 24 result bytes land in
/// bytes 0..24 of the register.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn dec_reshuffle(input: __m256i) -> __m256i {
    let merge_ab_and_bc = _mm256_maddubs_epi16(input, _mm256_set1_epi32(0x01400140));
    let out = _mm256_madd_epi16(merge_ab_and_bc, _mm256_set1_epi32(0x00011000));

    let out = _mm256_shuffle_epi8(
        out,
        _mm256_setr_epi8(
            2, 1, 0, 6, 5, 4, 10, 9, 8, 14, 13, 12, -1, -1, -1, -1, //
            2, 1, 0, 6, 5, 4, 10, 9, 8, 14, 13, 12, -1, -1, -1, -1,
        ),
    );
    _mm256_permutevar8x32_epi32(out, _mm256_setr_epi32(0, 1, 2, 4, 5, 6, -1, -1))
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn decode_block(src: &[u8], dst: &mut [u8]) -> bool {
    debug_assert!(src.len() >= 32 && dst.len() >= 24);
    let lut_lo = broadcast_lut(&DEC_LUT_LO);
    let lut_hi = broadcast_lut(&DEC_LUT_HI);
    let lut_roll = broadcast_lut(&DEC_ROLL);
    let mask_2f = _mm256_set1_epi8(0x2f);

    let str_vec = _mm256_loadu_si256(src.as_ptr() as *const __m256i);

    // Bit 7 stays clear in both index vectors, so the shuffles only see the nibble.
    let hi_nibbles = _mm256_and_si256(_mm256_srli_epi32(str_vec, 4), mask_2f);
    let lo_nibbles = _mm256_and_si256(str_vec, mask_2f);

    let lo = _mm256_shuffle_epi8(lut_lo, lo_nibbles);
    let hi = _mm256_shuffle_epi8(lut_hi, hi_nibbles);
    if _mm256_testz_si256(lo, hi) == 0 {
        return false;
    }

    let eq_2f = _mm256_cmpeq_epi8(str_vec, mask_2f);
    let roll = _mm256_shuffle_epi8(lut_roll, _mm256_add_epi8(eq_2f, hi_nibbles));
    let result = dec_reshuffle(_mm256_add_epi8(str_vec, roll));

    // Store exactly 24 bytes
    _mm_storeu_si128(dst.as_mut_ptr() as *mut __m128i, _mm256_castsi256_si128(result));
    _mm_storel_epi64(
        dst.as_mut_ptr().add(16) as *mut __m128i,
        _mm256_extracti128_si256::<1>(result),
    );
    true
}
