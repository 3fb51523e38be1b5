//! NEON SIMD kernels for aarch64.
//!
//! Encode deinterleaves 48 bytes into three 128-bit registers with `vld3q_u8`,
//! splits them into four registers of 6-bit fields, translates all four and
//! stores them interleaved with `vst4q_u8` (64 symbols). Decode works on
//! 64-bit registers: `vld4_u8` pulls 32 symbols apart into four fields,
//! which are validated, translated, repacked and stored with `vst3_u8`
//! (24 bytes).
//!
//! The two kernels differ only in how a 16-entry table lookup is done:
//!
//! - `neon64` uses the native `vqtbl1q_u8`/`vqtbl1_u8`.
//! - `neon32` uses the split-half shim: the table is cut into two 8-byte
//!   halves and looked up with `vtbl2_u8`, once per 64-bit half of the index
//!   vector. This is the only lookup a 32-bit ARM NEON unit has.
//!
//! On other targets the entry points return [`Error::NotApplicable`].

use crate::error::Error;

#[cfg(target_arch = "aarch64")]
use crate::driver::{self, Stride};
#[cfg(target_arch = "aarch64")]
use crate::translate::{DEC_LUT_HI, DEC_LUT_LO, DEC_ROLL, ENC_DELTAS, ENC_OFFSET, ENC_RANGE0_MAX};
#[cfg(target_arch = "aarch64")]
use core::arch::aarch64::*;
#[cfg(target_arch = "aarch64")]
use core::marker::PhantomData;

pub(crate) const NEON64: &str = "neon64";
pub(crate) const NEON32: &str = "neon32";

/// Check if NEON is available at runtime.
#[inline]
pub(crate) fn is_available() -> bool {
    #[cfg(target_arch = "aarch64")]
    {
        std::arch::is_aarch64_feature_detected!("neon")
    }
    #[cfg(not(target_arch = "aarch64"))]
    {
        false
    }
}

pub(crate) fn encode64(src: &[u8], dst: &mut [u8]) -> Result<usize, Error> {
    #[cfg(target_arch = "aarch64")]
    {
        if is_available() {
            // SAFETY: NEON was detected at runtime
            return Ok(unsafe { encode_neon::<Native>(src, dst) });
        }
    }
    #[cfg(not(target_arch = "aarch64"))]
    let _ = (src, dst);
    Err(Error::NotApplicable(NEON64))
}

pub(crate) fn decode64(src: &[u8], dst: &mut [u8]) -> Result<usize, Error> {
    #[cfg(target_arch = "aarch64")]
    {
        if is_available() {
            // SAFETY: NEON was detected at runtime
            return unsafe { decode_neon::<Native>(src, dst) };
        }
    }
    #[cfg(not(target_arch = "aarch64"))]
    let _ = (src, dst);
    Err(Error::NotApplicable(NEON64))
}

pub(crate) fn encode32(src: &[u8], dst: &mut [u8]) -> Result<usize, Error> {
    #[cfg(target_arch = "aarch64")]
    {
        if is_available() {
            // SAFETY: NEON was detected at runtime
            return Ok(unsafe { encode_neon::<SplitHalves>(src, dst) });
        }
    }
    #[cfg(not(target_arch = "aarch64"))]
    let _ = (src, dst);
    Err(Error::NotApplicable(NEON32))
}

pub(crate) fn decode32(src: &[u8], dst: &mut [u8]) -> Result<usize, Error> {
    #[cfg(target_arch = "aarch64")]
    {
        if is_available() {
            // SAFETY: NEON was detected at runtime
            return unsafe { decode_neon::<SplitHalves>(src, dst) };
        }
    }
    #[cfg(not(target_arch = "aarch64"))]
    let _ = (src, dst);
    Err(Error::NotApplicable(NEON32))
}

/// A 16-entry byte table lookup. Out-of-range indices yield zero.
#[cfg(target_arch = "aarch64")]
trait TableLookup {
    unsafe fn lookup16(table: uint8x16_t, indices: uint8x16_t) -> uint8x16_t;
    unsafe fn lookup8(table: uint8x16_t, indices: uint8x8_t) -> uint8x8_t;
}

#[cfg(target_arch = "aarch64")]
struct Native;

#[cfg(target_arch = "aarch64")]
impl TableLookup for Native {
    #[inline(always)]
    unsafe fn lookup16(table: uint8x16_t, indices: uint8x16_t) -> uint8x16_t {
        vqtbl1q_u8(table, indices)
    }

    #[inline(always)]
    unsafe fn lookup8(table: uint8x16_t, indices: uint8x8_t) -> uint8x8_t {
        vqtbl1_u8(table, indices)
    }
}

/// Portability shim for NEON units without a 128-bit table instruction.
#[cfg(target_arch = "aarch64")]
struct SplitHalves;

#[cfg(target_arch = "aarch64")]
impl TableLookup for SplitHalves {
    #[inline(always)]
    unsafe fn lookup16(table: uint8x16_t, indices: uint8x16_t) -> uint8x16_t {
        let halves = uint8x8x2_t(vget_low_u8(table), vget_high_u8(table));
        vcombine_u8(
            vtbl2_u8(halves, vget_low_u8(indices)),
            vtbl2_u8(halves, vget_high_u8(indices)),
        )
    }

    #[inline(always)]
    unsafe fn lookup8(table: uint8x16_t, indices: uint8x8_t) -> uint8x8_t {
        vtbl2_u8(uint8x8x2_t(vget_low_u8(table), vget_high_u8(table)), indices)
    }
}

#[cfg(target_arch = "aarch64")]
struct Neon<L>(PhantomData<L>);

#[cfg(target_arch = "aarch64")]
impl<L: TableLookup> Stride for Neon<L> {
    const ENC_IN: usize = 48;
    const ENC_OUT: usize = 64;
    const DEC_IN: usize = 32;
    const DEC_OUT: usize = 24;

    #[inline(always)]
    unsafe fn encode_stride(src: &[u8], dst: &mut [u8]) {
        encode_block::<L>(src, dst)
    }

    #[inline(always)]
    unsafe fn decode_stride(src: &[u8], dst: &mut [u8]) -> bool {
        decode_block::<L>(src, dst)
    }
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn encode_neon<L: TableLookup>(src: &[u8], dst: &mut [u8]) -> usize {
    driver::encode::<Neon<L>>(src, dst)
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn decode_neon<L: TableLookup>(src: &[u8], dst: &mut [u8]) -> Result<usize, Error> {
    driver::decode::<Neon<L>>(src, dst)
}

/// Splits deinterleaved bytes `a`, `b`, `c` into four 6-bit fields:
///
/// ```text
/// out.0 = 00 a7 a6 a5 a4 a3 a2
/// out.1 = 00 a1 a0 b7 b6 b5 b4
/// out.2 = 00 b3 b2 b1 b0 c7 c6
/// out.3 = 00 c5 c4 c3 c2 c1 c0
/// ```
#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
#[inline]
unsafe fn enc_reshuffle(input: uint8x16x3_t) -> uint8x16x4_t {
    let mask = vdupq_n_u8(0x3F);
    let f0 = vshrq_n_u8::<2>(input.0);
    let f1 = vsliq_n_u8::<4>(vshrq_n_u8::<4>(input.1), input.0);
    let f2 = vsliq_n_u8::<2>(vshrq_n_u8::<6>(input.2), input.1);
    uint8x16x4_t(f0, vandq_u8(f1, mask), vandq_u8(f2, mask), vandq_u8(input.2, mask))
}

#[cfg(target_arch = "aarch64")]
#[inline(always)]
unsafe fn enc_translate<L: TableLookup>(input: uint8x16_t, deltas: uint8x16_t) -> uint8x16_t {
    // Index is right for range 0 and one short for ranges 1-4
    let indices = vqsubq_u8(input, vdupq_n_u8(ENC_OFFSET));
    // 0xFF for ranges 1-4; subtracting it adds one
    let mask = vcgtq_u8(input, vdupq_n_u8(ENC_RANGE0_MAX));
    let indices = vsubq_u8(indices, mask);
    vaddq_u8(input, L::lookup16(deltas, indices))
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
#[inline]
unsafe fn encode_block<L: TableLookup>(src: &[u8], dst: &mut [u8]) {
    debug_assert!(src.len() >= 48 && dst.len() >= 64);
    let deltas = vld1q_u8(ENC_DELTAS.as_ptr());
    let fields = enc_reshuffle(vld3q_u8(src.as_ptr()));
    let out = uint8x16x4_t(
        enc_translate::<L>(fields.0, deltas),
        enc_translate::<L>(fields.1, deltas),
        enc_translate::<L>(fields.2, deltas),
        enc_translate::<L>(fields.3, deltas),
    );
    vst4q_u8(dst.as_mut_ptr(), out);
}

#[cfg(target_arch = "aarch64")]
struct DecodeLuts {
    lo: uint8x16_t,
    hi: uint8x16_t,
    roll: uint8x8_t,
}

/// Translates one register of symbols to 6-bit values in place and returns
/// its class mask, non-zero in every lane holding a non-alphabet byte.
#[cfg(target_arch = "aarch64")]
#[inline(always)]
unsafe fn dec_lane<L: TableLookup>(lane: &mut uint8x8_t, luts: &DecodeLuts) -> uint8x8_t {
    let hi_nibbles = vshr_n_u8::<4>(*lane);
    let lo_nibbles = vand_u8(*lane, vdup_n_u8(0x0F));
    let eq_2f = vceq_u8(*lane, vdup_n_u8(b'/'));

    let hi = L::lookup8(luts.hi, hi_nibbles);
    let lo = L::lookup8(luts.lo, lo_nibbles);

    // '/' shares its high nibble with '+', the equality mask moves it to slot 1
    *lane = vadd_u8(*lane, vtbl1_u8(luts.roll, vadd_u8(eq_2f, hi_nibbles)));
    vand_u8(lo, hi)
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
#[inline]
unsafe fn decode_block<L: TableLookup>(src: &[u8], dst: &mut [u8]) -> bool {
    debug_assert!(src.len() >= 32 && dst.len() >= 24);
    let luts = DecodeLuts {
        lo: vld1q_u8(DEC_LUT_LO.as_ptr()),
        hi: vld1q_u8(DEC_LUT_HI.as_ptr()),
        roll: vld1_u8(DEC_ROLL.as_ptr()),
    };

    let mut s = vld4_u8(src.as_ptr());
    let classified = vorr_u8(
        vorr_u8(dec_lane::<L>(&mut s.0, &luts), dec_lane::<L>(&mut s.1, &luts)),
        vorr_u8(dec_lane::<L>(&mut s.2, &luts), dec_lane::<L>(&mut s.3, &luts)),
    );
    if vget_lane_u64::<0>(vreinterpret_u64_u8(classified)) != 0 {
        return false;
    }

    // Compress four fields into three bytes
    let out = uint8x8x3_t(
        vorr_u8(vshl_n_u8::<2>(s.0), vshr_n_u8::<4>(s.1)),
        vorr_u8(vshl_n_u8::<4>(s.1), vshr_n_u8::<2>(s.2)),
        vorr_u8(vshl_n_u8::<6>(s.2), s.3),
    );
    vst3_u8(dst.as_mut_ptr(), out);
    true
}
