//! Portable scalar codec.
//!
//! Processes one 3-byte group (encode) or one 4-symbol group (decode) at a
//! time. It is a complete codec on its own and also finishes the remainder
//! left behind by every vector kernel.

use crate::error::Error;
use crate::translate::{ALPHABET, DECODE_TABLE, INVALID, PAD};

/// Encodes `src` into `dst` with `=` padding, returning the number of bytes written.
///
/// Panics if `dst` is shorter than [`crate::encoded_len`]`(src.len())`.
#[inline]
pub fn encode(src: &[u8], dst: &mut [u8]) -> usize {
    let full = src.len() - src.len() % 3;
    let (body, tail) = src.split_at(full);

    // Four groups per iteration for better instruction-level parallelism
    let mut blocks = body.chunks_exact(12);
    let mut out = 0;
    for block in &mut blocks {
        let dst = &mut dst[out..out + 16];
        encode_group(&block[0..3], &mut dst[0..4]);
        encode_group(&block[3..6], &mut dst[4..8]);
        encode_group(&block[6..9], &mut dst[8..12]);
        encode_group(&block[9..12], &mut dst[12..16]);
        out += 16;
    }
    for group in blocks.remainder().chunks_exact(3) {
        encode_group(group, &mut dst[out..out + 4]);
        out += 4;
    }

    match *tail {
        [b0] => {
            let dst = &mut dst[out..out + 4];
            dst[0] = ALPHABET[(b0 >> 2) as usize];
            dst[1] = ALPHABET[((b0 & 0x03) << 4) as usize];
            dst[2] = PAD;
            dst[3] = PAD;
            out + 4
        }
        [b0, b1] => {
            let dst = &mut dst[out..out + 4];
            dst[0] = ALPHABET[(b0 >> 2) as usize];
            dst[1] = ALPHABET[(((b0 & 0x03) << 4) | (b1 >> 4)) as usize];
            dst[2] = ALPHABET[((b1 & 0x0F) << 2) as usize];
            dst[3] = PAD;
            out + 4
        }
        _ => out,
    }
}

#[inline(always)]
fn encode_group(src: &[u8], dst: &mut [u8]) {
    let n = u32::from(src[0]) << 16 | u32::from(src[1]) << 8 | u32::from(src[2]);
    dst[0] = ALPHABET[(n >> 18) as usize & 0x3F];
    dst[1] = ALPHABET[(n >> 12) as usize & 0x3F];
    dst[2] = ALPHABET[(n >> 6) as usize & 0x3F];
    dst[3] = ALPHABET[n as usize & 0x3F];
}

/// Decodes padded base64 from `src` into `dst`, returning the number of bytes written.
///
/// Decoding is all-or-nothing: on error every byte written to `dst` is zeroed.
/// Error offsets are relative to `src`.
///
/// Panics if `dst` is shorter than the decoded output.
pub fn decode(src: &[u8], dst: &mut [u8]) -> Result<usize, Error> {
    let mut written = 0;
    let result = decode_into(src, dst, &mut written);
    if result.is_err() {
        dst[..written].fill(0);
    }
    result
}

fn decode_into(src: &[u8], dst: &mut [u8], written: &mut usize) -> Result<usize, Error> {
    if src.len() % 4 != 0 {
        return Err(Error::InvalidLength(src.len()));
    }
    let Some(last_start) = src.len().checked_sub(4) else {
        return Ok(0);
    };
    let (body, last) = src.split_at(last_start);

    for (i, quad) in body.chunks_exact(4).enumerate() {
        let n = decode_quad(quad).map_err(|e| e.offset_by(i * 4))?;
        let out = &mut dst[*written..*written + 3];
        out[0] = (n >> 16) as u8;
        out[1] = (n >> 8) as u8;
        out[2] = n as u8;
        *written += 3;
    }

    let n = decode_final(last, &mut dst[*written..]).map_err(|e| e.offset_by(last_start))?;
    *written += n;
    Ok(*written)
}

/// Decodes four symbols into a 24-bit value.
#[inline(always)]
fn decode_quad(quad: &[u8]) -> Result<u32, Error> {
    let v0 = DECODE_TABLE[quad[0] as usize];
    let v1 = DECODE_TABLE[quad[1] as usize];
    let v2 = DECODE_TABLE[quad[2] as usize];
    let v3 = DECODE_TABLE[quad[3] as usize];

    // Fast path: check all values at once
    if (v0 | v1 | v2 | v3) > 63 {
        return Err(find_invalid(quad));
    }
    Ok(u32::from(v0) << 18 | u32::from(v1) << 12 | u32::from(v2) << 6 | u32::from(v3))
}

/// Decodes the final group, which may carry one or two `=`.
fn decode_final(last: &[u8], dst: &mut [u8]) -> Result<usize, Error> {
    match (last[2], last[3]) {
        (PAD, PAD) => {
            let v0 = symbol(last, 0)?;
            let v1 = symbol(last, 1)?;
            dst[0] = (v0 << 2) | (v1 >> 4);
            Ok(1)
        }
        (_, PAD) => {
            let v0 = symbol(last, 0)?;
            let v1 = symbol(last, 1)?;
            let v2 = symbol(last, 2)?;
            let out = &mut dst[..2];
            out[0] = (v0 << 2) | (v1 >> 4);
            out[1] = (v1 << 4) | (v2 >> 2);
            Ok(2)
        }
        (PAD, _) => Err(Error::InvalidPadding { offset: 2 }),
        _ => {
            let n = decode_quad(last)?;
            let out = &mut dst[..3];
            out[0] = (n >> 16) as u8;
            out[1] = (n >> 8) as u8;
            out[2] = n as u8;
            Ok(3)
        }
    }
}

#[inline]
fn symbol(group: &[u8], offset: usize) -> Result<u8, Error> {
    match DECODE_TABLE[group[offset] as usize] {
        INVALID => Err(invalid_at(group[offset], offset)),
        v => Ok(v),
    }
}

#[cold]
fn find_invalid(quad: &[u8]) -> Error {
    quad.iter()
        .position(|&c| DECODE_TABLE[c as usize] == INVALID)
        .map(|offset| invalid_at(quad[offset], offset))
        .unwrap_or(Error::InvalidCharacter {
            byte: quad[0],
            offset: 0,
        })
}

fn invalid_at(byte: u8, offset: usize) -> Error {
    if byte == PAD {
        Error::InvalidPadding { offset }
    } else {
        Error::InvalidCharacter { byte, offset }
    }
}
