//! Branch-free translation between 6-bit values and the standard alphabet.
//!
//! The vector kernels apply these formulas to every lane at once. The scalar
//! tables are generated from the same formulas at compile time, so the two
//! paths cannot drift apart.
//!
//! Encode classifies a value into five ranges and adds a per-range offset:
//!
//! ```text
//! #  From      To         Delta  LUT index  Characters
//! 0  [0..25]   [65..90]   +65    0          ABCDEFGHIJKLMNOPQRSTUVWXYZ
//! 1  [26..51]  [97..122]  +71    1          abcdefghijklmnopqrstuvwxyz
//! 2  [52..61]  [48..57]   -4     [2..11]    0123456789
//! 3  [62]      [43]       -19    12         +
//! 4  [63]      [47]       -16    13         /
//! ```
//!
//! Decode classifies a byte by its high and low nibble. Each nibble selects a
//! class bitmask; a byte is valid only when the two masks share no bit.

/// Saturating-subtract offset that collapses ranges 0 and 1 onto index 0.
pub(crate) const ENC_OFFSET: u8 = 51;

/// Largest value of range 0; everything above gets its index bumped by one.
pub(crate) const ENC_RANGE0_MAX: u8 = 25;

/// Additive deltas indexed by the corrected range index.
pub(crate) const ENC_DELTAS: [u8; 16] = [
    65, 71, 252, 252, 252, 252, 252, 252, 252, 252, 252, 252, 237, 240, 0, 0,
];

/// Class bits selected by the low nibble of an input byte.
pub(crate) const DEC_LUT_LO: [u8; 16] = [
    0x15, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x13, 0x1A, 0x1B, 0x1B, 0x1B, 0x1A,
];

/// Class bits selected by the high nibble of an input byte.
pub(crate) const DEC_LUT_HI: [u8; 16] = [
    0x10, 0x10, 0x01, 0x02, 0x04, 0x08, 0x04, 0x08, 0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x10,
];

/// Deltas added to a valid symbol, indexed by high nibble (`'/'` shifted down by one).
pub(crate) const DEC_ROLL: [u8; 16] = [
    0, 16, 19, 4, 191, 191, 185, 185, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// Padding character.
pub const PAD: u8 = b'=';

/// Marker in [`DECODE_TABLE`] for bytes outside the alphabet.
pub const INVALID: u8 = 0xFF;

/// Standard base64 alphabet (RFC 4648), generated by [`encode_symbol`].
pub const ALPHABET: [u8; 64] = build_alphabet();

/// Symbol to 6-bit value, [`INVALID`] for anything else. Generated by [`decode_symbol`].
pub const DECODE_TABLE: [u8; 256] = build_decode_table();

/// Translates a 6-bit value (`v < 64`) to its base64 symbol without branching.
#[inline]
pub const fn encode_symbol(v: u8) -> u8 {
    let index = v.saturating_sub(ENC_OFFSET);
    // 0xFF for ranges 1-4, 0x00 for range 0.
    let mask = 0u8.wrapping_sub((v > ENC_RANGE0_MAX) as u8);
    let index = index.wrapping_sub(mask);
    v.wrapping_add(ENC_DELTAS[(index & 0x0F) as usize])
}

/// Translates a base64 symbol back to its 6-bit value.
///
/// Returns `None` for any byte outside the alphabet, including `=`.
#[inline]
pub const fn decode_symbol(c: u8) -> Option<u8> {
    let hi = c >> 4;
    let lo = c & 0x0F;
    let class = DEC_LUT_LO[lo as usize] & DEC_LUT_HI[hi as usize];
    let eq_2f = 0u8.wrapping_sub((c == b'/') as u8);
    let roll = DEC_ROLL[(hi.wrapping_add(eq_2f) & 0x0F) as usize];
    if class != 0 {
        None
    } else {
        Some(c.wrapping_add(roll))
    }
}

const fn build_alphabet() -> [u8; 64] {
    let mut table = [0u8; 64];
    let mut i = 0;
    while i < 64 {
        table[i] = encode_symbol(i as u8);
        i += 1;
    }
    table
}

const fn build_decode_table() -> [u8; 256] {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < 256 {
        if let Some(v) = decode_symbol(i as u8) {
            table[i] = v;
        }
        i += 1;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    const RFC4648: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

    #[test]
    fn test_alphabet_matches_rfc4648() {
        assert_eq!(&ALPHABET, RFC4648);
    }

    #[test]
    fn test_every_value_maps_to_one_symbol() {
        let mut seen = [false; 256];
        for v in 0..64u8 {
            let c = encode_symbol(v);
            assert!(RFC4648.contains(&c), "value {} mapped outside alphabet", v);
            assert!(!seen[c as usize], "symbol {} produced twice", c as char);
            seen[c as usize] = true;
        }
    }

    #[test]
    fn test_decode_is_left_inverse() {
        for v in 0..64u8 {
            assert_eq!(decode_symbol(encode_symbol(v)), Some(v));
            assert_eq!(DECODE_TABLE[ALPHABET[v as usize] as usize], v);
        }
    }

    #[test]
    fn test_decode_rejects_non_alphabet_bytes() {
        for c in 0..=255u8 {
            let expected = RFC4648.iter().position(|&a| a == c).map(|p| p as u8);
            assert_eq!(decode_symbol(c), expected, "byte {:#04x}", c);
        }
        assert_eq!(DECODE_TABLE[PAD as usize], INVALID);
    }

    #[test]
    fn test_range_boundaries() {
        assert_eq!(encode_symbol(0), b'A');
        assert_eq!(encode_symbol(25), b'Z');
        assert_eq!(encode_symbol(26), b'a');
        assert_eq!(encode_symbol(51), b'z');
        assert_eq!(encode_symbol(52), b'0');
        assert_eq!(encode_symbol(61), b'9');
        assert_eq!(encode_symbol(62), b'+');
        assert_eq!(encode_symbol(63), b'/');
    }
}
