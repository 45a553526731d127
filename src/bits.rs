//! Bit-level helpers shared by the decoder and the execution engine.
//!
//! LC-3 instructions pack register numbers and two's-complement offsets
//! into fixed bit ranges of a 16-bit word. Everything here is a pure
//! function on `u16`.

/// Sign-extend the low `bit_count` bits of `value` to a full 16-bit word.
///
/// Bits above `bit_count` must already be zero; callers mask with
/// [`field`] first.
#[inline]
pub fn sign_extend(value: u16, bit_count: u32) -> u16 {
    debug_assert!((1..=16).contains(&bit_count));
    if bit_count < 16 && (value >> (bit_count - 1)) & 1 == 1 {
        value | (0xFFFF << bit_count)
    } else {
        value
    }
}

/// Extract `width` bits of `word` starting at bit `low`.
#[inline]
pub fn field(word: u16, low: u32, width: u32) -> u16 {
    (word >> low) & mask(width)
}

/// Extract a `width`-bit two's-complement field starting at bit 0 and
/// sign-extend it.
#[inline]
pub fn signed_field(word: u16, width: u32) -> u16 {
    sign_extend(field(word, 0, width), width)
}

/// Test a single bit.
#[inline]
pub fn bit(word: u16, n: u32) -> bool {
    (word >> n) & 1 == 1
}

/// A mask of the low `width` bits.
#[inline]
pub const fn mask(width: u32) -> u16 {
    if width >= 16 {
        0xFFFF
    } else {
        (1u16 << width) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Reference decode: interpret the low `n` bits as a signed integer.
    fn reference(v: u16, n: u32) -> i32 {
        let raw = (v & mask(n)) as i32;
        if raw >= 1 << (n - 1) {
            raw - (1 << n)
        } else {
            raw
        }
    }

    #[test]
    fn test_sign_extend_known_values() {
        assert_eq!(sign_extend(0b11101, 5), 0xFFFD);
        assert_eq!(sign_extend(0b01111, 5), 0x000F);
        assert_eq!(sign_extend(0x1FF, 9), 0xFFFF);
        assert_eq!(sign_extend(0x100, 9), 0xFF00);
        assert_eq!(sign_extend(0x400, 11), 0xFC00);
        assert_eq!(sign_extend(0x8000, 16), 0x8000);
    }

    #[test]
    fn test_sign_extend_exhaustive_small_widths() {
        for n in 1..=9 {
            for v in 0..(1u16 << n) {
                assert_eq!(sign_extend(v, n) as i16 as i32, reference(v, n), "v={v:#x} n={n}");
            }
        }
    }

    #[test]
    fn test_field_extraction() {
        // ADD R3, R5, #-1 = 0001 011 101 1 11111
        let word = 0b0001_011_101_1_11111;
        assert_eq!(field(word, 12, 4), 0b0001);
        assert_eq!(field(word, 9, 3), 3);
        assert_eq!(field(word, 6, 3), 5);
        assert!(bit(word, 5));
        assert_eq!(signed_field(word, 5), 0xFFFF);
    }

    proptest! {
        #[test]
        fn prop_sign_extend_matches_reference(v in any::<u16>(), n in 1u32..=16) {
            let extended = sign_extend(v & mask(n), n);
            prop_assert_eq!(extended as i16 as i32, reference(v, n));
        }

        #[test]
        fn prop_sign_extend_preserves_low_bits(v in any::<u16>(), n in 1u32..=16) {
            let masked = v & mask(n);
            prop_assert_eq!(sign_extend(masked, n) & mask(n), masked);
        }
    }
}
