//! Branch-free masks and the final sign reduction.
//!
//! Every helper here is pure integer arithmetic. None of them compare a value
//! against anything, so the generated code has no data-dependent jump.

/// Widened unsigned difference `a - b`, always in `[-255, 255]`.
#[inline(always)]
pub fn byte_diff(a: u8, b: u8) -> i32 {
    i32::from(a) - i32::from(b)
}

/// `-1` (all bits set) if `x != 0`, otherwise `0`.
///
/// For any nonzero `x`, at least one of `x` and `-x` has the sign bit set,
/// and the arithmetic shift smears it across the word.
#[inline(always)]
pub fn nonzero_mask(x: i32) -> i32 {
    (x | x.wrapping_neg()) >> 31
}

/// `-1` if `x == 0`, otherwise `0`.
#[inline(always)]
pub fn zero_mask(x: i32) -> i32 {
    !nonzero_mask(x)
}

/// 16-bit variant of [`nonzero_mask`]: `0xFFFF` if `x != 0`, otherwise `0`.
#[inline(always)]
pub fn nonzero_mask16(x: u16) -> u16 {
    (((x | x.wrapping_neg()) as i16) >> 15) as u16
}

/// Reduces an accumulator to exactly one of `-1`, `0`, `1`.
///
/// `x >> 31` yields `-1` for negatives and `0` otherwise. `(-x as u32) >> 31`
/// yields `1` for positives and `0` for zero. For negatives it yields `0` or `1`,
/// which OR-ing into `-1` does not change. `i32::MIN` negates to itself and still
/// maps to `-1`.
#[inline(always)]
pub fn sign(x: i32) -> i32 {
    (x >> 31) | ((x.wrapping_neg() as u32) >> 31) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_diff_range() {
        assert_eq!(byte_diff(0, 0), 0);
        assert_eq!(byte_diff(0xFF, 0), 255);
        assert_eq!(byte_diff(0, 0xFF), -255);
        assert_eq!(byte_diff(0x78, 0x90), -24);
    }

    #[test]
    fn test_nonzero_mask() {
        assert_eq!(nonzero_mask(0), 0);
        for x in [1, -1, 255, -255, 0x4000_0000, i32::MAX, i32::MIN] {
            assert_eq!(nonzero_mask(x), -1, "x = {}", x);
            assert_eq!(zero_mask(x), 0, "x = {}", x);
        }
        assert_eq!(zero_mask(0), -1);
    }

    #[test]
    fn test_nonzero_mask16() {
        assert_eq!(nonzero_mask16(0), 0);
        for x in [1u16, 0x00FF, 0x0100, 0x8000, 0xFF01, 0xFFFF] {
            assert_eq!(nonzero_mask16(x), 0xFFFF, "x = {:#x}", x);
        }
    }

    #[test]
    fn test_sign_full_diff_domain() {
        for x in -255..=255 {
            assert_eq!(sign(x), x.signum(), "x = {}", x);
        }
    }

    #[test]
    fn test_sign_extremes() {
        assert_eq!(sign(i32::MAX), 1);
        assert_eq!(sign(i32::MIN), -1);
        assert_eq!(sign(i32::MIN + 1), -1);
    }
}
