//! Constant-time ordered byte comparison.
//!
//! [`compare`] returns a [`Verdict`] for the first `n` bytes of two buffers in
//! time that depends only on `n`: every position is visited, and the
//! per-byte differences are folded with masks instead of branches. The
//! [`harness`] module measures whether a comparator actually behaves that way.
//!
//! ```
//! use ct_memcmp::{compare, Verdict};
//!
//! let mac = [0x12u8, 0x34, 0x56, 0x78, 0x90];
//! let tag = [0x12u8, 0x34, 0x56, 0x90, 0x78];
//! assert_eq!(compare(Some(&mac[..]), Some(&tag[..]), 5), Verdict::Less);
//! assert_eq!(compare(None, Some(&tag[..]), 5), Verdict::Equal);
//! ```

use core::cmp::Ordering;
use core::fmt;
use core::ops::Neg;

pub mod arch;
pub mod encode;
pub mod engine;
pub mod harness;
pub mod stats;


pub use engine::{Comparator, EarlyExit, ParseStrategyError, Strategy};
pub use harness::{
    ConfigError, Harness, HarnessConfig, InputPattern, ParsePatternError, PatternInputs, Report,
};
pub use stats::RunningStats;

/// Outcome of an ordered comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Verdict {
    Less = -1,
    Equal = 0,
    Greater = 1,
}

impl Verdict {
    /// Maps any integer to the verdict of its sign.
    pub fn from_sign(x: i32) -> Verdict {
        match encode::sign(x) {
            -1 => Verdict::Less,
            0 => Verdict::Equal,
            _ => Verdict::Greater,
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i8 as i32
    }

    pub fn reverse(self) -> Verdict {
        -self
    }
}

impl Neg for Verdict {
    type Output = Verdict;

    fn neg(self) -> Verdict {
        match self {
            Verdict::Less => Verdict::Greater,
            Verdict::Equal => Verdict::Equal,
            Verdict::Greater => Verdict::Less,
        }
    }
}

impl From<Ordering> for Verdict {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => Verdict::Less,
            Ordering::Equal => Verdict::Equal,
            Ordering::Greater => Verdict::Greater,
        }
    }
}

impl From<Verdict> for Ordering {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Less => Ordering::Less,
            Verdict::Equal => Ordering::Equal,
            Verdict::Greater => Ordering::Greater,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Less => "less",
            Verdict::Equal => "equal",
            Verdict::Greater => "greater",
        })
    }
}

/// Compares the first `n` bytes of `a` and `b` with the default strategy.
///
/// Returns [`Verdict::Equal`] when `n == 0`, when either buffer is absent, or
/// when both refer to the same memory. Otherwise the verdict is the sign of
/// the first differing byte pair, each byte read as unsigned.
///
/// # Panics
///
/// Panics if `n` exceeds the length of a present buffer.
pub fn compare(a: Option<&[u8]>, b: Option<&[u8]>, n: usize) -> Verdict {
    compare_with(&Strategy::default(), a, b, n)
}

/// Like [`compare`], with an explicit comparator.
pub fn compare_with<C: Comparator + ?Sized>(
    comparator: &C,
    a: Option<&[u8]>,
    b: Option<&[u8]>,
    n: usize,
) -> Verdict {
    match (a, b) {
        (Some(a), Some(b)) => comparator.compare(a, b, n),
        _ => Verdict::Equal,
    }
}

/// C ABI entry point with `memcmp`-like signature.
///
/// Returns `-1`, `0` or `1`. Returns `0` when either pointer is null, both
/// pointers are equal, or `len == 0`.
///
/// # Safety
///
/// Non-null `lhs` and `rhs` must each be valid for reads of `len` bytes.
#[inline(never)]
#[no_mangle]
pub unsafe extern "C" fn ct_memcmp(lhs: *const u8, rhs: *const u8, len: usize) -> i32 {
    if lhs.is_null() || rhs.is_null() || lhs == rhs || len == 0 {
        return 0;
    }
    let a = core::slice::from_raw_parts(lhs, len);
    let b = core::slice::from_raw_parts(rhs, len);
    Strategy::default().compare_window(a, b).as_i32()
}
