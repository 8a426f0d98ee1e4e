//! Comparison engines.
//!
//! Every [`Strategy`] walks all `n` positions exactly once and folds the
//! per-byte difference into an accumulator without branching on byte values.
//! They differ only in traversal order and accumulator encoding:
//!
//! * *fastest* variants keep the raw difference (`[-255, 255]`) and reduce it
//!   with [`sign`] at the end;
//! * *safest* variants store only the orientation (`-1`, `0`, `1`) at every
//!   step, so no byte magnitude ever sits in the accumulator;
//! * [`Strategy::Masked16`] keeps a wrapped 16-bit difference plus a sticky
//!   "already differed" mask.
//!
//! [`EarlyExit`] is the textbook variable-time loop. It exists so the timing
//! harness has something it must flag.

use core::fmt;
use core::hint::black_box;
use core::str::FromStr;

use thiserror::Error;

use crate::arch::load;
use crate::encode::{byte_diff, nonzero_mask16, sign, zero_mask};
use crate::Verdict;

/// An ordered byte comparison over a caller-specified window.
pub trait Comparator {
    /// Short identifier used in reports and on the command line.
    fn name(&self) -> &'static str;

    /// Whether the implementation claims content-independent timing.
    fn is_constant_time(&self) -> bool {
        true
    }

    /// Compares two windows of equal length.
    ///
    /// # Panics
    ///
    /// Panics if `b` is shorter than `a`.
    fn compare_window(&self, a: &[u8], b: &[u8]) -> Verdict;

    /// Compares the first `n` bytes of `a` and `b`.
    ///
    /// Returns [`Verdict::Equal`] without reading any byte when `n == 0` or
    /// both slices start at the same address. Neither check looks at content.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds either slice length.
    fn compare(&self, a: &[u8], b: &[u8], n: usize) -> Verdict {
        if n == 0 || core::ptr::eq(a.as_ptr(), b.as_ptr()) {
            return Verdict::Equal;
        }
        self.compare_window(&a[..n], &b[..n])
    }
}

/// Interchangeable constant-time fold strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Descending index, raw difference accumulator.
    FastestBackward,
    /// Ascending index, raw difference accumulator.
    FastestForward,
    /// Descending index, sign-only accumulator.
    #[default]
    SafestBackward,
    /// Ascending index, sign-only accumulator.
    SafestForward,
    /// Ascending index, 16-bit wrapped difference with a sticky mask.
    Masked16,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::FastestBackward,
        Strategy::FastestForward,
        Strategy::SafestBackward,
        Strategy::SafestForward,
        Strategy::Masked16,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::FastestBackward => "fastest-backward",
            Strategy::FastestForward => "fastest-forward",
            Strategy::SafestBackward => "safest-backward",
            Strategy::SafestForward => "safest-forward",
            Strategy::Masked16 => "masked16",
        }
    }

    fn accumulate(self, a: &[u8], b: &[u8]) -> i32 {
        match self {
            Strategy::FastestBackward => fastest_backward(a, b),
            Strategy::FastestForward => fastest_forward(a, b),
            Strategy::SafestBackward => safest_backward(a, b),
            Strategy::SafestForward => safest_forward(a, b),
            Strategy::Masked16 => masked16(a, b),
        }
    }
}

impl Comparator for Strategy {
    fn name(&self) -> &'static str {
        Strategy::name(*self)
    }

    fn compare_window(&self, a: &[u8], b: &[u8]) -> Verdict {
        let b = &b[..a.len()];
        Verdict::from_sign(self.accumulate(a, b))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy `{0}` (expected one of: fastest-backward, fastest-forward, safest-backward, safest-forward, masked16)")]
pub struct ParseStrategyError(pub String);

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseStrategyError(s.to_string()))
    }
}

// The last nonzero difference folded in wins; walking backwards makes that
// the lowest differing index.
#[inline(never)]
fn fastest_backward(a: &[u8], b: &[u8]) -> i32 {
    let mut acc = 0i32;
    for i in (0..a.len()).rev() {
        let diff = byte_diff(load(a, i), load(b, i));
        acc = black_box((acc & zero_mask(diff)) | diff);
    }
    acc
}

// Once `acc` is nonzero its zero mask is 0 and nothing else gets in.
#[inline(never)]
fn fastest_forward(a: &[u8], b: &[u8]) -> i32 {
    let mut acc = 0i32;
    for i in 0..a.len() {
        let diff = byte_diff(load(a, i), load(b, i));
        acc = black_box(acc | (diff & zero_mask(acc)));
    }
    acc
}

#[inline(never)]
fn safest_backward(a: &[u8], b: &[u8]) -> i32 {
    let mut acc = 0i32;
    for i in (0..a.len()).rev() {
        let diff = byte_diff(load(a, i), load(b, i));
        acc = black_box((acc & zero_mask(diff)) | sign(diff));
    }
    acc
}

#[inline(never)]
fn safest_forward(a: &[u8], b: &[u8]) -> i32 {
    let mut acc = 0i32;
    for i in 0..a.len() {
        let diff = byte_diff(load(a, i), load(b, i));
        acc = black_box(acc | (sign(diff) & zero_mask(acc)));
    }
    acc
}

// `diff` wraps modulo 2^16; reinterpreted as i16 it is the exact difference
// in [-255, 255].
#[inline(never)]
fn masked16(a: &[u8], b: &[u8]) -> i32 {
    let mut acc = 0u16;
    let mut done = 0u16;
    for i in 0..a.len() {
        let diff = u16::from(load(a, i)).wrapping_sub(u16::from(load(b, i)));
        acc |= diff & !done;
        done |= nonzero_mask16(diff);
        acc = black_box(acc);
    }
    i32::from(acc as i16)
}

/// Variable-time reference: stops at the first differing byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct EarlyExit;

impl Comparator for EarlyExit {
    fn name(&self) -> &'static str {
        "early-exit"
    }

    fn is_constant_time(&self) -> bool {
        false
    }

    #[inline(never)]
    fn compare_window(&self, a: &[u8], b: &[u8]) -> Verdict {
        for (x, y) in a.iter().zip(&b[..a.len()]) {
            if x != y {
                return Verdict::from_sign(byte_diff(*x, *y));
            }
        }
        Verdict::Equal
    }
}
