//! Rounding modes and rounded integer division.
//!
//! The eight modes match those of the standard `decimal` module. A single
//! tie-classification rule drives the 64-bit, 128-bit, and big-integer
//! division paths, so every representation rounds identically.

use std::cell::Cell;
use std::cmp::Ordering;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Rounding modes for precision adjustment and quantization.
///
/// Discriminants and names match the `decimal` module constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
#[repr(i8)]
pub enum Rounding {
    /// Round away from zero if the last digit after rounding towards zero
    /// would have been 0 or 5; otherwise round towards zero.
    #[strum(serialize = "ROUND_05UP")]
    O5Up = 1,
    /// Round towards Infinity.
    #[strum(serialize = "ROUND_CEILING")]
    Ceiling = 2,
    /// Round towards zero.
    #[strum(serialize = "ROUND_DOWN")]
    Down = 3,
    /// Round towards -Infinity.
    #[strum(serialize = "ROUND_FLOOR")]
    Floor = 4,
    /// Round to nearest with ties going towards zero.
    #[strum(serialize = "ROUND_HALF_DOWN")]
    HalfDown = 5,
    /// Round to nearest with ties going to the nearest even integer.
    #[strum(serialize = "ROUND_HALF_EVEN")]
    HalfEven = 6,
    /// Round to nearest with ties going away from zero.
    #[strum(serialize = "ROUND_HALF_UP")]
    HalfUp = 7,
    /// Round away from zero.
    #[strum(serialize = "ROUND_UP")]
    Up = 8,
}

thread_local! {
    static DEFAULT_ROUNDING: Cell<Rounding> = const { Cell::new(Rounding::HalfEven) };
}

/// Returns the default rounding mode of the current thread.
///
/// Used by every adjustment that does not receive an explicit mode. The
/// initial default is [`Rounding::HalfEven`].
#[must_use]
pub fn default_rounding_mode() -> Rounding {
    DEFAULT_ROUNDING.with(Cell::get)
}

/// Sets the default rounding mode of the current thread, returning the
/// previous one.
///
/// The scope is per thread rather than process-wide, keeping the arithmetic
/// core free of shared mutable state.
pub fn set_default_rounding_mode(rounding: Rounding) -> Rounding {
    DEFAULT_ROUNDING.with(|cell| cell.replace(rounding))
}

/// Decides whether a truncated quotient must be incremented away from zero.
///
/// `half` classifies the discarded remainder against half the divisor
/// (`2 * remainder` versus divisor). `negative` is the sign of the exact
/// result, `quotient_is_odd` and `quotient_last_digit` describe the
/// truncated absolute quotient.
fn round_away(
    mode: Rounding,
    negative: bool,
    quotient_is_odd: bool,
    quotient_last_digit: u8,
    half: Ordering,
) -> bool {
    match mode {
        Rounding::Up => true,
        Rounding::Down => false,
        Rounding::Ceiling => !negative,
        Rounding::Floor => negative,
        Rounding::HalfUp => half != Ordering::Less,
        Rounding::HalfDown => half == Ordering::Greater,
        Rounding::HalfEven => half == Ordering::Greater || (half == Ordering::Equal && quotient_is_odd),
        Rounding::O5Up => quotient_last_digit == 0 || quotient_last_digit == 5,
    }
}

/// Rounded division of two `u64` magnitudes.
///
/// `negative` carries the sign of the exact value so that directed modes
/// (ceiling/floor) can act on it; the returned magnitude is unsigned.
pub(crate) fn u64_div_rounded(num: u64, den: u64, negative: bool, mode: Rounding) -> u64 {
    debug_assert!(den > 0);
    let quotient = num / den;
    let remainder = num % den;
    if remainder == 0 {
        return quotient;
    }
    // 2r > d  <=>  r > d - r, overflow-free
    let half = remainder.cmp(&(den - remainder));
    if round_away(mode, negative, quotient & 1 == 1, (quotient % 10) as u8, half) {
        quotient + 1
    } else {
        quotient
    }
}

/// Rounded division of two `u128` magnitudes, same contract as
/// [`u64_div_rounded`].
pub(crate) fn u128_div_rounded(num: u128, den: u128, negative: bool, mode: Rounding) -> u128 {
    debug_assert!(den > 0);
    let quotient = num / den;
    let remainder = num % den;
    if remainder == 0 {
        return quotient;
    }
    let half = remainder.cmp(&(den - remainder));
    if round_away(mode, negative, quotient & 1 == 1, (quotient % 10) as u8, half) {
        quotient + 1
    } else {
        quotient
    }
}

/// Rounded division of a signed big-integer numerator by a positive
/// big-integer denominator. The result carries the numerator's sign.
pub(crate) fn big_div_rounded(num: &BigInt, den: &BigInt, mode: Rounding) -> BigInt {
    debug_assert!(den.is_positive());
    let negative = num.is_negative();
    let (quotient, remainder) = num.abs().div_rem(den);
    if remainder.is_zero() {
        return if negative { -quotient } else { quotient };
    }
    let half = (&remainder + &remainder).cmp(den);
    let last_digit = (&quotient % 10u8).to_u8().unwrap_or(0);
    let rounded = if round_away(mode, negative, quotient.is_odd(), last_digit, half) {
        quotient + 1
    } else {
        quotient
    };
    if negative { -rounded } else { rounded }
}
