//! Exact rational number arithmetic.
//!
//! The [`Rational`] type represents any rational value without representation
//! error, unlike binary floating point. A value is stored in the cheapest of
//! three internal encodings able to hold it exactly:
//!
//! - a fixed-point form (`u128` coefficient times a power of ten) for values
//!   with a terminating decimal expansion,
//! - a pair of `u64` numerator/denominator for small non-terminating
//!   quotients,
//! - an arbitrary-precision quotient as the universal fallback.
//!
//! The encoding is an implementation detail: it never affects the value, only
//! the cost of operating on it. Every constructor normalizes its input (sign
//! extraction, GCD reduction, trailing-zero elimination) before selecting the
//! encoding, so equal values always share the same internal form.
//!
//! Values hash compatibly with CPython's numeric tower (`hash(Rational)` of 3
//! equals CPython's `hash(3)`), order by exact comparison, and render to a
//! canonical literal (`"1.5"`, `"1/3"`) that parses back to an equal value.
//!
//! ```
//! use rational::{Rational, Rounding};
//!
//! let third: Rational = "1/3".parse().unwrap();
//! let two_thirds: Rational = "2/3".parse().unwrap();
//! assert_eq!(&third + &two_thirds, Rational::from(1));
//!
//! let x: Rational = "2.5".parse().unwrap();
//! assert_eq!(x.adjusted(0, Some(Rounding::HalfEven)).unwrap().to_string(), "2");
//! assert_eq!(x.adjusted(0, Some(Rounding::HalfUp)).unwrap().to_string(), "3");
//! ```
#![allow(clippy::cast_possible_truncation, reason = "numeric narrowing is bounds-checked")]
#![allow(clippy::cast_sign_loss, reason = "sign is extracted before magnitude math")]
#![allow(clippy::cast_possible_wrap, reason = "exponent arithmetic stays within i16 bounds")]

mod big_ratio;
mod err;
mod num_hash;
mod parse;
mod rational;
mod rounding;
mod uint_math;

pub use err::{ErrorKind, RnError, RnResult};
pub use rational::{IntegerRatio, MAX_PREC, Rational, Sign};
pub use rounding::{Rounding, default_rounding_mode, set_default_rounding_mode};
