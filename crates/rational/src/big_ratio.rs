//! Reduced arbitrary-precision ratios backing the big quotient form.
//!
//! A [`BigRatio`] stores magnitudes only; the owning number tracks the sign.
//! Invariants: `num >= 0`, `den >= 1`, `gcd(num, den) == 1`.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BigRatio {
    num: BigInt,
    den: BigInt,
}

impl BigRatio {
    /// Builds a reduced ratio from nonnegative parts with `den > 0`.
    pub(crate) fn reduced(num: BigInt, den: BigInt) -> Self {
        debug_assert!(!num.is_negative());
        debug_assert!(den.is_positive());
        let gcd = num.gcd(&den);
        if gcd.is_one() {
            Self { num, den }
        } else {
            Self {
                num: num / &gcd,
                den: den / gcd,
            }
        }
    }

    pub(crate) fn num(&self) -> &BigInt {
        &self.num
    }

    pub(crate) fn den(&self) -> &BigInt {
        &self.den
    }

    /// Floor of the decimal log of the ratio, requiring `num > 0`.
    ///
    /// The digit-count difference pins the result to one of two candidates;
    /// a single cross-multiplied comparison picks the right one.
    pub(crate) fn magnitude(&self) -> i64 {
        debug_assert!(self.num.is_positive());
        let candidate = decimal_digits(&self.num) - decimal_digits(&self.den);
        let holds = if candidate >= 0 {
            self.num >= &self.den * ten_pow(candidate.unsigned_abs())
        } else {
            &self.num * ten_pow(candidate.unsigned_abs()) >= self.den
        };
        if holds { candidate } else { candidate - 1 }
    }

    /// Compares two ratios by cross-multiplication.
    pub(crate) fn cmp_ratio(&self, other: &Self) -> Ordering {
        (&self.num * &other.den).cmp(&(&other.num * &self.den))
    }

    /// Nearest-representable conversion, `None` when the quotient is not
    /// finite as an `f64`.
    pub(crate) fn to_f64(&self) -> Option<f64> {
        let quotient = self.num.to_f64()? / self.den.to_f64()?;
        quotient.is_finite().then_some(quotient)
    }
}

fn decimal_digits(x: &BigInt) -> i64 {
    debug_assert!(!x.is_negative() && !x.is_zero());
    x.magnitude().to_str_radix(10).len() as i64
}

fn ten_pow(n: u64) -> BigInt {
    num_traits::Pow::pow(BigInt::from(10), n)
}
