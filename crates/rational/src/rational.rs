//! The [`Rational`] value type: internal encodings, promotion, and the
//! arithmetic, comparison, and adjustment operations built on them.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;
use std::sync::OnceLock;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Pow, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::big_ratio::BigRatio;
use crate::err::{ErrorKind, RnError, RnResult};
use crate::num_hash::hash_ratio;
use crate::parse::{BigLiteral, ParseFailure, ParsedLiteral, parse_literal, parse_literal_big};
use crate::rounding::{
    Rounding, big_div_rounded, default_rounding_mode, u64_div_rounded, u128_div_rounded,
};
use crate::uint_math::{
    U128_MAX_DIGITS, pow10_factor, u64_five_pow, u64_two_pow, u128_magnitude,
    u128_strip_trailing_zeros, u128_ten_pow,
};

/// Largest fixed-point exponent a literal may carry.
pub(crate) const MAX_EXP: i16 = i16::MAX;

/// Smallest fixed-point exponent a literal may carry.
pub(crate) const MIN_EXP: i16 = -i16::MAX;

/// Bound on explicit precision constraints (fractional decimal digits).
pub const MAX_PREC: i16 = 9999;

/// Sign of a rational value.
///
/// Orders `Negative < Zero < Positive`, so comparing signs is the first step
/// of comparing values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sign {
    Negative = -1,
    Zero = 0,
    Positive = 1,
}

impl Sign {
    /// Flips positive to negative and back; zero negates to itself.
    #[must_use]
    pub fn negated(self) -> Self {
        match self {
            Self::Negative => Self::Positive,
            Self::Zero => Self::Zero,
            Self::Positive => Self::Negative,
        }
    }

    fn of(negative: bool) -> Self {
        if negative { Self::Negative } else { Self::Positive }
    }
}

/// Internal encoding of a nonzero magnitude.
///
/// Exactly one variant is authoritative for a value; promotion picks the
/// cheapest one able to hold the value without loss.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Repr {
    /// `coeff * 10^exp`; the canonical home of every value with a
    /// terminating decimal expansion, including zero (`coeff == 0`).
    FixedPoint { coeff: u128, exp: i16 },
    /// Coprime `num / den` where the fixed-point form was not reachable:
    /// `den` has a prime factor other than 2 and 5, or the power-of-ten
    /// multiplier would overflow.
    SmallQuot { num: u64, den: u64 },
    /// The universal fallback; magnitudes only, reduced.
    BigQuot(BigRatio),
}

/// An exact rational number.
///
/// Immutable once constructed; every operation returns a new value. The two
/// lazily materialized caches (the signed integer ratio and the numeric
/// hash) are the only interior state, and recomputing either yields the same
/// data, so values are freely shareable across threads.
#[derive(Debug)]
pub struct Rational {
    sign: Sign,
    precision: Option<i16>,
    repr: Repr,
    ratio: OnceLock<(BigInt, BigInt)>,
    hash: OnceLock<i64>,
}

/// Conversion to an exact integer ratio, the universal interchange form.
///
/// Returning `None` marks an operand with no exact ratio (a non-finite
/// float); arithmetic surfaces that as an unsupported-operand error so the
/// caller can try a different coercion.
pub trait IntegerRatio {
    fn integer_ratio(&self) -> Option<(BigInt, BigInt)>;
}

macro_rules! impl_integer_ratio_for_ints {
    ($($ty:ty),*) => {$(
        impl IntegerRatio for $ty {
            fn integer_ratio(&self) -> Option<(BigInt, BigInt)> {
                Some((BigInt::from(*self), BigInt::one()))
            }
        }
    )*};
}

impl_integer_ratio_for_ints!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128);

impl IntegerRatio for BigInt {
    fn integer_ratio(&self) -> Option<(BigInt, BigInt)> {
        Some((self.clone(), BigInt::one()))
    }
}

impl IntegerRatio for f64 {
    fn integer_ratio(&self) -> Option<(BigInt, BigInt)> {
        float_integer_ratio(*self)
    }
}

impl IntegerRatio for Rational {
    fn integer_ratio(&self) -> Option<(BigInt, BigInt)> {
        Some(self.ratio().clone())
    }
}

impl Rational {
    /// The additive identity, in its canonical encoding.
    #[must_use]
    pub fn zero() -> Self {
        Self::zero_with_precision(None)
    }

    /// Builds `num / den` from any two integer-ratio-convertible operands.
    ///
    /// The operands are cross-multiplied into a single ratio, reduced, and
    /// promoted into the cheapest exact encoding.
    pub fn new<N: IntegerRatio, D: IntegerRatio>(num: N, den: D) -> RnResult<Self> {
        let (num_n, num_d) = coerce_ratio(&num)?;
        let (den_n, den_d) = coerce_ratio(&den)?;
        // (num_n / num_d) / (den_n / den_d)
        Self::from_ratio(num_n * den_d, num_d * den_n)
    }

    /// Builds a value from any integer-ratio-convertible operand, optionally
    /// rounded to a precision constraint with the thread's default mode.
    pub fn from_value<T: IntegerRatio>(value: &T, precision: Option<i16>) -> RnResult<Self> {
        let (num, den) = coerce_ratio(value)?;
        let base = Self::from_ratio(num, den)?;
        match precision {
            Some(precision) => base.adjusted(precision, None),
            None => Ok(base),
        }
    }

    /// Sign of the value.
    #[must_use]
    pub fn sign(&self) -> Sign {
        self.sign
    }

    /// The precision constraint set by [`Rational::adjusted`], if any.
    #[must_use]
    pub fn precision(&self) -> Option<i16> {
        self.precision
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.sign == Sign::Zero
    }

    /// Whether the exact value is an integer.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        match &self.repr {
            Repr::FixedPoint { coeff, exp } => {
                *exp >= 0
                    || (u32::from(exp.unsigned_abs()) <= U128_MAX_DIGITS
                        && coeff % u128_ten_pow(u32::from(exp.unsigned_abs())) == 0)
            }
            Repr::SmallQuot { .. } => false,
            Repr::BigQuot(ratio) => ratio.den().is_one(),
        }
    }

    /// `⌊log₁₀|x|⌋`, or `None` for zero.
    #[must_use]
    pub fn magnitude(&self) -> Option<i64> {
        if self.sign == Sign::Zero {
            return None;
        }
        Some(match &self.repr {
            Repr::FixedPoint { coeff, exp } => {
                i64::from(u128_magnitude(*coeff)) + i64::from(*exp)
            }
            Repr::SmallQuot { num, den } => small_quot_magnitude(*num, *den),
            Repr::BigQuot(ratio) => ratio.magnitude(),
        })
    }

    /// Signed numerator of the value in lowest terms.
    #[must_use]
    pub fn numerator(&self) -> BigInt {
        self.ratio().0.clone()
    }

    /// Denominator of the value in lowest terms, always positive.
    #[must_use]
    pub fn denominator(&self) -> BigInt {
        self.ratio().1.clone()
    }

    /// The exact `(numerator, denominator)` pair in lowest terms.
    #[must_use]
    pub fn as_integer_ratio(&self) -> (BigInt, BigInt) {
        self.ratio().clone()
    }

    /// Hash agreeing with CPython's numeric tower: equal values hash equal
    /// whether they are integers, floats, or fractions. Computed once and
    /// cached.
    #[must_use]
    pub fn num_hash(&self) -> i64 {
        *self.hash.get_or_init(|| {
            let (num, den) = self.ratio();
            hash_ratio(num, den, self.sign == Sign::Negative)
        })
    }

    /// Absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        match self.sign {
            Sign::Negative => Self::from_repr(Sign::Positive, self.repr.clone(), self.precision),
            _ => self.clone(),
        }
    }

    /// Multiplicative inverse; zero has none.
    pub fn recip(&self) -> RnResult<Self> {
        if self.sign == Sign::Zero {
            return Err(RnError::division_by_zero());
        }
        let (num, den) = self.ratio().clone();
        let (num, den) = if num.is_negative() { (-den, -num) } else { (den, num) };
        Ok(Self::from_signed_ratio(num, den))
    }

    /// Raises the value to an integer power; a negative exponent inverts the
    /// base, so raising zero to a negative power is a division by zero.
    pub fn checked_pow(&self, exponent: i32) -> RnResult<Self> {
        if exponent == 0 {
            return Ok(Self::from(1));
        }
        if self.sign == Sign::Zero {
            if exponent < 0 {
                return Err(RnError::division_by_zero());
            }
            return Ok(Self::zero());
        }
        let (base_n, base_d) = self.ratio().clone();
        let power = exponent.unsigned_abs();
        let num = Pow::pow(base_n, power);
        let den = Pow::pow(base_d, power);
        let (num, den) = if exponent < 0 {
            if num.is_negative() { (-den, -num) } else { (den, num) }
        } else {
            (num, den)
        };
        Ok(Self::from_signed_ratio(num, den))
    }

    /// Integer part, truncated toward zero.
    #[must_use]
    pub fn trunc(&self) -> BigInt {
        let (num, den) = self.ratio();
        num / den
    }

    /// Largest integer not greater than the value.
    #[must_use]
    pub fn floor(&self) -> BigInt {
        let (num, den) = self.ratio();
        num.div_floor(den)
    }

    /// Smallest integer not less than the value.
    #[must_use]
    pub fn ceil(&self) -> BigInt {
        let (num, den) = self.ratio();
        num.div_ceil(den)
    }

    /// Nearest integer, ties to even.
    #[must_use]
    pub fn round(&self) -> BigInt {
        match &self.repr {
            Repr::SmallQuot { num, den } => {
                let negative = self.sign == Sign::Negative;
                let rounded = BigInt::from(u64_div_rounded(*num, *den, negative, Rounding::HalfEven));
                if negative { -rounded } else { rounded }
            }
            _ => {
                let (num, den) = self.ratio();
                big_div_rounded(num, den, Rounding::HalfEven)
            }
        }
    }

    /// Nearest representable `f64`, or `None` when out of range.
    #[must_use]
    pub fn to_f64(&self) -> Option<f64> {
        let magnitude = if let Repr::BigQuot(ratio) = &self.repr {
            // skips materializing the signed ratio
            ratio.to_f64()?
        } else {
            let (num, den) = self.ratio();
            let quotient = num.abs().to_f64()? / den.to_f64()?;
            if !quotient.is_finite() {
                return None;
            }
            quotient
        };
        Some(if self.sign == Sign::Negative { -magnitude } else { magnitude })
    }

    /// Returns the value rounded to `precision` fractional decimal digits.
    ///
    /// A negative precision rounds to a multiple of a positive power of ten.
    /// Without an explicit mode, the thread's default rounding mode applies.
    /// The result records `precision` as its constraint; a constraint looser
    /// than the value's own expansion leaves the value untouched.
    pub fn adjusted(&self, precision: i16, mode: Option<Rounding>) -> RnResult<Self> {
        if !(-MAX_PREC..=MAX_PREC).contains(&precision) {
            return Err(RnError::precision_out_of_range(i64::from(precision)));
        }
        let mode = mode.unwrap_or_else(default_rounding_mode);
        if self.sign == Sign::Zero {
            return Ok(Self::zero_with_precision(Some(precision)));
        }
        if let Repr::FixedPoint { coeff, exp } = self.repr {
            let shift = -(i32::from(precision) + i32::from(exp));
            if shift <= 0 {
                // value already fits in the requested precision
                let mut out = self.clone();
                out.precision = Some(precision);
                return Ok(out);
            }
            if shift <= U128_MAX_DIGITS as i32 {
                let negative = self.sign == Sign::Negative;
                let rounded =
                    u128_div_rounded(coeff, u128_ten_pow(shift as u32), negative, mode);
                if rounded == 0 {
                    return Ok(Self::zero_with_precision(Some(precision)));
                }
                return Ok(Self {
                    precision: Some(precision),
                    ..Self::from_repr(
                        self.sign,
                        Repr::FixedPoint { coeff: rounded, exp: -precision },
                        None,
                    )
                });
            }
        }
        // exact big-integer path
        let (num, den) = self.ratio();
        let mut out = if precision >= 0 {
            let scale = big_ten_pow(u64::from(precision.unsigned_abs()));
            let rounded = big_div_rounded(&(num * &scale), den, mode);
            if rounded.is_zero() {
                return Ok(Self::zero_with_precision(Some(precision)));
            }
            Self::from_signed_ratio(rounded, scale)
        } else {
            let scale = big_ten_pow(u64::from(precision.unsigned_abs()));
            let rounded = big_div_rounded(num, &(den * &scale), mode);
            if rounded.is_zero() {
                return Ok(Self::zero_with_precision(Some(precision)));
            }
            Self::from_signed_ratio(rounded * scale, BigInt::one())
        };
        out.precision = Some(precision);
        Ok(out)
    }

    /// Rounds to the closest multiple of `quant`.
    pub fn quantize<T: IntegerRatio>(&self, quant: &T, mode: Option<Rounding>) -> RnResult<Self> {
        let (quant_n, quant_d) = coerce_ratio(quant)?;
        if quant_n.is_zero() || quant_d.is_zero() {
            return Err(RnError::division_by_zero());
        }
        let mode = mode.unwrap_or_else(default_rounding_mode);
        let (num, den) = self.ratio();
        // self / quant, quotient sign folded into the numerator
        let mut steps_num = num * &quant_d;
        let mut steps_den = den * &quant_n;
        if steps_den.is_negative() {
            steps_num = -steps_num;
            steps_den = -steps_den;
        }
        let steps = big_div_rounded(&steps_num, &steps_den, mode);
        Self::from_ratio(steps * quant_n, quant_d)
    }

    /// Compares against any integer-ratio-convertible operand; `None` when
    /// the operand has no exact ratio.
    #[must_use]
    pub fn compare<T: IntegerRatio>(&self, other: &T) -> Option<Ordering> {
        let (mut num, mut den) = other.integer_ratio()?;
        if den.is_zero() {
            return None;
        }
        if den.is_negative() {
            num = -num;
            den = -den;
        }
        let (self_num, self_den) = self.ratio();
        Some((self_num * &den).cmp(&(num * self_den)))
    }

    /// Adds any integer-ratio-convertible operand.
    pub fn try_add<T: IntegerRatio>(&self, other: &T) -> RnResult<Self> {
        let (num, den) = coerce_ratio(other)?;
        if den.is_zero() {
            return Err(RnError::division_by_zero());
        }
        let (self_num, self_den) = self.ratio();
        Ok(Self::from_signed_ratio(
            self_num * &den + &num * self_den,
            self_den * den,
        ))
    }

    /// Subtracts any integer-ratio-convertible operand.
    pub fn try_sub<T: IntegerRatio>(&self, other: &T) -> RnResult<Self> {
        let (num, den) = coerce_ratio(other)?;
        if den.is_zero() {
            return Err(RnError::division_by_zero());
        }
        let (self_num, self_den) = self.ratio();
        Ok(Self::from_signed_ratio(
            self_num * &den - &num * self_den,
            self_den * den,
        ))
    }

    /// Multiplies by any integer-ratio-convertible operand.
    pub fn try_mul<T: IntegerRatio>(&self, other: &T) -> RnResult<Self> {
        let (num, den) = coerce_ratio(other)?;
        if den.is_zero() {
            return Err(RnError::division_by_zero());
        }
        let (self_num, self_den) = self.ratio();
        Ok(Self::from_signed_ratio(self_num * num, self_den * den))
    }

    /// Divides by any integer-ratio-convertible operand.
    pub fn try_div<T: IntegerRatio>(&self, other: &T) -> RnResult<Self> {
        let (num, den) = coerce_ratio(other)?;
        if den.is_zero() {
            return Err(RnError::division_by_zero());
        }
        let (self_num, self_den) = self.ratio();
        Self::from_ratio(self_num * den, self_den * num)
    }

    // --- construction internals -------------------------------------------

    fn from_repr(sign: Sign, repr: Repr, precision: Option<i16>) -> Self {
        Self {
            sign,
            precision,
            repr,
            ratio: OnceLock::new(),
            hash: OnceLock::new(),
        }
    }

    fn zero_with_precision(precision: Option<i16>) -> Self {
        Self::from_repr(Sign::Zero, Repr::FixedPoint { coeff: 0, exp: 0 }, precision)
    }

    /// Builds a value from a signed ratio, rejecting a zero denominator.
    fn from_ratio(num: BigInt, den: BigInt) -> RnResult<Self> {
        if den.is_zero() {
            return Err(RnError::division_by_zero());
        }
        let (num, den) = if den.is_negative() { (-num, -den) } else { (num, den) };
        Ok(Self::from_signed_ratio(num, den))
    }

    /// Builds a value from a signed numerator over a positive denominator.
    fn from_signed_ratio(num: BigInt, den: BigInt) -> Self {
        debug_assert!(den.is_positive());
        if num.is_zero() {
            return Self::zero();
        }
        let negative = num.is_negative();
        let num = num.abs();
        let gcd = num.gcd(&den);
        let (num, den) = if gcd.is_one() {
            (num, den)
        } else {
            (num / &gcd, den / gcd)
        };
        Self::from_reduced(negative, num, den)
    }

    /// Promotes an already-reduced positive ratio into its encoding.
    fn from_reduced(negative: bool, num: BigInt, den: BigInt) -> Self {
        Self::from_repr(Sign::of(negative), promote(num, den), None)
    }

    /// Normalizes raw fixed-point parts: strips trailing zeros off a
    /// negative exponent and folds a positive exponent into the coefficient,
    /// falling back to the big path when the fold overflows. The outcome
    /// matches what promotion of the equivalent ratio would pick.
    fn from_fixed_parts(negative: bool, coeff: u128, exp: i16) -> Self {
        if coeff == 0 {
            return Self::zero();
        }
        let (coeff, exp) = if exp < 0 {
            let (stripped, removed) = u128_strip_trailing_zeros(coeff, u32::from(exp.unsigned_abs()));
            (stripped, exp + removed as i16)
        } else {
            (coeff, exp)
        };
        if exp > 0 {
            let shift = u32::from(exp.unsigned_abs());
            let folded = (shift <= U128_MAX_DIGITS)
                .then(|| u128_ten_pow(shift))
                .and_then(|pow| coeff.checked_mul(pow));
            return match folded {
                Some(folded) => Self::from_repr(
                    Sign::of(negative),
                    Repr::FixedPoint { coeff: folded, exp: 0 },
                    None,
                ),
                None => {
                    let num = BigInt::from(coeff) * big_ten_pow(u64::from(shift));
                    Self::from_reduced(negative, num, BigInt::one())
                }
            };
        }
        Self::from_repr(Sign::of(negative), Repr::FixedPoint { coeff, exp }, None)
    }

    /// Exact construction from a literal whose digit counts overflowed the
    /// fixed-width scanner.
    fn from_big_literal(literal: &str) -> RnResult<Self> {
        let parsed =
            parse_literal_big(literal).map_err(|failure| literal_failure(literal, failure))?;
        match parsed {
            BigLiteral::Dec { negative, coeff, exp } => {
                if coeff.is_zero() {
                    return Ok(Self::zero());
                }
                let (num, den) = if exp >= 0 {
                    (coeff * big_ten_pow(exp.unsigned_abs()), BigInt::one())
                } else {
                    (coeff, big_ten_pow(exp.unsigned_abs()))
                };
                Ok(Self::from_signed_ratio(if negative { -num } else { num }, den))
            }
            BigLiteral::Quot { negative, num, den } => {
                if den.is_zero() {
                    return Err(RnError::division_by_zero());
                }
                Self::from_ratio(if negative { -num } else { num }, den)
            }
        }
    }

    /// Signed `(numerator, denominator)` in lowest terms, materialized once
    /// and cached.
    fn ratio(&self) -> &(BigInt, BigInt) {
        self.ratio.get_or_init(|| {
            let (num, den) = match &self.repr {
                Repr::FixedPoint { coeff, exp } => {
                    let num = BigInt::from(*coeff);
                    if *exp >= 0 {
                        (num * big_ten_pow(u64::from(exp.unsigned_abs())), BigInt::one())
                    } else {
                        let den = big_ten_pow(u64::from(exp.unsigned_abs()));
                        let gcd = num.gcd(&den);
                        (num / &gcd, den / gcd)
                    }
                }
                Repr::SmallQuot { num, den } => (BigInt::from(*num), BigInt::from(*den)),
                Repr::BigQuot(ratio) => (ratio.num().clone(), ratio.den().clone()),
            };
            let num = if self.sign == Sign::Negative { -num } else { num };
            (num, den)
        })
    }

    /// Compares absolute values; both operands are nonzero.
    fn cmp_abs(&self, other: &Self) -> Ordering {
        match (&self.repr, &other.repr) {
            (
                Repr::FixedPoint { coeff: lhs_coeff, exp: lhs_exp },
                Repr::FixedPoint { coeff: rhs_coeff, exp: rhs_exp },
            ) => cmp_fixed(*lhs_coeff, *lhs_exp, *rhs_coeff, *rhs_exp),
            (Repr::BigQuot(lhs), Repr::BigQuot(rhs)) => lhs.cmp_ratio(rhs),
            _ => {
                let (lhs_num, lhs_den) = self.ratio();
                let (rhs_num, rhs_den) = other.ratio();
                (lhs_num.abs() * rhs_den).cmp(&(rhs_num.abs() * lhs_den))
            }
        }
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl Clone for Rational {
    fn clone(&self) -> Self {
        Self {
            sign: self.sign,
            precision: self.precision,
            repr: self.repr.clone(),
            ratio: cloned_cell(&self.ratio),
            hash: cloned_cell(&self.hash),
        }
    }
}

fn cloned_cell<T: Clone>(cell: &OnceLock<T>) -> OnceLock<T> {
    let fresh = OnceLock::new();
    if let Some(value) = cell.get() {
        let _ = fresh.set(value.clone());
    }
    fresh
}

impl FromStr for Rational {
    type Err = RnError;

    fn from_str(literal: &str) -> Result<Self, Self::Err> {
        match parse_literal(literal) {
            Ok(ParsedLiteral::Dec { negative, coeff, exp }) => {
                Ok(Self::from_fixed_parts(negative, coeff, exp))
            }
            Ok(ParsedLiteral::Quot { negative, num, den }) => {
                if den == 0 {
                    return Err(RnError::division_by_zero());
                }
                let num = BigInt::from(num);
                Self::from_ratio(if negative { -num } else { num }, BigInt::from(den))
            }
            Err(ParseFailure::Overflow) => Self::from_big_literal(literal),
            Err(failure) => Err(literal_failure(literal, failure)),
        }
    }
}

fn literal_failure(literal: &str, failure: ParseFailure) -> RnError {
    match failure {
        ParseFailure::ExpRange => RnError::new(
            ErrorKind::PrecisionOutOfRange,
            format!("exponent of '{literal}' exceeds the representable range"),
        ),
        _ => RnError::invalid_literal(literal),
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        if value == 0 {
            return Self::zero();
        }
        Self::from_repr(
            Sign::of(value < 0),
            Repr::FixedPoint { coeff: u128::from(value.unsigned_abs()), exp: 0 },
            None,
        )
    }
}

impl From<i32> for Rational {
    fn from(value: i32) -> Self {
        Self::from(i64::from(value))
    }
}

impl From<u64> for Rational {
    fn from(value: u64) -> Self {
        if value == 0 {
            return Self::zero();
        }
        Self::from_repr(
            Sign::Positive,
            Repr::FixedPoint { coeff: u128::from(value), exp: 0 },
            None,
        )
    }
}

impl From<i128> for Rational {
    fn from(value: i128) -> Self {
        if value == 0 {
            return Self::zero();
        }
        Self::from_repr(
            Sign::of(value < 0),
            Repr::FixedPoint { coeff: value.unsigned_abs(), exp: 0 },
            None,
        )
    }
}

impl From<u128> for Rational {
    fn from(value: u128) -> Self {
        if value == 0 {
            return Self::zero();
        }
        Self::from_repr(Sign::Positive, Repr::FixedPoint { coeff: value, exp: 0 }, None)
    }
}

impl From<BigInt> for Rational {
    fn from(value: BigInt) -> Self {
        if value.is_zero() {
            return Self::zero();
        }
        let negative = value.is_negative();
        Self::from_reduced(negative, value.abs(), BigInt::one())
    }
}

impl TryFrom<f64> for Rational {
    type Error = RnError;

    /// Converts the exact binary value of the float, *not* its shortest
    /// decimal rendering: `0.1_f64` becomes `3602879701896397 /
    /// 36028797018963968`.
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let (num, den) = float_integer_ratio(value).ok_or_else(|| {
            RnError::unsupported_operand(format!("can't convert {value} to an integer ratio"))
        })?;
        Self::from_ratio(num, den)
    }
}

/// Decomposes a finite float into its exact integer ratio via the IEEE 754
/// bit pattern.
fn float_integer_ratio(value: f64) -> Option<(BigInt, BigInt)> {
    if !value.is_finite() {
        return None;
    }
    if value == 0.0 {
        return Some((BigInt::zero(), BigInt::one()));
    }
    let bits = value.to_bits();
    let negative = bits >> 63 == 1;
    let biased_exp = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1u64 << 52) - 1);
    let (mantissa, exp) = if biased_exp == 0 {
        // subnormal
        (fraction, -1074i64)
    } else {
        (fraction | (1 << 52), biased_exp - 1075)
    };
    let mut num = BigInt::from(mantissa);
    let mut den = BigInt::one();
    if exp >= 0 {
        num <<= exp.unsigned_abs() as usize;
    } else {
        den <<= exp.unsigned_abs() as usize;
    }
    if negative {
        num = -num;
    }
    Some((num, den))
}

fn coerce_ratio<T: IntegerRatio>(operand: &T) -> RnResult<(BigInt, BigInt)> {
    let (num, den) = operand.integer_ratio().ok_or_else(|| {
        RnError::unsupported_operand("operand is not convertible to an integer ratio")
    })?;
    if den.is_negative() {
        Ok((-num, -den))
    } else {
        Ok((num, den))
    }
}

fn big_ten_pow(n: u64) -> BigInt {
    Pow::pow(BigInt::from(10), n)
}

/// Selects the cheapest encoding for a reduced positive ratio.
///
/// A pure function of the value: the same ratio always promotes to the same
/// variant with the same payload, regardless of which operation produced it.
fn promote(num: BigInt, den: BigInt) -> Repr {
    if let Some(small_den) = den.to_u64() {
        if let Some((factor, pow10)) = pow10_factor(small_den) {
            if let Some(coeff) = num
                .to_u128()
                .and_then(|n| n.checked_mul(u128::from(factor)))
            {
                return Repr::FixedPoint { coeff, exp: -(pow10 as i16) };
            }
        } else if let Some(small_num) = num.to_u64() {
            return Repr::SmallQuot { num: small_num, den: small_den };
        }
    } else if let Some((factor, pow10)) = big_pow10_factor(&den) {
        if pow10 <= u64::from(MAX_EXP.unsigned_abs()) {
            if let Some(coeff) = num
                .to_u128()
                .and_then(|n| n.checked_mul(u128::from(factor)))
            {
                return Repr::FixedPoint { coeff, exp: -(pow10 as i16) };
            }
        }
    }
    Repr::BigQuot(BigRatio::reduced(num, den))
}

/// [`pow10_factor`] for denominators wider than `u64`.
///
/// The complementary multiplier is still bounded to a `u64` power of 2 or 5,
/// but the power-of-ten count may exceed the `u64` range of exponents; a huge
/// power of ten in the denominator is fixed-point representable as long as
/// the coefficient fits.
fn big_pow10_factor(den: &BigInt) -> Option<(u64, u64)> {
    debug_assert!(den.is_positive());
    let twos = den.trailing_zeros().unwrap_or(0);
    let mut rest = den >> twos;
    let mut fives = 0u64;
    let five = BigInt::from(5);
    while (&rest % &five).is_zero() {
        rest /= &five;
        fives += 1;
    }
    if !rest.is_one() {
        return None;
    }
    if twos > fives {
        let complement = twos - fives;
        if complement > 27 {
            return None;
        }
        Some((u64_five_pow(complement as u32), twos))
    } else if fives > twos {
        let complement = fives - twos;
        if complement > 63 {
            return None;
        }
        Some((u64_two_pow(complement as u32), fives))
    } else {
        Some((1, twos))
    }
}

/// Magnitude of a small quotient via digit counts plus one exact correction
/// comparison; operands are nonzero and fit the bounds of `u128` products.
fn small_quot_magnitude(num: u64, den: u64) -> i64 {
    let candidate =
        i64::from(u128_magnitude(u128::from(num))) - i64::from(u128_magnitude(u128::from(den)));
    let holds = if candidate >= 0 {
        u128::from(num) >= u128::from(den) * u128_ten_pow(candidate as u32)
    } else {
        u128::from(num) * u128_ten_pow(candidate.unsigned_abs() as u32) >= u128::from(den)
    };
    if holds { candidate } else { candidate - 1 }
}

/// Compares two positive fixed-point magnitudes by aligning exponents.
fn cmp_fixed(lhs_coeff: u128, lhs_exp: i16, rhs_coeff: u128, rhs_exp: i16) -> Ordering {
    let shift = i32::from(lhs_exp) - i32::from(rhs_exp);
    match shift {
        0 => lhs_coeff.cmp(&rhs_coeff),
        1..=38 => match lhs_coeff.checked_mul(u128_ten_pow(shift as u32)) {
            Some(scaled) => scaled.cmp(&rhs_coeff),
            // scaled lhs exceeds u128::MAX and thus any rhs coefficient
            None => Ordering::Greater,
        },
        -38..=-1 => match rhs_coeff.checked_mul(u128_ten_pow(shift.unsigned_abs())) {
            Some(scaled) => lhs_coeff.cmp(&scaled),
            None => Ordering::Less,
        },
        _ => {
            if shift > 0 { Ordering::Greater } else { Ordering::Less }
        }
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_sign = self.sign.cmp(&other.sign);
        if by_sign != Ordering::Equal || self.sign == Sign::Zero {
            return by_sign;
        }
        let by_abs = match (self.magnitude(), other.magnitude()) {
            (Some(lhs), Some(rhs)) if lhs != rhs => lhs.cmp(&rhs),
            _ => self.cmp_abs(other),
        };
        if self.sign == Sign::Negative { by_abs.reverse() } else { by_abs }
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Equality is by exact value; the precision constraint is excluded, so
/// `2.50` with precision 2 equals plain `2.5`.
impl PartialEq for Rational {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Rational {}

impl Hash for Rational {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.num_hash().hash(state);
    }
}

impl fmt::Display for Rational {
    /// Canonical literal: a decimal if the encoding is fixed-point, else
    /// `numerator/denominator`. Parsing the output reconstructs an equal
    /// value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign == Sign::Zero {
            return f.write_str("0");
        }
        if self.sign == Sign::Negative {
            f.write_str("-")?;
        }
        match &self.repr {
            Repr::FixedPoint { coeff, exp } => write_fixed(f, *coeff, *exp),
            Repr::SmallQuot { num, den } => write!(f, "{num}/{den}"),
            Repr::BigQuot(ratio) => {
                if ratio.den().is_one() {
                    write!(f, "{}", ratio.num())
                } else {
                    write!(f, "{}/{}", ratio.num(), ratio.den())
                }
            }
        }
    }
}

fn write_fixed(f: &mut fmt::Formatter<'_>, coeff: u128, exp: i16) -> fmt::Result {
    let digits = coeff.to_string();
    if exp >= 0 {
        f.write_str(&digits)?;
        for _ in 0..exp {
            f.write_str("0")?;
        }
        return Ok(());
    }
    let n_frac = usize::from(exp.unsigned_abs());
    if digits.len() > n_frac {
        let (int_part, frac_part) = digits.split_at(digits.len() - n_frac);
        write!(f, "{int_part}.{frac_part}")
    } else {
        write!(f, "0.{}{}", "0".repeat(n_frac - digits.len()), digits)
    }
}

// --- operators ------------------------------------------------------------

/// Sum of two fixed-point operands when the aligned `u128` arithmetic
/// provably fits; `None` routes to the big path.
fn fixed_sum(lhs: &Rational, rhs: &Rational, negate_rhs: bool) -> Option<Rational> {
    let (
        Repr::FixedPoint { coeff: lhs_coeff, exp: lhs_exp },
        Repr::FixedPoint { coeff: rhs_coeff, exp: rhs_exp },
    ) = (&lhs.repr, &rhs.repr)
    else {
        return None;
    };
    let lhs_negative = lhs.sign == Sign::Negative;
    let rhs_negative = (rhs.sign == Sign::Negative) != negate_rhs;
    let shift = i32::from(*lhs_exp) - i32::from(*lhs_exp).min(i32::from(*rhs_exp));
    let rhs_shift = i32::from(*rhs_exp) - i32::from(*lhs_exp).min(i32::from(*rhs_exp));
    if shift > U128_MAX_DIGITS as i32 || rhs_shift > U128_MAX_DIGITS as i32 {
        return None;
    }
    let exp = (*lhs_exp).min(*rhs_exp);
    let lhs_aligned = lhs_coeff.checked_mul(u128_ten_pow(shift as u32))?;
    let rhs_aligned = rhs_coeff.checked_mul(u128_ten_pow(rhs_shift as u32))?;
    let (coeff, negative) = if lhs_negative == rhs_negative {
        (lhs_aligned.checked_add(rhs_aligned)?, lhs_negative)
    } else if lhs_aligned >= rhs_aligned {
        (lhs_aligned - rhs_aligned, lhs_negative)
    } else {
        (rhs_aligned - lhs_aligned, rhs_negative)
    };
    Some(Rational::from_fixed_parts(negative, coeff, exp))
}

/// Product of two fixed-point operands when the `u128` product fits.
fn fixed_mul(lhs: &Rational, rhs: &Rational) -> Option<Rational> {
    let (
        Repr::FixedPoint { coeff: lhs_coeff, exp: lhs_exp },
        Repr::FixedPoint { coeff: rhs_coeff, exp: rhs_exp },
    ) = (&lhs.repr, &rhs.repr)
    else {
        return None;
    };
    let coeff = lhs_coeff.checked_mul(*rhs_coeff)?;
    let exp = i16::try_from(i32::from(*lhs_exp) + i32::from(*rhs_exp)).ok()?;
    let negative = (lhs.sign == Sign::Negative) != (rhs.sign == Sign::Negative);
    Some(Rational::from_fixed_parts(negative, coeff, exp))
}

impl Add<&Rational> for &Rational {
    type Output = Rational;

    fn add(self, rhs: &Rational) -> Rational {
        if let Some(sum) = fixed_sum(self, rhs, false) {
            return sum;
        }
        let (lhs_num, lhs_den) = self.ratio();
        let (rhs_num, rhs_den) = rhs.ratio();
        Rational::from_signed_ratio(lhs_num * rhs_den + rhs_num * lhs_den, lhs_den * rhs_den)
    }
}

impl Sub<&Rational> for &Rational {
    type Output = Rational;

    fn sub(self, rhs: &Rational) -> Rational {
        if let Some(difference) = fixed_sum(self, rhs, true) {
            return difference;
        }
        let (lhs_num, lhs_den) = self.ratio();
        let (rhs_num, rhs_den) = rhs.ratio();
        Rational::from_signed_ratio(lhs_num * rhs_den - rhs_num * lhs_den, lhs_den * rhs_den)
    }
}

impl Mul<&Rational> for &Rational {
    type Output = Rational;

    fn mul(self, rhs: &Rational) -> Rational {
        if let Some(product) = fixed_mul(self, rhs) {
            return product;
        }
        let (lhs_num, lhs_den) = self.ratio();
        let (rhs_num, rhs_den) = rhs.ratio();
        Rational::from_signed_ratio(lhs_num * rhs_num, lhs_den * rhs_den)
    }
}

impl Div<&Rational> for &Rational {
    type Output = Rational;

    /// Panics on a zero divisor, like the primitive integer types; use
    /// [`Rational::try_div`] for a fallible division.
    fn div(self, rhs: &Rational) -> Rational {
        assert!(rhs.sign != Sign::Zero, "division by zero");
        let (lhs_num, lhs_den) = self.ratio();
        let (rhs_num, rhs_den) = rhs.ratio();
        let mut num = lhs_num * rhs_den;
        let mut den = lhs_den * rhs_num;
        if den.is_negative() {
            num = -num;
            den = -den;
        }
        Rational::from_signed_ratio(num, den)
    }
}

macro_rules! impl_owned_binop {
    ($($trait:ident :: $method:ident),*) => {$(
        impl $trait for Rational {
            type Output = Rational;

            fn $method(self, rhs: Rational) -> Rational {
                $trait::$method(&self, &rhs)
            }
        }

        impl $trait<&Rational> for Rational {
            type Output = Rational;

            fn $method(self, rhs: &Rational) -> Rational {
                $trait::$method(&self, rhs)
            }
        }

        impl $trait<Rational> for &Rational {
            type Output = Rational;

            fn $method(self, rhs: Rational) -> Rational {
                $trait::$method(self, &rhs)
            }
        }
    )*};
}

impl_owned_binop!(Add::add, Sub::sub, Mul::mul, Div::div);

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        match self.sign {
            Sign::Zero => self.clone(),
            _ => Rational::from_repr(self.sign.negated(), self.repr.clone(), self.precision),
        }
    }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        -&self
    }
}

// --- serde ----------------------------------------------------------------

/// Interchange shape for serde: the exact lowest-terms ratio plus the
/// precision constraint.
///
/// Deserializing re-promotes the ratio from scratch, so a value adjusted to
/// a non-minimal coefficient comes back in the minimal encoding: value and
/// precision survive the round trip, but the rendering is re-canonicalized
/// (`"2.0"` re-reads as `"2"`).
#[derive(Serialize, Deserialize)]
struct RationalRepr {
    numerator: BigInt,
    denominator: BigInt,
    precision: Option<i16>,
}

impl Serialize for Rational {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (num, den) = self.ratio();
        RationalRepr {
            numerator: num.clone(),
            denominator: den.clone(),
            precision: self.precision,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Rational {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = RationalRepr::deserialize(deserializer)?;
        let mut value =
            Self::from_ratio(repr.numerator, repr.denominator).map_err(serde::de::Error::custom)?;
        value.precision = repr.precision;
        Ok(value)
    }
}
