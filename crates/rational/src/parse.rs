//! Hand-written scanner for decimal and fraction literals.
//!
//! Two grammars, with optional surrounding whitespace and a
//! case-insensitive exponent marker:
//!
//! ```text
//! [+|-] digits [. digits] [(e|E) [+|-] digits]
//! [+|-] digits / digits
//! ```
//!
//! The fast path accumulates into fixed-width integers and reports
//! [`ParseFailure::Overflow`] as soon as a literal cannot fit, at which point
//! the caller re-scans with [`parse_literal_big`]. Overflow is therefore
//! never user-visible; only malformed text and out-of-range exponents are.

use std::iter::Peekable;
use std::str::Chars;

use num_bigint::BigInt;
use num_traits::Zero;

use crate::rational::{MAX_EXP, MIN_EXP};
use crate::uint_math::{U64_MAX_DIGITS, U128_MAX_DIGITS};

/// A literal scanned into fixed-width components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParsedLiteral {
    /// `sign * coeff * 10^exp`
    Dec { negative: bool, coeff: u128, exp: i16 },
    /// `sign * num / den` (den not yet checked for zero)
    Quot { negative: bool, num: u64, den: u64 },
}

/// A literal scanned into arbitrary-precision components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BigLiteral {
    Dec { negative: bool, coeff: BigInt, exp: i64 },
    Quot { negative: bool, num: BigInt, den: BigInt },
}

/// Why a scan stopped without producing a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParseFailure {
    /// Malformed text; a hard error.
    Invalid,
    /// A fixed-width accumulator ran out of digits; retry on the big path.
    Overflow,
    /// Exponent outside the representable range; a hard error.
    ExpRange,
}

/// Zero code points of Unicode decimal-digit ranges beyond ASCII.
///
/// Each range holds the ten consecutive digits 0..=9 starting at the listed
/// code point (Arabic-Indic, Devanagari, Bengali, and friends).
const NON_ASCII_DIGIT_ZEROS: &[u32] = &[
    0x0660, // Arabic-Indic
    0x06F0, // Extended Arabic-Indic
    0x0966, // Devanagari
    0x09E6, // Bengali
    0x0A66, // Gurmukhi
    0x0AE6, // Gujarati
    0x0B66, // Oriya
    0x0BE6, // Tamil
    0x0C66, // Telugu
    0x0CE6, // Kannada
    0x0D66, // Malayalam
    0x0E50, // Thai
    0x0ED0, // Lao
    0x0F20, // Tibetan
    0x1040, // Myanmar
    0x17E0, // Khmer
    0x1810, // Mongolian
    0xFF10, // Fullwidth
];

/// Maps a character to its decimal digit value, covering ASCII and the
/// non-ASCII ranges above.
fn map_decimal_digit(ch: char) -> Option<u32> {
    ch.to_digit(10).or_else(|| {
        NON_ASCII_DIGIT_ZEROS.iter().find_map(|&zero| {
            let offset = (ch as u32).wrapping_sub(zero);
            (offset < 10).then_some(offset)
        })
    })
}

struct Scanner<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Scanner<'a> {
    fn new(literal: &'a str) -> Self {
        Self {
            chars: literal.chars().peekable(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) {
        self.chars.next();
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Consumes an optional sign, returning true for `-`.
    fn consume_sign(&mut self) -> bool {
        match self.peek() {
            Some('-') => {
                self.bump();
                true
            }
            Some('+') => {
                self.bump();
                false
            }
            _ => false,
        }
    }

    /// Consumes leading zero digits, returning whether any were seen.
    fn consume_leading_zeros(&mut self) -> bool {
        let mut seen = false;
        while self.peek().and_then(map_decimal_digit) == Some(0) {
            self.bump();
            seen = true;
        }
        seen
    }

    fn next_digit(&mut self) -> Option<u32> {
        let digit = self.peek().and_then(map_decimal_digit)?;
        self.bump();
        Some(digit)
    }

    /// Verifies only trailing whitespace remains.
    fn expect_end(&mut self) -> Result<(), ParseFailure> {
        self.skip_whitespace();
        if self.peek().is_some() {
            return Err(ParseFailure::Invalid);
        }
        Ok(())
    }

    /// Parses the optional exponent part, returning the explicit exponent.
    ///
    /// The accumulated value is capped at [`MAX_EXP`]; a marker without any
    /// digit is malformed.
    fn consume_exponent(&mut self) -> Result<i64, ParseFailure> {
        if !matches!(self.peek(), Some('e' | 'E')) {
            return Ok(0);
        }
        self.bump();
        let negative = self.consume_sign();
        let Some(first) = self.next_digit() else {
            return Err(ParseFailure::Invalid);
        };
        let mut accu = i64::from(first);
        while let Some(digit) = self.next_digit() {
            accu = accu * 10 + i64::from(digit);
            if accu > i64::from(MAX_EXP) {
                return Err(ParseFailure::ExpRange);
            }
        }
        Ok(if negative { -accu } else { accu })
    }
}

/// Scans a literal into fixed-width components.
///
/// Digit counts are capped at the 38-digit `u128` coefficient capacity and
/// the 19-digit `u64` capacity for fraction parts.
pub(crate) fn parse_literal(literal: &str) -> Result<ParsedLiteral, ParseFailure> {
    let mut s = Scanner::new(literal);
    s.skip_whitespace();
    if s.peek().is_none() {
        return Err(ParseFailure::Invalid);
    }
    let negative = s.consume_sign();
    let leading_zero = s.consume_leading_zeros();

    let mut coeff: u128 = 0;
    let mut n_digits: u32 = 0;
    while let Some(digit) = s.peek().and_then(map_decimal_digit) {
        if n_digits == U128_MAX_DIGITS {
            return Err(ParseFailure::Overflow);
        }
        coeff = coeff * 10 + u128::from(digit);
        n_digits += 1;
        s.bump();
    }

    let mut n_frac: u32 = 0;
    let mut quot: Option<(u64, u64)> = None;
    match s.peek() {
        Some('.') => {
            s.bump();
            let n_int_digits = n_digits;
            while let Some(digit) = s.peek().and_then(map_decimal_digit) {
                if n_digits == U128_MAX_DIGITS {
                    return Err(ParseFailure::Overflow);
                }
                coeff = coeff * 10 + u128::from(digit);
                n_digits += 1;
                s.bump();
            }
            n_frac = n_digits - n_int_digits;
        }
        Some('/') => {
            if n_digits > U64_MAX_DIGITS {
                // numerator too wide for the u64 quotient form
                return Err(ParseFailure::Overflow);
            }
            s.bump();
            let num = coeff as u64;
            let mut den: u64 = 0;
            let mut n_den: u32 = 0;
            while let Some(digit) = s.peek().and_then(map_decimal_digit) {
                den = den
                    .checked_mul(10)
                    .and_then(|d| d.checked_add(u64::from(digit)))
                    .ok_or(ParseFailure::Overflow)?;
                n_den += 1;
                s.bump();
            }
            if n_den == 0 {
                return Err(ParseFailure::Invalid);
            }
            quot = Some((num, den));
        }
        _ => {}
    }

    if n_digits == 0 && !leading_zero {
        return Err(ParseFailure::Invalid);
    }

    let parsed = if let Some((num, den)) = quot {
        ParsedLiteral::Quot { negative, num, den }
    } else {
        let explicit_exp = s.consume_exponent()?;
        let exp = explicit_exp - i64::from(n_frac);
        if exp < i64::from(MIN_EXP) || exp > i64::from(MAX_EXP) {
            return Err(ParseFailure::ExpRange);
        }
        ParsedLiteral::Dec {
            negative,
            coeff,
            exp: exp as i16,
        }
    };
    s.expect_end()?;
    Ok(parsed)
}

/// Scans a literal into arbitrary-precision components.
///
/// This is the exact fallback for literals whose digit counts overflow the
/// fixed-width scanner. Only the explicit exponent is bounded; fractional
/// digit counts may push the effective exponent past the fixed-point range
/// without losing exactness.
pub(crate) fn parse_literal_big(literal: &str) -> Result<BigLiteral, ParseFailure> {
    let mut s = Scanner::new(literal);
    s.skip_whitespace();
    if s.peek().is_none() {
        return Err(ParseFailure::Invalid);
    }
    let negative = s.consume_sign();
    let leading_zero = s.consume_leading_zeros();

    let mut coeff = BigInt::zero();
    let mut n_digits: u64 = 0;
    while let Some(digit) = s.peek().and_then(map_decimal_digit) {
        coeff = coeff * 10u32 + digit;
        n_digits += 1;
        s.bump();
    }

    let mut n_frac: u64 = 0;
    let mut quot: Option<(BigInt, BigInt)> = None;
    match s.peek() {
        Some('.') => {
            s.bump();
            let n_int_digits = n_digits;
            while let Some(digit) = s.peek().and_then(map_decimal_digit) {
                coeff = coeff * 10u32 + digit;
                n_digits += 1;
                s.bump();
            }
            n_frac = n_digits - n_int_digits;
        }
        Some('/') => {
            s.bump();
            let num = coeff;
            coeff = BigInt::zero();
            let mut den = BigInt::zero();
            let mut n_den: u64 = 0;
            while let Some(digit) = s.peek().and_then(map_decimal_digit) {
                den = den * 10u32 + digit;
                n_den += 1;
                s.bump();
            }
            if n_den == 0 {
                return Err(ParseFailure::Invalid);
            }
            quot = Some((num, den));
        }
        _ => {}
    }

    if n_digits == 0 && !leading_zero {
        return Err(ParseFailure::Invalid);
    }

    let parsed = if let Some((num, den)) = quot {
        BigLiteral::Quot { negative, num, den }
    } else {
        let explicit_exp = s.consume_exponent()?;
        BigLiteral::Dec {
            negative,
            coeff,
            exp: explicit_exp - i64::try_from(n_frac).unwrap_or(i64::MAX),
        }
    };
    s.expect_end()?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_integer() {
        assert_eq!(
            parse_literal("42"),
            Ok(ParsedLiteral::Dec {
                negative: false,
                coeff: 42,
                exp: 0
            })
        );
        assert_eq!(
            parse_literal("  -17 "),
            Ok(ParsedLiteral::Dec {
                negative: true,
                coeff: 17,
                exp: 0
            })
        );
    }

    #[test]
    fn test_decimal_forms() {
        assert_eq!(
            parse_literal("1.5"),
            Ok(ParsedLiteral::Dec {
                negative: false,
                coeff: 15,
                exp: -1
            })
        );
        assert_eq!(
            parse_literal("+.25"),
            Ok(ParsedLiteral::Dec {
                negative: false,
                coeff: 25,
                exp: -2
            })
        );
        assert_eq!(
            parse_literal("12."),
            Ok(ParsedLiteral::Dec {
                negative: false,
                coeff: 12,
                exp: 0
            })
        );
        assert_eq!(
            parse_literal("2.5e-3"),
            Ok(ParsedLiteral::Dec {
                negative: false,
                coeff: 25,
                exp: -4
            })
        );
        assert_eq!(
            parse_literal("3E2"),
            Ok(ParsedLiteral::Dec {
                negative: false,
                coeff: 3,
                exp: 2
            })
        );
    }

    #[test]
    fn test_leading_zeros() {
        assert_eq!(
            parse_literal("0007"),
            Ok(ParsedLiteral::Dec {
                negative: false,
                coeff: 7,
                exp: 0
            })
        );
        assert_eq!(
            parse_literal("0"),
            Ok(ParsedLiteral::Dec {
                negative: false,
                coeff: 0,
                exp: 0
            })
        );
        assert_eq!(
            parse_literal("0."),
            Ok(ParsedLiteral::Dec {
                negative: false,
                coeff: 0,
                exp: 0
            })
        );
    }

    #[test]
    fn test_fraction_form() {
        assert_eq!(
            parse_literal("3/7"),
            Ok(ParsedLiteral::Quot {
                negative: false,
                num: 3,
                den: 7
            })
        );
        assert_eq!(
            parse_literal("-22/7"),
            Ok(ParsedLiteral::Quot {
                negative: true,
                num: 22,
                den: 7
            })
        );
        // zero denominator scans fine, the constructor rejects it
        assert_eq!(
            parse_literal("1/0"),
            Ok(ParsedLiteral::Quot {
                negative: false,
                num: 1,
                den: 0
            })
        );
    }

    #[test]
    fn test_non_ascii_digits() {
        // Arabic-Indic "42"
        assert_eq!(
            parse_literal("\u{0664}\u{0662}"),
            Ok(ParsedLiteral::Dec {
                negative: false,
                coeff: 42,
                exp: 0
            })
        );
        // Fullwidth "1.5"
        assert_eq!(
            parse_literal("\u{FF11}.\u{FF15}"),
            Ok(ParsedLiteral::Dec {
                negative: false,
                coeff: 15,
                exp: -1
            })
        );
    }

    #[test]
    fn test_invalid_literals() {
        for literal in ["", "   ", "abc", "+", "-", ".", "1x", "1.5x", "1/", "/3", "1e", "1e+", "1/2/3", "1 2"] {
            assert_eq!(parse_literal(literal), Err(ParseFailure::Invalid), "literal {literal:?}");
        }
    }

    #[test]
    fn test_overflow_falls_back() {
        let wide = "1".repeat(39);
        assert_eq!(parse_literal(&wide), Err(ParseFailure::Overflow));
        assert_eq!(parse_literal("12345678901234567890/3"), Err(ParseFailure::Overflow));
        assert_eq!(parse_literal("1/123456789012345678901"), Err(ParseFailure::Overflow));
    }

    #[test]
    fn test_exponent_bounds() {
        assert_eq!(parse_literal("1e99999"), Err(ParseFailure::ExpRange));
        assert_eq!(parse_literal("1e-99999"), Err(ParseFailure::ExpRange));
        assert!(parse_literal("1e32767").is_ok());
    }

    #[test]
    fn test_big_fallback_matches() {
        let wide = "9".repeat(45);
        let BigLiteral::Dec { negative, coeff, exp } = parse_literal_big(&wide).unwrap() else {
            panic!("expected decimal literal");
        };
        assert!(!negative);
        assert_eq!(coeff.to_string(), wide);
        assert_eq!(exp, 0);

        let BigLiteral::Quot { num, den, .. } = parse_literal_big("12345678901234567890/3").unwrap() else {
            panic!("expected quotient literal");
        };
        assert_eq!(num.to_string(), "12345678901234567890");
        assert_eq!(den, BigInt::from(3));
    }

    #[test]
    fn test_big_fallback_deep_fraction() {
        // 1 followed by a very long fractional tail stays exact
        let literal = format!("0.{}1", "0".repeat(100));
        let BigLiteral::Dec { coeff, exp, .. } = parse_literal_big(&literal).unwrap() else {
            panic!("expected decimal literal");
        };
        assert_eq!(coeff, BigInt::from(1));
        assert_eq!(exp, -101);
    }
}
