//! Numeric-tower-compatible hashing.
//!
//! Equal numeric values hash equal regardless of representation: the hash of
//! a fraction is computed modulo the Mersenne prime `2^61 - 1`, so `3/1`
//! hashes like the integer `3` and `1/2` hashes via the modular inverse of
//! its denominator. This mirrors CPython's scheme for `int` and `Fraction`.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};

/// `2^61 - 1`, the reduction modulus of the numeric hash.
pub(crate) const HASH_MODULUS: u64 = (1 << 61) - 1;

/// Hash of a denominator with no inverse modulo [`HASH_MODULUS`].
const HASH_INF: i64 = 314_159;

/// Hash of an arbitrary-precision integer, reduced modulo `2^61 - 1`.
pub(crate) fn hash_bigint(value: &BigInt) -> i64 {
    let modulus = BigInt::from(HASH_MODULUS);
    let remainder = value.abs().mod_floor(&modulus);
    // mod_floor of a nonnegative value fits well below 2^61
    let mut hash = remainder.to_i64().unwrap_or(0);
    if value.is_negative() {
        hash = -hash;
    }
    if hash == -1 { -2 } else { hash }
}

/// Hash of the fraction `sign * num / den` with `num >= 0` and `den > 0`.
///
/// Denominators divisible by the modulus have no inverse and map to the
/// infinity marker instead.
pub(crate) fn hash_ratio(num: &BigInt, den: &BigInt, negative: bool) -> i64 {
    let modulus = BigInt::from(HASH_MODULUS);
    let den_inverse = den.modpow(&BigInt::from(HASH_MODULUS - 2), &modulus);
    let mut hash = if den_inverse.is_zero() {
        HASH_INF
    } else {
        hash_bigint(&(BigInt::from(hash_bigint(&num.abs())) * den_inverse))
    };
    if negative {
        hash = -hash;
    }
    if hash == -1 { -2 } else { hash }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_i64(value: i64) -> i64 {
        hash_bigint(&BigInt::from(value))
    }

    #[test]
    fn test_hash_small_ints() {
        assert_eq!(hash_i64(0), 0);
        assert_eq!(hash_i64(1), 1);
        assert_eq!(hash_i64(-1), -2);
        assert_eq!(hash_i64(314), 314);
        assert_eq!(hash_i64(-314), -314);
    }

    #[test]
    fn test_hash_reduces_modulo_mersenne() {
        let modulus = BigInt::from(HASH_MODULUS);
        assert_eq!(hash_bigint(&modulus), 0);
        assert_eq!(hash_bigint(&(&modulus + 7)), 7);
        assert_eq!(hash_bigint(&(&modulus * 12 + 34)), 34);
    }

    #[test]
    fn test_integer_valued_ratio_matches_int_hash() {
        for value in [0i64, 1, 2, 42, 1_000_003] {
            assert_eq!(
                hash_ratio(&BigInt::from(value), &BigInt::from(1), false),
                hash_i64(value),
            );
        }
        assert_eq!(hash_ratio(&BigInt::from(3), &BigInt::from(1), true), hash_i64(-3));
    }

    #[test]
    fn test_hash_one_half() {
        // the inverse of 2 modulo 2^61 - 1 is 2^60
        assert_eq!(
            hash_ratio(&BigInt::from(1), &BigInt::from(2), false),
            1 << 60,
        );
    }

    #[test]
    fn test_denominator_without_inverse() {
        let den = BigInt::from(HASH_MODULUS);
        assert_eq!(hash_ratio(&BigInt::from(1), &den, false), HASH_INF);
        assert_eq!(hash_ratio(&BigInt::from(1), &den, true), -HASH_INF);
    }

    #[test]
    fn test_negative_one_value_remaps() {
        assert_eq!(hash_ratio(&BigInt::from(1), &BigInt::from(1), true), -2);
    }
}
