//! Fixed-width integer helpers for the two fast internal encodings.
//!
//! Everything here operates on unsigned 64- and 128-bit integers with
//! explicit overflow checks. These are the performance substrate of the
//! fixed-point and small-quotient forms; the arbitrary-precision path never
//! goes through this module.

/// Largest `n` with `10^n <= u64::MAX`.
pub(crate) const U64_MAX_DIGITS: u32 = 19;

/// Largest decimal digit count accepted by the `u128` coefficient
/// accumulator. `10^38 <= u128::MAX`, so 38 digits always fit.
pub(crate) const U128_MAX_DIGITS: u32 = 2 * U64_MAX_DIGITS;

const U64_TEN_POWS: [u64; 20] = [
    1,
    10,
    100,
    1_000,
    10_000,
    100_000,
    1_000_000,
    10_000_000,
    100_000_000,
    1_000_000_000,
    10_000_000_000,
    100_000_000_000,
    1_000_000_000_000,
    10_000_000_000_000,
    100_000_000_000_000,
    1_000_000_000_000_000,
    10_000_000_000_000_000,
    100_000_000_000_000_000,
    1_000_000_000_000_000_000,
    10_000_000_000_000_000_000,
];

/// Returns `10^n` for `n <= 19`.
pub(crate) fn u64_ten_pow(n: u32) -> u64 {
    debug_assert!(n <= U64_MAX_DIGITS);
    U64_TEN_POWS[n as usize]
}

/// Returns `10^n` for `n <= 38`.
pub(crate) fn u128_ten_pow(n: u32) -> u128 {
    debug_assert!(n <= U128_MAX_DIGITS);
    if n <= U64_MAX_DIGITS {
        u128::from(u64_ten_pow(n))
    } else {
        u128::from(u64_ten_pow(U64_MAX_DIGITS)) * u128::from(u64_ten_pow(n - U64_MAX_DIGITS))
    }
}

/// Floor of the base-10 logarithm of `x`.
///
/// Precondition: `x > 0`.
pub(crate) fn u128_magnitude(x: u128) -> i32 {
    debug_assert!(x > 0);
    x.ilog10() as i32
}

/// Divides out factors of ten, up to `max` of them, returning the reduced
/// value and the number of zeros removed.
pub(crate) fn u128_strip_trailing_zeros(mut x: u128, max: u32) -> (u128, u32) {
    let mut stripped = 0;
    while x != 0 && stripped < max && x % 10 == 0 {
        x /= 10;
        stripped += 1;
    }
    (x, stripped)
}

/// Returns `2^n` for `n <= 63`.
pub(crate) fn u64_two_pow(n: u32) -> u64 {
    debug_assert!(n <= 63);
    1 << n
}

/// Returns `5^n` for `n <= 27` (the largest power of five fitting in `u64`).
pub(crate) fn u64_five_pow(n: u32) -> u64 {
    debug_assert!(n <= 27);
    let mut base: u64 = 5;
    let mut result: u64 = 1;
    let mut n = n;
    while n > 0 {
        if n % 2 == 1 {
            result *= base;
        }
        n >>= 1;
        if n > 0 {
            base *= base;
        }
    }
    result
}

/// Finds the least power of ten that is a multiple of `den`.
///
/// Factors `den` into powers of 2, 5, and 10. If a residual factor remains,
/// `den` cannot divide any power of ten and the result is `None`. Otherwise
/// returns `(factor, n)` such that `den * factor == 10^n`, with `factor` a
/// pure power of 2 or 5. `None` is also returned when `factor` would
/// overflow `u64` (complementary power of 5 above 27 or of 2 above 63).
pub(crate) fn pow10_factor(den: u64) -> Option<(u64, u32)> {
    let mut n = den;
    let mut nf10 = 0u32;
    let mut nf5 = 0u32;
    let mut nf2 = 0u32;
    while n >= 10 && n % 10 == 0 {
        n /= 10;
        nf10 += 1;
    }
    while n >= 5 && n % 5 == 0 {
        n /= 5;
        nf5 += 1;
    }
    while n >= 2 && n % 2 == 0 {
        n /= 2;
        nf2 += 1;
    }
    if n != 1 {
        return None;
    }
    if nf2 > nf5 {
        let t = nf2 - nf5;
        if t > 27 {
            return None;
        }
        Some((u64_five_pow(t), nf10 + nf2))
    } else if nf5 > nf2 {
        let t = nf5 - nf2;
        if t > 63 {
            return None;
        }
        Some((u64_two_pow(t), nf10 + nf5))
    } else {
        Some((1, nf10 + nf2))
    }
}
