//! End-to-end properties of the public API: canonical-rendering round
//! trips, exactness of construction, variant-independent arithmetic, and
//! numeric-tower hash compatibility.

use std::cmp::Ordering;

use num_bigint::BigInt;
use pretty_assertions::assert_eq;
use rational::{ErrorKind, Rational, Rounding, set_default_rounding_mode};

fn rn(literal: &str) -> Rational {
    literal.parse().unwrap()
}

// === Round trip ===

#[test]
fn rational_render_parse_round_trip() {
    let literals = [
        "0", "1", "-1", "42", "1.5", "-0.05", "0.333", "1/3", "-22/7", "150",
        "123456789012345678901234567890123456789012345",
        "3602879701896397/36028797018963968",
    ];
    for literal in literals {
        let value = rn(literal);
        let rendered = value.to_string();
        assert_eq!(rn(&rendered), value, "literal {literal:?}");
        // canonical rendering is idempotent
        assert_eq!(rn(&rendered).to_string(), rendered);
    }
}

#[test]
fn rational_parse_normalizes_input() {
    assert_eq!(rn(" +1.50 ").to_string(), "1.5");
    assert_eq!(rn("0012").to_string(), "12");
    assert_eq!(rn("4/6").to_string(), "2/3");
    assert_eq!(rn("2.5e-3").to_string(), "0.0025");
    assert_eq!(rn("12e2").to_string(), "1200");
}

// === Exactness ===

#[test]
fn rational_new_reduces_to_lowest_terms() {
    let cases = [
        (6i64, 4i64, 3i64, 2i64),
        (-6, 4, -3, 2),
        (6, -4, -3, 2),
        (-6, -4, 3, 2),
        (0, 7, 0, 1),
        (10, 5, 2, 1),
    ];
    for (num, den, expected_num, expected_den) in cases {
        let value = Rational::new(num, den).unwrap();
        assert_eq!(
            value.as_integer_ratio(),
            (BigInt::from(expected_num), BigInt::from(expected_den)),
            "{num}/{den}"
        );
    }
}

#[test]
fn rational_float_construction_is_exact() {
    let tenth = Rational::try_from(0.1_f64).unwrap();
    assert_eq!(tenth.to_string(), "3602879701896397/36028797018963968");
    // the decimal literal 0.1 is a different (exact) value
    assert_ne!(tenth, rn("0.1"));
    assert_eq!(tenth.compare(&0.1_f64), Some(Ordering::Equal));
}

// === Variant transparency ===

#[test]
fn rational_arithmetic_is_variant_independent() {
    assert_eq!(&rn("1/3") + &rn("2/3"), rn("1"));
    assert_eq!(&rn("0.5") + &rn("1/2"), rn("1"));
    let wide = rn(&format!("1{}", "0".repeat(40)));
    assert_eq!(&(&wide - &wide) + &rn("1/3"), rn("1/3"));
    assert_eq!(wide.try_div(&wide).unwrap(), rn("1"));
}

#[test]
fn rational_sum_of_thirds_matches_decimal_path() {
    let mut total = Rational::zero();
    let third = rn("1/3");
    for _ in 0..6 {
        total = &total + &third;
    }
    assert_eq!(total, rn("2"));
    assert_eq!(total.to_string(), "2");
}

// === Rounding ===

#[test]
fn rational_adjusted_two_point_five_all_modes() {
    let value = rn("2.5");
    let expected = [
        (Rounding::O5Up, "2"),
        (Rounding::Ceiling, "3"),
        (Rounding::Down, "2"),
        (Rounding::Floor, "2"),
        (Rounding::HalfDown, "2"),
        (Rounding::HalfEven, "2"),
        (Rounding::HalfUp, "3"),
        (Rounding::Up, "3"),
    ];
    for (mode, text) in expected {
        assert_eq!(value.adjusted(0, Some(mode)).unwrap().to_string(), text, "{mode}");
    }
}

#[test]
fn rational_default_mode_is_scoped_to_thread() {
    let value = rn("0.5");
    assert_eq!(value.adjusted(0, None).unwrap().to_string(), "0");
    let previous = set_default_rounding_mode(Rounding::Up);
    assert_eq!(value.adjusted(0, None).unwrap().to_string(), "1");
    let inner = std::thread::spawn(move || rn("0.5").adjusted(0, None).unwrap().to_string())
        .join()
        .unwrap();
    // the spawned thread still sees the initial default
    assert_eq!(inner, "0");
    set_default_rounding_mode(previous);
}

// === Hash compatibility ===

#[test]
fn rational_hash_matches_integer_hash() {
    // CPython: hash(3) == 3, hash(-3) == -3 for small ints
    assert_eq!(rn("3").num_hash(), 3);
    assert_eq!(rn("-3").num_hash(), -3);
    assert_eq!(rn("0").num_hash(), 0);
    // CPython: hash(Fraction(1, 2)) == 2**60
    assert_eq!(rn("0.5").num_hash(), 1 << 60);
    assert_eq!(rn("1/2").num_hash(), 1 << 60);
    // hash(-1) is remapped to -2 throughout the tower
    assert_eq!(rn("-1").num_hash(), -2);
}

#[test]
fn rational_equal_values_hash_equal() {
    let pairs = [("0.5", "1/2"), ("2", "4/2"), ("1.5e1", "15"), ("-0.25", "-1/4")];
    for (lhs, rhs) in pairs {
        assert_eq!(rn(lhs).num_hash(), rn(rhs).num_hash(), "{lhs} vs {rhs}");
    }
}

// === Boundaries and zero ===

#[test]
fn rational_41_digit_integer_stays_exact() {
    let literal = format!("1{}", "0".repeat(40));
    let value = rn(&literal);
    let expected = BigInt::parse_bytes(literal.as_bytes(), 10).unwrap();
    assert_eq!(value.as_integer_ratio(), (expected.clone(), BigInt::from(1)));
    assert_eq!(value, Rational::from(expected));
    assert_eq!(value.to_string(), literal);
}

#[test]
fn rational_zero_is_canonical() {
    let zeros = [rn("0"), rn("0.000"), rn("-0"), rn("0/9"), Rational::default()];
    for zero in &zeros {
        assert_eq!(*zero, Rational::zero());
        assert_eq!(zero.num_hash(), 0);
        assert_eq!(zero.to_string(), "0");
        assert!(zero.is_zero());
    }
    let constrained = Rational::zero().adjusted(5, None).unwrap();
    assert_eq!(constrained, Rational::zero());
    assert_eq!(constrained.to_string(), "0");
}

// === Errors ===

#[test]
fn rational_error_kinds() {
    assert_eq!(rn_err("1/0"), ErrorKind::DivisionByZero);
    assert_eq!(rn_err("abc"), ErrorKind::InvalidLiteral);
    assert_eq!(rn_err(""), ErrorKind::InvalidLiteral);
    assert_eq!(rn_err("1.2.3"), ErrorKind::InvalidLiteral);
    assert_eq!(rn_err("1e999999"), ErrorKind::PrecisionOutOfRange);
    assert_eq!(Rational::new(1, 0).unwrap_err().kind(), ErrorKind::DivisionByZero);
    assert_eq!(
        Rational::new(f64::NAN, 1).unwrap_err().kind(),
        ErrorKind::UnsupportedOperand
    );
}

fn rn_err(literal: &str) -> ErrorKind {
    literal.parse::<Rational>().unwrap_err().kind()
}
