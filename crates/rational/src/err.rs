//! Error type shared by construction, parsing, and adjustment operations.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Result type alias for operations that can fail with an [`RnError`].
pub type RnResult<T> = Result<T, RnError>;

/// Classification of rational arithmetic failures.
///
/// Uses strum derives for automatic `Display`, `FromStr`, and
/// `Into<&'static str>` implementations. The string representation matches
/// the variant name exactly (e.g., `InvalidLiteral` -> "InvalidLiteral").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed literal text.
    InvalidLiteral,
    /// Explicit zero denominator.
    DivisionByZero,
    /// Requested precision or exponent outside representable bounds.
    PrecisionOutOfRange,
    /// Operand not convertible to an integer ratio.
    UnsupportedOperand,
}

/// An error raised by rational construction or arithmetic.
///
/// Overflow of a fast internal representation is never an error: it silently
/// promotes the value to a wider encoding. Errors are reserved for inputs
/// that have no exact rational meaning at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RnError {
    kind: ErrorKind,
    message: String,
}

impl RnError {
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_literal(literal: &str) -> Self {
        Self::new(ErrorKind::InvalidLiteral, format!("invalid literal for Rational: '{literal}'"))
    }

    pub(crate) fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "rational division by zero")
    }

    pub(crate) fn precision_out_of_range(precision: i64) -> Self {
        Self::new(ErrorKind::PrecisionOutOfRange, format!("precision limit exceeded: {precision}"))
    }

    pub(crate) fn unsupported_operand(detail: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedOperand, detail)
    }

    /// Returns the error classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the human-readable error detail.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RnError {}
