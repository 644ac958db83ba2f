//! Literal values and their typing rules.
//!
//! Unquoted literal text is typed by shape: a full base-10 integer becomes
//! [`Value::Integer`], a full decimal becomes [`Value::Float`], anything else is a
//! [`Value::String`]. Integers outside the `i64` range and decimals that overflow `f64`
//! stay strings so that no literal is ever rounded. Quoted literals are always strings.

use std::fmt;

use serde::Serialize;

/// A typed literal value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// A base-10 integer that fits in an `i64`.
    Integer(i64),
    /// A decimal number.
    Float(f64),
    /// Any other text.
    String(String),
}

impl Value {
    /// Types unquoted literal text.
    pub fn classify(text: &str) -> Self {
        if let Ok(n) = text.parse::<i64>() {
            return Self::Integer(n);
        }
        if is_decimal(text)
            && text.contains('.')
            && let Ok(f) = text.parse::<f64>()
            && f.is_finite()
        {
            return Self::Float(f);
        }
        Self::String(text.to_string())
    }

}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            // Debug keeps the fractional part, so 2.0 stays distinguishable from 2.
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// Checks for `[+-]? digits? ('.' digits?)?` with at least one digit.
///
/// `f64::from_str` alone is too lenient: it accepts `inf`, `NaN` and exponents,
/// none of which are decimals in the query language.
fn is_decimal(text: &str) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (unsigned, ""),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    (!int_part.is_empty() || !frac_part.is_empty()) && all_digits(int_part) && all_digits(frac_part)
}
