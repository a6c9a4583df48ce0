// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Exact scalar values.
//!
//! Every amount handled by a time system (conversion factors, exception
//! amounts, dates expressed in the base unit) is a [`Value`], an arbitrary
//! precision rational. Conversions must be exact inverses of each other for
//! format round trips to hold, so no floating point is used internally.
//!
//! Caller-supplied amounts enter through [`IntoValue`], which accepts the
//! usual numeric types and strings such as `"42"`, `"-12.75"` or `"3/4"`.

use crate::error::{Error, Result};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

/// Exact rational amount.
pub type Value = BigRational;

// ═══════════════════════════════════════════════════════════════════════════
// Conversions into Value
// ═══════════════════════════════════════════════════════════════════════════

/// Conversion of caller input into an exact [`Value`].
///
/// Fails with [`Error::InvalidValue`] for inputs that have no exact rational
/// reading (`NaN`, infinities, malformed strings, zero denominators).
pub trait IntoValue {
    fn into_value(self) -> Result<Value>;
}

macro_rules! impl_into_value_for_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl IntoValue for $t {
                #[inline]
                fn into_value(self) -> Result<Value> {
                    Ok(Value::from_integer(BigInt::from(self)))
                }
            }
        )*
    };
}

impl_into_value_for_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl IntoValue for BigInt {
    #[inline]
    fn into_value(self) -> Result<Value> {
        Ok(Value::from_integer(self))
    }
}

impl IntoValue for Value {
    #[inline]
    fn into_value(self) -> Result<Value> {
        Ok(self)
    }
}

impl IntoValue for &Value {
    #[inline]
    fn into_value(self) -> Result<Value> {
        Ok(self.clone())
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Result<Value> {
        BigRational::from_float(self)
            .ok_or_else(|| Error::InvalidValue(format!("{self} has no exact rational value")))
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Result<Value> {
        f64::from(self).into_value()
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Result<Value> {
        parse_value(self)
    }
}

impl IntoValue for String {
    fn into_value(self) -> Result<Value> {
        parse_value(&self)
    }
}

impl IntoValue for &String {
    fn into_value(self) -> Result<Value> {
        parse_value(self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Parsing
// ═══════════════════════════════════════════════════════════════════════════

/// Parse a decimal (`"-12.5"`), integer (`"7"`) or fraction (`"3/4"`) string.
///
/// # Examples
///
/// ```
/// use horolog::{parse_value, Value};
/// use num_bigint::BigInt;
///
/// let v = parse_value("-12.5").unwrap();
/// assert_eq!(v, Value::new(BigInt::from(-25), BigInt::from(2)));
/// assert!(parse_value("twelve").is_err());
/// ```
pub fn parse_value(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    let parsed = match trimmed.split_once('/') {
        Some((num, den)) => parse_fraction(num.trim(), den.trim()),
        None => parse_decimal(trimmed),
    };
    parsed.ok_or_else(|| Error::InvalidValue(format!("\"{text}\" is not a number")))
}

fn parse_fraction(num: &str, den: &str) -> Option<Value> {
    let num = parse_decimal(num)?;
    let den = parse_decimal(den)?;
    if den.is_zero() {
        return None;
    }
    Some(num / den)
}

fn parse_decimal(text: &str) -> Option<Value> {
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }

    let mantissa: BigInt = format!("{int_part}{frac_part}").parse().ok()?;
    let scale = num_traits::pow(BigInt::from(10u8), frac_part.len());
    let magnitude = Value::new(mantissa, scale);
    Some(if negative { -magnitude } else { magnitude })
}

// ═══════════════════════════════════════════════════════════════════════════
// Arithmetic helpers
// ═══════════════════════════════════════════════════════════════════════════

/// Floored modulo: the result has the sign of `modulus` (always ≥ 0 for the
/// positive lengths used by unit and division arithmetic).
pub(crate) fn modulo(value: &Value, modulus: &Value) -> Value {
    value - modulus * (value / modulus).floor()
}

/// Largest integer not greater than `value`.
pub(crate) fn floor_int(value: &Value) -> BigInt {
    value.floor().to_integer()
}

pub(crate) fn one() -> Value {
    Value::one()
}

pub(crate) fn is_positive(value: &Value) -> bool {
    value.is_positive()
}
