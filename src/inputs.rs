//! Conversions from caller-supplied values into `Decimal`.
//!
//! Two flavours live here: the strict [`IntoTipDecimal`] trait for numeric
//! call sites, and the lenient text coercion a screen applies to whatever
//! the user has typed so far (see [`parse_amount`] and [`parse_tip_percent`]).

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{trace, warn};

use crate::calculator::DEFAULT_TIP_PERCENT;
use crate::types::TipError;

/// Trait for converting various types into `Decimal` for tip calculations.
///
/// Lets callers pass `i32`, `f64`, `&str`, etc. directly into builders
/// without wrapping them in `dec!()` or `Decimal::from()`.
pub trait IntoTipDecimal {
    fn into_tip_decimal(self) -> Result<Decimal, TipError>;
}

impl IntoTipDecimal for Decimal {
    fn into_tip_decimal(self) -> Result<Decimal, TipError> {
        Ok(self)
    }
}

macro_rules! impl_into_tip_decimal_int {
    ($($t:ty),*) => {
        $(
            impl IntoTipDecimal for $t {
                fn into_tip_decimal(self) -> Result<Decimal, TipError> {
                    Ok(Decimal::from(self))
                }
            }
        )*
    };
}

impl_into_tip_decimal_int!(i32, u32, i64, u64, isize, usize);

// `from_f64` picks the shortest decimal that round-trips, so 59.99 stays 59.99.
macro_rules! impl_into_tip_decimal_float {
    ($($t:ty),*) => {
        $(
            impl IntoTipDecimal for $t {
                fn into_tip_decimal(self) -> Result<Decimal, TipError> {
                    Decimal::from_f64(self as f64)
                        .ok_or_else(|| TipError::invalid_input("number", format!("Invalid float value: {}", self)))
                }
            }
        )*
    };
}

impl_into_tip_decimal_float!(f32, f64);

impl IntoTipDecimal for &str {
    fn into_tip_decimal(self) -> Result<Decimal, TipError> {
        match classify(self) {
            ParsedNumber::Value(value) => Ok(value),
            ParsedNumber::OutOfRange { .. } => {
                Err(TipError::invalid_input("text", format!("Number out of range: '{}'", self)))
            }
            ParsedNumber::NotANumber => {
                Err(TipError::invalid_input("text", format!("Invalid number format: '{}'", self)))
            }
        }
    }
}

impl IntoTipDecimal for String {
    fn into_tip_decimal(self) -> Result<Decimal, TipError> {
        self.as_str().into_tip_decimal()
    }
}

/// What a blank or unparsable tip-percentage field means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlankTipPolicy {
    /// Fall back to the configured default percentage (15% unless overridden).
    #[default]
    DefaultPercent,
    /// Treat the field as 0%, so no tip is shown until a percentage is typed.
    Zero,
}

impl FromStr for BlankTipPolicy {
    type Err = TipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "default-percent" => Ok(BlankTipPolicy::DefaultPercent),
            "zero" | "0" => Ok(BlankTipPolicy::Zero),
            other => Err(TipError::ConfigurationError(format!(
                "Unknown blank tip policy '{}' (expected 'default-percent' or 'zero')",
                other
            ))),
        }
    }
}

/// Just under `Decimal::MAX` (about 7.92e28).
const DECIMAL_MAGNITUDE_LIMIT: f64 = 7.9e28;

/// Outcome of reading user text as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParsedNumber {
    Value(Decimal),
    /// A well-formed number whose magnitude does not fit in `Decimal`.
    OutOfRange { negative: bool },
    NotANumber,
}

/// Optional sign, digits with at most one `.`, optional exponent.
/// Digit separators, suffixes and words such as `NaN` are rejected.
fn is_real_number(text: &str) -> bool {
    let body = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };

    let mut digits = 0;
    let mut dots = 0;
    for c in mantissa.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    if digits == 0 || dots > 1 {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !exp.is_empty() && exp.chars().all(|c| c.is_ascii_digit())
        }
    }
}

fn classify(text: &str) -> ParsedNumber {
    let text = text.trim();
    if !is_real_number(text) {
        return ParsedNumber::NotANumber;
    }
    if let Ok(value) = Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text)) {
        return ParsedNumber::Value(value);
    }

    // Syntax is valid, so rust_decimal rejected it for range or precision.
    match text.parse::<f64>() {
        Ok(value) if value.abs() < DECIMAL_MAGNITUDE_LIMIT => {
            ParsedNumber::Value(Decimal::from_f64(value).unwrap_or(Decimal::ZERO))
        }
        Ok(value) => ParsedNumber::OutOfRange {
            negative: value.is_sign_negative(),
        },
        Err(_) => ParsedNumber::NotANumber,
    }
}

/// Parses user-entered text as a real number.
///
/// Surrounding whitespace is ignored; plain and scientific notation are
/// accepted. Numbers beyond the range of `Decimal` saturate to
/// `Decimal::MAX` / `Decimal::MIN`. Returns `None` for anything else,
/// including empty text.
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    match classify(text) {
        ParsedNumber::Value(value) => Some(value),
        ParsedNumber::OutOfRange { negative } => {
            warn!(input = text, "number out of range, saturating");
            Some(if negative { Decimal::MIN } else { Decimal::MAX })
        }
        ParsedNumber::NotANumber => None,
    }
}

/// Coerces the bill-amount field. Unparsable text counts as zero.
pub fn parse_amount(text: &str) -> Decimal {
    parse_decimal(text).unwrap_or_else(|| {
        trace!(input = text, "bill amount not a number, using 0");
        Decimal::ZERO
    })
}

/// Coerces the tip-percentage field, applying `policy` when it does not parse.
pub fn parse_tip_percent(text: &str, policy: BlankTipPolicy, default_percent: Decimal) -> Decimal {
    parse_decimal(text).unwrap_or_else(|| {
        let fallback = match policy {
            BlankTipPolicy::DefaultPercent => default_percent,
            BlankTipPolicy::Zero => Decimal::ZERO,
        };
        trace!(input = text, %fallback, ?policy, "tip percent not a number");
        fallback
    })
}

/// Coerces the tip-percentage field with the stock 15% default.
pub fn parse_tip_percent_or_default(text: &str) -> Decimal {
    parse_tip_percent(text, BlankTipPolicy::DefaultPercent, DEFAULT_TIP_PERCENT)
}
