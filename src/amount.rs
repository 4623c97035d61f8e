//! Numeric helpers shared by the totalizer, the word formatter and the print preview.
//!
//! Every monetary value is a [`BigDecimal`] expressed in whole Ariary. Values keep their full
//! precision while they flow through computations and are only rounded (half-up, to the unit)
//! when they are displayed.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode};

use crate::error::Error;

/// Suffix printed after formatted amounts.
pub const CURRENCY_SYMBOL: &str = "Ar";

/// Full currency name appended to amounts written in words.
pub const CURRENCY_NAME: &str = "Ariary";

/// Convert a float coming from a form field or a JSON number into a [`BigDecimal`].
///
/// The conversion goes through the shortest decimal representation of the float, so `0.1`
/// becomes exactly `0.1` rather than its binary expansion.
///
/// # Errors
/// [`crate::error::ErrorKind::InvalidAmount`] if `value` is NaN or infinite.
///
/// # Example
/// ```rust
/// use std::str::FromStr;
///
/// use bigdecimal::BigDecimal;
/// use facture::amount::decimal_from_f64;
///
/// assert_eq!(decimal_from_f64(2.5).unwrap(), BigDecimal::from_str("2.5").unwrap());
/// assert!(decimal_from_f64(f64::NAN).is_err());
/// ```
pub fn decimal_from_f64(value: f64) -> Result<BigDecimal, Error> {
    if !value.is_finite() {
        return Err(Error::invalid_amount(format!("{value} is not a finite number")));
    }
    BigDecimal::from_str(&value.to_string())
        .map_err(|e| Error::invalid_amount(format!("cannot represent {value}: {e}")))
}

/// Parse an amount typed by a user. Spaces used as thousands separators are ignored and a
/// comma is accepted as the decimal separator.
///
/// # Errors
/// [`crate::error::ErrorKind::InvalidAmount`] if the text is not a number.
pub fn parse_decimal(raw: &str) -> Result<BigDecimal, Error> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return Err(Error::invalid_amount("empty amount"));
    }
    BigDecimal::from_str(&cleaned)
        .map_err(|e| Error::invalid_amount(format!("'{raw}' is not a number: {e}")))
}

/// Fail with [`crate::error::ErrorKind::InvalidAmount`] when `value` is below zero.
///
/// `label` names the offending input in the error message.
pub fn ensure_non_negative(label: &str, value: &BigDecimal) -> Result<(), Error> {
    if *value < BigDecimal::from(0) {
        return Err(Error::invalid_amount(format!(
            "{label} must not be negative, got {value}"
        )));
    }
    Ok(())
}

/// Round to the whole currency unit, halves going away from zero.
pub fn round_to_unit(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(0, RoundingMode::HalfUp)
}

/// Format an amount rounded to the unit with spaces between groups of three digits.
///
/// # Example
/// ```rust
/// use bigdecimal::BigDecimal;
/// use facture::amount::format_amount;
///
/// assert_eq!(format_amount(&BigDecimal::from(182500)), "182 500");
/// ```
pub fn format_amount(value: &BigDecimal) -> String {
    let (digits, _) = round_to_unit(value).as_bigint_and_exponent();
    let digits = digits.to_string();
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits.as_str()),
    };
    format!("{sign}{}", group_thousands(digits))
}

/// [`format_amount`] followed by the currency symbol, e.g. `"1 500 Ar"`.
pub fn format_ariary(value: &BigDecimal) -> String {
    format!("{} {CURRENCY_SYMBOL}", format_amount(value))
}

/// Format a percentage with at most two decimals and a French decimal comma, e.g. `"12,5 %"`.
pub fn format_percentage(value: &BigDecimal) -> String {
    format!("{} %", trimmed(value, 2))
}

/// Format a quantity with at most three decimals, e.g. `"2,75"` or `"10"`.
pub fn format_quantity(value: &BigDecimal) -> String {
    trimmed(value, 3)
}

fn trimmed(value: &BigDecimal, scale: i64) -> String {
    let text = value.with_scale_round(scale, RoundingMode::HalfUp).to_string();
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    text.replace('.', ",")
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}
