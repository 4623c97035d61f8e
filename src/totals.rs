//! Line and invoice totals.
//!
//! All functions here are pure: they validate their inputs, never mutate them and return a fresh
//! [`BigDecimal`]. Invalid input is reported as [`crate::error::ErrorKind::InvalidAmount`] instead
//! of being clamped or coerced to zero. Results keep full precision; use
//! [`crate::amount::round_to_unit`] when displaying them.

use bigdecimal::BigDecimal;
use serde::Serialize;

use crate::{
    amount::ensure_non_negative,
    error::{AddContext, Error},
    invoice::serialize_bigdecimal,
};

/// Anything billed as `quantity × unit price`.
pub trait Priced {
    fn quantity(&self) -> &BigDecimal;
    fn unit_price(&self) -> &BigDecimal;
}

/// Every figure printed at the bottom of an invoice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceTotals {
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub subtotal: BigDecimal,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub discount: BigDecimal,
    /// `subtotal - discount`
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub base: BigDecimal,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub margin: BigDecimal,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub delivery: BigDecimal,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub total: BigDecimal,
}

/// Compute `quantity × unit_price`.
///
/// # Errors
/// [`crate::error::ErrorKind::InvalidAmount`] if either argument is negative.
///
/// # Example
/// ```rust
/// use bigdecimal::BigDecimal;
/// use facture::totals::compute_line_total;
///
/// let total = compute_line_total(&BigDecimal::from(10), &BigDecimal::from(15000)).unwrap();
/// assert_eq!(total, BigDecimal::from(150000));
/// assert!(compute_line_total(&BigDecimal::from(-1), &BigDecimal::from(100)).is_err());
/// ```
pub fn compute_line_total(
    quantity: &BigDecimal,
    unit_price: &BigDecimal,
) -> Result<BigDecimal, Error> {
    ensure_non_negative("quantity", quantity)?;
    ensure_non_negative("unit price", unit_price)?;
    Ok(quantity * unit_price)
}

/// Sum the line totals of `items`. An empty slice yields zero and the order of the items has no
/// influence on the result.
///
/// # Errors
/// [`crate::error::ErrorKind::InvalidAmount`] if any line has a negative quantity or price. The
/// error context names the 1-based position of the line.
pub fn compute_invoice_subtotal<P: Priced>(items: &[P]) -> Result<BigDecimal, Error> {
    items
        .iter()
        .enumerate()
        .try_fold(BigDecimal::from(0), |acc, (i, item)| {
            let line = compute_line_total(item.quantity(), item.unit_price())
                .add_context(&format!("computing total of line {}", i + 1))?;
            Ok(acc + line)
        })
}

/// Compute the grand total of an invoice.
///
/// The order of operations is fixed so printed totals agree everywhere:
/// 1. `base = subtotal - discount_amount`
/// 2. `margin = base × margin_percentage / 100`
/// 3. `total = base + margin + delivery_amount`
///
/// # Errors
/// [`crate::error::ErrorKind::InvalidAmount`] if any argument is negative or the discount exceeds
/// the subtotal.
///
/// # Example
/// ```rust
/// use bigdecimal::BigDecimal;
/// use facture::totals::compute_invoice_total;
///
/// let zero = BigDecimal::from(0);
/// let total =
///     compute_invoice_total(&BigDecimal::from(1000), &zero, &zero, &BigDecimal::from(15))
///         .unwrap();
/// assert_eq!(total, BigDecimal::from(1150));
/// ```
pub fn compute_invoice_total(
    subtotal: &BigDecimal,
    discount_amount: &BigDecimal,
    delivery_amount: &BigDecimal,
    margin_percentage: &BigDecimal,
) -> Result<BigDecimal, Error> {
    Ok(compute_breakdown(subtotal, discount_amount, delivery_amount, margin_percentage)?.total)
}

/// Same computation as [`compute_invoice_total`], keeping every intermediate figure.
///
/// # Errors
/// See [`compute_invoice_total`].
pub fn compute_breakdown(
    subtotal: &BigDecimal,
    discount_amount: &BigDecimal,
    delivery_amount: &BigDecimal,
    margin_percentage: &BigDecimal,
) -> Result<InvoiceTotals, Error> {
    ensure_non_negative("subtotal", subtotal)?;
    ensure_non_negative("discount", discount_amount)?;
    ensure_non_negative("delivery amount", delivery_amount)?;
    ensure_non_negative("margin percentage", margin_percentage)?;

    let base = subtotal - discount_amount;
    if base < BigDecimal::from(0) {
        return Err(Error::invalid_amount(format!(
            "discount {discount_amount} exceeds subtotal {subtotal}"
        )));
    }
    let margin = &base * margin_percentage / BigDecimal::from(100);
    let total = &base + &margin + delivery_amount;

    Ok(InvoiceTotals {
        subtotal: subtotal.clone(),
        discount: discount_amount.clone(),
        base,
        margin,
        delivery: delivery_amount.clone(),
        total,
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    struct Line(BigDecimal, BigDecimal);

    impl Priced for Line {
        fn quantity(&self) -> &BigDecimal {
            &self.0
        }

        fn unit_price(&self) -> &BigDecimal {
            &self.1
        }
    }

    fn line(quantity: i64, price: i64) -> Line {
        Line(BigDecimal::from(quantity), BigDecimal::from(price))
    }

    fn n(v: i64) -> BigDecimal {
        BigDecimal::from(v)
    }

    #[test]
    fn negative_line_inputs_are_rejected() {
        assert!(compute_line_total(&n(-1), &n(100)).unwrap_err().is_invalid_amount());
        assert!(compute_line_total(&n(5), &n(-1)).unwrap_err().is_invalid_amount());
    }

    #[test]
    fn fractional_quantities_keep_precision() {
        let qty = BigDecimal::from_str("2.5").unwrap();
        let total = compute_line_total(&qty, &n(1001)).unwrap();
        assert_eq!(total, BigDecimal::from_str("2502.5").unwrap());
    }

    #[test]
    fn empty_subtotal_is_zero() {
        let items: Vec<Line> = Vec::new();
        assert_eq!(compute_invoice_subtotal(&items).unwrap(), n(0));
    }

    #[test]
    fn subtotal_does_not_depend_on_order() {
        let mut items = vec![line(10, 15000), line(5, 2500), line(3, 7), line(0, 900)];
        let expected = compute_invoice_subtotal(&items).unwrap();
        items.reverse();
        assert_eq!(compute_invoice_subtotal(&items).unwrap(), expected);
        items.swap(0, 2);
        assert_eq!(compute_invoice_subtotal(&items).unwrap(), expected);
        assert_eq!(expected, n(162521));
    }

    #[test]
    fn bad_line_is_reported_with_its_position() {
        let items = vec![line(1, 10), line(-2, 10)];
        let err = compute_invoice_subtotal(&items).unwrap_err();
        assert!(err.is_invalid_amount());
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn discount_may_equal_but_not_exceed_subtotal() {
        assert_eq!(
            compute_invoice_total(&n(100), &n(100), &n(0), &n(0)).unwrap(),
            n(0)
        );
        assert!(
            compute_invoice_total(&n(100), &n(101), &n(0), &n(0))
                .unwrap_err()
                .is_invalid_amount()
        );
    }

    #[test]
    fn margin_applies_to_discounted_base() {
        assert_eq!(
            compute_invoice_total(&n(1000), &n(0), &n(0), &n(15)).unwrap(),
            n(1150)
        );
        let totals = compute_breakdown(&n(1000), &n(200), &n(50), &n(10)).unwrap();
        assert_eq!(totals.base, n(800));
        assert_eq!(totals.margin, n(80));
        assert_eq!(totals.total, n(930));
    }

    #[test]
    fn negative_terms_are_rejected() {
        assert!(compute_invoice_total(&n(100), &n(0), &n(-1), &n(0)).is_err());
        assert!(compute_invoice_total(&n(100), &n(0), &n(0), &n(-5)).is_err());
        assert!(compute_invoice_total(&n(100), &n(-1), &n(0), &n(0)).is_err());
    }

    #[test]
    fn total_is_idempotent() {
        let first = compute_invoice_total(&n(162500), &n(0), &n(20000), &n(0)).unwrap();
        let second = compute_invoice_total(&n(162500), &n(0), &n(20000), &n(0)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, n(182500));
    }
}
