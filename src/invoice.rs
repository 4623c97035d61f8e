//! Invoice domain types and serialization helpers.
//!
//! This module defines the structures used to represent invoices and quotes, their clients, line
//! items and optional delivery and margin terms. Derived amounts (line totals, subtotal, total)
//! are never stored: they are recomputed from the lines every time they are read. Builders are
//! derived for constructing instances.
//!
//! Decimals and datetimes are serialized as strings. Decimals also deserialize from JSON numbers
//! so that documents produced by a web form can be read directly.

use std::fmt::Display;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, Local};
use derive_builder::Builder;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    amount::{decimal_from_f64, parse_decimal, round_to_unit},
    error::{AddContext, Error},
    totals::{InvoiceTotals, Priced, compute_breakdown, compute_invoice_subtotal, compute_line_total},
    words::decimal_to_words,
};

pub(crate) fn serialize_bigdecimal<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

fn serialize_datetime<S>(value: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDecimal {
    Text(String),
    Signed(i64),
    Unsigned(u64),
    Number(f64),
}

pub(crate) fn deserialize_bigdecimal<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match RawDecimal::deserialize(deserializer)? {
        RawDecimal::Text(s) => parse_decimal(&s),
        RawDecimal::Signed(n) => Ok(BigDecimal::from(n)),
        RawDecimal::Unsigned(n) => Ok(BigDecimal::from(n)),
        RawDecimal::Number(n) => decimal_from_f64(n),
    };
    parsed.map_err(serde::de::Error::custom)
}

fn deserialize_datetime<'de, D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    DateTime::parse_from_rfc3339(&s).map_err(serde::de::Error::custom)
}

fn zero() -> BigDecimal {
    BigDecimal::from(0)
}

pub(crate) fn default_unit() -> String {
    String::from("pce")
}

fn now() -> DateTime<FixedOffset> {
    Local::now().into()
}

/// Whether a document is a final invoice or a quote. Both are computed the same way; they differ
/// by label, numbering and effect on stock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[default]
    Facture,
    Devis,
}

impl DocumentKind {
    /// Prefix used in document numbers, e.g. `FAC-2026-0001`.
    pub fn number_prefix(&self) -> &'static str {
        match self {
            DocumentKind::Facture => "FAC",
            DocumentKind::Devis => "DEV",
        }
    }

    /// Title printed at the top of the document.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Facture => "Facture",
            DocumentKind::Devis => "Devis",
        }
    }
}

impl Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Finalized,
    Paid,
    Cancelled,
}

/// A single invoice line: what was sold, in which unit, how many and at which unit price.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(strip_option, into), pattern = "owned")]
pub struct LineItem {
    description: String,
    #[builder(default = default_unit())]
    #[serde(default = "default_unit")]
    unit: String,
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal"
    )]
    quantity: BigDecimal,
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal"
    )]
    unit_price: BigDecimal,
    /// Catalog product this line was created from, if any.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    product_id: Option<u64>,
}

impl LineItem {
    pub(crate) fn for_product(
        product_id: Option<u64>,
        description: &str,
        unit: &str,
        quantity: BigDecimal,
        unit_price: BigDecimal,
    ) -> Self {
        Self {
            description: description.to_string(),
            unit: unit.to_string(),
            quantity,
            unit_price,
            product_id,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn product_id(&self) -> Option<u64> {
        self.product_id
    }

    /// Return the line total equal to `quantity * unit_price`.
    ///
    /// # Errors
    /// [`crate::error::ErrorKind::InvalidAmount`] if the quantity or the unit price is negative.
    pub fn total(&self) -> Result<BigDecimal, Error> {
        compute_line_total(&self.quantity, &self.unit_price)
    }
}

impl Priced for LineItem {
    fn quantity(&self) -> &BigDecimal {
        &self.quantity
    }

    fn unit_price(&self) -> &BigDecimal {
        &self.unit_price
    }
}

/// Delivery billed on top of the lines. A disabled term is kept on the document (so the form can
/// toggle it back on) but contributes nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryTerm {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal"
    )]
    pub quantity: BigDecimal,
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal"
    )]
    pub unit_price: BigDecimal,
}

fn enabled_by_default() -> bool {
    true
}

impl DeliveryTerm {
    pub fn new(quantity: impl Into<BigDecimal>, unit_price: impl Into<BigDecimal>) -> Self {
        Self {
            enabled: true,
            quantity: quantity.into(),
            unit_price: unit_price.into(),
        }
    }

    /// `quantity * unit_price` when enabled, zero otherwise.
    ///
    /// # Errors
    /// [`crate::error::ErrorKind::InvalidAmount`] if the quantity or the unit price is negative.
    pub fn amount(&self) -> Result<BigDecimal, Error> {
        if !self.enabled {
            return Ok(zero());
        }
        compute_line_total(&self.quantity, &self.unit_price)
    }
}

/// Percentage markup applied to the discounted subtotal, used on quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginTerm {
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal"
    )]
    pub percentage: BigDecimal,
}

impl MarginTerm {
    pub fn new(percentage: impl Into<BigDecimal>) -> Self {
        Self {
            percentage: percentage.into(),
        }
    }
}

/// The customer an invoice is addressed to.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(strip_option, into), pattern = "owned")]
pub struct Client {
    name: String,
    #[builder(default)]
    #[serde(default)]
    phone: Option<String>,
    #[builder(default)]
    #[serde(default)]
    email: Option<String>,
    #[builder(default)]
    #[serde(default)]
    address: Option<String>,
    /// Numéro d'identification fiscale
    #[builder(default)]
    #[serde(default)]
    nif: Option<String>,
    /// Numéro statistique
    #[builder(default)]
    #[serde(default)]
    stat: Option<String>,
}

impl Client {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Invoice or quote top level model
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(strip_option, into), pattern = "owned")]
pub struct Invoice {
    /// Assigned by the store.
    #[builder(setter(skip))]
    #[serde(default)]
    id: Option<u64>,
    /// Assigned by the store when the document is finalized.
    #[builder(setter(skip))]
    #[serde(default)]
    number: Option<String>,
    #[builder(default)]
    #[serde(default)]
    kind: DocumentKind,
    #[builder(setter(skip))]
    #[serde(default)]
    status: InvoiceStatus,
    client: Client,
    #[serde(
        serialize_with = "serialize_datetime",
        deserialize_with = "deserialize_datetime",
        default = "now"
    )]
    #[builder(default = Local::now().into())]
    created_datetime: DateTime<FixedOffset>,
    #[serde(
        serialize_with = "serialize_datetime",
        deserialize_with = "deserialize_datetime",
        default = "now"
    )]
    #[builder(default = Local::now().into())]
    net_due_datetime: DateTime<FixedOffset>,
    #[builder(default = Vec::new())]
    #[serde(default)]
    line_items: Vec<LineItem>,
    #[builder(default)]
    #[serde(default)]
    delivery: Option<DeliveryTerm>,
    #[builder(default)]
    #[serde(default)]
    margin: Option<MarginTerm>,
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal",
        default = "zero"
    )]
    #[builder(default = BigDecimal::from(0))]
    discount: BigDecimal,
    #[builder(default)]
    #[serde(default)]
    notes: Option<String>,
}

impl Invoice {
    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn number(&self) -> Option<&str> {
        self.number.as_deref()
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn created_datetime(&self) -> &DateTime<FixedOffset> {
        &self.created_datetime
    }

    pub fn net_due_datetime(&self) -> &DateTime<FixedOffset> {
        &self.net_due_datetime
    }

    /// Return a reference to the invoice's line items.
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn delivery(&self) -> Option<&DeliveryTerm> {
        self.delivery.as_ref()
    }

    pub fn margin(&self) -> Option<&MarginTerm> {
        self.margin.as_ref()
    }

    pub fn discount(&self) -> &BigDecimal {
        &self.discount
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Append a line at the end of the document.
    pub fn add_line(&mut self, line: LineItem) {
        self.line_items.push(line);
    }

    /// Remove and return the line at `index`, or `None` if there is no such line.
    pub fn remove_line(&mut self, index: usize) -> Option<LineItem> {
        if index < self.line_items.len() {
            Some(self.line_items.remove(index))
        } else {
            None
        }
    }

    pub fn set_delivery(&mut self, delivery: Option<DeliveryTerm>) {
        self.delivery = delivery;
    }

    pub fn set_margin(&mut self, margin: Option<MarginTerm>) {
        self.margin = margin;
    }

    pub fn set_discount(&mut self, discount: impl Into<BigDecimal>) {
        self.discount = discount.into();
    }

    pub fn set_notes(&mut self, notes: Option<String>) {
        self.notes = notes;
    }

    /// Sum of the line totals.
    ///
    /// # Errors
    /// [`crate::error::ErrorKind::InvalidAmount`] if a line has a negative quantity or price.
    pub fn subtotal(&self) -> Result<BigDecimal, Error> {
        compute_invoice_subtotal(&self.line_items).add_context("computing subtotal")
    }

    /// Compute subtotal, discount, margin, delivery and total of the document.
    ///
    /// # Errors
    /// [`crate::error::ErrorKind::InvalidAmount`] if any amount is negative or the discount
    /// exceeds the subtotal.
    ///
    /// # Example
    /// ```rust
    /// use bigdecimal::BigDecimal;
    /// use facture::{ClientBuilder, DeliveryTerm, InvoiceBuilder, LineItemBuilder};
    ///
    /// let invoice = InvoiceBuilder::default()
    ///     .client(ClientBuilder::default().name("Rakoto").build().unwrap())
    ///     .add_line(
    ///         LineItemBuilder::default()
    ///             .description("Tôle")
    ///             .quantity(10)
    ///             .unit_price(15000)
    ///             .build().unwrap())
    ///     .add_line(
    ///         LineItemBuilder::default()
    ///             .description("Clous")
    ///             .unit("kg")
    ///             .quantity(5)
    ///             .unit_price(2500)
    ///             .build().unwrap())
    ///     .delivery(DeliveryTerm::new(1, 20000))
    ///     .build().unwrap();
    /// let totals = invoice.totals().unwrap();
    /// assert_eq!(totals.subtotal, BigDecimal::from(162500));
    /// assert_eq!(totals.total, BigDecimal::from(182500));
    /// ```
    pub fn totals(&self) -> Result<InvoiceTotals, Error> {
        let subtotal = self.subtotal()?;
        let delivery = match &self.delivery {
            Some(d) => d.amount().add_context("computing delivery amount")?,
            None => zero(),
        };
        let margin = self
            .margin
            .as_ref()
            .map(|m| m.percentage.clone())
            .unwrap_or_else(zero);
        compute_breakdown(&subtotal, &self.discount, &delivery, &margin)
            .add_context("computing invoice total")
    }

    /// Grand total of the document.
    ///
    /// # Errors
    /// See [`Invoice::totals`].
    pub fn total(&self) -> Result<BigDecimal, Error> {
        Ok(self.totals()?.total)
    }

    /// The total rounded to the Ariary and written in words, e.g.
    /// `"Cent quatre-vingt-deux mille cinq cents Ariary"`.
    ///
    /// # Errors
    /// See [`Invoice::totals`].
    pub fn amount_in_words(&self) -> Result<String, Error> {
        let total = self.total()?;
        decimal_to_words(&round_to_unit(&total)).add_context("writing total in words")
    }

    pub(crate) fn assign_id(&mut self, id: u64) {
        self.id = Some(id);
    }

    pub(crate) fn set_state(&mut self, status: InvoiceStatus, number: Option<String>) {
        self.status = status;
        self.number = number;
    }

    /// Drop any status or number that did not come from the store's lifecycle functions.
    pub(crate) fn reset_to_draft(&mut self) {
        self.set_state(InvoiceStatus::Draft, None);
    }
}

impl InvoiceBuilder {
    /// Add a [`LineItem`] to the builder's internal list.
    ///
    /// # Arguments
    /// * `line` - The [`LineItem`] to append.
    ///
    /// # Returns
    /// The updated [`InvoiceBuilder`].
    pub fn add_line(self, line: LineItem) -> Self {
        match self.line_items {
            Some(mut l) => {
                l.push(line);
                Self {
                    line_items: Some(l),
                    ..self
                }
            }
            None => Self {
                line_items: Some(vec![line]),
                ..self
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn make_client(name: &str) -> Client {
        ClientBuilder::default().name(name).build().unwrap()
    }

    fn make_line(description: &str, quantity: i32, unit_price: i32) -> LineItem {
        LineItemBuilder::default()
            .description(description)
            .quantity(quantity)
            .unit_price(unit_price)
            .build()
            .unwrap()
    }

    fn scenario() -> Invoice {
        InvoiceBuilder::default()
            .client(make_client("Rasoa"))
            .add_line(make_line("Ciment", 10, 15000))
            .add_line(make_line("Sable", 5, 2500))
            .delivery(DeliveryTerm::new(1, 20000))
            .margin(MarginTerm::new(0))
            .build()
            .unwrap()
    }

    #[test]
    fn test_deserialize_bigdecimal() {
        #[derive(Deserialize)]
        struct Wrap {
            #[serde(deserialize_with = "super::deserialize_bigdecimal")]
            bd: BigDecimal,
        }

        let w: Wrap = serde_json::from_value(serde_json::json!({"bd": "12.50"})).unwrap();
        assert_eq!(w.bd, BigDecimal::from_str("12.5").unwrap());
        let w: Wrap = serde_json::from_value(serde_json::json!({"bd": 15000})).unwrap();
        assert_eq!(w.bd, BigDecimal::from(15000));
        let w: Wrap = serde_json::from_str(r#"{"bd": 9007199254740993}"#).unwrap();
        assert_eq!(w.bd, BigDecimal::from(9_007_199_254_740_993u64));
        let w: Wrap = serde_json::from_str(r#"{"bd": 18446744073709551615}"#).unwrap();
        assert_eq!(w.bd, BigDecimal::from(u64::MAX));
        let w: Wrap = serde_json::from_str(r#"{"bd": 2.5}"#).unwrap();
        assert_eq!(w.bd, BigDecimal::from_str("2.5").unwrap());
        let x = serde_json::from_value::<Wrap>(serde_json::json!({"bd": "reee"}));
        assert!(x.is_err())
    }

    #[test]
    fn test_serialize_bigdecimal() {
        #[derive(Serialize)]
        struct Wrap<'a> {
            #[serde(serialize_with = "super::serialize_bigdecimal")]
            v: &'a BigDecimal,
        }

        let bd = BigDecimal::from_str("12.34").unwrap();
        let j = serde_json::to_value(Wrap { v: &bd }).unwrap();
        assert_eq!(j.get("v").and_then(|v| v.as_str()), Some("12.34"));
    }

    #[test]
    fn line_item_builder_defaults_and_accessors() {
        let item = make_line("Fer à béton", 3, 12000);
        assert_eq!(item.description(), "Fer à béton");
        assert_eq!(item.unit(), "pce");
        assert_eq!(item.product_id(), None);
        assert_eq!(item.total().unwrap(), BigDecimal::from(36000));
    }

    #[test]
    fn line_item_builder_missing_required_fields_fails() {
        let _ = LineItemBuilder::default()
            .description("X")
            .quantity(1)
            .build()
            .unwrap_err();
        let _ = LineItemBuilder::default()
            .description("X")
            .unit_price(1)
            .build()
            .unwrap_err();
        let _ = LineItemBuilder::default()
            .quantity(1)
            .unit_price(1)
            .build()
            .unwrap_err();
    }

    #[test]
    fn invoice_builder_missing_client_fails() {
        let _ = InvoiceBuilder::default().build().unwrap_err();
    }

    #[test]
    fn end_to_end_scenario() {
        let inv = scenario();
        let totals = inv.totals().unwrap();
        assert_eq!(totals.subtotal, BigDecimal::from(162500));
        assert_eq!(totals.delivery, BigDecimal::from(20000));
        assert_eq!(totals.margin, BigDecimal::from(0));
        assert_eq!(totals.total, BigDecimal::from(182500));
        let words = inv.amount_in_words().unwrap();
        assert!(words.ends_with("Ariary"));
        assert_eq!(words, "Cent quatre-vingt-deux mille cinq cents Ariary");
    }

    #[test]
    fn totals_follow_mutations() {
        let mut inv = scenario();
        inv.set_delivery(Some(DeliveryTerm {
            enabled: false,
            quantity: BigDecimal::from(1),
            unit_price: BigDecimal::from(20000),
        }));
        assert_eq!(inv.total().unwrap(), BigDecimal::from(162500));

        let removed = inv.remove_line(1).unwrap();
        assert_eq!(removed.description(), "Sable");
        assert!(inv.remove_line(5).is_none());
        assert_eq!(inv.subtotal().unwrap(), BigDecimal::from(150000));

        inv.set_discount(50000);
        inv.set_margin(Some(MarginTerm::new(10)));
        assert_eq!(inv.total().unwrap(), BigDecimal::from(110000));

        inv.add_line(make_line("Gravier", 2, 5000));
        assert_eq!(inv.total().unwrap(), BigDecimal::from(121000));
    }

    #[test]
    fn excessive_discount_is_reported() {
        let mut inv = scenario();
        inv.set_discount(200000);
        let err = inv.total().unwrap_err();
        assert!(err.is_invalid_amount());
        assert!(err.to_string().starts_with("computing invoice total"));
    }

    #[test]
    fn fractional_total_is_rounded_before_words() {
        let inv = InvoiceBuilder::default()
            .client(make_client("Hery"))
            .add_line(
                LineItemBuilder::default()
                    .description("Tissu")
                    .unit("m")
                    .quantity(BigDecimal::from_str("2.5").unwrap())
                    .unit_price(1001)
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        assert_eq!(inv.total().unwrap(), BigDecimal::from_str("2502.5").unwrap());
        assert_eq!(inv.amount_in_words().unwrap(), "Deux mille cinq cent trois Ariary");
    }

    #[test]
    fn invoice_deserializes_from_form_json() {
        let raw = serde_json::json!({
            "kind": "devis",
            "client": {"name": "Soa", "nif": "123"},
            "line_items": [
                {"description": "Peinture", "unit": "l", "quantity": 4, "unit_price": "8500"}
            ],
            "margin": {"percentage": 15},
            "created_datetime": "2026-02-10T12:00:00+03:00",
            "net_due_datetime": "2026-03-10T12:00:00+03:00"
        });
        let inv: Invoice = serde_json::from_value(raw).unwrap();
        assert_eq!(inv.kind(), DocumentKind::Devis);
        assert_eq!(inv.status(), InvoiceStatus::Draft);
        assert_eq!(inv.discount(), &BigDecimal::from(0));
        assert_eq!(inv.total().unwrap(), BigDecimal::from(39100));

        let back = serde_json::to_value(&inv).unwrap();
        assert_eq!(back["line_items"][0]["unit_price"], "8500");
        assert_eq!(back["kind"], "devis");
    }
}
