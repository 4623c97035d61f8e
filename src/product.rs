//! Catalog products and their stock levels.

use bigdecimal::BigDecimal;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::{
    amount::ensure_non_negative,
    error::{AddContext, Error},
    invoice::{LineItem, default_unit, deserialize_bigdecimal, serialize_bigdecimal},
};

/// A product sold by the shop.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(strip_option, into), pattern = "owned")]
pub struct Product {
    /// Assigned by the store.
    #[builder(setter(skip))]
    #[serde(default)]
    id: Option<u64>,
    name: String,
    #[builder(default = default_unit())]
    #[serde(default = "default_unit")]
    unit: String,
    /// Selling price of one unit.
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal"
    )]
    unit_price: BigDecimal,
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal"
    )]
    #[builder(default = BigDecimal::from(0))]
    purchase_price: BigDecimal,
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal"
    )]
    #[builder(default = BigDecimal::from(0))]
    stock: BigDecimal,
    /// Stock level at or below which the dashboard flags the product.
    #[serde(
        serialize_with = "serialize_bigdecimal",
        deserialize_with = "deserialize_bigdecimal"
    )]
    #[builder(default = BigDecimal::from(0))]
    alert_threshold: BigDecimal,
}

impl Product {
    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn unit_price(&self) -> &BigDecimal {
        &self.unit_price
    }

    pub fn purchase_price(&self) -> &BigDecimal {
        &self.purchase_price
    }

    pub fn stock(&self) -> &BigDecimal {
        &self.stock
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.alert_threshold
    }

    /// Gross profit on one unit, `unit_price - purchase_price`.
    pub fn unit_profit(&self) -> BigDecimal {
        &self.unit_price - &self.purchase_price
    }

    /// Build an invoice line selling `quantity` units at the catalog price.
    ///
    /// # Errors
    /// [`crate::error::ErrorKind::InvalidAmount`] if `quantity` is negative.
    ///
    /// # Example
    /// ```rust
    /// use bigdecimal::BigDecimal;
    /// use facture::ProductBuilder;
    ///
    /// let cement = ProductBuilder::default()
    ///     .name("Ciment 50kg")
    ///     .unit("sac")
    ///     .unit_price(32000)
    ///     .build().unwrap();
    /// let line = cement.line_item(3).unwrap();
    /// assert_eq!(line.total().unwrap(), BigDecimal::from(96000));
    /// ```
    pub fn line_item(&self, quantity: impl Into<BigDecimal>) -> Result<LineItem, Error> {
        let quantity = quantity.into();
        ensure_non_negative("quantity", &quantity)
            .add_context(&format!("adding product '{}' to a document", self.name))?;
        Ok(LineItem::for_product(
            self.id,
            &self.name,
            &self.unit,
            quantity,
            self.unit_price.clone(),
        ))
    }

    /// Put `quantity` units back into stock, e.g. after a delivery from a supplier.
    ///
    /// # Errors
    /// [`crate::error::ErrorKind::InvalidAmount`] if `quantity` is negative.
    pub fn restock(&mut self, quantity: &BigDecimal) -> Result<(), Error> {
        ensure_non_negative("restocked quantity", quantity)?;
        self.stock = &self.stock + quantity;
        Ok(())
    }

    pub(crate) fn assign_id(&mut self, id: u64) {
        self.id = Some(id);
    }

    /// Take `quantity` units out of stock.
    pub(crate) fn withdraw(&mut self, quantity: &BigDecimal) -> Result<(), Error> {
        if *quantity > self.stock {
            return Err(Error::insufficient_stock(format!(
                "only {} {} of '{}' left, {} requested",
                self.stock, self.unit, self.name, quantity
            )));
        }
        self.stock = &self.stock - quantity;
        Ok(())
    }
}
