//! Invoice and quote computation for a small business billing in Ariary
//!
//! This crate computes invoice totals from line items, delivery, discount and margin terms,
//! writes amounts out in French words for printed documents, and renders an HTML print preview.
//! Around that core it provides catalog products with stock, clients, roles, dashboard figures
//! and a storage interface with an in-memory implementation.
//!
//! # Example
//!
//! ```rust
//! use bigdecimal::BigDecimal;
//! use facture::{ClientBuilder, DeliveryTerm, InvoiceBuilder, LineItemBuilder, render_preview};
//!
//! let inv = InvoiceBuilder::default()
//!     .client(ClientBuilder::default().name("Rasoa").build().unwrap())
//!     .add_line(
//!         LineItemBuilder::default()
//!             .description("Ciment")
//!             .unit("sac")
//!             .quantity(10)
//!             .unit_price(15000)
//!             .build().unwrap())
//!     .add_line(
//!         LineItemBuilder::default()
//!             .description("Sable")
//!             .quantity(5)
//!             .unit_price(2500)
//!             .build().unwrap())
//!     .delivery(DeliveryTerm::new(1, 20000))
//!     .build().unwrap();
//! assert_eq!(inv.total().unwrap(), BigDecimal::from(182500));
//! assert_eq!(
//!     inv.amount_in_words().unwrap(),
//!     "Cent quatre-vingt-deux mille cinq cents Ariary"
//! );
//! let html = render_preview(&inv).unwrap();
//! assert!(html.contains("182 500 Ar"));
//! ```

pub mod amount;
pub mod dashboard;
pub mod error;
pub mod invoice;
pub mod product;
pub mod role;
pub mod store;
pub mod template_env;
pub mod totals;
pub mod words;

pub use dashboard::DashboardSummary;
pub use error::Error;
pub use invoice::{
    Client, ClientBuilder, ClientBuilderError, DeliveryTerm, DocumentKind, Invoice,
    InvoiceBuilder, InvoiceBuilderError, InvoiceStatus, LineItem, LineItemBuilder,
    LineItemBuilderError, MarginTerm,
};
pub use product::{Product, ProductBuilder, ProductBuilderError};
pub use store::{ClientStore, InvoiceStore, MemoryStore, ProductStore};
pub use totals::{
    InvoiceTotals, Priced, compute_invoice_subtotal, compute_invoice_total, compute_line_total,
};
pub use words::amount_to_words;

use error::AddContext;
use tracing::{debug, instrument};

use crate::template_env::{render_template, setup_template_env};

/// Render the print preview of an [`Invoice`] as an HTML document.
///
/// The document lists every line with its total, the discount, margin and delivery rows when
/// present, the grand total and the total written in words.
///
/// # Errors
///
/// Returns `Err(crate::Error)` if any step fails:
/// - computing the totals (negative amounts, discount above the subtotal)
/// - setting up the templating environment
/// - rendering the HTML template
#[instrument(skip_all, fields(number = invoice.number().unwrap_or("draft")))]
pub fn render_preview(invoice: &Invoice) -> Result<String, crate::Error> {
    let template_env = setup_template_env()
        .map_err(crate::Error::from)
        .add_context("setting up templating environment")
        .add_context("rendering preview")?;
    let html = render_template(&template_env, invoice)
        .add_context("rendering html template")
        .add_context("rendering preview")?;
    debug!(bytes = html.len(), "preview rendered");
    Ok(html)
}
