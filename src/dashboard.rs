//! Figures shown on the home screen.

use bigdecimal::BigDecimal;
use serde::Serialize;

use crate::{
    error::{AddContext, Error},
    invoice::{DocumentKind, InvoiceStatus, serialize_bigdecimal},
    store::{InvoiceStore, ProductStore},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// Factures that are not cancelled.
    pub factures: usize,
    /// Devis that are not cancelled.
    pub devis: usize,
    pub drafts: usize,
    /// Total of finalized and paid factures.
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub revenue: BigDecimal,
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub paid: BigDecimal,
    /// Finalized factures not paid yet.
    #[serde(serialize_with = "serialize_bigdecimal")]
    pub outstanding: BigDecimal,
    /// Names of products at or below their alert threshold.
    pub low_stock: Vec<String>,
}

impl DashboardSummary {
    /// Aggregate every document and product of `store`.
    ///
    /// # Errors
    /// [`crate::error::ErrorKind::InvalidAmount`] if the total of a finalized facture cannot be
    /// computed.
    pub fn collect<S>(store: &S) -> Result<Self, Error>
    where
        S: InvoiceStore + ProductStore,
    {
        let mut summary = DashboardSummary {
            factures: 0,
            devis: 0,
            drafts: 0,
            revenue: BigDecimal::from(0),
            paid: BigDecimal::from(0),
            outstanding: BigDecimal::from(0),
            low_stock: Vec::new(),
        };

        for invoice in store.invoices() {
            if invoice.status() == InvoiceStatus::Cancelled {
                continue;
            }
            match invoice.kind() {
                DocumentKind::Facture => summary.factures += 1,
                DocumentKind::Devis => summary.devis += 1,
            }
            if invoice.status() == InvoiceStatus::Draft {
                summary.drafts += 1;
                continue;
            }
            if invoice.kind() != DocumentKind::Facture {
                continue;
            }
            let ctx = format!("summarizing {}", invoice.number().unwrap_or("document"));
            let total = invoice.total().add_context(&ctx)?;
            if invoice.status() == InvoiceStatus::Paid {
                summary.paid += &total;
            } else {
                summary.outstanding += &total;
            }
            summary.revenue += total;
        }

        summary.low_stock = store
            .products()
            .into_iter()
            .filter(|p| p.is_low_stock())
            .map(|p| p.name().to_string())
            .collect();
        Ok(summary)
    }
}
