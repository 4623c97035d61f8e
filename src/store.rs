//! Storage interfaces for products, clients and documents.
//!
//! Callers receive a store explicitly instead of reaching for a global one. [`MemoryStore`]
//! implements every trait in memory; a database backed store only has to implement the same
//! traits. Document lifecycle rules (numbering, stock movements) live in the free functions
//! [`finalize_invoice`], [`mark_paid`] and [`cancel_invoice`] so they apply to any store.

use std::collections::{BTreeMap, HashMap};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Datelike, FixedOffset};
use tracing::{debug, info, instrument};

use crate::{
    error::{AddContext, Error},
    invoice::{Client, DocumentKind, Invoice, InvoiceStatus},
    product::Product,
    totals::Priced,
};

pub trait ProductStore {
    /// Store a new product and return its id.
    fn create_product(&mut self, product: Product) -> Result<u64, Error>;
    fn product(&self, id: u64) -> Result<Product, Error>;
    fn products(&self) -> Vec<Product>;
    fn update_product(&mut self, id: u64, product: Product) -> Result<(), Error>;
    fn delete_product(&mut self, id: u64) -> Result<Product, Error>;
}

pub trait ClientStore {
    /// Store a new client and return its id.
    fn create_client(&mut self, client: Client) -> Result<u64, Error>;
    fn client(&self, id: u64) -> Result<Client, Error>;
    fn clients(&self) -> Vec<(u64, Client)>;
    fn update_client(&mut self, id: u64, client: Client) -> Result<(), Error>;
    fn delete_client(&mut self, id: u64) -> Result<Client, Error>;
}

pub trait InvoiceStore {
    /// Store a new document as a draft and return its id. Any status or number carried by
    /// `invoice` is discarded.
    fn create_invoice(&mut self, invoice: Invoice) -> Result<u64, Error>;
    fn invoice(&self, id: u64) -> Result<Invoice, Error>;
    fn invoices(&self) -> Vec<Invoice>;
    /// Replace the content of a draft. Finalized, paid and cancelled documents are read only and
    /// yield [`crate::error::ErrorKind::InvalidState`].
    fn update_invoice(&mut self, id: u64, invoice: Invoice) -> Result<(), Error>;
    /// Record a lifecycle transition. Only [`finalize_invoice`], [`mark_paid`] and
    /// [`cancel_invoice`] should call this, after checking the transition is allowed.
    fn set_invoice_state(
        &mut self,
        id: u64,
        status: InvoiceStatus,
        number: Option<String>,
    ) -> Result<(), Error>;
    fn delete_invoice(&mut self, id: u64) -> Result<Invoice, Error>;
    /// Next number in the sequence of `kind` documents for `year`, starting at 1.
    fn next_sequence(&mut self, kind: DocumentKind, year: i32) -> u32;
}

/// In-memory implementation of every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    next_id: u64,
    products: BTreeMap<u64, Product>,
    clients: BTreeMap<u64, Client>,
    invoices: BTreeMap<u64, Invoice>,
    sequences: HashMap<(DocumentKind, i32), u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

fn get<T: Clone>(map: &BTreeMap<u64, T>, what: &str, id: u64) -> Result<T, Error> {
    map.get(&id)
        .cloned()
        .ok_or_else(|| Error::not_found(format!("{what} {id}")))
}

fn replace<T>(map: &mut BTreeMap<u64, T>, what: &str, id: u64, value: T) -> Result<(), Error> {
    match map.get_mut(&id) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(Error::not_found(format!("{what} {id}"))),
    }
}

fn remove<T>(map: &mut BTreeMap<u64, T>, what: &str, id: u64) -> Result<T, Error> {
    map.remove(&id)
        .ok_or_else(|| Error::not_found(format!("{what} {id}")))
}

impl ProductStore for MemoryStore {
    fn create_product(&mut self, mut product: Product) -> Result<u64, Error> {
        let id = self.allocate_id();
        product.assign_id(id);
        debug!(id, name = product.name(), "product created");
        self.products.insert(id, product);
        Ok(id)
    }

    fn product(&self, id: u64) -> Result<Product, Error> {
        get(&self.products, "product", id)
    }

    fn products(&self) -> Vec<Product> {
        self.products.values().cloned().collect()
    }

    fn update_product(&mut self, id: u64, mut product: Product) -> Result<(), Error> {
        product.assign_id(id);
        replace(&mut self.products, "product", id, product)
    }

    fn delete_product(&mut self, id: u64) -> Result<Product, Error> {
        remove(&mut self.products, "product", id)
    }
}

impl ClientStore for MemoryStore {
    fn create_client(&mut self, client: Client) -> Result<u64, Error> {
        let id = self.allocate_id();
        debug!(id, name = client.name(), "client created");
        self.clients.insert(id, client);
        Ok(id)
    }

    fn client(&self, id: u64) -> Result<Client, Error> {
        get(&self.clients, "client", id)
    }

    fn clients(&self) -> Vec<(u64, Client)> {
        self.clients
            .iter()
            .map(|(id, c)| (*id, c.clone()))
            .collect()
    }

    fn update_client(&mut self, id: u64, client: Client) -> Result<(), Error> {
        replace(&mut self.clients, "client", id, client)
    }

    fn delete_client(&mut self, id: u64) -> Result<Client, Error> {
        remove(&mut self.clients, "client", id)
    }
}

impl InvoiceStore for MemoryStore {
    fn create_invoice(&mut self, mut invoice: Invoice) -> Result<u64, Error> {
        let id = self.allocate_id();
        invoice.assign_id(id);
        invoice.reset_to_draft();
        debug!(id, kind = %invoice.kind(), "document created");
        self.invoices.insert(id, invoice);
        Ok(id)
    }

    fn invoice(&self, id: u64) -> Result<Invoice, Error> {
        get(&self.invoices, "document", id)
    }

    fn invoices(&self) -> Vec<Invoice> {
        self.invoices.values().cloned().collect()
    }

    fn update_invoice(&mut self, id: u64, mut invoice: Invoice) -> Result<(), Error> {
        let status = get(&self.invoices, "document", id)?.status();
        if status != InvoiceStatus::Draft {
            return Err(Error::invalid_state(format!(
                "document is {status:?}, only drafts can be edited"
            )));
        }
        invoice.assign_id(id);
        invoice.reset_to_draft();
        replace(&mut self.invoices, "document", id, invoice)
    }

    fn set_invoice_state(
        &mut self,
        id: u64,
        status: InvoiceStatus,
        number: Option<String>,
    ) -> Result<(), Error> {
        let invoice = self
            .invoices
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(format!("document {id}")))?;
        invoice.set_state(status, number);
        Ok(())
    }

    fn delete_invoice(&mut self, id: u64) -> Result<Invoice, Error> {
        remove(&mut self.invoices, "document", id)
    }

    fn next_sequence(&mut self, kind: DocumentKind, year: i32) -> u32 {
        let seq = self.sequences.entry((kind, year)).or_insert(0);
        *seq += 1;
        *seq
    }
}

/// Quantities sold per catalog product on a document.
fn quantities_by_product(invoice: &Invoice) -> BTreeMap<u64, BigDecimal> {
    let mut quantities: BTreeMap<u64, BigDecimal> = BTreeMap::new();
    for line in invoice.line_items() {
        if let Some(product_id) = line.product_id() {
            let entry = quantities
                .entry(product_id)
                .or_insert_with(|| BigDecimal::from(0));
            *entry = &*entry + line.quantity();
        }
    }
    quantities
}

/// Number a draft document and, for factures, take the sold quantities out of stock.
///
/// Numbers look like `FAC-2026-0001` or `DEV-2026-0001`, with one sequence per kind and year of
/// `issued`. Stock is checked for every line before any product is modified.
///
/// # Returns
/// The assigned number.
///
/// # Errors
/// - [`crate::error::ErrorKind::NotFound`] if the document or a linked product does not exist
/// - [`crate::error::ErrorKind::InvalidState`] if the document is not a draft
/// - [`crate::error::ErrorKind::InvalidAmount`] if its totals cannot be computed
/// - [`crate::error::ErrorKind::InsufficientStock`] if a product does not have enough stock
#[instrument(skip(store))]
pub fn finalize_invoice<S>(
    store: &mut S,
    id: u64,
    issued: DateTime<FixedOffset>,
) -> Result<String, Error>
where
    S: InvoiceStore + ProductStore,
{
    let ctx = format!("finalizing document {id}");
    let invoice = store.invoice(id).add_context(&ctx)?;
    if invoice.status() != InvoiceStatus::Draft {
        return Err(Error::invalid_state(format!(
            "document is {:?}, only drafts can be finalized",
            invoice.status()
        ))
        .add_context(&ctx));
    }
    let total = invoice.total().add_context(&ctx)?;

    if invoice.kind() == DocumentKind::Facture {
        let mut updated = Vec::new();
        for (product_id, quantity) in quantities_by_product(&invoice) {
            let mut product = store.product(product_id).add_context(&ctx)?;
            product.withdraw(&quantity).add_context(&ctx)?;
            updated.push((product_id, product));
        }
        for (product_id, product) in updated {
            debug!(product_id, stock = %product.stock(), "stock updated");
            store.update_product(product_id, product).add_context(&ctx)?;
        }
    }

    let kind = invoice.kind();
    let year = issued.year();
    let number = format!(
        "{}-{year}-{:04}",
        kind.number_prefix(),
        store.next_sequence(kind, year)
    );
    store
        .set_invoice_state(id, InvoiceStatus::Finalized, Some(number.clone()))
        .add_context(&ctx)?;
    info!(id, %number, %total, "document finalized");
    Ok(number)
}

/// Record that a finalized facture has been paid.
///
/// # Errors
/// [`crate::error::ErrorKind::InvalidState`] unless the document is a finalized facture.
#[instrument(skip(store))]
pub fn mark_paid<S: InvoiceStore>(store: &mut S, id: u64) -> Result<(), Error> {
    let ctx = format!("marking document {id} as paid");
    let invoice = store.invoice(id).add_context(&ctx)?;
    if invoice.kind() != DocumentKind::Facture || invoice.status() != InvoiceStatus::Finalized {
        return Err(Error::invalid_state(format!(
            "{} is {:?}, only finalized factures can be paid",
            invoice.kind(),
            invoice.status()
        ))
        .add_context(&ctx));
    }
    store
        .set_invoice_state(id, InvoiceStatus::Paid, invoice.number().map(String::from))
        .add_context(&ctx)?;
    info!(id, "document paid");
    Ok(())
}

/// Cancel a draft or finalized document. Stock taken by a finalized facture is put back.
///
/// Every linked product is loaded before any of them is written, so a missing product leaves
/// stock and status untouched.
///
/// # Errors
/// - [`crate::error::ErrorKind::NotFound`] if the document or a linked product does not exist
/// - [`crate::error::ErrorKind::InvalidState`] if the document is paid or already cancelled
#[instrument(skip(store))]
pub fn cancel_invoice<S>(store: &mut S, id: u64) -> Result<(), Error>
where
    S: InvoiceStore + ProductStore,
{
    let ctx = format!("cancelling document {id}");
    let invoice = store.invoice(id).add_context(&ctx)?;
    match invoice.status() {
        InvoiceStatus::Draft => {}
        InvoiceStatus::Finalized if invoice.kind() == DocumentKind::Facture => {
            let mut updated = Vec::new();
            for (product_id, quantity) in quantities_by_product(&invoice) {
                let mut product = store.product(product_id).add_context(&ctx)?;
                product.restock(&quantity).add_context(&ctx)?;
                updated.push((product_id, product));
            }
            for (product_id, product) in updated {
                debug!(product_id, stock = %product.stock(), "stock restored");
                store.update_product(product_id, product).add_context(&ctx)?;
            }
        }
        InvoiceStatus::Finalized => {}
        status => {
            return Err(
                Error::invalid_state(format!("document is {status:?}")).add_context(&ctx)
            );
        }
    }
    store
        .set_invoice_state(id, InvoiceStatus::Cancelled, invoice.number().map(String::from))
        .add_context(&ctx)?;
    info!(id, "document cancelled");
    Ok(())
}
