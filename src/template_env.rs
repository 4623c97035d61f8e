use minijinja::context;
use serde::Serialize;

use crate::{
    amount::{format_ariary, format_percentage, format_quantity},
    error::{AddContext, Error},
    invoice::{Client, DocumentKind, Invoice},
    totals::Priced,
};

const TEMPLATE_NAME: &str = "facture.html";
const LINES_PER_PAGE: usize = 21;

#[derive(Debug, Serialize)]
struct PrintLine {
    description: String,
    unit: String,
    quantity: String,
    unit_price: String,
    total: String,
}

#[derive(Debug, Serialize)]
struct PrintMargin {
    percentage: String,
    amount: String,
}

/// Everything the template prints, already computed and formatted.
#[derive(Debug, Serialize)]
struct PrintDocument<'a> {
    title: &'static str,
    is_facture: bool,
    number: &'a str,
    created: String,
    due: Option<String>,
    client: &'a Client,
    subtotal: String,
    discount: Option<String>,
    margin: Option<PrintMargin>,
    delivery: Option<String>,
    total: String,
    words: String,
    notes: Option<&'a str>,
}

pub fn setup_template_env() -> Result<minijinja::Environment<'static>, minijinja::Error> {
    let mut env = minijinja::Environment::new();
    env.add_template(TEMPLATE_NAME, include_str!("../templates/facture.html"))?;
    Ok(env)
}

pub fn render_template(
    env: &minijinja::Environment<'static>,
    invoice: &Invoice,
) -> Result<String, Error> {
    let totals = invoice.totals().add_context("computing printed totals")?;
    let words = invoice.amount_in_words()?;

    let mut lines = Vec::with_capacity(invoice.line_items().len());
    for line in invoice.line_items() {
        lines.push(PrintLine {
            description: line.description().to_string(),
            unit: line.unit().to_string(),
            quantity: format_quantity(line.quantity()),
            unit_price: format_ariary(line.unit_price()),
            total: format_ariary(&line.total()?),
        });
    }
    let mut pages: Vec<&[PrintLine]> = lines.chunks(LINES_PER_PAGE).collect();
    if pages.is_empty() {
        pages.push(&[]);
    }

    let zero = bigdecimal::BigDecimal::from(0);
    let doc = PrintDocument {
        title: invoice.kind().label(),
        is_facture: invoice.kind() == DocumentKind::Facture,
        number: invoice.number().unwrap_or("Brouillon"),
        created: invoice.created_datetime().format("%d/%m/%Y").to_string(),
        due: (invoice.kind() == DocumentKind::Facture)
            .then(|| invoice.net_due_datetime().format("%d/%m/%Y").to_string()),
        client: invoice.client(),
        subtotal: format_ariary(&totals.subtotal),
        discount: (totals.discount > zero).then(|| format_ariary(&totals.discount)),
        margin: invoice.margin().map(|m| PrintMargin {
            percentage: format_percentage(&m.percentage),
            amount: format_ariary(&totals.margin),
        }),
        delivery: invoice
            .delivery()
            .filter(|d| d.enabled)
            .map(|_| format_ariary(&totals.delivery)),
        total: format_ariary(&totals.total),
        words,
        notes: invoice.notes(),
    };

    let template = env.get_template(TEMPLATE_NAME)?;
    Ok(template.render(context! {
        pages => pages,
        doc => doc,
    })?)
}
