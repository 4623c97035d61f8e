use std::{io::Write, path::Path};

use clap::Parser;
use facture::{
    Invoice,
    amount::{format_ariary, parse_decimal},
    error::AddContext,
    render_preview,
    words::decimal_to_words,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

mod cli;

/// File stem for a document: its number reduced to `[A-Za-z0-9_-]`, or its position in the input.
fn document_name(invoice: &Invoice, index: usize) -> String {
    let number: String = invoice
        .number()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect();
    if number.is_empty() {
        format!("document-{}", index + 1)
    } else {
        number
    }
}

fn print_totals(invoices: &[Invoice], json: bool) -> Result<(), facture::Error> {
    let mut out = std::io::stdout().lock();
    if json {
        let mut rows = Vec::with_capacity(invoices.len());
        for (i, invoice) in invoices.iter().enumerate() {
            let ctx = format!("computing totals of {}", document_name(invoice, i));
            rows.push(serde_json::json!({
                "document": document_name(invoice, i),
                "totals": invoice.totals().add_context(&ctx)?,
                "words": invoice.amount_in_words().add_context(&ctx)?,
            }));
        }
        serde_json::to_writer_pretty(&mut out, &rows)
            .map_err(facture::Error::from)
            .add_context("writing totals as JSON")?;
        writeln!(out)?;
        return Ok(());
    }

    for (i, invoice) in invoices.iter().enumerate() {
        let ctx = format!("computing totals of {}", document_name(invoice, i));
        let totals = invoice.totals().add_context(&ctx)?;
        writeln!(
            out,
            "{} {} ({})",
            invoice.kind(),
            document_name(invoice, i),
            invoice.client().name()
        )?;
        writeln!(out, "  {:<12}{:>20}", "Sous-total", format_ariary(&totals.subtotal))?;
        writeln!(out, "  {:<12}{:>20}", "Remise", format_ariary(&totals.discount))?;
        writeln!(out, "  {:<12}{:>20}", "Marge", format_ariary(&totals.margin))?;
        writeln!(out, "  {:<12}{:>20}", "Livraison", format_ariary(&totals.delivery))?;
        writeln!(out, "  {:<12}{:>20}", "Total", format_ariary(&totals.total))?;
        writeln!(out, "  {}", invoice.amount_in_words().add_context(&ctx)?)?;
    }
    Ok(())
}

fn write_previews(invoices: &[Invoice], out: Option<&Path>) -> Result<(), facture::Error> {
    for (i, invoice) in invoices.iter().enumerate() {
        let name = document_name(invoice, i);
        let html = render_preview(invoice).add_context(&format!("rendering preview of {name}"))?;
        match out {
            Some(dir) => {
                let path = dir.join(format!("{name}.html"));
                if let Err(e) = std::fs::write(&path, &html) {
                    warn!(error = %e, path = %path.to_string_lossy(), "failed to write preview");
                    write_to_stdout(&html)?;
                } else {
                    info!(path = %path.to_string_lossy(), "preview written");
                }
            }
            None => write_to_stdout(&html)?,
        }
    }
    Ok(())
}

fn write_to_stdout(html: &str) -> Result<(), facture::Error> {
    let mut stdout = std::io::stdout();
    stdout
        .write_all(html.as_bytes())
        .map_err(facture::Error::from)
        .add_context("writing preview to stdout")?;
    stdout
        .flush()
        .map_err(facture::Error::from)
        .add_context("flushing stdout")?;
    Ok(())
}

fn main() -> Result<(), facture::Error> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Command::Totals { input, json } => {
            let invoices = input
                .get_invoices()
                .add_context("deserializing invoices from cli")?;
            print_totals(&invoices, *json)
        }
        Command::Words { amount } => {
            let amount = parse_decimal(amount).add_context("reading amount from cli")?;
            println!("{}", decimal_to_words(&amount)?);
            Ok(())
        }
        Command::Preview { input, out } => {
            let invoices = input
                .get_invoices()
                .add_context("deserializing invoices from cli")?;
            write_previews(&invoices, out.as_deref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice_numbered(number: &str) -> Invoice {
        serde_json::from_value(serde_json::json!({
            "number": number,
            "client": {"name": "Soa"},
            "line_items": []
        }))
        .unwrap()
    }

    #[test]
    fn document_names_stay_inside_output_dir() {
        assert_eq!(document_name(&invoice_numbered("FAC-2026-0001"), 0), "FAC-2026-0001");
        assert_eq!(document_name(&invoice_numbered("../x"), 0), "x");
        assert_eq!(document_name(&invoice_numbered("/etc/passwd"), 0), "etcpasswd");
        assert_eq!(document_name(&invoice_numbered("../.."), 2), "document-3");
    }

    #[test]
    fn unnumbered_documents_are_named_by_position() {
        let invoice: Invoice =
            serde_json::from_value(serde_json::json!({"client": {"name": "Soa"}})).unwrap();
        assert_eq!(document_name(&invoice, 4), "document-5");
    }
}
