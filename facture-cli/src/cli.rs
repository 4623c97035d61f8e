use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use clap::{Args, Parser, Subcommand};
use facture::{Invoice, error::AddContext};

fn read_until_eof() -> io::Result<String> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    Ok(input)
}

#[derive(Debug, Parser)]
#[command(name = "facture", version, about = "Compute, word and preview invoices in Ariary")]
pub struct Cli {
    /// Log filter directive, e.g. `info` or `facture=debug`
    #[arg(long, global = true, env = "FACTURE_LOG", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print subtotal, discount, margin, delivery and total of each invoice
    Totals {
        #[command(flatten)]
        input: Input,

        /// Print the totals as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write an amount of Ariary in words
    Words {
        /// Whole amount, e.g. `182500` or `182 500`
        amount: String,
    },
    /// Render the HTML print preview of each invoice
    Preview {
        #[command(flatten)]
        input: Input,

        /// Directory where HTML files should be saved, stdout when omitted
        #[arg(short, long, env = "FACTURE_OUT")]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
pub struct Input {
    /// Path to the JSON file with one invoice or an array of invoices, stdin when omitted
    #[arg(short, long)]
    pub data: Option<PathBuf>,
}

impl Input {
    pub fn get_invoices(&self) -> Result<Vec<Invoice>, facture::Error> {
        let raw = match &self.data {
            Some(path) => fs::read_to_string(path)
                .map_err(facture::Error::from)
                .add_context(&format!(
                    "reading invoice data from file '{}'",
                    path.to_string_lossy()
                ))?,
            None => read_until_eof()
                .map_err(facture::Error::from)
                .add_context("reading invoice data from stdin")?,
        };

        let value: serde_json::Value = serde_json::from_str(&raw)
            .map_err(facture::Error::from)
            .add_context("parsing invoice JSON")?;
        let invoices = if value.is_array() {
            serde_json::from_value(value)
        } else {
            serde_json::from_value(value).map(|invoice| vec![invoice])
        };
        invoices
            .map_err(facture::Error::from)
            .add_context("reading invoices from JSON")
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::CommandFactory;
    use facture::amount::format_amount;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn words_subcommand_parses() {
        let cli = Cli::try_parse_from(["facture", "words", "42500"]).unwrap();
        assert!(matches!(cli.command, Command::Words { ref amount } if amount == "42500"));
    }

    #[test]
    fn reads_single_invoice_and_arrays() {
        let dir = std::env::temp_dir().join(format!("facture-cli-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let invoice = r#"{"client": {"name": "Soa"}, "line_items": [
            {"description": "Riz", "unit": "kg", "quantity": 50, "unit_price": 3000}
        ]}"#;

        let single = dir.join("single.json");
        fs::File::create(&single)
            .unwrap()
            .write_all(invoice.as_bytes())
            .unwrap();
        let input = Input { data: Some(single) };
        assert_eq!(input.get_invoices().unwrap().len(), 1);

        let many = dir.join("many.json");
        fs::write(&many, format!("[{invoice}, {invoice}]")).unwrap();
        let input = Input { data: Some(many) };
        let invoices = input.get_invoices().unwrap();
        assert_eq!(invoices.len(), 2);
        assert_eq!(format_amount(&invoices[1].total().unwrap()), "150 000");

        let missing = Input {
            data: Some(dir.join("missing.json")),
        };
        assert!(missing.get_invoices().is_err());
        fs::remove_dir_all(&dir).unwrap();
    }
}
