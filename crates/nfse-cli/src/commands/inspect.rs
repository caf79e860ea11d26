//! Inspect command - show what the renamer sees in a single invoice.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;

use nfse_core::{compose_fields, compose_name, FieldSet, PdfTextSource, TextSource};

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Invoice PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Also print the extracted text
    #[arg(long)]
    show_text: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

#[derive(Serialize)]
struct Inspection {
    file: PathBuf,
    fields: Option<FieldSet>,
    name: Option<String>,
    problem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

pub async fn run(args: InspectArgs) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let text = PdfTextSource::new().extract_text(&args.input)?;

    let fields = compose_fields(&text);
    let name = compose_name(&text);
    let problem = name.as_ref().err().map(|e| e.to_string());

    let inspection = Inspection {
        file: args.input.clone(),
        fields: fields.ok(),
        name: name.ok(),
        problem,
        text: args.show_text.then_some(text),
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&inspection)?),
        OutputFormat::Text => print_text(&inspection),
    }

    Ok(())
}

fn print_text(inspection: &Inspection) {
    println!("File: {}", inspection.file.display());

    if let Some(fields) = &inspection.fields {
        let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        println!("  Provider:       {}", show(&fields.provider));
        println!("  Customer:       {}", show(&fields.customer));
        println!("  Invoice number: {}", show(&fields.invoice_number));
        println!("  Issue date:     {}", show(&fields.issue_date));
    }

    match (&inspection.name, &inspection.problem) {
        (Some(name), _) => println!("{} {}", style("✓").green(), name),
        (None, Some(problem)) => println!("{} {}", style("✗").red(), problem),
        (None, None) => {}
    }

    if let Some(text) = &inspection.text {
        println!();
        println!("{}", style("--- Extracted text ---").dim());
        println!("{}", text);
    }
}
