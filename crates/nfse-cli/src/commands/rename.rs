//! Rename command - copy every invoice in a tree under its canonical name.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use nfse_core::{BatchObserver, BatchRenamer, BatchSummary};

use super::config::load_config;

/// Arguments for the rename command.
#[derive(Args)]
pub struct RenameArgs {
    /// Source directory containing invoice PDFs
    #[arg(required = true)]
    source: PathBuf,

    /// Destination directory for the renamed copies
    #[arg(required = true)]
    dest: PathBuf,

    /// Document type (only "NFS" is supported)
    #[arg(short = 't', long = "type")]
    document_type: Option<String>,

    /// Per-document timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Follow symbolic links in the source tree
    #[arg(long)]
    follow_links: bool,

    /// Also write a per-document CSV summary into the destination
    #[arg(long)]
    summary: bool,

    /// Print the final summary as JSON instead of a report
    #[arg(long)]
    json: bool,
}

/// Forwards batch log lines and progress to an indicatif bar.
struct ProgressObserver {
    pb: ProgressBar,
}

impl BatchObserver for ProgressObserver {
    fn on_log(&mut self, line: &str) {
        if self.pb.is_hidden() {
            eprintln!("{}", line);
        } else {
            self.pb.println(line);
        }
    }

    fn on_progress(&mut self, percent: u8) {
        self.pb.set_position(u64::from(percent));
    }
}

pub async fn run(args: RenameArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Command-line flags override the config file
    let mut config = load_config(config_path)?;
    if let Some(document_type) = args.document_type {
        config.batch.document_type = document_type;
    }
    if let Some(timeout) = args.timeout {
        config.batch.timeout_secs = timeout;
    }
    if args.follow_links {
        config.batch.follow_links = true;
    }
    if args.summary {
        config.output.write_summary = true;
    }

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}%")?
            .progress_chars("=>-"),
    );

    let document_type = config.batch.document_type.clone();
    let renamer = BatchRenamer::new(config.batch.clone());
    let mut observer = ProgressObserver { pb };

    let result = renamer
        .process(&args.source, &args.dest, &document_type, &mut observer)
        .await;
    observer.pb.finish_and_clear();

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            // Setup faults still produce the zero-count report
            if let Some(summary) = e.summary() {
                print_summary(summary, args.json)?;
            }
            return Err(e.into());
        }
    };

    if config.output.write_summary {
        let summary_path = args.dest.join(&config.output.summary_file);
        write_summary(&summary_path, &summary)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    print_summary(&summary, args.json)?;

    debug!("Batch finished in {:?}", start.elapsed());

    Ok(())
}

fn print_summary(summary: &BatchSummary, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        print_report(summary);
    }
    Ok(())
}

fn print_report(summary: &BatchSummary) {
    println!();
    println!("{}", style("========== FINAL REPORT ==========").bold());
    println!("Total found: {}", summary.total_found);
    println!("Renamed:     {}", style(summary.renamed).green());
    println!("Skipped:     {}", style(summary.skipped).yellow());
    println!("Ignored:     {}", summary.ignored);
    println!("Errors:      {}", style(summary.errors.len()).red());

    if !summary.errors.is_empty() {
        println!();
        println!("{}", style("--- Skipped files / errors ---").red());
        for error in &summary.errors {
            println!("  - {}", error);
        }
    }

    if let Some(finished_at) = summary.finished_at {
        let elapsed = finished_at - summary.started_at;
        println!();
        println!(
            "{} Done in {}.{:03}s",
            style("✓").green(),
            elapsed.num_seconds(),
            elapsed.num_milliseconds() % 1000
        );
    }
}

fn write_summary(path: &Path, summary: &BatchSummary) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["filename", "status", "destination", "elapsed_ms", "detail"])?;

    for document in &summary.documents {
        let destination = document
            .outcome
            .destination()
            .map(|d| d.display().to_string())
            .unwrap_or_default();
        let detail = if document.outcome.is_success() {
            String::new()
        } else {
            document.outcome.to_string()
        };

        wtr.write_record([
            document.file_name().as_str(),
            document.outcome.label(),
            destination.as_str(),
            document.elapsed_ms.to_string().as_str(),
            detail.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
