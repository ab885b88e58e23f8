//! entitle - derive chapter titles and identifiers for ebook sources

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use entitle::{BatchReport, process_directory};

#[derive(Parser)]
#[command(name = "entitle")]
#[command(version, about = "Derive chapter titles and identifiers for ebook sources", long_about = None)]
#[command(after_help = "EXAMPLES:
    entitle ~/ebooks/my-book         Print retitled files to stdout
    entitle -i ~/ebooks/my-book      Rewrite the content files in place
    entitle -i --json ~/ebooks/my-book   Rewrite and print a JSON report")]
struct Cli {
    /// An unpacked ebook source directory (containing src/epub/content.opf)
    #[arg(value_name = "DIRECTORY")]
    directory: PathBuf,

    /// Overwrite the existing xhtml files instead of printing to stdout
    #[arg(short, long)]
    in_place: bool,

    /// Print the batch report as JSON
    #[arg(long)]
    json: bool,

    /// Suppress progress messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let opf = cli.directory.join("src").join("epub").join("content.opf");
    if !opf.exists() {
        eprintln!(
            "error: {} not found; is this an unpacked ebook source directory?",
            opf.display()
        );
        return ExitCode::FAILURE;
    }

    let report = match process_directory(&cli.directory, cli.in_place) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    print_report(&cli, &report);

    if report.no_successes() {
        eprintln!("warning: no files processed; did you update the manifest and order the spine?");
    }
    if report.failures.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_report(cli: &Cli, report: &BatchReport) {
    if !cli.in_place {
        for processed in &report.processed {
            if let Some(xhtml) = &processed.xhtml {
                println!("{xhtml}");
            }
        }
    } else if !cli.quiet {
        for processed in &report.processed {
            println!("{}: {} ({})", processed.file, processed.title, processed.id);
        }
        for skipped in &report.skipped {
            println!("{skipped}: skipped, no heading");
        }
    }

    for failure in &report.failures {
        eprintln!("error: {}: {}", failure.file, failure.error);
    }

    if cli.json {
        match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("error: {e}"),
        }
    }
}
