//! unembed CLI - removes ad wrappers from shared PDF files

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use unembed::{
    clean_paths_with, discover, CleanOptions, CleanOutput, CleanReport, CleanResult, Method,
};

#[derive(Parser)]
#[command(name = "unembed")]
#[command(version)]
#[command(about = "Remove ad wrappers, banners and watermarks from shared PDF files", long_about = None)]
struct Cli {
    /// PDF files or directories to clean
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,

    /// Replace original files with their cleaned version
    #[arg(short, long)]
    replace: bool,

    /// Do not show metadata about cleaned files
    #[arg(short, long)]
    short: bool,

    /// Force the naive cleaning method
    #[arg(short, long, conflicts_with = "method")]
    naive: bool,

    /// Cleaning method (auto, new, old, naive)
    #[arg(short, long, default_value = "auto", value_parser = parse_method)]
    method: Method,

    /// Only clean files in directories whose name matches this glob
    #[arg(long, value_name = "GLOB")]
    pattern: Option<String>,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,

    /// Clean one file at a time
    #[arg(long, env = "UNEMBED_SEQUENTIAL")]
    sequential: bool,
}

fn parse_method(value: &str) -> Result<Method, String> {
    value.parse::<Method>().map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Clean every input. Returns whether all of them were cleaned.
fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let method = if cli.naive { Method::Naive } else { cli.method };
    let options = CleanOptions::new()
        .with_method(method)
        .with_replace(cli.replace)
        .with_metadata(!cli.short)
        .with_parallel(!cli.sequential);

    let pattern = cli
        .pattern
        .as_deref()
        .map(glob::Pattern::new)
        .transpose()
        .map_err(|e| format!("Invalid pattern: {}", e))?;

    let discovery = discover(&cli.paths, &options, pattern.as_ref());
    for missing in &discovery.missing {
        println!("{} {}", missing.display(), "not found.".yellow());
    }

    let progress = progress_bar(discovery.files.len(), cli.json);
    let reports = clean_paths_with(&discovery.files, &options, |report| {
        progress.set_message(report.input.display().to_string());
        progress.inc(1);
    });
    progress.finish_and_clear();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_report(report, cli.short);
        }
    }

    let failed = reports.iter().filter(|r| !r.result.is_success()).count();
    if !cli.json && reports.len() > 1 {
        print_summary(reports.len(), failed);
    }

    Ok(failed == 0 && discovery.missing.is_empty())
}

fn progress_bar(total: usize, hidden: bool) -> ProgressBar {
    if hidden || total < 2 {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

fn print_report(report: &CleanReport, short: bool) {
    println!("{}", report.input.display().to_string().cyan().bold());

    if !short {
        if let Some(ref metadata) = report.metadata {
            println!("{}", "Metadata:".bold());
            for (label, value) in metadata.entries() {
                println!("  {}: {}", label, value.unwrap_or("-"));
            }
        } else if let Some(ref error) = report.metadata_error {
            println!("{} {}", "Failed to extract metadata:".yellow(), error);
        }
    }

    match &report.result {
        CleanResult::Success(success) => {
            let saved = match &success.output {
                CleanOutput::Path(path) => path.display().to_string(),
                CleanOutput::Bytes(bytes) => format!("{} bytes", bytes.len()),
            };
            println!(
                "{} {} {}",
                "Cleaning successful. File saved in".green(),
                saved,
                format!("({} method, {} pages)", success.method, success.pages).dimmed()
            );
        }
        CleanResult::Failure(failure) => {
            eprintln!(
                "{} {}: {}",
                "Error cleaning".red().bold(),
                report.input.display(),
                failure.message
            );
        }
    }
}

fn print_summary(total: usize, failed: usize) {
    println!();
    if failed == 0 {
        println!("{} {} files cleaned", "Done!".green().bold(), total);
    } else {
        println!(
            "{} {} of {} files cleaned, {} failed",
            "Done.".yellow().bold(),
            total - failed,
            total,
            failed
        );
    }
}
