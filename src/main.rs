//! gtraid
//!
//! Reads damage-log screenshots from a raid game and collects every hit
//! (player name and damage) into an xlsx workbook, with the source images
//! embedded next to each value for checking.

mod batch;
mod diagnostics;
mod error;
mod ocr;
mod paths;
mod pipeline;
mod profile;
mod report;
mod vision;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::filter::EnvFilter;

use crate::batch::BatchOptions;
use crate::profile::DimensionsFile;

#[derive(Parser, Debug)]
#[command(version, about = "Extract raid hit records from screenshots into an xlsx report")]
struct Args {
    /// Screenshot files or glob patterns
    #[arg(required_unless_present = "list_resolutions")]
    inputs: Vec<String>,

    /// 0: quiet, 1: progress and stage images, 2: everything
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=2))]
    debug: u8,

    /// Directory for stage images
    #[arg(short, long, default_value = "report")]
    report: PathBuf,

    /// Do not write stage images
    #[arg(long)]
    no_report: bool,

    /// Output workbook
    #[arg(short, long, default_value = "result.xlsx")]
    output: PathBuf,

    /// Layout file with per-resolution regions
    #[arg(short = 'c', long)]
    dimensions: Option<PathBuf>,

    /// Tesseract executable
    #[arg(short, long, env = "TESSERACT_CMD")]
    tesseract: Option<PathBuf>,

    /// Directory holding the .traineddata files
    #[arg(long, env = "GTRAID_TESSDATA")]
    tessdata_dir: Option<PathBuf>,

    /// Tesseract language(s) for player names
    #[arg(long, default_value = ocr::DEFAULT_NAME_LANGUAGE)]
    name_lang: String,

    /// Print the resolutions the layout file supports and exit
    #[arg(long)]
    list_resolutions: bool,
}

fn init_logging(debug: u8) {
    let level = match debug {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = panic_info
            .location()
            .map(|loc| format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_default();
        tracing::error!("[PANIC]{} {}", location, msg);
    }));

    let dims_path = paths::resolve_dimensions_path(args.dimensions.as_deref());
    let dims = DimensionsFile::load(&dims_path)?;
    tracing::info!("Loaded layouts from {}", dims_path.display());

    if args.list_resolutions {
        for (width, height) in dims.resolutions() {
            println!("{}x{}", width, height);
        }
        return Ok(());
    }

    let files = batch::expand_inputs(&args.inputs);
    if files.is_empty() {
        tracing::warn!("No screenshots to process");
    }

    let engine = ocr::init_tesseract(args.tesseract.as_deref(), args.tessdata_dir.as_deref())?;

    let report_dir = if args.no_report {
        None
    } else {
        paths::ensure_report_dir(&args.report)
            .with_context(|| format!("Failed to create {}", args.report.display()))?;
        Some(args.report.clone())
    };

    let opts = BatchOptions {
        debug_level: args.debug,
        report_dir,
        output: args.output.clone(),
        name_language: args.name_lang.clone(),
    };
    let summary = batch::run_batch(&files, &dims, &engine, &opts)?;

    println!(
        "{} image(s), {} skipped, {} hit(s) written to {}",
        summary.images,
        summary.skipped,
        summary.rows,
        opts.output.display()
    );
    Ok(())
}
