//! Batch driver: every screenshot in turn, into one report.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::diagnostics::Diagnostics;
use crate::ocr::TextRecognizer;
use crate::pipeline::{label_for, load_screenshot, recognize_screenshot};
use crate::profile::DimensionsFile;
use crate::report::{Aggregator, ReportWriter};

/// Settings shared by every screenshot in a run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub debug_level: u8,
    /// Where diagnostic images go; None disables them
    pub report_dir: Option<PathBuf>,
    pub output: PathBuf,
    pub name_language: String,
}

/// Counts reported at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub images: usize,
    pub skipped: usize,
    pub rows: usize,
    pub duplicates: usize,
}

/// Expands file paths and glob patterns, in argument order.
///
/// A literal path that exists is taken as is. Patterns matching nothing are
/// logged and contribute no files.
pub fn expand_inputs(inputs: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        let literal = Path::new(input);
        if literal.is_file() {
            files.push(literal.to_path_buf());
            continue;
        }

        let matches = match glob::glob(input) {
            Ok(paths) => paths
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        tracing::warn!("Cannot read {}: {}", e.path().display(), e);
                        None
                    }
                })
                .filter(|p| p.is_file())
                .collect::<Vec<_>>(),
            Err(e) => {
                tracing::warn!("Invalid pattern '{}': {}", input, e);
                continue;
            }
        };

        if matches.is_empty() {
            tracing::warn!("No files match '{}'", input);
        }
        files.extend(matches);
    }
    files
}

/// Processes `files` in order and saves the workbook.
///
/// Unreadable images and per-image recognition failures are logged and
/// skipped. A screenshot whose resolution has no profile aborts the run, as
/// does failing to save the workbook.
pub fn run_batch(
    files: &[PathBuf],
    dims: &DimensionsFile,
    ocr: &dyn TextRecognizer,
    opts: &BatchOptions,
) -> Result<BatchSummary> {
    let mut writer = ReportWriter::new()?;
    let mut aggregator = Aggregator::new();
    let mut summary = BatchSummary::default();

    for path in files {
        summary.images += 1;
        let label = label_for(path);
        tracing::info!("Processing {}", path.display());

        let screenshot = match load_screenshot(path) {
            Ok(img) => img,
            Err(e) => {
                tracing::error!("{}", e);
                summary.skipped += 1;
                continue;
            }
        };

        let profile = dims
            .lookup(screenshot.width(), screenshot.height())
            .with_context(|| format!("No layout for {}", path.display()))?;

        let diag = Diagnostics::new(opts.debug_level, opts.report_dir.as_deref(), &label);
        let result = match recognize_screenshot(
            &screenshot,
            profile,
            &label,
            ocr,
            &opts.name_language,
            &diag,
        ) {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Skipping {}: {:#}", path.display(), e);
                summary.skipped += 1;
                continue;
            }
        };
        tracing::info!("{}: Recognized {} hits", label, result.hit_records.len());

        for row in aggregator.add(result) {
            writer.append(&row)?;
            summary.rows += 1;
        }
    }

    summary.duplicates = aggregator.duplicates();
    writer.save(&opts.output)?;
    tracing::info!(
        "Wrote {} rows ({} flagged as duplicates) to {}",
        summary.rows,
        summary.duplicates,
        opts.output.display()
    );

    Ok(summary)
}
