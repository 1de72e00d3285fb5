use anyhow::{anyhow, Context, Result};
use image::GrayImage;
use std::path::PathBuf;
use std::process::Command;
use tempfile::NamedTempFile;

use crate::error::RaidError;

/// Turns a prepared (black text on white) image into text.
pub trait TextRecognizer {
    /// Recognizes `img`. `language` is a Tesseract language spec such as
    /// `kor+eng`; `None` leaves the engine default.
    fn recognize(&self, img: &GrayImage, language: Option<&str>) -> Result<String>;
}

/// Runs the Tesseract command line tool on a temporary PNG.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    executable: PathBuf,
    tessdata_dir: Option<PathBuf>,
}

impl TesseractEngine {
    pub fn new(executable: PathBuf, tessdata_dir: Option<PathBuf>) -> Self {
        Self {
            executable,
            tessdata_dir,
        }
    }

    /// Checks that the executable runs and returns its version banner.
    pub fn version(&self) -> Result<String> {
        let output = Command::new(&self.executable)
            .arg("--version")
            .output()
            .with_context(|| format!("Failed to run {}", self.executable.display()))?;

        if !output.status.success() {
            return Err(anyhow!(
                "{} --version exited with {}",
                self.executable.display(),
                output.status
            ));
        }

        // Older builds print the banner to stderr
        let banner = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        Ok(String::from_utf8_lossy(&banner)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string())
    }
}

impl TextRecognizer for TesseractEngine {
    fn recognize(&self, img: &GrayImage, language: Option<&str>) -> Result<String> {
        // Save image to temporary file
        let temp_input = NamedTempFile::with_suffix(".png")?;
        img.save(temp_input.path())
            .context("Failed to write OCR input image")?;

        // Run Tesseract to stdout
        let mut command = Command::new(&self.executable);
        command.arg(temp_input.path()).arg("stdout");
        if let Some(dir) = &self.tessdata_dir {
            command.arg("--tessdata-dir").arg(dir);
        }
        if let Some(lang) = language {
            command.arg("-l").arg(lang);
        }

        let output = command
            .output()
            .map_err(|e| RaidError::Ocr(format!("{}: {}", self.executable.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RaidError::Ocr(stderr.trim().to_string()).into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
