use anyhow::{anyhow, Result};
use std::path::{Component, Path, PathBuf};

/// Returns the per-user directory for OCR data: `<data_local_dir>/gtraid/tessdata`
pub fn get_tessdata_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gtraid")
        .join("tessdata")
}

/// Finds the Tesseract executable.
///
/// An explicitly configured path (flag or `TESSERACT_CMD`) wins. It may also be
/// a bare command name, which is then looked up on `PATH`. Without one the
/// `tesseract` found on `PATH` is used.
pub fn find_tesseract_executable(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.exists() || (is_bare_command(path) && runs_version_check(path)) {
            return Ok(path.to_path_buf());
        }
        return Err(anyhow!(
            "Tesseract executable not found at {}",
            path.display()
        ));
    }

    let default = Path::new("tesseract");
    if runs_version_check(default) {
        return Ok(default.to_path_buf());
    }

    Err(anyhow!(
        "Tesseract not found. Install Tesseract-OCR, then pass --tesseract <path> or set TESSERACT_CMD."
    ))
}

/// A name without directory parts, resolved through `PATH` by the OS.
fn is_bare_command(path: &Path) -> bool {
    let mut components = path.components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn runs_version_check(command: &Path) -> bool {
    std::process::Command::new(command)
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

/// Picks the tessdata directory handed to Tesseract, if any.
///
/// Without a configured directory the per-user one is used when it holds
/// trained data; otherwise Tesseract falls back to its own lookup
/// (`TESSDATA_PREFIX` or the install location).
pub fn find_tessdata_dir(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = configured {
        return Some(dir.to_path_buf());
    }

    let local = get_tessdata_dir();
    if has_trained_data(&local) {
        tracing::debug!("Using tessdata at {}", local.display());
        return Some(local);
    }
    None
}

fn has_trained_data(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries.flatten().any(|e| {
                e.path()
                    .extension()
                    .is_some_and(|ext| ext == "traineddata")
            })
        })
        .unwrap_or(false)
}
