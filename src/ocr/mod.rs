pub mod engine;
pub mod extract;
pub mod recognize;
pub mod setup;

pub use engine::{TesseractEngine, TextRecognizer};
pub use extract::parse_damage;
pub use recognize::{recognize_damage, recognize_name, DEFAULT_NAME_LANGUAGE};

use anyhow::Result;
use std::path::Path;

/// Locates Tesseract and verifies that it runs.
pub fn init_tesseract(
    configured_exe: Option<&Path>,
    configured_tessdata: Option<&Path>,
) -> Result<TesseractEngine> {
    let executable = setup::find_tesseract_executable(configured_exe)?;
    let tessdata = setup::find_tessdata_dir(configured_tessdata);

    let engine = TesseractEngine::new(executable.clone(), tessdata);
    let version = engine.version()?;
    tracing::info!("Using {} ({})", executable.display(), version);

    Ok(engine)
}
