//! Screenshot → hit records.
//!
//! Stages run strictly in order: crop the hits window, segment it into hits,
//! cut each hit into zones, then read name and damage. A zone that does not fit
//! its hit only drops that hit; any other failure aborts the screenshot.

use anyhow::{Context, Result};
use image::{GrayImage, RgbImage};
use std::path::Path;

use crate::diagnostics::Diagnostics;
use crate::error::RaidError;
use crate::ocr::{recognize_damage, recognize_name, TextRecognizer};
use crate::profile::ResolutionProfile;
use crate::vision::{crop_zones, extract, find_hits};

/// One recognized hit entry.
#[derive(Debug, Clone)]
pub struct HitRecord {
    /// Position among the hit boxes found in the screenshot, top to bottom.
    /// Skipped hits leave gaps, so it matches the diagnostics file names.
    pub hit_index: usize,
    /// Recognized name, possibly empty
    pub name: String,
    /// Raw recognized damage text
    pub damage: String,
    /// The whole hit entry
    pub hit_image: RgbImage,
    /// Image used for name recognition
    pub name_image: GrayImage,
    /// Image used for damage recognition
    pub damage_image: GrayImage,
    pub party_image: RgbImage,
    pub boss_image: RgbImage,
}

/// All hits recognized in one screenshot.
#[derive(Debug, Clone)]
pub struct ScreenshotResult {
    /// Source file name without extension
    pub label: String,
    pub hit_records: Vec<HitRecord>,
}

/// Label used for a screenshot in the report: its file stem.
pub fn label_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Decodes a screenshot into RGB.
pub fn load_screenshot(path: &Path) -> Result<RgbImage, RaidError> {
    image::open(path)
        .map(|img| img.to_rgb8())
        .map_err(|source| RaidError::UnreadableImage {
            path: path.to_path_buf(),
            source,
        })
}

/// Runs the whole recognition pipeline over one screenshot.
pub fn recognize_screenshot(
    screenshot: &RgbImage,
    profile: &ResolutionProfile,
    label: &str,
    ocr: &dyn TextRecognizer,
    name_language: &str,
    diag: &Diagnostics,
) -> Result<ScreenshotResult> {
    // 1. Crop hits window
    diag.hits_window(screenshot, &profile.hits_window);
    let region = extract(screenshot, &profile.hits_window)?;

    // 2. Find hit images
    let layout = &profile.hit_image;
    let seg = find_hits(&region, layout.min_width, layout.min_height);
    diag.segmentation(&region, &seg);
    tracing::info!("{}: found {} hit box(es)", label, seg.hits.len());
    for rect in seg.kept_boxes() {
        tracing::debug!("{}: hit box {}", label, rect);
    }

    let mut hit_records = Vec::with_capacity(seg.hits.len());

    for (index, hit) in seg.hits.into_iter().enumerate() {
        // 3. Crop hit to zones
        let zones = match crop_zones(&hit, layout) {
            Ok(zones) => zones,
            Err(e) => {
                tracing::warn!("{}: skipping hit #{}: {}", label, index, e);
                continue;
            }
        };
        diag.zones(index, &hit, layout, &zones);

        // 4. Recognize name and damage
        let name = recognize_name(&zones.name, ocr, name_language)
            .with_context(|| format!("{}: name of hit #{}", label, index))?;
        let damage = recognize_damage(&zones.damage, ocr)
            .with_context(|| format!("{}: damage of hit #{}", label, index))?;
        diag.ocr_inputs(index, &name.image, &damage.image);

        hit_records.push(HitRecord {
            hit_index: index,
            name: name.text,
            damage: damage.text,
            hit_image: hit,
            name_image: name.image,
            damage_image: damage.image,
            party_image: zones.party,
            boss_image: zones.boss,
        });
    }

    Ok(ScreenshotResult {
        label: label.to_string(),
        hit_records,
    })
}
