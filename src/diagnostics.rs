//! Stage-by-stage debug images.
//!
//! Files land in the report directory as `{label}_{stage}.png`, where the
//! stage name starts with its pipeline step number so a directory listing
//! reads in processing order. Failing to write one is logged and ignored.

use image::{GrayImage, ImageBuffer, Pixel, PixelWithColorType, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect as DrawRect;
use std::path::{Path, PathBuf};

use crate::profile::{HitImageLayout, Rect};
use crate::vision::{HitZones, Segmentation};

const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
const RED: Rgb<u8> = Rgb([255, 0, 0]);
const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);

/// Debug image writer for one screenshot.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    level: u8,
    /// `<report_dir>/<label>`, or None when no report is wanted
    prefix: Option<PathBuf>,
}

impl Diagnostics {
    /// `level` 2 adds the closed mask and the OCR inputs to the regular images.
    pub fn new(level: u8, report_dir: Option<&Path>, label: &str) -> Self {
        Self {
            level,
            prefix: report_dir.map(|dir| dir.join(label)),
        }
    }

    pub fn disabled() -> Self {
        Self {
            level: 0,
            prefix: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.prefix.is_some()
    }

    fn verbose(&self) -> bool {
        self.level >= 2
    }

    /// Path of the image written for `stage`.
    pub fn stage_path(&self, stage: &str) -> Option<PathBuf> {
        let prefix = self.prefix.as_ref()?;
        let file_name = format!(
            "{}_{}.png",
            prefix.file_name()?.to_string_lossy(),
            stage
        );
        Some(prefix.with_file_name(file_name))
    }

    fn save<P>(&self, stage: &str, img: &ImageBuffer<P, Vec<u8>>)
    where
        P: Pixel<Subpixel = u8> + PixelWithColorType,
    {
        let Some(path) = self.stage_path(stage) else {
            return;
        };
        match img.save(&path) {
            Ok(()) => tracing::debug!("Saved {}", path.display()),
            Err(e) => tracing::warn!("Could not save debug image {}: {}", path.display(), e),
        }
    }

    /// Screenshot with the hits window outlined.
    pub fn hits_window(&self, screenshot: &RgbImage, window: &Rect) {
        if !self.is_enabled() {
            return;
        }
        let mut overlay = screenshot.clone();
        outline(&mut overlay, window, BLUE);
        self.save("01_hits_window", &overlay);
    }

    /// Binarized window and every candidate box (kept green, rejected red).
    pub fn segmentation(&self, region: &RgbImage, seg: &Segmentation) {
        if !self.is_enabled() {
            return;
        }
        self.save("02_mask", &seg.mask);
        if self.verbose() {
            self.save("02_closed", &seg.closed);
        }

        let mut overlay = region.clone();
        for candidate in &seg.candidates {
            let color = if candidate.kept { GREEN } else { RED };
            outline(&mut overlay, &candidate.rect, color);
        }
        self.save("02_contours", &overlay);
    }

    /// One hit with its zone rects drawn in, plus each zone crop.
    pub fn zones(&self, index: usize, hit: &RgbImage, layout: &HitImageLayout, zones: &HitZones) {
        if !self.is_enabled() {
            return;
        }
        let mut overlay = hit.clone();
        outline(&mut overlay, &layout.name_rect, BLUE);
        outline(&mut overlay, &layout.party_rect, GREEN);
        outline(&mut overlay, &layout.boss_rect, RED);
        outline(&mut overlay, &layout.damage_rect, YELLOW);

        self.save(&format!("03_{:03}_zones", index), &overlay);
        self.save(&format!("03_{:03}_name", index), &zones.name);
        self.save(&format!("03_{:03}_party", index), &zones.party);
        self.save(&format!("03_{:03}_boss", index), &zones.boss);
        self.save(&format!("03_{:03}_damage", index), &zones.damage);
    }

    /// The exact images handed to OCR.
    pub fn ocr_inputs(&self, index: usize, name: &GrayImage, damage: &GrayImage) {
        if !self.is_enabled() || !self.verbose() {
            return;
        }
        self.save(&format!("04_{:03}_name_ocr", index), name);
        self.save(&format!("04_{:03}_damage_ocr", index), damage);
    }
}

/// Draws a 2px outline just inside `rect`, skipping rects that are off-image.
fn outline(img: &mut RgbImage, rect: &Rect, color: Rgb<u8>) {
    let (width, height) = img.dimensions();
    if !rect.is_valid() || !rect.fits_within(width, height) {
        return;
    }

    let outer = DrawRect::at(rect.x_start as i32, rect.y_start as i32)
        .of_size(rect.width(), rect.height());
    draw_hollow_rect_mut(img, outer, color);

    if rect.width() > 2 && rect.height() > 2 {
        let inner = DrawRect::at(rect.x_start as i32 + 1, rect.y_start as i32 + 1)
            .of_size(rect.width() - 2, rect.height() - 2);
        draw_hollow_rect_mut(img, inner, color);
    }
}
