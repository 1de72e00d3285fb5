//! Geometric crops driven by the resolution profile.
//!
//! Rectangles are never clamped. A rect that does not fit the image is a
//! configuration mismatch and is reported as a bounds error.

use image::{ImageBuffer, Pixel, RgbImage};

use crate::error::RaidError;
use crate::profile::{HitImageLayout, Rect};

/// The four semantic zones of one hit entry.
#[derive(Debug, Clone)]
pub struct HitZones {
    pub name: RgbImage,
    pub party: RgbImage,
    pub damage: RgbImage,
    pub boss: RgbImage,
}

/// Crops `rect` out of `img`, failing if it does not fit.
pub fn crop_rect<P>(
    img: &ImageBuffer<P, Vec<u8>>,
    rect: &Rect,
    what: &'static str,
) -> Result<ImageBuffer<P, Vec<u8>>, RaidError>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let (width, height) = img.dimensions();
    if !rect.is_valid() || !rect.fits_within(width, height) {
        return Err(RaidError::Bounds {
            what,
            rect: *rect,
            width,
            height,
        });
    }

    Ok(image::imageops::crop_imm(img, rect.x_start, rect.y_start, rect.width(), rect.height()).to_image())
}

/// Crops the window holding the list of hits out of a full screenshot.
pub fn extract(screenshot: &RgbImage, hits_window: &Rect) -> Result<RgbImage, RaidError> {
    let (width, height) = screenshot.dimensions();
    tracing::debug!(
        "Cropping hits window {} from {}x{} screenshot",
        hits_window,
        width,
        height
    );
    crop_rect(screenshot, hits_window, "hits_window")
}

/// Splits one hit image into its name, party, damage and boss zones.
///
/// Zone rects are relative to the hit image, not the screenshot.
pub fn crop_zones(hit: &RgbImage, layout: &HitImageLayout) -> Result<HitZones, RaidError> {
    Ok(HitZones {
        name: crop_rect(hit, &layout.name_rect, "name_rect")?,
        party: crop_rect(hit, &layout.party_rect, "party_rect")?,
        damage: crop_rect(hit, &layout.damage_rect, "damage_rect")?,
        boss: crop_rect(hit, &layout.boss_rect, "boss_rect")?,
    })
}
