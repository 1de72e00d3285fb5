//! Zone recognizers: mask a zone for OCR and read its text.

use anyhow::Result;
use image::{GrayImage, RgbImage};

use super::engine::TextRecognizer;
use super::extract::clean_damage_text;
use crate::vision::{content_bounds, invert, threshold_binary, to_gray};

/// Isolates the bright name and timestamp text.
const NAME_LOCATE_THRESHOLD: u8 = 200;
/// Gives the cleaner mask used for the actual recognition.
const NAME_READ_THRESHOLD: u8 = 130;
/// Pixels kept to the right of the last name column.
const NAME_MARGIN: u32 = 10;

const DAMAGE_THRESHOLD: u8 = 160;

/// Default language for player names, which mix Hangul and Latin letters.
pub const DEFAULT_NAME_LANGUAGE: &str = "kor+eng";

/// A recognized zone: the exact image handed to OCR plus the text it produced.
#[derive(Debug, Clone)]
pub struct ZoneReading {
    pub image: GrayImage,
    pub text: String,
}

/// Reads the player name from the name zone.
///
/// The zone holds the name followed by a timestamp. Only the name is bright
/// enough to pass the first threshold, so the rightmost bright column marks
/// where the name ends; everything past it plus a small margin is dropped
/// before the second, more permissive threshold.
pub fn recognize_name(
    zone: &RgbImage,
    ocr: &dyn TextRecognizer,
    language: &str,
) -> Result<ZoneReading> {
    let gray = to_gray(zone);
    let (width, height) = gray.dimensions();

    let name_mask = threshold_binary(&gray, NAME_LOCATE_THRESHOLD);
    let bounds = content_bounds(&name_mask, 0);
    let keep_width = (bounds.x_end + NAME_MARGIN).min(width);

    let name_only = image::imageops::crop_imm(&gray, 0, 0, keep_width, height).to_image();
    let mask = threshold_binary(&name_only, NAME_READ_THRESHOLD);
    let reco_image = invert(&mask);

    let text = ocr.recognize(&reco_image, Some(language))?.trim().to_string();
    tracing::debug!("Name is: '{}'", text);

    Ok(ZoneReading {
        image: reco_image,
        text,
    })
}

/// Reads the raw damage string from the damage zone.
///
/// Separators are kept; numeric parsing happens during aggregation.
pub fn recognize_damage(zone: &RgbImage, ocr: &dyn TextRecognizer) -> Result<ZoneReading> {
    let gray = to_gray(zone);
    let mask = invert(&threshold_binary(&gray, DAMAGE_THRESHOLD));

    let raw = ocr.recognize(&mask, None)?;
    let text = clean_damage_text(&raw);
    tracing::debug!("Damage is: '{}'", text);

    Ok(ZoneReading { image: mask, text })
}
