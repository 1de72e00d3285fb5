//! xlsx report writer.
//!
//! One row per hit, with the recognized text next to thumbnails of the images
//! it was read from so mistakes can be spotted by eye. Image columns widen to
//! the largest thumbnail written so far.

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{GrayImage, ImageBuffer, ImageFormat, Pixel, PixelWithColorType};
use rust_xlsxwriter::{Color, Format, FormatAlign, Image, ObjectMovement, Workbook, Worksheet};
use std::io::Cursor;
use std::path::Path;

use super::aggregate::{DamageCell, ReportRow};
use crate::vision::{auto_crop, invert};

const COL_NAME: u16 = 0;
const COL_NAME_IMG: u16 = 1;
const COL_DAMAGE: u16 = 2;
const COL_DAMAGE_IMG: u16 = 3;
const COL_PARTY_IMG: u16 = 4;
const COL_BOSS_IMG: u16 = 5;
const COL_LABEL: u16 = 6;
const COL_INDEX: u16 = 7;
const COL_HIT_IMG: u16 = 8;

const IMAGE_COLUMNS: [u16; 5] = [COL_NAME_IMG, COL_DAMAGE_IMG, COL_PARTY_IMG, COL_BOSS_IMG, COL_HIT_IMG];

/// Starting width of image columns, in pixels
const MIN_IMAGE_COLUMN_WIDTH: u32 = 100;
/// Space added next to the widest image
const COLUMN_PADDING: u32 = 10;

const NAME_SCALE: f64 = 0.4;
const DAMAGE_SCALE: f64 = 0.5;
const ZONE_SCALE: f64 = 0.5;
const HIT_SCALE: f64 = 0.7;
/// The hit image is stored at HIT_SCALE and shown smaller in the sheet
const HIT_DISPLAY_SCALE: f64 = 0.3;

/// Light red fill for probable duplicates
const DUPLICATE_FILL: u32 = 0xFFB3B3;

/// Accumulates rows into a worksheet; `save` writes the workbook.
pub struct ReportWriter {
    worksheet: Worksheet,
    next_row: u32,
    rows_written: usize,
    image_widths: [u32; 5],
    damage_format: Format,
    duplicate_format: Format,
}

impl ReportWriter {
    pub fn new() -> Result<Self> {
        let mut worksheet = Worksheet::new();
        worksheet.set_name("Hits")?;

        worksheet.set_column_width(COL_NAME, 15)?;
        worksheet.set_column_width(COL_DAMAGE, 15)?;
        worksheet.set_column_width(COL_LABEL, 30)?;
        for col in IMAGE_COLUMNS {
            worksheet.set_column_width_pixels(col, MIN_IMAGE_COLUMN_WIDTH as u16)?;
        }

        let header_format = Format::new().set_bold();
        let headers = [
            (COL_NAME, "Name"),
            (COL_NAME_IMG, "Name image"),
            (COL_DAMAGE, "Damage"),
            (COL_DAMAGE_IMG, "Damage image"),
            (COL_PARTY_IMG, "Party"),
            (COL_BOSS_IMG, "Boss"),
            (COL_LABEL, "Screenshot"),
            (COL_INDEX, "Hit"),
            (COL_HIT_IMG, "Hit image"),
        ];
        for (col, title) in headers {
            worksheet.write_string_with_format(0, col, title, &header_format)?;
        }

        let damage_format = Format::new()
            .set_num_format("#,##0")
            .set_align(FormatAlign::Left);
        let duplicate_format = damage_format
            .clone()
            .set_background_color(Color::RGB(DUPLICATE_FILL));

        Ok(Self {
            worksheet,
            next_row: 1,
            rows_written: 0,
            image_widths: [MIN_IMAGE_COLUMN_WIDTH; 5],
            damage_format,
            duplicate_format,
        })
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Current width of an image column in pixels.
    fn image_width(&self, col: u16) -> u32 {
        IMAGE_COLUMNS
            .iter()
            .position(|&c| c == col)
            .map(|i| self.image_widths[i])
            .unwrap_or(MIN_IMAGE_COLUMN_WIDTH)
    }

    /// Widens an image column if `width` does not fit.
    fn fit_column(&mut self, col: u16, width: u32) -> Result<()> {
        let Some(i) = IMAGE_COLUMNS.iter().position(|&c| c == col) else {
            return Ok(());
        };
        if width > self.image_widths[i] {
            self.image_widths[i] = width;
            let pixels = (width + COLUMN_PADDING).min(u16::MAX as u32) as u16;
            self.worksheet.set_column_width_pixels(col, pixels)?;
        }
        Ok(())
    }

    /// Embeds `png` at (row, col) and returns the displayed (width, height).
    fn insert_thumbnail(
        &mut self,
        row: u32,
        col: u16,
        png: &[u8],
        size: (u32, u32),
        display_scale: f64,
    ) -> Result<(u32, u32)> {
        let mut image = Image::new_from_buffer(png)?
            .set_object_movement(ObjectMovement::MoveAndSizeWithCells);
        if display_scale != 1.0 {
            image = image
                .set_scale_width(display_scale)
                .set_scale_height(display_scale);
        }

        let width = (size.0 as f64 * display_scale) as u32;
        let height = (size.1 as f64 * display_scale) as u32;
        self.fit_column(col, width)?;
        self.worksheet.insert_image(row, col, &image)?;
        Ok((width, height))
    }

    /// Writes one hit row.
    pub fn append(&mut self, row: &ReportRow) -> Result<()> {
        let r = self.next_row;
        let record = &row.record;

        self.worksheet.write_string(r, COL_NAME, &record.name)?;

        match &row.damage {
            DamageCell::Value { value, duplicate } => {
                let format = if *duplicate {
                    &self.duplicate_format
                } else {
                    &self.damage_format
                };
                self.worksheet
                    .write_number_with_format(r, COL_DAMAGE, *value as f64, format)?;
            }
            DamageCell::Empty | DamageCell::Unparsed(_) => {}
        }

        let name_thumb = scale(&trim_mask(&record.name_image), NAME_SCALE);
        let damage_thumb = scale(&trim_mask(&record.damage_image), DAMAGE_SCALE);
        let party_thumb = scale(&record.party_image, ZONE_SCALE);
        let boss_thumb = scale(&record.boss_image, ZONE_SCALE);
        let hit_thumb = scale(&record.hit_image, HIT_SCALE);

        let heights = [
            self.insert_thumbnail(r, COL_NAME_IMG, &encode_png(&name_thumb)?, name_thumb.dimensions(), 1.0)?.1,
            self.insert_thumbnail(r, COL_DAMAGE_IMG, &encode_png(&damage_thumb)?, damage_thumb.dimensions(), 1.0)?.1,
            self.insert_thumbnail(r, COL_PARTY_IMG, &encode_png(&party_thumb)?, party_thumb.dimensions(), 1.0)?.1,
            self.insert_thumbnail(r, COL_BOSS_IMG, &encode_png(&boss_thumb)?, boss_thumb.dimensions(), 1.0)?.1,
            self.insert_thumbnail(r, COL_HIT_IMG, &encode_png(&hit_thumb)?, hit_thumb.dimensions(), HIT_DISPLAY_SCALE)?.1,
        ];
        let row_height = heights.into_iter().max().unwrap_or(0).clamp(1, u16::MAX as u32);
        self.worksheet.set_row_height_pixels(r, row_height as u16)?;

        self.worksheet.write_string(r, COL_LABEL, &row.label)?;
        self.worksheet.write_number(r, COL_INDEX, row.hit_index as f64)?;

        self.next_row += 1;
        self.rows_written += 1;
        Ok(())
    }

    /// Writes the workbook to `path`.
    pub fn save(self, path: &Path) -> Result<()> {
        let mut workbook = Workbook::new();
        workbook.push_worksheet(self.worksheet);
        workbook
            .save(path)
            .with_context(|| format!("Failed to save report {}", path.display()))?;
        Ok(())
    }
}

/// Trims the white border around a black-on-white recognition mask.
fn trim_mask(mask: &GrayImage) -> GrayImage {
    invert(&auto_crop(&invert(mask), 0))
}

/// Resizes by `factor`, never below 1x1.
fn scale<P>(img: &ImageBuffer<P, Vec<u8>>, factor: f64) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let (width, height) = img.dimensions();
    let new_width = ((width as f64 * factor) as u32).max(1);
    let new_height = ((height as f64 * factor) as u32).max(1);
    image::imageops::resize(img, new_width, new_height, FilterType::Triangle)
}

fn encode_png<P>(img: &ImageBuffer<P, Vec<u8>>) -> Result<Vec<u8>>
where
    P: Pixel<Subpixel = u8> + PixelWithColorType,
{
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)
        .context("Failed to encode thumbnail")?;
    Ok(buffer.into_inner())
}
