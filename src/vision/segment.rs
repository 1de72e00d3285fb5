//! Hit segmentation: finds the individual hit entries inside the hits window.
//!
//! Every hit entry is drawn as a framed panel on a near-black background, so a
//! low fixed threshold separates panels from the background. A morphological
//! close then fuses broken frame edges into solid blobs, and each external
//! contour's bounding box becomes one hit candidate.

use image::{GrayImage, RgbImage};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::distance_transform::Norm;
use imageproc::morphology::close;

use super::threshold::{threshold_binary, to_gray};
use crate::profile::Rect;

/// Anything brighter than this is part of a panel.
pub const BACKGROUND_THRESHOLD: u8 = 15;

/// A 3x3 square element applied twice equals an L-inf radius of 2.
const CLOSE_RADIUS: u8 = 2;

/// Bounding box of one external contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateBox {
    pub rect: Rect,
    /// False when the box is too small to be a hit
    pub kept: bool,
}

/// Output of [`find_hits`].
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Binarized window
    pub mask: GrayImage,
    /// Mask after closing, the contour source
    pub closed: GrayImage,
    /// Every candidate box, kept or not
    pub candidates: Vec<CandidateBox>,
    /// Crops of the kept boxes, top to bottom
    pub hits: Vec<RgbImage>,
}

impl Segmentation {
    pub fn kept_boxes(&self) -> impl Iterator<Item = &Rect> {
        self.candidates.iter().filter(|c| c.kept).map(|c| &c.rect)
    }
}

/// Axis-aligned bounding box of a contour, with exclusive ends.
fn bounding_rect(contour: &Contour<u32>) -> Option<Rect> {
    let first = contour.points.first()?;
    let mut rect = Rect::new(first.x, first.y, first.x + 1, first.y + 1);
    for p in &contour.points {
        rect.x_start = rect.x_start.min(p.x);
        rect.y_start = rect.y_start.min(p.y);
        rect.x_end = rect.x_end.max(p.x + 1);
        rect.y_end = rect.y_end.max(p.y + 1);
    }
    Some(rect)
}

/// Finds hit entries in a cropped hits window.
///
/// A box is kept only if its width is strictly greater than `min_width` and
/// its height strictly greater than `min_height`. Kept hits are sorted by
/// vertical, then horizontal position so that hit indices follow the on-screen
/// order. Finding nothing is not an error.
pub fn find_hits(region: &RgbImage, min_width: u32, min_height: u32) -> Segmentation {
    let gray = to_gray(region);
    let mask = threshold_binary(&gray, BACKGROUND_THRESHOLD);
    let closed = close(&mask, Norm::LInf, CLOSE_RADIUS);

    // Only outer borders of top-level components; holes and nested panels are ignored
    let contours: Vec<Contour<u32>> = find_contours::<u32>(&closed)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .collect();

    tracing::debug!("find_hits: found external contours = {}", contours.len());

    let mut candidates: Vec<CandidateBox> = Vec::with_capacity(contours.len());
    for rect in contours.iter().filter_map(bounding_rect) {
        let kept = rect.width() > min_width && rect.height() > min_height;
        if kept {
            tracing::debug!(
                "find_hits: keeping x={}, y={}, width={}, height={}",
                rect.x_start,
                rect.y_start,
                rect.width(),
                rect.height()
            );
        } else {
            tracing::debug!(
                "find_hits: skipping x={}, y={}, width={}, height={}",
                rect.x_start,
                rect.y_start,
                rect.width(),
                rect.height()
            );
        }
        candidates.push(CandidateBox { rect, kept });
    }

    let mut kept: Vec<Rect> = candidates.iter().filter(|c| c.kept).map(|c| c.rect).collect();
    kept.sort_by_key(|r| (r.y_start, r.x_start));

    let hits = kept
        .iter()
        .map(|r| {
            image::imageops::crop_imm(region, r.x_start, r.y_start, r.width(), r.height())
                .to_image()
        })
        .collect();

    Segmentation {
        mask,
        closed,
        candidates,
        hits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn fill(img: &mut RgbImage, rect: Rect, color: [u8; 3]) {
        for y in rect.y_start..rect.y_end {
            for x in rect.x_start..rect.x_end {
                img.put_pixel(x, y, Rgb(color));
            }
        }
    }

    /// Draws a 2px panel frame, the way hit entries look in the game.
    fn frame(img: &mut RgbImage, rect: Rect, color: [u8; 3]) {
        fill(img, Rect::new(rect.x_start, rect.y_start, rect.x_end, rect.y_start + 2), color);
        fill(img, Rect::new(rect.x_start, rect.y_end - 2, rect.x_end, rect.y_end), color);
        fill(img, Rect::new(rect.x_start, rect.y_start, rect.x_start + 2, rect.y_end), color);
        fill(img, Rect::new(rect.x_end - 2, rect.y_start, rect.x_end, rect.y_end), color);
    }

    #[test]
    fn test_find_hits_filters_small_boxes() {
        let mut region = RgbImage::new(300, 200);

        // 3 hit-sized panels
        fill(&mut region, Rect::new(10, 10, 210, 50), [60, 60, 80]);
        fill(&mut region, Rect::new(10, 70, 210, 110), [60, 60, 80]);
        fill(&mut region, Rect::new(10, 130, 210, 170), [60, 60, 80]);
        // 2 specks of noise
        fill(&mut region, Rect::new(250, 20, 256, 26), [200, 200, 200]);
        fill(&mut region, Rect::new(250, 120, 262, 128), [200, 200, 200]);

        let seg = find_hits(&region, 100, 30);

        assert_eq!(seg.hits.len(), 3);
        assert_eq!(seg.candidates.len(), 5);
        for hit in &seg.hits {
            assert_eq!(hit.dimensions(), (200, 40));
        }
    }

    #[test]
    fn test_find_hits_sorted_top_to_bottom() {
        let mut region = RgbImage::new(300, 200);
        fill(&mut region, Rect::new(10, 130, 210, 170), [180, 40, 40]);
        fill(&mut region, Rect::new(10, 10, 210, 50), [40, 180, 40]);
        fill(&mut region, Rect::new(10, 70, 210, 110), [40, 40, 180]);

        let seg = find_hits(&region, 100, 30);
        assert_eq!(seg.hits.len(), 3);
        assert_eq!(seg.kept_boxes().count(), 3);

        // Crops follow screen order
        assert_eq!(seg.hits[0].get_pixel(5, 5), &Rgb([40, 180, 40]));
        assert_eq!(seg.hits[1].get_pixel(5, 5), &Rgb([40, 40, 180]));
        assert_eq!(seg.hits[2].get_pixel(5, 5), &Rgb([180, 40, 40]));
    }

    #[test]
    fn test_find_hits_size_limits_are_strict() {
        let mut region = RgbImage::new(300, 100);
        // Exactly 100x30: not strictly greater than the minimum
        fill(&mut region, Rect::new(20, 20, 120, 50), [90, 90, 90]);

        let seg = find_hits(&region, 100, 30);
        assert!(seg.hits.is_empty());
        assert_eq!(seg.candidates.len(), 1);
        assert!(!seg.candidates[0].kept);
    }

    #[test]
    fn test_find_hits_closes_broken_frames() {
        let mut region = RgbImage::new(300, 120);
        frame(&mut region, Rect::new(20, 20, 240, 90), [120, 120, 120]);
        // 2px gaps in the top and bottom edges split the frame in two pieces
        fill(&mut region, Rect::new(100, 20, 102, 22), [0, 0, 0]);
        fill(&mut region, Rect::new(100, 88, 102, 90), [0, 0, 0]);

        let seg = find_hits(&region, 100, 30);
        assert_eq!(seg.hits.len(), 1);
        assert_eq!(seg.hits[0].dimensions(), (220, 70));
    }

    #[test]
    fn test_find_hits_empty_region() {
        let region = RgbImage::new(120, 80);
        let seg = find_hits(&region, 10, 10);

        assert!(seg.hits.is_empty());
        assert!(seg.candidates.is_empty());
        assert_eq!(seg.mask.dimensions(), (120, 80));
    }
}
