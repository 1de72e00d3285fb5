use image::{GrayImage, ImageBuffer, Luma, Pixel, RgbImage};

use crate::profile::Rect;

/// Converts an RGB image to single-channel intensity.
pub fn to_gray(img: &RgbImage) -> GrayImage {
    image::imageops::grayscale(img)
}

/// Fixed-level binarization.
///
/// Pixels brighter than `cutoff` become 255, everything else becomes 0.
pub fn threshold_binary(img: &GrayImage, cutoff: u8) -> GrayImage {
    let (width, height) = img.dimensions();
    let mut output = GrayImage::new(width, height);

    for (x, y, pixel) in img.enumerate_pixels() {
        let value = if pixel[0] > cutoff { 255u8 } else { 0u8 };
        output.put_pixel(x, y, Luma([value]));
    }

    output
}

/// Returns a copy with every pixel inverted (255 - value).
pub fn invert(img: &GrayImage) -> GrayImage {
    let mut output = img.clone();
    image::imageops::invert(&mut output);
    output
}

/// Finds the bounding box of all pixels whose brightest channel exceeds
/// `threshold`.
///
/// The box is in (x = column, y = row) coordinates with exclusive ends.
/// An image with no such pixel yields the 1x1 box at the origin.
pub fn content_bounds<P>(img: &ImageBuffer<P, Vec<u8>>, threshold: u8) -> Rect
where
    P: Pixel<Subpixel = u8>,
{
    let mut bounds: Option<Rect> = None;

    for (x, y, pixel) in img.enumerate_pixels() {
        let level = pixel.channels().iter().copied().max().unwrap_or(0);
        if level <= threshold {
            continue;
        }

        bounds = Some(match bounds {
            None => Rect::new(x, y, x + 1, y + 1),
            Some(b) => Rect::new(
                b.x_start.min(x),
                b.y_start.min(y),
                b.x_end.max(x + 1),
                b.y_end.max(y + 1),
            ),
        });
    }

    bounds.unwrap_or(Rect::new(0, 0, 1, 1))
}

/// Crops an image to its non-background content (see [`content_bounds`]).
pub fn auto_crop<P>(img: &ImageBuffer<P, Vec<u8>>, threshold: u8) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let b = content_bounds(img, threshold);
    image::imageops::crop_imm(img, b.x_start, b.y_start, b.width(), b.height()).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_threshold_binary() {
        let mut img = GrayImage::new(3, 1);
        img.put_pixel(0, 0, Luma([15]));
        img.put_pixel(1, 0, Luma([16]));
        img.put_pixel(2, 0, Luma([250]));

        let mask = threshold_binary(&img, 15);

        assert_eq!(mask.get_pixel(0, 0)[0], 0, "Equal to cutoff stays background");
        assert_eq!(mask.get_pixel(1, 0)[0], 255);
        assert_eq!(mask.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_invert() {
        let img = GrayImage::from_raw(2, 1, vec![0, 200]).unwrap();
        let inverted = invert(&img);
        assert_eq!(inverted.as_raw(), &vec![255, 55]);
    }

    #[test]
    fn test_content_bounds_blank_image() {
        let img = GrayImage::new(40, 20);
        assert_eq!(content_bounds(&img, 0), Rect::new(0, 0, 1, 1));
    }

    #[test]
    fn test_content_bounds_single_pixel() {
        // Pixel at row 7, column 12
        let mut img = GrayImage::new(40, 20);
        img.put_pixel(12, 7, Luma([255]));

        let b = content_bounds(&img, 0);
        assert_eq!(b, Rect::new(12, 7, 13, 8));
        assert_eq!((b.width(), b.height()), (1, 1));
    }

    #[test]
    fn test_content_bounds_uses_brightest_channel() {
        let mut img = RgbImage::new(10, 10);
        img.put_pixel(2, 3, Rgb([0, 0, 90]));
        img.put_pixel(6, 8, Rgb([50, 10, 10]));

        // Only the blue pixel exceeds 60 on any channel
        assert_eq!(content_bounds(&img, 60), Rect::new(2, 3, 3, 4));
        assert_eq!(content_bounds(&img, 0), Rect::new(2, 3, 7, 9));
    }

    #[test]
    fn test_auto_crop() {
        let mut img = GrayImage::new(30, 10);
        for x in 5..9 {
            img.put_pixel(x, 2, Luma([200]));
            img.put_pixel(x, 4, Luma([200]));
        }

        let cropped = auto_crop(&img, 0);
        assert_eq!(cropped.dimensions(), (4, 3));
        assert_eq!(cropped.get_pixel(0, 0)[0], 200);
        assert_eq!(cropped.get_pixel(0, 1)[0], 0);
    }
}
