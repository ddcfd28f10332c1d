//! Side-by-side pair geometry: split, pad, center crop.

use crate::types::{DatasetResult, PairDatasetError};
use image::{Rgb, RgbImage};
use std::path::Path;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Per-side padding in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Padding {
    /// Padding that brings a `width` x `height` half up to at least `size` on both axes.
    ///
    /// The trailing side always carries one extra pixel, so the result can overshoot
    /// `size` by one; the center crop removes it.
    pub fn to_reach(width: u32, height: u32, size: u32) -> Self {
        let wp = size.saturating_sub(width);
        let hp = size.saturating_sub(height);
        Padding {
            left: wp / 2,
            top: hp / 2,
            right: wp / 2 + 1,
            bottom: hp / 2 + 1,
        }
    }
}

/// Split a side-by-side pair at `width / 2` into (left, right).
///
/// For odd widths the right half keeps the extra column.
pub fn split_pair(img: &RgbImage, path: &Path) -> DatasetResult<(RgbImage, RgbImage)> {
    let (width, height) = img.dimensions();
    if width < 2 || height == 0 {
        return Err(PairDatasetError::PairLayout {
            path: path.to_path_buf(),
            width,
            height,
        });
    }
    let half = width / 2;
    let left = image::imageops::crop_imm(img, 0, 0, half, height).to_image();
    let right = image::imageops::crop_imm(img, half, 0, width - half, height).to_image();
    Ok((left, right))
}

pub fn pad(img: &RgbImage, padding: Padding, fill: Rgb<u8>) -> RgbImage {
    let (w, h) = img.dimensions();
    let mut canvas = RgbImage::from_pixel(
        w + padding.left + padding.right,
        h + padding.top + padding.bottom,
        fill,
    );
    image::imageops::replace(&mut canvas, img, padding.left.into(), padding.top.into());
    canvas
}

/// Crop a `size` x `size` window from the middle of `img`.
///
/// Offsets round half to even, so a 1px surplus is trimmed from the trailing side.
/// Areas outside the source come out white.
pub fn center_crop(img: &RgbImage, size: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    let x0 = crop_offset(w, size);
    let y0 = crop_offset(h, size);
    let mut canvas = RgbImage::from_pixel(size, size, WHITE);
    image::imageops::replace(&mut canvas, img, -x0, -y0);
    canvas
}

fn crop_offset(extent: u32, size: u32) -> i64 {
    ((extent as f64 - size as f64) / 2.0).round_ties_even() as i64
}

/// White-pad to at least `size`, then center crop to exactly `size` x `size`.
pub fn pad_and_center_crop(img: &RgbImage, size: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    let padded = pad(img, Padding::to_reach(w, h, size), WHITE);
    center_crop(&padded, size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn padding_biases_trailing_side() {
        assert_eq!(
            Padding::to_reach(300, 509, 512),
            Padding {
                left: 106,
                top: 1,
                right: 107,
                bottom: 2
            }
        );
        // Already large enough: only the one-pixel bias remains.
        assert_eq!(
            Padding::to_reach(600, 700, 512),
            Padding {
                left: 0,
                top: 0,
                right: 1,
                bottom: 1
            }
        );
    }

    #[test]
    fn split_keeps_extra_column_on_the_right() {
        let img = RgbImage::new(5, 2);
        let (left, right) = split_pair(&img, &PathBuf::from("x.png")).unwrap();
        assert_eq!(left.dimensions(), (2, 2));
        assert_eq!(right.dimensions(), (3, 2));
    }

    #[test]
    fn split_rejects_degenerate_width() {
        let img = RgbImage::new(1, 4);
        let err = split_pair(&img, &PathBuf::from("thin.png")).unwrap_err();
        assert!(matches!(err, PairDatasetError::PairLayout { width: 1, .. }));
    }

    #[test]
    fn small_half_is_centered_on_white() {
        let img = RgbImage::from_pixel(2, 2, Rgb([0, 0, 0]));
        let out = pad_and_center_crop(&img, 6);
        assert_eq!(out.dimensions(), (6, 6));
        // pad 2/3 on each axis -> 7x7, crop offset round(0.5) = 0.
        assert_eq!(*out.get_pixel(0, 0), WHITE);
        assert_eq!(*out.get_pixel(2, 2), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(3, 3), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(4, 4), WHITE);
    }

    #[test]
    fn large_half_is_cropped_from_the_middle() {
        let img = RgbImage::from_fn(10, 10, |x, y| Rgb([x as u8, y as u8, 0]));
        let out = pad_and_center_crop(&img, 4);
        assert_eq!(out.dimensions(), (4, 4));
        // padded to 11x11, offset round(3.5) = 4
        assert_eq!(*out.get_pixel(0, 0), Rgb([4, 4, 0]));
        assert_eq!(*out.get_pixel(3, 3), Rgb([7, 7, 0]));
    }

    #[test]
    fn crop_offset_rounds_half_to_even() {
        assert_eq!(crop_offset(7, 6), 0);
        assert_eq!(crop_offset(9, 6), 2);
        assert_eq!(crop_offset(11, 6), 2);
        assert_eq!(crop_offset(13, 6), 4);
    }
}
