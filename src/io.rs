//! Image loading and conversion between `image` buffers and ndarray.

use std::path::Path;

use image::{DynamicImage, GrayImage};
use log::info;
use ndarray::{Array2, ArrayView2};

use crate::error::{AnalysisError, Result};

/// Decode an image file (JPEG, PNG, TIFF) and convert it to 8-bit grayscale.
pub fn load_grayscale(path: &Path) -> Result<Array2<u8>> {
    let decoded = image::open(path)
        .map_err(|e| match e {
            image::ImageError::IoError(source) => AnalysisError::Io {
                path: path.display().to_string(),
                source,
            },
            other => AnalysisError::Image(other),
        })?;
    let luma = to_gray(decoded);
    info!(
        "loaded {} ({}x{})",
        path.display(),
        luma.width(),
        luma.height()
    );
    Ok(gray_to_array(luma))
}

/// Reduce a decoded image to 8-bit gray.
///
/// Colour images are weighted `0.299 R + 0.587 G + 0.114 B` (BT.601, 14-bit
/// fixed point, rounded), matching OpenCV's grayscale decode. Alpha is
/// dropped. Gray inputs keep their values.
pub fn to_gray(decoded: DynamicImage) -> GrayImage {
    match decoded {
        DynamicImage::ImageLuma8(gray) => gray,
        color if color.color().has_color() => {
            let rgb = color.to_rgb8();
            GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                let [r, g, b] = rgb.get_pixel(x, y).0;
                image::Luma([bt601_luma(r, g, b)])
            })
        }
        gray => gray.to_luma8(),
    }
}

#[inline]
fn bt601_luma(r: u8, g: u8, b: u8) -> u8 {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    ((r as u32 * R + g as u32 * G + b as u32 * B + (1 << 13)) >> 14) as u8
}

/// Convert a `GrayImage` into an (height, width) array.
pub fn gray_to_array(image: GrayImage) -> Array2<u8> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let raw = image.into_raw();
    Array2::from_shape_vec((height, width), raw).expect("luma buffer matches its dimensions")
}

/// Convert an (height, width) array into a `GrayImage`.
pub fn array_to_gray(data: ArrayView2<u8>) -> GrayImage {
    let (height, width) = data.dim();
    GrayImage::from_fn(width as u32, height as u32, |x, y| {
        image::Luma([data[[y as usize, x as usize]]])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_png() {
        let data = Array2::from_shape_fn((5, 7), |(y, x)| (x * 30 + y) as u8);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.png");
        array_to_gray(data.view()).save(&path).unwrap();

        let loaded = load_grayscale(&path).unwrap();
        assert_eq!(loaded, data);
    }

    #[test]
    fn test_color_png_uses_bt601_weights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        image::RgbImage::from_pixel(2, 2, image::Rgb([255, 0, 0]))
            .save(&path)
            .unwrap();

        let loaded = load_grayscale(&path).unwrap();
        assert!(loaded.iter().all(|&v| v == 76));
    }

    #[test]
    fn test_bt601_channels() {
        assert_eq!(bt601_luma(255, 0, 0), 76);
        assert_eq!(bt601_luma(0, 255, 0), 150);
        assert_eq!(bt601_luma(0, 0, 255), 29);
        assert_eq!(bt601_luma(255, 255, 255), 255);
        assert_eq!(bt601_luma(0, 0, 0), 0);
    }

    #[test]
    fn test_rgba_alpha_is_ignored() {
        let img = image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 255, 0, 10]));
        let gray = to_gray(DynamicImage::ImageRgba8(img));
        assert_eq!(gray.get_pixel(0, 0).0, [150]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_grayscale(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }

    #[test]
    fn test_array_layout() {
        let img = GrayImage::from_fn(3, 2, |x, y| image::Luma([(y * 10 + x) as u8]));
        let arr = gray_to_array(img);
        assert_eq!(arr.dim(), (2, 3));
        assert_eq!(arr[[1, 2]], 12);
    }
}
