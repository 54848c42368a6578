//! WebAssembly exports for the stateless core operations.
//!
//! Images and masks cross the boundary as flat row-major byte arrays of
//! length `width * height`.

use ndarray::Array2;
use wasm_bindgen::prelude::*;

use crate::preprocess::{preprocess, Parameters};
use crate::selection::{flood_fill, BinaryMask, Connectivity};

fn to_array(data: &[u8], width: usize, height: usize) -> Result<Array2<u8>, JsError> {
    Array2::from_shape_vec((height, width), data.to_vec())
        .map_err(|_| JsError::new("data length does not match width * height"))
}

// ============================================================================
// Preprocessing
// ============================================================================

/// Blur and binarize a grayscale image.
///
/// # Arguments
/// * `data` - Flat grayscale bytes (length = width * height)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `threshold` - Pixels >= threshold become 255
/// * `blur_radius` - Gaussian kernel is 2r+1 taps (1-21)
///
/// # Returns
/// Flat binary image (0 / 255)
#[wasm_bindgen]
pub fn preprocess_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    threshold: u8,
    blur_radius: u8,
) -> Result<Vec<u8>, JsError> {
    let image = to_array(data, width, height)?;
    let params = Parameters::new(threshold as i64, blur_radius as i64)
        .map_err(|e| JsError::new(&e.to_string()))?;
    Ok(preprocess(image.view(), &params)
        .into_array()
        .into_raw_vec_and_offset()
        .0)
}

// ============================================================================
// Selection
// ============================================================================

/// Flood-fill the region under (x, y).
///
/// # Arguments
/// * `binary` - Flat binary image
/// * `claimed` - Flat mask of pixels the fill must not enter; empty for none
/// * `eight_connected` - Use 8-neighborhood instead of 4
///
/// # Returns
/// Flat region mask (0 / 255)
#[wasm_bindgen]
pub fn flood_select_wasm(
    binary: &[u8],
    claimed: &[u8],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    eight_connected: bool,
) -> Result<Vec<u8>, JsError> {
    let binary = BinaryMask::from_array(to_array(binary, width, height)?);
    let claimed = if claimed.is_empty() {
        None
    } else {
        Some(BinaryMask::from_array(to_array(claimed, width, height)?))
    };
    let connectivity = if eight_connected {
        Connectivity::Eight
    } else {
        Connectivity::Four
    };

    let result = flood_fill(&binary, x, y, claimed.as_ref(), connectivity);
    Ok(result.mask.into_array().into_raw_vec_and_offset().0)
}
