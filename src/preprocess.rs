//! Preprocessing parameters and the blur → threshold pipeline.

use ndarray::ArrayView2;

use crate::error::{AnalysisError, Result};
use crate::filters::{gaussian_blur_gray, threshold_gray, BorderMode};
use crate::selection::{BinaryMask, Connectivity};

pub const MIN_BLUR_RADIUS: u8 = 1;
pub const MAX_BLUR_RADIUS: u8 = 21;
pub const DEFAULT_THRESHOLD: u8 = 128;
pub const DEFAULT_BLUR_RADIUS: u8 = 5;

/// User-tunable analysis parameters.
///
/// Threshold and blur radius drive the preprocessor; border mode and
/// connectivity are fixed conventions chosen once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameters {
    threshold: u8,
    blur_radius: u8,
    pub border: BorderMode,
    pub connectivity: Connectivity,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            blur_radius: DEFAULT_BLUR_RADIUS,
            border: BorderMode::default(),
            connectivity: Connectivity::default(),
        }
    }
}

impl Parameters {
    /// Validated parameters with default border mode and connectivity.
    pub fn new(threshold: i64, blur_radius: i64) -> Result<Self> {
        let mut params = Self::default();
        params.set_threshold(threshold)?;
        params.set_blur_radius(blur_radius)?;
        Ok(params)
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn blur_radius(&self) -> u8 {
        self.blur_radius
    }

    /// Gaussian kernel size, always odd.
    pub fn kernel_size(&self) -> usize {
        2 * self.blur_radius as usize + 1
    }

    pub fn set_threshold(&mut self, value: i64) -> Result<()> {
        self.threshold = check_range("threshold", value, 0, 255)?;
        Ok(())
    }

    pub fn set_blur_radius(&mut self, value: i64) -> Result<()> {
        self.blur_radius = check_range(
            "blur radius",
            value,
            MIN_BLUR_RADIUS as i64,
            MAX_BLUR_RADIUS as i64,
        )?;
        Ok(())
    }
}

fn check_range(name: &'static str, value: i64, min: i64, max: i64) -> Result<u8> {
    if value < min || value > max {
        return Err(AnalysisError::InvalidParameter {
            name,
            value,
            min,
            max,
        });
    }
    Ok(value as u8)
}

/// Blur then binarize a grayscale image.
///
/// Pure function of (image, threshold, blur radius, border mode): repeated
/// calls yield bit-identical masks.
pub fn preprocess(image: ArrayView2<u8>, params: &Parameters) -> BinaryMask {
    let blurred = gaussian_blur_gray(image, params.kernel_size(), params.border);
    BinaryMask::from_array(threshold_gray(blurred.view(), params.threshold))
}
