//! Core utilities shared by the preprocessing filters.
//!
//! - Gaussian kernel generation from an odd kernel size
//! - Border index mapping for convolution

/// How samples outside the image are produced during convolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    /// Outside samples read as 0.
    #[default]
    Zero,
    /// Mirror around the edge pixel without repeating it (`dcb|abcd|cba`).
    Reflect101,
}

impl BorderMode {
    /// Map a possibly out-of-range index onto `0..len`.
    ///
    /// Returns `None` when the sample should read as zero.
    #[inline]
    pub fn map_index(self, i: isize, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        if i >= 0 && (i as usize) < len {
            return Some(i as usize);
        }
        match self {
            BorderMode::Zero => None,
            BorderMode::Reflect101 => {
                if len == 1 {
                    return Some(0);
                }
                let period = (2 * len - 2) as isize;
                let r = i.rem_euclid(period) as usize;
                if r < len {
                    Some(r)
                } else {
                    Some(2 * len - 2 - r)
                }
            }
        }
    }
}

/// Sigma used for a kernel of `ksize` taps when none is given explicitly.
///
/// Same rule as OpenCV's `getGaussianKernel` with `sigma <= 0`.
pub fn sigma_for_kernel_size(ksize: usize) -> f64 {
    0.3 * ((ksize as f64 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Generate a normalized 1D Gaussian kernel with `ksize` taps.
///
/// Sizes 1, 3, 5 and 7 use the fixed binomial-like tables, larger sizes are
/// sampled from the Gaussian with [`sigma_for_kernel_size`]. `ksize` must be
/// odd; an even size is bumped to the next odd value.
pub fn gaussian_kernel_1d(ksize: usize) -> Vec<f32> {
    let ksize = ksize | 1;

    match ksize {
        1 => return vec![1.0],
        3 => return vec![0.25, 0.5, 0.25],
        5 => return vec![0.0625, 0.25, 0.375, 0.25, 0.0625],
        7 => {
            return vec![
                0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125,
            ]
        }
        _ => {}
    }

    let sigma = sigma_for_kernel_size(ksize);
    let half = (ksize / 2) as f64;
    let scale = -0.5 / (sigma * sigma);

    let raw: Vec<f64> = (0..ksize)
        .map(|i| {
            let x = i as f64 - half;
            (scale * x * x).exp()
        })
        .collect();

    // Normalize
    let sum: f64 = raw.iter().sum();
    raw.into_iter().map(|v| (v / sum) as f32).collect()
}
