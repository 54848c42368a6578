//! Basic pixel-wise operations.

use ndarray::{Array2, ArrayView2};

/// Apply binary threshold to grayscale image.
///
/// # Arguments
/// * `image` - 2D grayscale image (u8)
/// * `threshold` - Threshold value (0-255)
///
/// # Returns
/// Binary image where pixels >= threshold become 255, others become 0
pub fn threshold_gray(image: ArrayView2<u8>, threshold: u8) -> Array2<u8> {
    image.mapv(|v| if v >= threshold { 255 } else { 0 })
}

/// Count pixels set in a binary image.
pub fn count_foreground(binary: ArrayView2<u8>) -> usize {
    binary.iter().filter(|&&v| v > 0).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_inclusive() {
        let img = Array2::from_shape_vec((1, 3), vec![127u8, 128, 129]).unwrap();
        let out = threshold_gray(img.view(), 128);
        assert_eq!(out.as_slice().unwrap(), &[0, 255, 255]);
    }

    #[test]
    fn test_threshold_zero_selects_everything() {
        let img = Array2::from_shape_vec((2, 2), vec![0u8, 10, 20, 30]).unwrap();
        let out = threshold_gray(img.view(), 0);
        assert_eq!(count_foreground(out.view()), 4);
    }

    #[test]
    fn test_monotonic_in_threshold() {
        let img = Array2::from_shape_fn((16, 16), |(y, x)| ((x * 16 + y) % 256) as u8);
        let mut previous = usize::MAX;
        for t in 0..=255u8 {
            let count = count_foreground(threshold_gray(img.view(), t).view());
            assert!(count <= previous, "threshold {t} increased foreground");
            previous = count;
        }
    }
}
