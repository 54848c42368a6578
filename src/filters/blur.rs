//! Gaussian blur for single-channel 8-bit images.
//!
//! Separable 2-pass convolution in f32, parallelized per row with Rayon.
//! Every output pixel is computed independently with a fixed summation
//! order, so results do not depend on the thread count.

use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;

use super::core::{gaussian_kernel_1d, BorderMode};

/// Apply Gaussian blur to a grayscale image.
///
/// # Arguments
/// * `input` - Grayscale image (height, width)
/// * `ksize` - Kernel size in taps (odd; `2 * radius + 1`)
/// * `border` - How samples outside the image are read
///
/// # Returns
/// Blurred image with same dimensions, rounded to nearest
pub fn gaussian_blur_gray(input: ArrayView2<u8>, ksize: usize, border: BorderMode) -> Array2<u8> {
    let (height, width) = input.dim();
    if height == 0 || width == 0 || ksize <= 1 {
        return input.to_owned();
    }

    let kernel = gaussian_kernel_1d(ksize);
    let half = (kernel.len() / 2) as isize;

    // Row-major f32 copy so every row is a contiguous slice
    let src: Vec<f32> = input.iter().map(|&v| v as f32).collect();

    // Horizontal pass
    let mut temp = vec![0.0f32; height * width];
    temp.par_chunks_mut(width)
        .zip(src.par_chunks(width))
        .for_each(|(out, row)| convolve_row(row, out, &kernel, border));

    // Vertical pass: each tap adds one weighted source row
    let mut output = vec![0u8; height * width];
    output.par_chunks_mut(width).enumerate().for_each_init(
        || vec![0.0f32; width],
        |acc, (y, out)| {
            acc.fill(0.0);
            for (ki, &kv) in kernel.iter().enumerate() {
                let sy = y as isize + ki as isize - half;
                if let Some(sy) = border.map_index(sy, height) {
                    let row = &temp[sy * width..(sy + 1) * width];
                    for (a, &v) in acc.iter_mut().zip(row) {
                        *a += v * kv;
                    }
                }
            }
            for (o, &a) in out.iter_mut().zip(acc.iter()) {
                *o = a.round().clamp(0.0, 255.0) as u8;
            }
        },
    );

    Array2::from_shape_vec((height, width), output).expect("row chunks cover the image")
}

/// Convolve one row. Taps that stay inside the row skip border mapping.
#[inline]
fn convolve_row(row: &[f32], out: &mut [f32], kernel: &[f32], border: BorderMode) {
    let width = row.len();
    let half = kernel.len() / 2;

    for (x, o) in out.iter_mut().enumerate() {
        *o = if x >= half && x + half < width {
            row[x - half..=x + half]
                .iter()
                .zip(kernel)
                .fold(0.0f32, |sum, (&v, &kv)| sum + v * kv)
        } else {
            let mut sum = 0.0f32;
            for (ki, &kv) in kernel.iter().enumerate() {
                let sx = x as isize + ki as isize - half as isize;
                if let Some(sx) = border.map_index(sx, width) {
                    sum += row[sx] * kv;
                }
            }
            sum
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_image_unchanged_with_reflect() {
        let img = Array2::<u8>::from_elem((8, 6), 200);
        let out = gaussian_blur_gray(img.view(), 5, BorderMode::Reflect101);
        assert!(out.iter().all(|&v| v == 200));
    }

    #[test]
    fn test_zero_border_darkens_edges() {
        let img = Array2::<u8>::from_elem((9, 9), 200);
        let out = gaussian_blur_gray(img.view(), 5, BorderMode::Zero);
        // Interior is far enough from the border to stay intact
        assert_eq!(out[[4, 4]], 200);
        assert!(out[[0, 0]] < 200);
        assert!(out[[0, 4]] < 200);
    }

    #[test]
    fn test_single_pixel_spreads_symmetrically() {
        let mut img = Array2::<u8>::zeros((7, 7));
        img[[3, 3]] = 255;
        let out = gaussian_blur_gray(img.view(), 3, BorderMode::Zero);
        // 3-tap kernel [0.25, 0.5, 0.25]: centre weight 0.25
        assert_eq!(out[[3, 3]], 64);
        assert_eq!(out[[2, 3]], out[[4, 3]]);
        assert_eq!(out[[3, 2]], out[[3, 4]]);
        assert_eq!(out[[2, 2]], out[[4, 4]]);
        assert_eq!(out[[0, 0]], 0);
    }

    #[test]
    fn test_deterministic() {
        let img = Array2::from_shape_fn((31, 17), |(y, x)| ((x * 37 + y * 11) % 256) as u8);
        let a = gaussian_blur_gray(img.view(), 11, BorderMode::Zero);
        let b = gaussian_blur_gray(img.view(), 11, BorderMode::Zero);
        assert_eq!(a, b);
    }

    /// Tap-by-tap convolution with border mapping on every sample.
    fn blur_reference(input: &Array2<u8>, ksize: usize, border: BorderMode) -> Array2<u8> {
        let (height, width) = input.dim();
        let kernel = gaussian_kernel_1d(ksize);
        let half = (kernel.len() / 2) as isize;
        let mut temp = Array2::<f32>::zeros((height, width));
        for ((y, x), t) in temp.indexed_iter_mut() {
            for (ki, &kv) in kernel.iter().enumerate() {
                if let Some(sx) = border.map_index(x as isize + ki as isize - half, width) {
                    *t += input[[y, sx]] as f32 * kv;
                }
            }
        }
        Array2::from_shape_fn((height, width), |(y, x)| {
            let mut sum = 0.0f32;
            for (ki, &kv) in kernel.iter().enumerate() {
                if let Some(sy) = border.map_index(y as isize + ki as isize - half, height) {
                    sum += temp[[sy, x]] * kv;
                }
            }
            sum.round().clamp(0.0, 255.0) as u8
        })
    }

    #[test]
    fn test_interior_fast_path_matches_reference() {
        let img = Array2::from_shape_fn((40, 53), |(y, x)| ((x * 73 + y * 29 + x * y) % 256) as u8);
        for border in [BorderMode::Zero, BorderMode::Reflect101] {
            for ksize in [3, 11, 43] {
                let fast = gaussian_blur_gray(img.view(), ksize, border);
                assert_eq!(fast, blur_reference(&img, ksize, border), "{border:?} k={ksize}");
            }
        }
    }

    #[test]
    fn test_kernel_wider_than_image() {
        let img = Array2::from_shape_fn((4, 5), |(y, x)| (x * 40 + y * 10) as u8);
        let out = gaussian_blur_gray(img.view(), 11, BorderMode::Reflect101);
        assert_eq!(out, blur_reference(&img, 11, BorderMode::Reflect101));
    }

    #[test]
    fn test_non_standard_layout_input() {
        let img = Array2::from_shape_fn((9, 12), |(y, x)| ((x * 17 + y * 5) % 256) as u8);
        let transposed = img.t();
        let out = gaussian_blur_gray(transposed, 5, BorderMode::Zero);
        assert_eq!(out, blur_reference(&transposed.to_owned(), 5, BorderMode::Zero));
    }

    #[test]
    fn test_empty_image() {
        let img = Array2::<u8>::zeros((0, 4));
        let out = gaussian_blur_gray(img.view(), 5, BorderMode::Zero);
        assert_eq!(out.dim(), (0, 4));
    }
}
