//! Filter modules for micrograph preprocessing.
//!
//! All filters operate on single-channel 8-bit images stored as
//! `ndarray::Array2<u8>` indexed `[[y, x]]`.
//!
//! - **core**: Gaussian kernel generation, border handling
//! - **blur**: separable Gaussian blur, parallelized with rayon
//! - **basic**: binary threshold

pub mod basic;
pub mod blur;
pub mod core;

pub use basic::{count_foreground, threshold_gray};
pub use blur::gaussian_blur_gray;
pub use self::core::BorderMode;
