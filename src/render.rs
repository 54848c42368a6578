//! Overlay preview: binary image with claimed and session masks tinted.

use image::{Rgb, RgbImage};

use crate::selection::BinaryMask;

/// Tint for committed particles.
pub const CLAIMED_TINT: [u8; 3] = [255, 170, 0];
/// Tint for particles picked in the active round.
pub const SESSION_TINT: [u8; 3] = [255, 0, 255];

const CLAIMED_ALPHA: f32 = 0.5;
const SESSION_ALPHA: f32 = 0.3;

/// Blend `src` over `dst` with constant opacity.
#[inline]
fn blend_over(dst: &mut [u8; 3], src: [u8; 3], alpha: f32) {
    if alpha <= 0.0 {
        return;
    }
    if alpha >= 1.0 {
        *dst = src;
        return;
    }
    for c in 0..3 {
        let v = src[c] as f32 * alpha + dst[c] as f32 * (1.0 - alpha);
        dst[c] = v.round().clamp(0.0, 255.0) as u8;
    }
}

/// Compose the preview image.
///
/// Claimed pixels are tinted at 50% opacity, session pixels at 30% on top.
/// Masks whose size differs from `binary` are skipped.
pub fn compose_overlay(
    binary: &BinaryMask,
    claimed: Option<&BinaryMask>,
    session: Option<&BinaryMask>,
) -> RgbImage {
    let (height, width) = binary.dim();
    let claimed = claimed.filter(|m| m.dim() == binary.dim());
    let session = session.filter(|m| m.dim() == binary.dim());

    RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let v = if binary.is_set(x, y) { 255 } else { 0 };
        let mut px = [v, v, v];
        if claimed.is_some_and(|m| m.is_set(x, y)) {
            blend_over(&mut px, CLAIMED_TINT, CLAIMED_ALPHA);
        }
        if session.is_some_and(|m| m.is_set(x, y)) {
            blend_over(&mut px, SESSION_TINT, SESSION_ALPHA);
        }
        Rgb(px)
    })
}
