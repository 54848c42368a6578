//! Click-driven region extraction using flood fill.
//!
//! Selects the connected region of a binary image that contains the seed and
//! shares its value (foreground or background). The fill runs on a working
//! buffer padded by one pixel on every side:
//!
//! ```text
//!   B B B B B B
//!   B . . . . B      B = barrier (padding or claimed pixel)
//!   B . B . . B      . = free image pixel
//!   B B B B B B
//! ```
//!
//! Padding cells start as barrier, so neighbor lookups never leave the
//! buffer. Pixels of an optional barrier mask (the claimed area) are marked
//! the same way, which keeps growth out of claimed territory at every step,
//! not only at the seed.

use std::collections::VecDeque;

use super::mask::BinaryMask;

/// Pixel neighborhood used while growing a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// Horizontal and vertical neighbors only. Diagonal-only contacts split
    /// regions.
    #[default]
    Four,
    /// All eight neighbors. Diagonal-only contacts join regions.
    Eight,
}

impl Connectivity {
    fn offsets(self) -> &'static [(isize, isize)] {
        const FOUR: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        const EIGHT: [(isize, isize); 8] = [
            (-1, 0),
            (1, 0),
            (0, -1),
            (0, 1),
            (-1, -1),
            (1, -1),
            (-1, 1),
            (1, 1),
        ];
        match self {
            Connectivity::Four => &FOUR,
            Connectivity::Eight => &EIGHT,
        }
    }
}

/// Flood fill result with metadata.
#[derive(Debug, Clone)]
pub struct FloodFillResult {
    /// Region mask (255 = in region), same size as the image
    pub mask: BinaryMask,
    /// Bounds of the region
    pub bounds: Option<(usize, usize, usize, usize)>, // (x, y, width, height)
    /// Number of pixels in the region
    pub pixel_count: usize,
}

impl FloodFillResult {
    fn empty(height: usize, width: usize) -> Self {
        Self {
            mask: BinaryMask::zeros(height, width),
            bounds: None,
            pixel_count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pixel_count == 0
    }
}

const FREE: u8 = 0;
const BARRIER: u8 = 1;
const FILLED: u8 = 2;

/// Fill the region containing (`seed_x`, `seed_y`).
///
/// # Arguments
/// * `binary` - Binarized image (0 / 255)
/// * `seed_x`, `seed_y` - Seed pixel
/// * `barrier` - Optional mask of pixels the fill must never enter
/// * `connectivity` - Neighborhood used for growth
///
/// # Returns
/// The filled region. Empty when the seed is out of bounds, sits on a
/// barrier pixel, or `barrier` does not match the image size.
pub fn flood_fill(
    binary: &BinaryMask,
    seed_x: usize,
    seed_y: usize,
    barrier: Option<&BinaryMask>,
    connectivity: Connectivity,
) -> FloodFillResult {
    let (height, width) = binary.dim();

    if width == 0 || height == 0 || seed_x >= width || seed_y >= height {
        return FloodFillResult::empty(height, width);
    }
    if barrier.is_some_and(|b| b.dim() != binary.dim()) {
        return FloodFillResult::empty(height, width);
    }

    // Working buffer with a one-pixel barrier frame
    let stride = width + 2;
    let mut work = vec![BARRIER; stride * (height + 2)];
    for y in 0..height {
        let row = (y + 1) * stride + 1;
        for x in 0..width {
            let blocked = barrier.is_some_and(|b| b.is_set(x, y));
            work[row + x] = if blocked { BARRIER } else { FREE };
        }
    }

    let seed = (seed_y + 1) * stride + seed_x + 1;
    if work[seed] != FREE {
        return FloodFillResult::empty(height, width);
    }

    let pixels = binary.view();
    let seed_value = pixels[[seed_y, seed_x]];
    let offsets: Vec<isize> = connectivity
        .offsets()
        .iter()
        .map(|&(dx, dy)| dy * stride as isize + dx)
        .collect();

    let mut mask = BinaryMask::zeros(height, width);
    let mut pixel_count = 0;
    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0;
    let mut max_y = 0;

    let mut queue = VecDeque::new();
    work[seed] = FILLED;
    queue.push_back(seed);

    while let Some(idx) = queue.pop_front() {
        let x = idx % stride - 1;
        let y = idx / stride - 1;

        mask.set(x, y);
        pixel_count += 1;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);

        for &off in &offsets {
            // The frame guarantees idx + off stays inside the buffer
            let nidx = (idx as isize + off) as usize;
            if work[nidx] != FREE {
                continue;
            }
            let nx = nidx % stride - 1;
            let ny = nidx / stride - 1;
            if pixels[[ny, nx]] == seed_value {
                work[nidx] = FILLED;
                queue.push_back(nidx);
            }
        }
    }

    let bounds = if pixel_count > 0 {
        Some((min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    } else {
        None
    };

    FloodFillResult {
        mask,
        bounds,
        pixel_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn binary_from_rows(rows: &[&str]) -> BinaryMask {
        let height = rows.len();
        let width = rows[0].len();
        let data: Vec<u8> = rows
            .iter()
            .flat_map(|r| r.bytes().map(|b| if b == b'#' { 255 } else { 0 }))
            .collect();
        BinaryMask::from_array(Array2::from_shape_vec((height, width), data).unwrap())
    }

    #[test]
    fn test_fills_single_blob() {
        let img = binary_from_rows(&[
            ".....", //
            ".##..", //
            ".##..", //
            ".....", //
        ]);
        let result = flood_fill(&img, 1, 1, None, Connectivity::Four);
        assert_eq!(result.pixel_count, 4);
        assert_eq!(result.bounds, Some((1, 1, 2, 2)));
        assert!(result.mask.is_set(2, 2));
        assert!(!result.mask.is_set(0, 0));
    }

    #[test]
    fn test_background_seed_fills_background() {
        let img = binary_from_rows(&[
            "...", //
            ".#.", //
            "...", //
        ]);
        let result = flood_fill(&img, 0, 0, None, Connectivity::Four);
        assert_eq!(result.pixel_count, 8);
        assert!(!result.mask.is_set(1, 1));
    }

    #[test]
    fn test_diagonal_contact_depends_on_connectivity() {
        let img = binary_from_rows(&[
            "#..", //
            ".#.", //
            "..#", //
        ]);
        let four = flood_fill(&img, 0, 0, None, Connectivity::Four);
        assert_eq!(four.pixel_count, 1);
        let eight = flood_fill(&img, 0, 0, None, Connectivity::Eight);
        assert_eq!(eight.pixel_count, 3);
    }

    #[test]
    fn test_region_touching_image_edge() {
        let img = binary_from_rows(&[
            "##", //
            "##", //
        ]);
        let result = flood_fill(&img, 1, 1, None, Connectivity::Eight);
        assert_eq!(result.pixel_count, 4);
        assert_eq!(result.bounds, Some((0, 0, 2, 2)));
    }

    #[test]
    fn test_barrier_blocks_growth_mid_fill() {
        // One long bar; the claimed pixel in the middle splits it
        let img = binary_from_rows(&["#####"]);
        let mut claimed = BinaryMask::zeros(1, 5);
        claimed.set(2, 0);
        let result = flood_fill(&img, 0, 0, Some(&claimed), Connectivity::Four);
        assert_eq!(result.pixel_count, 2);
        assert!(!result.mask.is_set(2, 0));
        assert!(!result.mask.is_set(3, 0));
    }

    #[test]
    fn test_seed_on_barrier_is_empty() {
        let img = binary_from_rows(&["##"]);
        let mut claimed = BinaryMask::zeros(1, 2);
        claimed.set(0, 0);
        let result = flood_fill(&img, 0, 0, Some(&claimed), Connectivity::Four);
        assert!(result.is_empty());
        assert_eq!(result.bounds, None);
    }

    #[test]
    fn test_out_of_bounds_seed_is_empty() {
        let img = binary_from_rows(&["##"]);
        assert!(flood_fill(&img, 2, 0, None, Connectivity::Four).is_empty());
        assert!(flood_fill(&img, 0, 1, None, Connectivity::Four).is_empty());
    }
}
