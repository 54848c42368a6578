//! Binary masks (255 = claimed, 0 = free).

use ndarray::{Array2, ArrayView2};

use crate::error::{AnalysisError, Result};

/// Value stored in claimed cells.
pub const CLAIMED: u8 = 255;

/// A 2D grid where each cell is either claimed (255) or free (0).
///
/// Used for binarized images, single particles, the per-round session mask
/// and the cumulative claimed-area mask. Cells hold only 0 or 255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    data: Array2<u8>,
}

impl BinaryMask {
    /// Empty mask with shape (height, width).
    pub fn zeros(height: usize, width: usize) -> Self {
        Self {
            data: Array2::zeros((height, width)),
        }
    }

    /// Build a mask from any u8 array; nonzero cells become claimed.
    pub fn from_array(data: Array2<u8>) -> Self {
        let mut data = data;
        data.mapv_inplace(|v| if v > 0 { CLAIMED } else { 0 });
        Self { data }
    }

    /// (height, width)
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn view(&self) -> ArrayView2<'_, u8> {
        self.data.view()
    }

    pub fn into_array(self) -> Array2<u8> {
        self.data
    }

    /// Raw cell value at (x, y), `None` outside the mask.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.data.get([y, x]).copied()
    }

    /// Whether (x, y) is claimed. Out-of-bounds cells are free.
    #[inline]
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_some_and(|v| v > 0)
    }

    /// Mark (x, y) as claimed. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize) {
        if let Some(cell) = self.data.get_mut([y, x]) {
            *cell = CLAIMED;
        }
    }

    /// Number of claimed cells.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&v| v == 0)
    }

    fn check_dim(&self, other: &BinaryMask) -> Result<()> {
        if self.dim() != other.dim() {
            return Err(AnalysisError::DimensionMismatch {
                expected: self.dim(),
                actual: other.dim(),
            });
        }
        Ok(())
    }

    /// Whether any cell is claimed in both masks.
    pub fn intersects(&self, other: &BinaryMask) -> Result<bool> {
        self.check_dim(other)?;
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .any(|(&a, &b)| a > 0 && b > 0))
    }

    /// OR `other` into this mask in place.
    pub fn union_with(&mut self, other: &BinaryMask) -> Result<()> {
        self.check_dim(other)?;
        self.data.zip_mut_with(&other.data, |a, &b| *a |= b);
        Ok(())
    }

    /// New mask holding the OR of both masks.
    pub fn union(&self, other: &BinaryMask) -> Result<BinaryMask> {
        let mut out = self.clone();
        out.union_with(other)?;
        Ok(out)
    }
}
