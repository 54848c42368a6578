//! Particle Sizer
//!
//! Interactive particle sizing for grayscale micrographs: blur and threshold
//! an image, pick particles by clicking (flood fill), and measure their
//! equivalent circular diameters.
//!
//! ## Pipeline
//! 1. **Preprocess** ([`preprocess`]): Gaussian blur (kernel `2r+1`), then
//!    binary threshold (`pixel >= t` → 255).
//! 2. **Select** ([`session`]): rounds of clicks; each click flood-fills the
//!    region under the cursor, rejects overlaps, and adds it to the round.
//!    Committing a round makes its particles permanent.
//! 3. **Measure** ([`metrics`]): area in pixels and diameter
//!    `2 * sqrt(area / π)`, with mean / population std / min / max.
//! 4. **Export** ([`export`]): CSV `No.,Area(px),Diameter(px)`.
//!
//! ## Image Format
//! Images and masks are `ndarray::Array2<u8>` indexed `[[y, x]]`. Masks hold
//! 0 (free) or 255 (claimed).
//!
//! ## Front Ends
//! - [`controller::Controller`] dispatches explicit [`controller::Event`]s and
//!   returns [`error::Outcome`]s.
//! - The `particle-sizer` binary drives the controller from an event script.
//! - Python bindings (`python` feature) and WASM bindings (`wasm` feature)
//!   expose the stateless operations.

pub mod cli;
pub mod controller;
pub mod error;
pub mod export;
pub mod filters;
pub mod io;
pub mod metrics;
pub mod preprocess;
pub mod render;
pub mod selection;
pub mod session;
pub mod viewport;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use controller::{Controller, Event, ParameterChange};
pub use error::{AnalysisError, Outcome, Rejection, Result};
pub use metrics::{equivalent_diameter, Report};
pub use preprocess::Parameters;
pub use selection::{BinaryMask, Connectivity};
pub use session::{AnalysisSession, Particle};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::metrics::analyze_areas;
    use crate::preprocess::{preprocess, Parameters};
    use crate::selection::{flood_fill, BinaryMask, Connectivity};

    fn value_error(e: crate::AnalysisError) -> PyErr {
        PyValueError::new_err(e.to_string())
    }

    // ========================================================================
    // Preprocessing
    // ========================================================================

    /// Blur and binarize a grayscale image.
    ///
    /// # Arguments
    /// * `image` - 2D grayscale image (u8)
    /// * `threshold` - Pixels >= threshold become 255 (0-255)
    /// * `blur_radius` - Gaussian kernel is 2r+1 taps (1-21)
    #[pyfunction(name = "preprocess")]
    #[pyo3(signature = (image, threshold=128, blur_radius=5))]
    pub fn preprocess_py<'py>(
        py: Python<'py>,
        image: PyReadonlyArray2<'py, u8>,
        threshold: i64,
        blur_radius: i64,
    ) -> PyResult<Bound<'py, PyArray2<u8>>> {
        let params = Parameters::new(threshold, blur_radius).map_err(value_error)?;
        let binary = preprocess(image.as_array(), &params);
        Ok(binary.into_array().into_pyarray(py))
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Flood-fill the region under (x, y) of a binary image.
    ///
    /// Pixels set in `claimed` are never entered. Returns the region mask and
    /// its pixel count.
    #[pyfunction]
    #[pyo3(signature = (binary, x, y, claimed=None, eight_connected=false))]
    pub fn flood_select<'py>(
        py: Python<'py>,
        binary: PyReadonlyArray2<'py, u8>,
        x: usize,
        y: usize,
        claimed: Option<PyReadonlyArray2<'py, u8>>,
        eight_connected: bool,
    ) -> PyResult<(Bound<'py, PyArray2<u8>>, usize)> {
        let binary = BinaryMask::from_array(binary.as_array().to_owned());
        let claimed = claimed.map(|c| BinaryMask::from_array(c.as_array().to_owned()));
        if let Some(c) = &claimed {
            if c.dim() != binary.dim() {
                return Err(value_error(crate::AnalysisError::DimensionMismatch {
                    expected: binary.dim(),
                    actual: c.dim(),
                }));
            }
        }
        let connectivity = if eight_connected {
            Connectivity::Eight
        } else {
            Connectivity::Four
        };

        let result = flood_fill(&binary, x, y, claimed.as_ref(), connectivity);
        let count = result.pixel_count;
        Ok((result.mask.into_array().into_pyarray(py), count))
    }

    // ========================================================================
    // Metrics
    // ========================================================================

    /// Per-particle records and summary from particle areas.
    ///
    /// Returns `([(index, area, diameter), ...], (count, mean, std, min, max))`.
    #[pyfunction]
    #[allow(clippy::type_complexity)]
    pub fn particle_metrics(
        areas: Vec<usize>,
    ) -> PyResult<(Vec<(usize, usize, f64)>, (usize, f64, f64, f64, f64))> {
        let report = analyze_areas(&areas).map_err(value_error)?;
        let records = report
            .records
            .iter()
            .map(|r| (r.index, r.area, r.diameter))
            .collect();
        let s = report.summary;
        Ok((
            records,
            (s.count, s.mean_diameter, s.std_diameter, s.min_diameter, s.max_diameter),
        ))
    }

    /// Particle Sizer extension module
    #[pymodule]
    pub fn particle_sizer(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(preprocess_py, m)?)?;
        m.add_function(wrap_pyfunction!(flood_select, m)?)?;
        m.add_function(wrap_pyfunction!(particle_metrics, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::particle_sizer;
