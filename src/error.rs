//! Error and rejection types shared by the analysis core.
//!
//! Two families are kept apart:
//! - [`AnalysisError`]: something failed (bad parameter, empty input, I/O).
//! - [`Rejection`]: the user asked for something the current state does not
//!   allow (click on a claimed pixel, overlapping region, wrong round state).
//!   Rejections never mutate state and the round continues.
//!
//! Session transitions report both through [`Outcome`].

use std::fmt;
use std::io;

use thiserror::Error;

/// Failures raised by the analysis core and its collaborators.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A parameter is outside its documented range.
    #[error("invalid parameter {name}: {value} (expected {min}..={max})")]
    InvalidParameter {
        /// Parameter name as shown to the user.
        name: &'static str,
        /// Rejected value.
        value: i64,
        /// Inclusive lower bound.
        min: i64,
        /// Inclusive upper bound.
        max: i64,
    },

    /// Statistics or export requested with no committed particles.
    #[error("nothing to analyze: no particles have been selected")]
    NothingToAnalyze,

    /// A mask or image does not match the working image size.
    #[error("dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// (height, width) of the working image.
        expected: (usize, usize),
        /// (height, width) that was supplied.
        actual: (usize, usize),
    },

    /// No image has been loaded yet.
    #[error("no image loaded")]
    NoImage,

    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path that was being accessed.
        path: String,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },

    /// Image decoding or encoding failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Reasons a user request was refused without touching any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The clicked pixel already belongs to a committed particle.
    AlreadyClaimed,
    /// The filled region intersects committed or pending particles.
    Overlap,
    /// The flood fill produced no pixels.
    EmptyRegion,
    /// The click lies outside the image.
    OutOfBounds,
    /// A click or commit arrived while no round is collecting.
    NoActiveRound,
    /// `StartRound` while a round is already collecting.
    RoundAlreadyActive,
    /// Parameters cannot change while a round is collecting.
    ParametersLocked,
    /// Nothing has been loaded to select from.
    NoImage,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::AlreadyClaimed => "this area has already been selected",
            Self::Overlap => "this particle overlaps with the selected area",
            Self::EmptyRegion => "flood fill produced an empty region",
            Self::OutOfBounds => "click lies outside the image",
            Self::NoActiveRound => "no selection round is active",
            Self::RoundAlreadyActive => "a selection round is already active",
            Self::ParametersLocked => "parameters cannot change during a selection round",
            Self::NoImage => "no image loaded",
        };
        f.write_str(msg)
    }
}

/// Result of a session transition.
///
/// `Selected { area }` is an accepted click: one particle of `area` pixels
/// joined the round. `Applied { added }` covers every other transition and
/// reports how many particles it committed (0 for start/discard).
#[derive(Debug)]
pub enum Outcome {
    Selected { area: usize },
    Applied { added: usize },
    Rejected(Rejection),
    Failed(AnalysisError),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Selected { .. } | Self::Applied { .. })
    }

    /// Particles added by this transition.
    pub fn added(&self) -> usize {
        match self {
            Self::Selected { .. } => 1,
            Self::Applied { added } => *added,
            _ => 0,
        }
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::Rejected(r) => Some(*r),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selected { area } => write!(f, "ok (1 added, {area} px)"),
            Self::Applied { added } => write!(f, "ok ({added} added)"),
            Self::Rejected(r) => write!(f, "rejected: {r}"),
            Self::Failed(e) => write!(f, "failed: {e}"),
        }
    }
}
