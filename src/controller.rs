//! Event-driven front for the analysis core.
//!
//! The [`Controller`] owns the loaded image, the parameters, the cached binary
//! image and the [`AnalysisSession`]. User interface layers translate their
//! input into [`Event`]s and show the returned [`Outcome`]; they never touch
//! masks directly.

use std::path::Path;

use image::RgbImage;
use log::{debug, info, warn};
use ndarray::Array2;

use crate::error::{AnalysisError, Outcome, Rejection, Result};
use crate::export::export_csv;
use crate::metrics::{analyze, Report};
use crate::preprocess::{preprocess, Parameters};
use crate::render::compose_overlay;
use crate::selection::BinaryMask;
use crate::session::AnalysisSession;
use crate::viewport::FitTransform;

/// A parameter edit coming from the controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterChange {
    Threshold(i64),
    BlurRadius(i64),
}

/// User input understood by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    ParameterChanged(ParameterChange),
    StartRound,
    /// Click in image pixel coordinates.
    Clicked { x: usize, y: usize },
    CommitRequested,
    DiscardRequested,
}

/// State loaded for one image.
#[derive(Debug, Clone)]
struct Loaded {
    image: Array2<u8>,
    binary: BinaryMask,
    session: AnalysisSession,
}

#[derive(Debug, Clone, Default)]
pub struct Controller {
    params: Parameters,
    loaded: Option<Loaded>,
}

impl Controller {
    pub fn new(params: Parameters) -> Self {
        Self {
            params,
            loaded: None,
        }
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Replace the working image. Clears every particle and round.
    pub fn load_image(&mut self, image: Array2<u8>) {
        let (height, width) = image.dim();
        let binary = preprocess(image.view(), &self.params);
        info!(
            "image {width}x{height} loaded, {} foreground px at threshold {}",
            binary.count(),
            self.params.threshold()
        );
        self.loaded = Some(Loaded {
            image,
            binary,
            session: AnalysisSession::new(height, width),
        });
    }

    /// Load an image file from disk; state is left untouched on failure.
    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        let image = crate::io::load_grayscale(path)?;
        self.load_image(image);
        Ok(())
    }

    pub fn image(&self) -> Option<&Array2<u8>> {
        self.loaded.as_ref().map(|l| &l.image)
    }

    pub fn binary(&self) -> Option<&BinaryMask> {
        self.loaded.as_ref().map(|l| &l.binary)
    }

    pub fn session(&self) -> Option<&AnalysisSession> {
        self.loaded.as_ref().map(|l| &l.session)
    }

    /// Apply one event and report what happened.
    pub fn dispatch(&mut self, event: Event) -> Outcome {
        debug!("dispatch {event:?}");
        match event {
            Event::ParameterChanged(change) => self.change_parameter(change),
            Event::StartRound => match &mut self.loaded {
                Some(l) => l.session.start_round(),
                None => Outcome::Rejected(Rejection::NoImage),
            },
            Event::Clicked { x, y } => match &mut self.loaded {
                Some(l) => l.session.click(&l.binary, x, y, self.params.connectivity),
                None => Outcome::Rejected(Rejection::NoImage),
            },
            Event::CommitRequested => match &mut self.loaded {
                Some(l) => l.session.commit(),
                None => Outcome::Rejected(Rejection::NoImage),
            },
            Event::DiscardRequested => match &mut self.loaded {
                Some(l) => l.session.discard(),
                None => Outcome::Applied { added: 0 },
            },
        }
    }

    /// Click on a display canvas that shows the image fitted into
    /// `canvas_width` x `canvas_height`. Positions off the drawn image are
    /// rejected as out of bounds.
    pub fn click_canvas(
        &mut self,
        canvas_width: usize,
        canvas_height: usize,
        cx: f64,
        cy: f64,
    ) -> Outcome {
        let Some((height, width)) = self.image().map(|img| img.dim()) else {
            return Outcome::Rejected(Rejection::NoImage);
        };
        let fit = FitTransform::fit(width, height, canvas_width, canvas_height);
        match fit.canvas_to_image(cx, cy) {
            Some((x, y)) => self.dispatch(Event::Clicked { x, y }),
            None => {
                warn!("canvas click ({cx}, {cy}) is off the image");
                Outcome::Rejected(Rejection::OutOfBounds)
            }
        }
    }

    fn change_parameter(&mut self, change: ParameterChange) -> Outcome {
        if self.loaded.as_ref().is_some_and(|l| l.session.is_collecting()) {
            return Outcome::Rejected(Rejection::ParametersLocked);
        }

        let mut params = self.params;
        let applied = match change {
            ParameterChange::Threshold(v) => params.set_threshold(v),
            ParameterChange::BlurRadius(v) => params.set_blur_radius(v),
        };
        if let Err(e) = applied {
            return Outcome::Failed(e);
        }
        self.params = params;

        // Committed particles keep their masks; only the binary image changes
        if let Some(l) = &mut self.loaded {
            l.binary = preprocess(l.image.view(), &self.params);
            debug!(
                "reprocessed: threshold {}, blur radius {}, {} foreground px",
                self.params.threshold(),
                self.params.blur_radius(),
                l.binary.count()
            );
        }
        Outcome::Applied { added: 0 }
    }

    /// Committed particle count, 0 with no image.
    pub fn total_count(&self) -> usize {
        self.session().map_or(0, AnalysisSession::total_count)
    }

    /// Measurements of every committed particle.
    pub fn report(&self) -> Result<Report> {
        match self.session() {
            Some(s) => analyze(s.all_particles()),
            None => Err(AnalysisError::NothingToAnalyze),
        }
    }

    /// Export the report as CSV; nothing is written when there is nothing
    /// to analyze.
    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let report = self.report()?;
        export_csv(path, &report)
    }

    /// Overlay preview of the current state.
    pub fn preview(&self) -> Result<RgbImage> {
        let l = self.loaded.as_ref().ok_or(AnalysisError::NoImage)?;
        Ok(compose_overlay(
            &l.binary,
            Some(l.session.claimed_mask()),
            l.session.session_mask(),
        ))
    }

    /// Status text for the current state.
    pub fn status_line(&self) -> String {
        match self.session() {
            Some(s) => s.status_line(),
            None => "No image loaded".to_string(),
        }
    }
}
