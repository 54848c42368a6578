//! Selection rounds and the committed particle list.
//!
//! An [`AnalysisSession`] is created per loaded image. Particles are picked in
//! rounds:
//!
//! ```text
//!   Idle --start_round--> Collecting --commit--> Idle   (pending particles kept)
//!                            |  ^
//!                      click |  | accepted / rejected
//!                            +--+
//!                         Collecting --discard--> Idle  (pending particles dropped)
//! ```
//!
//! The claimed-area mask is always the OR of every committed particle mask,
//! and committed particles never share a pixel.

use log::{debug, info, warn};

use crate::error::{AnalysisError, Outcome, Rejection};
use crate::selection::{flood_fill, BinaryMask, Connectivity};

/// A committed particle. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Particle {
    mask: BinaryMask,
    area: usize,
}

impl Particle {
    fn new(mask: BinaryMask) -> Self {
        let area = mask.count();
        Self { mask, area }
    }

    pub fn mask(&self) -> &BinaryMask {
        &self.mask
    }

    /// Number of pixels in the particle.
    pub fn area(&self) -> usize {
        self.area
    }
}

/// Transient state of an active round.
#[derive(Debug, Clone)]
pub struct Round {
    session_mask: BinaryMask,
    pending: Vec<BinaryMask>,
}

impl Round {
    pub fn session_mask(&self) -> &BinaryMask {
        &self.session_mask
    }

    pub fn pending(&self) -> &[BinaryMask] {
        &self.pending
    }
}

#[derive(Debug, Clone, Default)]
pub enum RoundState {
    #[default]
    Idle,
    Collecting(Round),
}

/// All selection state for one loaded image.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    claimed: BinaryMask,
    particles: Vec<Particle>,
    round: RoundState,
}

impl AnalysisSession {
    /// Empty session for an image of shape (height, width).
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            claimed: BinaryMask::zeros(height, width),
            particles: Vec::new(),
            round: RoundState::Idle,
        }
    }

    /// (height, width)
    pub fn dim(&self) -> (usize, usize) {
        self.claimed.dim()
    }

    pub fn is_collecting(&self) -> bool {
        matches!(self.round, RoundState::Collecting(_))
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    /// Start a new round with an empty session mask.
    pub fn start_round(&mut self) -> Outcome {
        if self.is_collecting() {
            warn!("start_round: {}", Rejection::RoundAlreadyActive);
            return Outcome::Rejected(Rejection::RoundAlreadyActive);
        }
        let (height, width) = self.dim();
        self.round = RoundState::Collecting(Round {
            session_mask: BinaryMask::zeros(height, width),
            pending: Vec::new(),
        });
        debug!("selection round started");
        Outcome::Applied { added: 0 }
    }

    /// Try to add the region under (x, y) of `binary` to the current round.
    ///
    /// Rejections leave every mask untouched.
    pub fn click(
        &mut self,
        binary: &BinaryMask,
        x: usize,
        y: usize,
        connectivity: Connectivity,
    ) -> Outcome {
        let round = match &mut self.round {
            RoundState::Collecting(round) => round,
            RoundState::Idle => return reject("click", Rejection::NoActiveRound),
        };
        if binary.dim() != self.claimed.dim() {
            return Outcome::Failed(AnalysisError::DimensionMismatch {
                expected: self.claimed.dim(),
                actual: binary.dim(),
            });
        }

        let (height, width) = binary.dim();
        if x >= width || y >= height {
            return reject("click", Rejection::OutOfBounds);
        }
        if self.claimed.is_set(x, y) {
            return reject("click", Rejection::AlreadyClaimed);
        }

        let region = flood_fill(binary, x, y, Some(&self.claimed), connectivity);
        if region.is_empty() {
            return reject("click", Rejection::EmptyRegion);
        }

        let overlaps = match (
            region.mask.intersects(&self.claimed),
            region.mask.intersects(&round.session_mask),
        ) {
            (Ok(a), Ok(b)) => a || b,
            (Err(e), _) | (_, Err(e)) => return Outcome::Failed(e),
        };
        if overlaps {
            return reject("click", Rejection::Overlap);
        }

        if let Err(e) = round.session_mask.union_with(&region.mask) {
            return Outcome::Failed(e);
        }
        debug!(
            "particle accepted at ({x}, {y}): {} px, bounds {:?}",
            region.pixel_count, region.bounds
        );
        round.pending.push(region.mask);
        Outcome::Selected {
            area: region.pixel_count,
        }
    }

    /// Persist the pending particles of the active round.
    ///
    /// The new claimed mask is built before anything is replaced, so a
    /// failure leaves the committed state and the round as they were.
    pub fn commit(&mut self) -> Outcome {
        let round = match std::mem::take(&mut self.round) {
            RoundState::Collecting(round) => round,
            RoundState::Idle => return reject("commit", Rejection::NoActiveRound),
        };

        let claimed = match self.claimed.union(&round.session_mask) {
            Ok(mask) => mask,
            Err(e) => {
                self.round = RoundState::Collecting(round);
                return Outcome::Failed(e);
            }
        };

        let added = round.pending.len();
        self.particles
            .extend(round.pending.into_iter().map(Particle::new));
        self.claimed = claimed;

        info!(
            "committed {added} particle(s), {} total",
            self.particles.len()
        );
        Outcome::Applied { added }
    }

    /// Abandon the active round. No-op while idle.
    pub fn discard(&mut self) -> Outcome {
        if let RoundState::Collecting(round) = std::mem::take(&mut self.round) {
            debug!("discarded round with {} pending particle(s)", round.pending.len());
        }
        Outcome::Applied { added: 0 }
    }

    /// Committed particles across all rounds.
    pub fn total_count(&self) -> usize {
        self.particles.len()
    }

    /// Particles accepted in the active round but not yet committed.
    pub fn pending_count(&self) -> usize {
        match &self.round {
            RoundState::Collecting(round) => round.pending.len(),
            RoundState::Idle => 0,
        }
    }

    /// Committed particles in commit order.
    pub fn all_particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn claimed_mask(&self) -> &BinaryMask {
        &self.claimed
    }

    /// Session mask of the active round, if any.
    pub fn session_mask(&self) -> Option<&BinaryMask> {
        match &self.round {
            RoundState::Collecting(round) => Some(&round.session_mask),
            RoundState::Idle => None,
        }
    }

    /// Live status text, e.g. `Current batch: 2 particles (Total: 5)`.
    pub fn status_line(&self) -> String {
        match &self.round {
            RoundState::Collecting(round) => format!(
                "Current batch: {} particles (Total: {})",
                round.pending.len(),
                self.particles.len() + round.pending.len()
            ),
            RoundState::Idle => format!("Selected: {}", self.particles.len()),
        }
    }
}

fn reject(op: &str, reason: Rejection) -> Outcome {
    warn!("{op}: {reason}");
    Outcome::Rejected(reason)
}
