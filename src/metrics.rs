//! Particle size metrics.
//!
//! Converts committed particles into per-particle area / equivalent circular
//! diameter records and summary statistics. Pure and deterministic.

use std::f64::consts::PI;
use std::fmt;

use crate::error::{AnalysisError, Result};
use crate::session::Particle;

/// Diameter of the circle whose area equals `area` pixels: `2 * sqrt(area / π)`.
#[inline]
pub fn equivalent_diameter(area: usize) -> f64 {
    2.0 * (area as f64 / PI).sqrt()
}

/// One row of the result table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleRecord {
    /// 1-based position in commit order
    pub index: usize,
    /// Pixel count
    pub area: usize,
    /// Equivalent circular diameter in pixels
    pub diameter: f64,
}

/// Aggregate statistics over all particle diameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean_diameter: f64,
    /// Population standard deviation (divides by `count`)
    pub std_diameter: f64,
    pub min_diameter: f64,
    pub max_diameter: f64,
}

/// Records plus summary, ready for display or export.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub records: Vec<ParticleRecord>,
    pub summary: Summary,
}

/// Build a report from particle areas in commit order.
pub fn analyze_areas(areas: &[usize]) -> Result<Report> {
    if areas.is_empty() {
        return Err(AnalysisError::NothingToAnalyze);
    }

    let records: Vec<ParticleRecord> = areas
        .iter()
        .enumerate()
        .map(|(i, &area)| ParticleRecord {
            index: i + 1,
            area,
            diameter: equivalent_diameter(area),
        })
        .collect();

    let n = records.len() as f64;
    let mean = records.iter().map(|r| r.diameter).sum::<f64>() / n;
    let variance = records
        .iter()
        .map(|r| (r.diameter - mean).powi(2))
        .sum::<f64>()
        / n;
    let min = records
        .iter()
        .map(|r| r.diameter)
        .fold(f64::INFINITY, f64::min);
    let max = records
        .iter()
        .map(|r| r.diameter)
        .fold(f64::NEG_INFINITY, f64::max);

    Ok(Report {
        summary: Summary {
            count: records.len(),
            mean_diameter: mean,
            std_diameter: variance.sqrt(),
            min_diameter: min,
            max_diameter: max,
        },
        records,
    })
}

/// Build a report from committed particles.
pub fn analyze(particles: &[Particle]) -> Result<Report> {
    let areas: Vec<usize> = particles.iter().map(Particle::area).collect();
    analyze_areas(&areas)
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Particle Analysis Results:")?;
        writeln!(f)?;
        writeln!(f, "{:^6}{:^12}{:^12}", "No.", "Area(px)", "Diameter(px)")?;
        writeln!(f, "{}", "-".repeat(30))?;
        for r in &self.records {
            writeln!(f, "{:^6}{:^12.1}{:^12.2}", r.index, r.area as f64, r.diameter)?;
        }

        let s = &self.summary;
        writeln!(f)?;
        writeln!(f, "Statistics:")?;
        writeln!(f, "Total count: {}", s.count)?;
        writeln!(f, "Mean diameter: {:.2} ± {:.2}", s.mean_diameter, s.std_diameter)?;
        writeln!(f, "Min diameter: {:.2}", s.min_diameter)?;
        writeln!(f, "Max diameter: {:.2}", s.max_diameter)
    }
}
