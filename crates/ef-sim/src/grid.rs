//! Evaluation grids.

use crate::error::{SimError, SimResult};
use ef_core::ensure_finite;
use ef_solver::TimeSpan;

/// A closed horizon `[start, end]` (days) and the instants at which the
/// trajectory must be reported.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeGrid {
    start: f64,
    end: f64,
    points: Vec<f64>,
}

impl TimeGrid {
    /// `n >= 2` evenly spaced instants, endpoints exact.
    pub fn linspace(start: f64, end: f64, n: usize) -> SimResult<Self> {
        Self::check_span(start, end)?;
        if n < 2 {
            return Err(SimError::config(format!(
                "a linspace grid needs at least 2 points, got {n}"
            )));
        }
        let step = (end - start) / (n - 1) as f64;
        let mut points: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
        points[n - 1] = end;
        Ok(Self { start, end, points })
    }

    /// Custom instants, sorted and inside `[start, end]`.
    pub fn new(start: f64, end: f64, points: Vec<f64>) -> SimResult<Self> {
        Self::check_span(start, end)?;
        if points.is_empty() {
            return Err(SimError::config("evaluation grid is empty"));
        }
        for &t in &points {
            ensure_finite(t, "evaluation point")?;
            if t < start || t > end {
                return Err(SimError::config(format!(
                    "evaluation point {t} outside [{start}, {end}]"
                )));
            }
        }
        if points.windows(2).any(|w| w[1] < w[0]) {
            return Err(SimError::config("evaluation points must be sorted"));
        }
        Ok(Self { start, end, points })
    }

    fn check_span(start: f64, end: f64) -> SimResult<()> {
        ensure_finite(start, "grid start")?;
        ensure_finite(end, "grid end")?;
        if start >= end {
            return Err(SimError::config(format!(
                "grid start {start} must precede end {end}"
            )));
        }
        Ok(())
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn span(&self) -> TimeSpan {
        TimeSpan {
            start: self.start,
            end: self.end,
        }
    }
}
