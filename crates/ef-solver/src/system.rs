//! ODE system abstraction.

use crate::error::{SolverError, SolverResult};
use nalgebra::DVector;

/// A first-order system `dy/dt = f(t, y)`.
///
/// Implementations must be pure: the same `(t, y)` always yields the same
/// derivative, and evaluation never mutates the system.
pub trait OdeSystem {
    /// Number of state variables.
    fn dim(&self) -> usize;

    /// Compute the derivative vector at `(t, y)`.
    fn rhs(&self, t: f64, y: &DVector<f64>) -> DVector<f64>;
}

/// Closed integration interval `[start, end]` with `start < end`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

impl TimeSpan {
    pub fn new(start: f64, end: f64) -> SolverResult<Self> {
        let span = Self { start, end };
        span.validate()?;
        Ok(span)
    }

    pub fn validate(&self) -> SolverResult<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(SolverError::InvalidArg {
                what: format!("time span must be finite, got ({}, {})", self.start, self.end),
            });
        }
        if self.start >= self.end {
            return Err(SolverError::InvalidArg {
                what: format!("time span start {} must precede end {}", self.start, self.end),
            });
        }
        Ok(())
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }
}

/// Adapter turning a closure into an [`OdeSystem`].
pub struct FnSystem<F> {
    dim: usize,
    f: F,
}

impl<F> FnSystem<F>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    pub fn new(dim: usize, f: F) -> Self {
        Self { dim, f }
    }
}

impl<F> OdeSystem for FnSystem<F>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    fn dim(&self) -> usize {
        self.dim
    }

    fn rhs(&self, t: f64, y: &DVector<f64>) -> DVector<f64> {
        (self.f)(t, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_span_rejects_reversed() {
        assert!(TimeSpan::new(1.0, 0.0).is_err());
        assert!(TimeSpan::new(0.0, 0.0).is_err());
        assert!(TimeSpan::new(0.0, f64::NAN).is_err());
        let span = TimeSpan::new(0.0, 200.0).unwrap();
        assert_eq!(span.length(), 200.0);
        assert!(span.contains(200.0));
        assert!(!span.contains(200.5));
    }

    #[test]
    fn fn_system_forwards() {
        let sys = FnSystem::new(1, |_t, y: &DVector<f64>| -y);
        let dy = sys.rhs(0.0, &DVector::from_element(1, 2.0));
        assert_eq!(sys.dim(), 1);
        assert_eq!(dy[0], -2.0);
    }
}
