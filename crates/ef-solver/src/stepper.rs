//! Shared machinery for single-step integrators.

use crate::dense::DenseSegment;
use crate::error::SolverResult;
use crate::options::SolverOptions;
use crate::solve::SolverStats;
use crate::system::OdeSystem;
use nalgebra::DVector;

/// One adaptive integrator advancing its own `(t, y)`.
///
/// `step` performs exactly one accepted step (retrying rejected attempts
/// internally) and returns the dense output valid over that step.
pub(crate) trait Stepper {
    fn t(&self) -> f64;

    fn y(&self) -> &DVector<f64>;

    fn step(
        &mut self,
        system: &dyn OdeSystem,
        stats: &mut SolverStats,
    ) -> SolverResult<DenseSegment>;
}

/// Smallest step the solver may take near `t`.
pub(crate) fn min_step(t: f64) -> f64 {
    10.0 * f64::EPSILON * t.abs().max(f64::MIN_POSITIVE)
}

/// Root-mean-square norm of `v / scale`.
pub(crate) fn scaled_rms(v: &DVector<f64>, scale: &DVector<f64>) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v
        .iter()
        .zip(scale.iter())
        .map(|(x, s)| (x / s).powi(2))
        .sum();
    (sum / v.len() as f64).sqrt()
}

/// Error weights `atol + rtol * |y|`.
pub(crate) fn error_scale(y: &DVector<f64>, rtol: f64, atol: f64) -> DVector<f64> {
    y.map(|v| atol + rtol * v.abs())
}

/// Initial step heuristic (Hairer, Norsett & Wanner, section II.4).
///
/// `error_order` is the order of the solver's local error estimate.
#[allow(clippy::too_many_arguments)]
pub(crate) fn select_initial_step(
    system: &dyn OdeSystem,
    t0: f64,
    y0: &DVector<f64>,
    f0: &DVector<f64>,
    t_bound: f64,
    error_order: u32,
    options: &SolverOptions,
    stats: &mut SolverStats,
) -> f64 {
    let interval = (t_bound - t0).abs();
    if y0.is_empty() || interval == 0.0 {
        return interval;
    }

    let scale = error_scale(y0, options.rtol, options.atol);
    let d0 = scaled_rms(y0, &scale);
    let d1 = scaled_rms(f0, &scale);
    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    }
    .min(interval);

    let y1 = y0 + f0 * h0;
    let f1 = system.rhs(t0 + h0, &y1);
    stats.n_rhs_evals += 1;
    let d2 = scaled_rms(&(f1 - f0), &scale) / h0;

    let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / d1.max(d2)).powf(1.0 / (f64::from(error_order) + 1.0))
    };

    (100.0 * h0).min(h1).min(interval)
}
