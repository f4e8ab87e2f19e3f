//! Simplified Newton iteration for implicit correctors.

use crate::error::{SolverError, SolverResult};
use crate::solve::SolverStats;
use crate::stepper::scaled_rms;
use crate::system::OdeSystem;
use nalgebra::linalg::LU;
use nalgebra::{DVector, Dyn};

/// Newton corrector configuration.
#[derive(Clone, Debug)]
pub struct NewtonConfig {
    /// Maximum iterations per corrector solve
    pub max_iterations: usize,
    /// Convergence tolerance on the scaled increment norm
    pub tol: f64,
}

impl NewtonConfig {
    /// Tolerance tied to the solver's relative tolerance.
    pub fn for_rtol(rtol: f64) -> Self {
        Self {
            max_iterations: 4,
            tol: (10.0 * f64::EPSILON / rtol).max(0.03_f64.min(rtol.sqrt())),
        }
    }
}

/// Corrector iteration result.
pub struct CorrectorResult {
    /// Corrected state
    pub y: DVector<f64>,
    /// Accumulated correction `y - y_predict`
    pub d: DVector<f64>,
    /// Number of iterations
    pub iterations: usize,
    /// Converged flag
    pub converged: bool,
}

/// Solve `d - c * f(t_new, y_predict + d) + psi = 0` by simplified Newton.
///
/// `lu` is the factored iteration matrix `I - c * J`, reused across
/// iterations. Divergence (contraction rate >= 1, or a rate too slow to
/// converge within the remaining iterations) stops early with
/// `converged = false`; the caller then refreshes the Jacobian or shrinks
/// the step.
#[allow(clippy::too_many_arguments)]
pub fn solve_corrector(
    system: &dyn OdeSystem,
    t_new: f64,
    y_predict: &DVector<f64>,
    c: f64,
    psi: &DVector<f64>,
    lu: &LU<f64, Dyn, Dyn>,
    scale: &DVector<f64>,
    config: &NewtonConfig,
    stats: &mut SolverStats,
) -> SolverResult<CorrectorResult> {
    let mut d = DVector::zeros(y_predict.len());
    let mut y = y_predict.clone();
    let mut dy_norm_old: Option<f64> = None;
    let mut converged = false;
    let mut iterations = 0;

    for k in 0..config.max_iterations {
        iterations = k + 1;

        let f = system.rhs(t_new, &y);
        stats.n_rhs_evals += 1;
        if f.iter().any(|v| !v.is_finite()) {
            break;
        }

        let residual = f * c - psi - &d;
        let dy = lu
            .solve(&residual)
            .ok_or(SolverError::SingularMatrix { t: t_new })?;
        let dy_norm = scaled_rms(&dy, scale);

        let rate = dy_norm_old.map(|old| dy_norm / old);
        if let Some(rate) = rate {
            let remaining = (config.max_iterations - k) as i32;
            if rate >= 1.0 || rate.powi(remaining) / (1.0 - rate) * dy_norm > config.tol {
                break;
            }
        }

        y += &dy;
        d += &dy;

        if dy_norm == 0.0 || rate.is_some_and(|rate| rate / (1.0 - rate) * dy_norm < config.tol) {
            converged = true;
            break;
        }

        dy_norm_old = Some(dy_norm);
    }

    Ok(CorrectorResult {
        y,
        d,
        iterations,
        converged,
    })
}
