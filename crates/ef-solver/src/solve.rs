//! High-level solver interface.

use crate::error::{SolverError, SolverResult};
use crate::options::{Method, SolverOptions};
use crate::stepper::Stepper;
use crate::system::{OdeSystem, TimeSpan};
use nalgebra::DVector;
use serde::Serialize;
use std::time::Instant;

/// Work counters for one integration.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SolverStats {
    /// Accepted steps
    pub n_steps: usize,
    /// Rejected step attempts
    pub n_rejected: usize,
    /// Right-hand side evaluations (including Jacobian columns)
    pub n_rhs_evals: usize,
    /// Jacobian evaluations
    pub n_jac_evals: usize,
    /// LU decompositions
    pub n_lu: usize,
    /// Time at which an auto-switching solver moved to the stiff method
    pub stiff_switch_at: Option<f64>,
}

/// States sampled at the requested instants.
#[derive(Clone, Debug)]
pub struct Solution {
    /// Evaluation instants, identical to the requested `t_eval`
    pub t: Vec<f64>,
    /// One state per instant
    pub y: Vec<DVector<f64>>,
    pub stats: SolverStats,
}

/// An adaptive ODE solver that can be injected wherever integration is needed.
pub trait OdeSolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Integrate `system` over `span` from `y0`, reporting the state at each
    /// instant of `t_eval` (sorted, inside `span`).
    fn solve(
        &self,
        system: &dyn OdeSystem,
        span: TimeSpan,
        y0: &DVector<f64>,
        t_eval: &[f64],
    ) -> SolverResult<Solution>;
}

/// Solve an initial value problem with the selected method.
pub fn solve_ivp(
    system: &dyn OdeSystem,
    span: TimeSpan,
    y0: &DVector<f64>,
    t_eval: &[f64],
    method: Method,
    options: &SolverOptions,
) -> SolverResult<Solution> {
    method.solver(options.clone()).solve(system, span, y0, t_eval)
}

pub(crate) fn validate_problem(
    system: &dyn OdeSystem,
    span: TimeSpan,
    y0: &DVector<f64>,
    t_eval: &[f64],
    options: &SolverOptions,
) -> SolverResult<()> {
    span.validate()?;
    options.validate()?;

    if system.dim() == 0 {
        return Err(SolverError::InvalidArg {
            what: "system has no state variables".to_string(),
        });
    }
    if y0.len() != system.dim() {
        return Err(SolverError::InvalidArg {
            what: format!(
                "initial state has {} entries, system expects {}",
                y0.len(),
                system.dim()
            ),
        });
    }
    if y0.iter().any(|v| !v.is_finite()) {
        return Err(SolverError::InvalidArg {
            what: "initial state must be finite".to_string(),
        });
    }
    if let Some(&t) = t_eval.iter().find(|&&t| !span.contains(t)) {
        return Err(SolverError::InvalidArg {
            what: format!(
                "evaluation point {t} outside [{}, {}]",
                span.start, span.end
            ),
        });
    }
    if t_eval.windows(2).any(|w| w[1] < w[0]) {
        return Err(SolverError::InvalidArg {
            what: "evaluation points must be sorted".to_string(),
        });
    }
    Ok(())
}

/// Advance `stepper` to the end of `span`, sampling dense output at `t_eval`.
pub(crate) fn drive<S: Stepper>(
    stepper: &mut S,
    system: &dyn OdeSystem,
    span: TimeSpan,
    y0: &DVector<f64>,
    t_eval: &[f64],
    options: &SolverOptions,
    mut stats: SolverStats,
) -> SolverResult<Solution> {
    let started = Instant::now();
    let mut t_out = Vec::with_capacity(t_eval.len());
    let mut y_out = Vec::with_capacity(t_eval.len());

    let mut next = 0;
    while next < t_eval.len() && t_eval[next] <= span.start {
        t_out.push(t_eval[next]);
        y_out.push(y0.clone());
        next += 1;
    }

    while stepper.t() < span.end {
        if stats.n_steps >= options.max_steps {
            return Err(SolverError::MaxStepsExceeded {
                max_steps: options.max_steps,
                t: stepper.t(),
            });
        }
        if let Some(limit) = options.max_wall_time {
            if started.elapsed() > limit {
                return Err(SolverError::WallTimeExceeded {
                    limit_s: limit.as_secs_f64(),
                    t: stepper.t(),
                });
            }
        }

        let segment = stepper.step(system, &mut stats)?;
        stats.n_steps += 1;

        let t = stepper.t();
        if stepper.y().iter().any(|v| !v.is_finite()) {
            return Err(SolverError::NonFinite { t });
        }

        while next < t_eval.len() && t_eval[next] <= t {
            let at = t_eval[next];
            let y = if at == t {
                stepper.y().clone()
            } else {
                segment.eval(at)
            };
            t_out.push(at);
            y_out.push(y);
            next += 1;
        }
    }

    tracing::debug!(
        steps = stats.n_steps,
        rejected = stats.n_rejected,
        rhs_evals = stats.n_rhs_evals,
        jac_evals = stats.n_jac_evals,
        "integration finished"
    );

    Ok(Solution {
        t: t_out,
        y: y_out,
        stats,
    })
}
