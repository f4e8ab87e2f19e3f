//! Implicit variable-order BDF integrator for stiff systems.
//!
//! The solution history is stored as modified backward differences
//! `D[0..=order+2]` at a constant spacing `h`; changing the step rescales the
//! differences instead of restarting. Coefficients are the numerical
//! differentiation formula (NDF) variant, orders 1 through 5.

use crate::dense::DenseSegment;
use crate::error::{SolverError, SolverResult};
use crate::jacobian::{default_epsilon, finite_difference_jacobian};
use crate::newton::{NewtonConfig, solve_corrector};
use crate::options::SolverOptions;
use crate::solve::{OdeSolver, Solution, SolverStats, drive, validate_problem};
use crate::stepper::{Stepper, error_scale, min_step, scaled_rms, select_initial_step};
use crate::system::{OdeSystem, TimeSpan};
use nalgebra::linalg::LU;
use nalgebra::{DMatrix, DVector, Dyn};

const MAX_ORDER: usize = 5;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
const KAPPA: [f64; MAX_ORDER + 1] = [0.0, -0.1850, -1.0 / 9.0, -0.0823, -0.0415, 0.0];

/// Per-order method coefficients.
#[derive(Clone, Debug)]
struct Coefficients {
    gamma: [f64; MAX_ORDER + 1],
    alpha: [f64; MAX_ORDER + 1],
    error_const: [f64; MAX_ORDER + 1],
}

impl Coefficients {
    fn ndf() -> Self {
        let mut gamma = [0.0; MAX_ORDER + 1];
        for k in 1..=MAX_ORDER {
            gamma[k] = gamma[k - 1] + 1.0 / k as f64;
        }
        let mut alpha = [0.0; MAX_ORDER + 1];
        let mut error_const = [0.0; MAX_ORDER + 1];
        for k in 0..=MAX_ORDER {
            alpha[k] = (1.0 - KAPPA[k]) * gamma[k];
            error_const[k] = KAPPA[k] * gamma[k] + 1.0 / (k as f64 + 1.0);
        }
        Self {
            gamma,
            alpha,
            error_const,
        }
    }
}

/// Transformation matrix for rescaling differences by `factor`.
fn compute_r(order: usize, factor: f64) -> DMatrix<f64> {
    let n = order + 1;
    let mut m = DMatrix::zeros(n, n);
    for j in 0..n {
        m[(0, j)] = 1.0;
    }
    for i in 1..n {
        for j in 1..n {
            m[(i, j)] = (i as f64 - 1.0 - factor * j as f64) / i as f64;
        }
    }
    // Cumulative product down each column.
    for i in 1..n {
        for j in 0..n {
            m[(i, j)] *= m[(i - 1, j)];
        }
    }
    m
}

/// Rescale rows `0..=order` of `d` for a step size multiplied by `factor`.
fn change_d(d: &mut DMatrix<f64>, order: usize, factor: f64) {
    let r = compute_r(order, factor);
    let u = compute_r(order, 1.0);
    let ru = r * u;
    let head = d.rows(0, order + 1).clone_owned();
    let updated = ru.transpose() * head;
    d.rows_mut(0, order + 1).copy_from(&updated);
}

pub(crate) struct BdfStepper {
    t: f64,
    y: DVector<f64>,
    t_bound: f64,
    h_abs: f64,
    order: usize,
    n_equal_steps: usize,
    d: DMatrix<f64>,
    jac: DMatrix<f64>,
    lu: Option<LU<f64, Dyn, Dyn>>,
    coeffs: Coefficients,
    newton: NewtonConfig,
    rtol: f64,
    atol: f64,
    max_step: f64,
}

impl BdfStepper {
    pub(crate) fn new(
        system: &dyn OdeSystem,
        t0: f64,
        y0: DVector<f64>,
        t_bound: f64,
        options: &SolverOptions,
        stats: &mut SolverStats,
    ) -> Self {
        let n = y0.len();
        let f = system.rhs(t0, &y0);
        stats.n_rhs_evals += 1;
        let h_abs = match options.first_step {
            Some(h) => h,
            None => select_initial_step(system, t0, &y0, &f, t_bound, 1, options, stats),
        }
        .min(options.max_step);

        let mut d = DMatrix::zeros(MAX_ORDER + 3, n);
        d.set_row(0, &y0.transpose());
        d.set_row(1, &(&f * h_abs).transpose());

        let jac = jacobian(system, t0, &y0, &f, stats);

        Self {
            t: t0,
            y: y0,
            t_bound,
            h_abs,
            order: 1,
            n_equal_steps: 0,
            d,
            jac,
            lu: None,
            coeffs: Coefficients::ndf(),
            newton: NewtonConfig::for_rtol(options.rtol),
            rtol: options.rtol,
            atol: options.atol,
            max_step: options.max_step,
        }
    }

    /// Current method order.
    #[cfg(test)]
    pub(crate) fn order(&self) -> usize {
        self.order
    }
}

fn jacobian(
    system: &dyn OdeSystem,
    t: f64,
    y: &DVector<f64>,
    f: &DVector<f64>,
    stats: &mut SolverStats,
) -> DMatrix<f64> {
    stats.n_jac_evals += 1;
    stats.n_rhs_evals += y.len();
    finite_difference_jacobian(y, f, |x| system.rhs(t, x), default_epsilon())
}

impl Stepper for BdfStepper {
    fn t(&self) -> f64 {
        self.t
    }

    fn y(&self) -> &DVector<f64> {
        &self.y
    }

    fn step(
        &mut self,
        system: &dyn OdeSystem,
        stats: &mut SolverStats,
    ) -> SolverResult<DenseSegment> {
        let t = self.t;
        let n = self.y.len();
        let min_step = min_step(t);

        let mut h_abs = if self.h_abs > self.max_step {
            change_d(&mut self.d, self.order, self.max_step / self.h_abs);
            self.n_equal_steps = 0;
            self.lu = None;
            self.max_step
        } else if self.h_abs < min_step {
            change_d(&mut self.d, self.order, min_step / self.h_abs);
            self.n_equal_steps = 0;
            self.lu = None;
            min_step
        } else {
            self.h_abs
        };

        let order = self.order;
        let alpha = self.coeffs.alpha[order];
        let gamma = DVector::from_row_slice(&self.coeffs.gamma[1..=order]);
        let mut current_jac = false;

        let (t_new, y_new, d_corr, safety, error_norm, scale) = loop {
            if h_abs < min_step {
                return Err(SolverError::StepSizeTooSmall { t });
            }

            let mut t_new = t + h_abs;
            if t_new > self.t_bound {
                t_new = self.t_bound;
                change_d(&mut self.d, order, (t_new - t).abs() / h_abs);
                self.n_equal_steps = 0;
                self.lu = None;
            }
            let h = t_new - t;
            h_abs = h.abs();

            let y_predict: DVector<f64> = self.d.rows(0, order + 1).row_sum().transpose();
            let scale = error_scale(&y_predict, self.rtol, self.atol);
            let psi: DVector<f64> = self.d.rows(1, order).transpose() * &gamma / alpha;
            let c = h / alpha;

            let corrected = loop {
                let jac = &self.jac;
                let lu = self.lu.get_or_insert_with(|| {
                    stats.n_lu += 1;
                    (DMatrix::identity(n, n) - jac * c).lu()
                });
                let result = solve_corrector(
                    system,
                    t_new,
                    &y_predict,
                    c,
                    &psi,
                    lu,
                    &scale,
                    &self.newton,
                    stats,
                )?;
                if result.converged {
                    break Some(result);
                }
                if current_jac {
                    break None;
                }
                let f_predict = system.rhs(t_new, &y_predict);
                stats.n_rhs_evals += 1;
                self.jac = jacobian(system, t_new, &y_predict, &f_predict, stats);
                self.lu = None;
                current_jac = true;
            };

            let Some(corrected) = corrected else {
                h_abs *= 0.5;
                change_d(&mut self.d, order, 0.5);
                self.n_equal_steps = 0;
                self.lu = None;
                stats.n_rejected += 1;
                tracing::trace!(t, h_abs, "bdf corrector failed to converge");
                continue;
            };

            let max_iter = self.newton.max_iterations;
            let safety = 0.9 * (2 * max_iter + 1) as f64 / (2 * max_iter + corrected.iterations) as f64;
            let scale = error_scale(&corrected.y, self.rtol, self.atol);
            let error = &corrected.d * self.coeffs.error_const[order];
            let error_norm = scaled_rms(&error, &scale);

            if error_norm.is_nan() || error_norm > 1.0 {
                let factor = if error_norm.is_finite() {
                    (safety * error_norm.powf(-1.0 / (order as f64 + 1.0))).max(MIN_FACTOR)
                } else {
                    MIN_FACTOR
                };
                h_abs *= factor;
                change_d(&mut self.d, order, factor);
                self.n_equal_steps = 0;
                stats.n_rejected += 1;
                tracing::trace!(t, h_abs, error_norm, "bdf step rejected");
                continue;
            }

            break (t_new, corrected.y, corrected.d, safety, error_norm, scale);
        };

        self.n_equal_steps += 1;
        self.t = t_new;
        self.y = y_new;
        self.h_abs = h_abs;

        // Update differences with the accepted correction.
        let next = &d_corr - self.d.row(order + 1).transpose();
        self.d.set_row(order + 2, &next.transpose());
        self.d.set_row(order + 1, &d_corr.transpose());
        for i in (0..=order).rev() {
            let sum = self.d.row(i) + self.d.row(i + 1);
            self.d.set_row(i, &sum);
        }

        let segment = DenseSegment::Backward {
            t: t_new,
            h: h_abs,
            order,
            d: self.d.rows(0, order + 1).clone_owned(),
        };

        if self.n_equal_steps < order + 1 {
            return Ok(segment);
        }

        // Order selection from neighbouring-order error estimates.
        let error_const = &self.coeffs.error_const;
        let error_m_norm = if order > 1 {
            let e = self.d.row(order).transpose() * error_const[order - 1];
            scaled_rms(&e, &scale)
        } else {
            f64::INFINITY
        };
        let error_p_norm = if order < MAX_ORDER {
            let e = self.d.row(order + 2).transpose() * error_const[order + 1];
            scaled_rms(&e, &scale)
        } else {
            f64::INFINITY
        };

        let norms = [error_m_norm, error_norm, error_p_norm];
        let mut best = 0;
        let mut best_factor = f64::NEG_INFINITY;
        for (i, norm) in norms.iter().enumerate() {
            let factor = norm.powf(-1.0 / (order + i) as f64);
            if factor > best_factor {
                best = i;
                best_factor = factor;
            }
        }

        let new_order = (order + best).saturating_sub(1).clamp(1, MAX_ORDER);
        if new_order != order {
            tracing::trace!(t = t_new, from = order, to = new_order, "bdf order change");
        }
        self.order = new_order;

        let factor = (safety * best_factor).min(MAX_FACTOR);
        self.h_abs *= factor;
        change_d(&mut self.d, new_order, factor);
        self.n_equal_steps = 0;
        self.lu = None;

        Ok(segment)
    }
}

/// Implicit variable-order BDF solver for stiff systems.
#[derive(Clone, Debug, Default)]
pub struct Bdf {
    pub options: SolverOptions,
}

impl Bdf {
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }
}

impl OdeSolver for Bdf {
    fn name(&self) -> &'static str {
        "BDF"
    }

    fn solve(
        &self,
        system: &dyn OdeSystem,
        span: TimeSpan,
        y0: &DVector<f64>,
        t_eval: &[f64],
    ) -> SolverResult<Solution> {
        validate_problem(system, span, y0, t_eval, &self.options)?;
        let mut stats = SolverStats::default();
        let mut stepper = BdfStepper::new(
            system,
            span.start,
            y0.clone(),
            span.end,
            &self.options,
            &mut stats,
        );
        drive(&mut stepper, system, span, y0, t_eval, &self.options, stats)
    }
}
